use std::{collections::HashMap, time::Duration};

use chrono::TimeDelta;
use config::{Config as ConfigLib, ConfigError, Environment, File};
use redis::{
    Client as RedisClient, RedisResult,
    aio::{ConnectionManager, ConnectionManagerConfig},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub redis: Option<RedisConfig>,
    pub crl: CrlConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub uri: SecretString,
    #[serde(default)]
    pub key_prefix: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrlConfig {
    /// How long a published CRL stays fresh (in seconds)
    pub validity_secs: u64,
    /// Deadline for each storage call (in milliseconds)
    pub operation_timeout_ms: u64,
    /// How often to check whether a republish is due (in seconds, 0 disables)
    pub poll_interval_secs: u64,
}

/// Upper bound on `crl.validity_secs` (ten years).
const MAX_VALIDITY_SECS: u64 = 10 * 366 * 24 * 60 * 60;

impl CrlConfig {
    pub fn validity(&self) -> TimeDelta {
        TimeDelta::seconds(self.validity_secs.min(MAX_VALIDITY_SECS) as i64)
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }

    pub fn poll_interval(&self) -> Option<Duration> {
        (self.poll_interval_secs > 0).then(|| Duration::from_secs(self.poll_interval_secs))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.validity_secs == 0 || self.validity_secs > MAX_VALIDITY_SECS {
            return Err(ConfigError::Message(format!(
                "crl.validity_secs must be between 1 and {MAX_VALIDITY_SECS}"
            )));
        }
        if self.operation_timeout_ms == 0 {
            return Err(ConfigError::Message(
                "crl.operation_timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl RedisConfig {
    /// Establishes a new Redis connection based on the provided URI.
    ///
    /// - To enable TLS, the URI must use the `rediss://` scheme.
    /// - To enable insecure TLS, the URI must use the `rediss://` scheme and end with `/#insecure`.
    ///
    /// # Errors
    /// Returns an error if the connection cannot be established.
    pub async fn start(&self) -> RedisResult<ConnectionManager> {
        let client = RedisClient::open(self.uri.expose_secret())?;
        let config = ConnectionManagerConfig::new().set_connection_timeout(Duration::from_secs(60));
        client.get_connection_manager_with_config(config).await
    }
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_sources(None)
    }

    pub fn load_with_sources(
        env_vars: Option<HashMap<String, String>>,
    ) -> Result<Self, ConfigError> {
        let mut builder = ConfigLib::builder()
            .set_default("server.host", "localhost")?
            .set_default("server.port", 3000)?
            .set_default("crl.validity_secs", 86_400)?
            .set_default("crl.operation_timeout_ms", 5_000)?
            .set_default("crl.poll_interval_secs", 0)?
            .add_source(File::with_name("config/settings").required(false));

        // If env_vars is provided, we use it instead of system environment
        // This is to avoid systems variables pollution across tests
        if let Some(vars) = env_vars {
            for (key, value) in vars {
                builder = builder.set_override(&key, value)?;
            }
        } else {
            // Should be in the format APP_SERVER__HOST or APP_CRL__VALIDITY_SECS
            builder = builder.add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__"),
            );
        }

        let config: Self = builder.build()?.try_deserialize()?;
        config.crl.validate()?;
        Ok(config)
    }
}
