use crate::config::Config;
use crate::crl::{CrlService, CrlStore, MemoryStore, PublicationScheduler, RedisStore, RevocationStore};
use color_eyre::eyre::WrapErr;
use std::sync::Arc;

/// Wires the CRL engine from configuration.
///
/// Redis backs the store when `redis.uri` is set, otherwise state lives in
/// memory and is lost on restart.
pub async fn setup(config: &Config) -> color_eyre::Result<CrlService> {
    let store: Arc<dyn CrlStore> = if let Some(redis_config) = &config.redis {
        tracing::info!("Redis URI provided, using Redis for revocation storage.");
        let redis_conn = redis_config
            .start()
            .await
            .wrap_err("Failed to start Redis")?;

        let mut store = RedisStore::new(redis_conn);
        if let Some(prefix) = &redis_config.key_prefix {
            store = store.with_prefix(prefix.clone());
        }
        Arc::new(store)
    } else {
        tracing::warn!("No Redis URI, using in-memory revocation storage.");
        Arc::new(MemoryStore::new())
    };

    let revocations = RevocationStore::new(store).with_timeout(config.crl.operation_timeout());
    let scheduler = PublicationScheduler::new(revocations).with_validity(config.crl.validity());
    tracing::info!(
        "CRL validity is {}s, storage timeout {:?}",
        config.crl.validity().num_seconds(),
        config.crl.operation_timeout()
    );

    Ok(CrlService::new(scheduler))
}
