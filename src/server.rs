pub mod errors;
pub mod handlers;

use axum::{
    Router,
    http::Method,
    routing::{get, post},
};
use color_eyre::eyre::{Result, WrapErr};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::crl::CrlService;
use handlers::{crl, health::health_check, revocations::record_revocation};

#[derive(Debug, Clone)]
pub struct ServerConfig<'a> {
    pub host: &'a str,
    pub port: u16,
}

#[derive(Clone)]
pub struct AppState {
    pub service: CrlService,
}

/// Builds the HTTP routes over `service`.
pub fn router(service: CrlService) -> Router {
    let trace_layer =
        TraceLayer::new_for_http().make_span_with(|request: &'_ axum::extract::Request<_>| {
            let uri = request.uri().to_string();
            tracing::info_span!("request", method = %request.method(), uri)
        });

    let cors_layer = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS]);

    Router::new()
        .route("/health", get(health_check))
        .route("/revocations", post(record_revocation))
        .route("/crl", get(crl::get_crl))
        .route("/crl.pem", get(crl::get_crl_pem))
        .route("/crl/publish", post(crl::publish_crl))
        .route("/crl/status", get(crl::crl_status))
        .layer(cors_layer)
        .layer(trace_layer)
        .with_state(AppState { service })
}

pub struct Server {
    router: Router,
    listener: TcpListener,
}

impl Server {
    /// Binds the listener; port 0 lets the OS pick one, see [port][Self::port].
    pub async fn new(service: CrlService, config: ServerConfig<'_>) -> Result<Self> {
        let addr = format!("{}:{}", config.host, config.port);
        let listener = TcpListener::bind(&addr)
            .await
            .wrap_err_with(|| format!("Binding TCP listener on {addr}"))?;

        Ok(Self {
            router: router(service),
            listener,
        })
    }

    /// The port the server is bound to.
    pub fn port(&self) -> Result<u16> {
        Ok(self
            .listener
            .local_addr()
            .wrap_err("Getting local address")?
            .port())
    }

    pub async fn run(self) -> Result<()> {
        let addr = self.listener.local_addr().wrap_err("Getting local address")?;
        tracing::info!("Server listening on http://{addr}");
        axum::serve(self.listener, self.router)
            .await
            .wrap_err("Running HTTP server")
    }
}

#[cfg(test)]
pub(crate) fn test_state() -> (AppState, crate::crl::ManualClock) {
    test_state_with(std::sync::Arc::new(crate::crl::MemoryStore::new()))
}

#[cfg(test)]
pub(crate) fn test_state_with(
    store: std::sync::Arc<dyn crate::crl::CrlStore>,
) -> (AppState, crate::crl::ManualClock) {
    use crate::crl::{ManualClock, PublicationScheduler, RevocationStore};
    use chrono::TimeZone;
    use std::sync::Arc;

    let clock = ManualClock::new(chrono::Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap());
    let revocations = RevocationStore::new(store).with_clock(Arc::new(clock.clone()));
    let service = CrlService::new(PublicationScheduler::new(revocations));
    (AppState { service }, clock)
}
