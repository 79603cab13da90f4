use std::sync::OnceLock;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt as _,
    util::SubscriberInitExt as _,
};

const DEFAULT_FILTER: &str = "info,crl_server=info,tower_http=info";

static INIT: OnceLock<()> = OnceLock::new();

/// Installs the global subscriber once; later calls are no-ops.
///
/// `RUST_LOG` overrides the default filter. Closed spans are logged with
/// their duration so request latency shows up next to the handler logs.
pub fn init_tracing() {
    let _ = INIT.get_or_init(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
        let _ = tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_span_events(FmtSpan::CLOSE))
            .with(env_filter)
            .try_init();
    });
}
