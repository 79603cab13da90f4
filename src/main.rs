use crl_server::{
    config::Config,
    poller,
    server::{Server, ServerConfig},
    setup::setup,
    telemetry,
};

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();
    telemetry::init_tracing();

    // Load configuration
    let config = Config::load()?;
    tracing::info!("Loaded configuration: {:?}", config);

    let service = setup(&config).await?;

    if let Some(period) = config.crl.poll_interval() {
        poller::spawn(service.clone(), period);
    } else {
        tracing::info!("CRL poller disabled, publication is left to external callers");
    }

    let server_config = ServerConfig {
        host: &config.server.host,
        port: config.server.port,
    };
    let server = Server::new(service, server_config).await?;
    server.run().await
}
