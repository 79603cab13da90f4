use std::collections::HashMap;

use crl_server::{
    config::Config,
    server::{Server, ServerConfig},
    setup::setup,
};

// Helper function to spawn a test server on a random port
pub async fn spawn_server() -> String {
    spawn_server_with(HashMap::new()).await
}

pub async fn spawn_server_with(mut overrides: HashMap<String, String>) -> String {
    overrides.insert("server.host".to_string(), "127.0.0.1".to_string());
    // Use a random OS port
    overrides.insert("server.port".to_string(), "0".to_string());
    let config = Config::load_with_sources(Some(overrides)).unwrap();

    let service = setup(&config).await.unwrap();
    let server_config = ServerConfig {
        host: &config.server.host,
        port: config.server.port,
    };

    let server = Server::new(service, server_config.clone()).await.unwrap();

    let port = server.port().unwrap();
    tokio::spawn(async move {
        server.run().await.expect("failed to run server");
    });

    format!("http://{}:{}", server_config.host, port)
}
