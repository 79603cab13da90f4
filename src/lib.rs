pub mod config;
pub mod crl;
pub mod poller;
pub mod server;
pub mod setup;
pub mod telemetry;
