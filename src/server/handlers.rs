pub mod crl;
pub mod health;
pub mod revocations;
