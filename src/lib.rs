pub mod config;
pub mod error;
pub mod http_client;
pub mod payload;
pub mod providers;
pub mod server;
