mod app;
mod client;
mod config;

pub use app::{GateError, GateResult};
pub use client::ClientError;
pub use config::ConfigError;
