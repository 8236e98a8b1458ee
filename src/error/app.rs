use thiserror::Error;

use super::{ClientError, ConfigError};

#[derive(Debug, Error)]
pub enum GateError {
    #[error("Client error: {0}")]
    Client(#[from] ClientError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

pub type GateResult<T> = Result<T, GateError>;

impl GateError {
    pub fn client<E>(error: E) -> Self
    where
        E: Into<ClientError>,
    {
        error.into().into()
    }

    pub fn config<E>(error: E) -> Self
    where
        E: Into<ConfigError>,
    {
        error.into().into()
    }
}
