//! Error types for client bootstrap.

use crate::config::ConfigError;
use crate::persistence::PersistenceError;
use crate::realtime::WsError;
use crate::transport::TransportError;
use rukun_core::ApiError;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Realtime(#[from] WsError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

pub type ClientResult<T> = Result<T, ClientError>;
