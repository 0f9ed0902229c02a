use rampart_core::error::{ConfigError, SimError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Sim(#[from] SimError),
    #[error("failed to spawn game loop thread: {0}")]
    Spawn(#[source] std::io::Error),
}
