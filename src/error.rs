use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("configuration file not found in '{0}'")]
    NotFound(PathBuf),
    #[error("'{0}' must be set")]
    Missing(&'static str),
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    // External errors
    #[error(transparent)]
    Database(#[from] mongodb::error::Error),
    #[error("document store unavailable: {0}")]
    Store(#[from] crate::resp::problem::Problem),
    #[error(transparent)]
    Payment(#[from] anyhow::Error),
    #[error(transparent)]
    Launch(#[from] rocket::Error),
}
