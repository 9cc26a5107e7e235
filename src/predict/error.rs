use std::path::PathBuf;
use thiserror::Error;

use crate::settings::ValidationError;

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("TLE catalog folder {} does not exist", .0.display())]
    CatalogMissing(PathBuf),
    #[error("reading TLE catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("{file}: bad element set: {message}")]
    InvalidTle { file: String, message: String },
    #[error("SGP4 propagation failed: {0}")]
    Propagation(String),
    #[error("no prediction window: {0}")]
    Window(#[from] ValidationError),
}
