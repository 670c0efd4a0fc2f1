//! Erros específicos do módulo fotônico

use thiserror::Error;
use feeder_core::traits::SensorError;

pub type PhotonicResult<T> = Result<T, PhotonicError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PhotonicError {
    #[error("Camera initialization failed: {0}")]
    CameraInitFailed(String),

    #[error("Frame capture failed: {0}")]
    CaptureFailed(String),

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Image too large: {0} bytes")]
    TooLarge(usize),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Camera not ready")]
    NotReady,

    #[error("Timeout after {0}ms")]
    Timeout(u64),

    #[error("Snapshot request failed: {0}")]
    Http(String),
}

// Conversão para SensorError do core
impl From<PhotonicError> for SensorError {
    fn from(err: PhotonicError) -> Self {
        match err {
            PhotonicError::NotReady => SensorError::NotInitialized,
            PhotonicError::Timeout(ms) => SensorError::Timeout(ms),
            PhotonicError::CameraInitFailed(msg) => SensorError::Hardware(msg),
            PhotonicError::InvalidConfig(msg) => SensorError::InvalidConfig(msg),
            other => SensorError::ReadFailed(other.to_string()),
        }
    }
}
