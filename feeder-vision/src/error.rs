//! Erros da camada de visão

use thiserror::Error;
use feeder_core::traits::ClassifierError;

pub type VisionResult<T> = Result<T, VisionError>;

/// Erros de classificação
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VisionError {
    /// Falha de transporte (DNS, TLS, timeout)
    #[error("Request failed: {0}")]
    Request(String),

    /// Status HTTP sem corpo de erro reconhecível
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Erro estruturado da API
    #[error("API error {code}: {message}")]
    Api { code: u16, message: String },

    /// Corpo de resposta inesperado
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Modelo recusou responder
    #[error("Response blocked: {0}")]
    Blocked(String),

    /// Configuração inválida
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<VisionError> for ClassifierError {
    fn from(err: VisionError) -> Self {
        match err {
            VisionError::Request(msg) => ClassifierError::RequestFailed(msg),
            VisionError::Status { status, body } => ClassifierError::Status { status, body },
            VisionError::Api { code, message } => ClassifierError::Status {
                status: code,
                body: message,
            },
            VisionError::InvalidResponse(msg) => ClassifierError::InvalidResponse(msg),
            VisionError::Blocked(msg) => ClassifierError::Blocked(msg),
            VisionError::InvalidConfig(msg) => ClassifierError::InvalidInput(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = VisionError::Api {
            code: 403,
            message: "API key not valid".into(),
        };
        assert_eq!(err.to_string(), "API error 403: API key not valid");
    }

    #[test]
    fn test_error_conversion_to_core() {
        let err: ClassifierError = VisionError::Blocked("SAFETY".into()).into();
        assert_eq!(err, ClassifierError::Blocked("SAFETY".into()));

        let err: ClassifierError = VisionError::Api {
            code: 429,
            message: "quota".into(),
        }
        .into();
        assert!(err.to_string().contains("429"));
    }
}
