//! Erros da camada de atuador

use thiserror::Error;
use feeder_core::traits::ActuatorError as CoreActuatorError;

pub type ActuatorResult<T> = Result<T, ActuatorError>;

/// Erros de atuador
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ActuatorError {
    /// Captura HAR ilegível ou incompleta
    #[error("Invalid HAR: {0}")]
    InvalidHar(String),

    /// Comando falhou
    #[error("Command failed: {0}")]
    CommandFailed(String),

    /// Servidor respondeu fora de 2xx
    #[error("Feed request returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// Falha de rede (DNS, conexão, timeout)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Atuador ocupado
    #[error("Actuator busy")]
    Busy,

    /// Falha no atuador
    #[error("Actuator fault: {0}")]
    Fault(String),

    /// Configuração inválida
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<ActuatorError> for CoreActuatorError {
    fn from(err: ActuatorError) -> Self {
        match err {
            ActuatorError::InvalidHar(msg) => CoreActuatorError::InvalidCommand(msg),
            ActuatorError::CommandFailed(msg) => CoreActuatorError::CommandFailed(msg),
            ActuatorError::HttpStatus { status, body } => {
                CoreActuatorError::CommandFailed(format!("HTTP {}: {}", status, body))
            }
            ActuatorError::Transport(msg) => CoreActuatorError::CommandFailed(msg),
            ActuatorError::Busy => CoreActuatorError::Busy,
            ActuatorError::Fault(msg) => CoreActuatorError::Fault(msg),
            ActuatorError::InvalidConfig(msg) => {
                CoreActuatorError::InvalidCommand(format!("Invalid config: {}", msg))
            }
        }
    }
}

impl From<CoreActuatorError> for ActuatorError {
    fn from(err: CoreActuatorError) -> Self {
        match err {
            CoreActuatorError::CommandFailed(msg) => ActuatorError::CommandFailed(msg),
            CoreActuatorError::Busy => ActuatorError::Busy,
            CoreActuatorError::Fault(msg) => ActuatorError::Fault(msg),
            CoreActuatorError::InvalidCommand(msg) => ActuatorError::InvalidHar(msg),
        }
    }
}
