//! Erros de orquestração

use thiserror::Error;
use feeder_core::traits::{ActuatorError, ClassifierError, ComponentError, SensorError};

pub type OrchestrationResult<T> = Result<T, OrchestrationError>;

/// Erros de orquestração
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrchestrationError {
    /// `start()` com o laço já ativo
    #[error("Feeder already running")]
    AlreadyRunning,

    /// Erro de componente
    #[error("Component error: {0}")]
    Component(#[from] ComponentError),

    /// Thread do laço não pôde ser criada
    #[error("Failed to spawn feeder loop: {0}")]
    Spawn(String),

    /// Thread do laço entrou em pânico
    #[error("Feeder loop panicked")]
    WorkerPanicked,

    /// Configuração inválida
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Lock poison
    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),
}

impl<T> From<std::sync::PoisonError<T>> for OrchestrationError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        OrchestrationError::LockPoisoned(err.to_string())
    }
}

impl From<SensorError> for OrchestrationError {
    fn from(err: SensorError) -> Self {
        OrchestrationError::Component(err.into())
    }
}

impl From<ClassifierError> for OrchestrationError {
    fn from(err: ClassifierError) -> Self {
        OrchestrationError::Component(err.into())
    }
}

impl From<ActuatorError> for OrchestrationError {
    fn from(err: ActuatorError) -> Self {
        OrchestrationError::Component(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(OrchestrationError::AlreadyRunning.to_string(), "Feeder already running");
    }

    #[test]
    fn test_component_error_conversion() {
        let comp_err = ComponentError::Other("test".into());
        let orch_err: OrchestrationError = comp_err.into();
        assert!(orch_err.to_string().contains("Component error"));
    }

    #[test]
    fn test_actuator_error_conversion() {
        let err: OrchestrationError = ActuatorError::Busy.into();
        assert_eq!(
            err.to_string(),
            "Component error: Actuator error: Actuator busy"
        );
    }

    #[test]
    fn test_poison_conversion() {
        let lock = std::sync::Arc::new(std::sync::Mutex::new(0));
        let clone = lock.clone();
        let _ = std::thread::spawn(move || {
            let _guard = clone.lock().unwrap();
            panic!("poison");
        })
        .join();

        let err: OrchestrationError = lock.lock().unwrap_err().into();
        assert!(matches!(err, OrchestrationError::LockPoisoned(_)));
    }
}
