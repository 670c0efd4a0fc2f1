//! # 🎯 Traits — Abstrações Fundamentais do Alimentador
//!
//! Este módulo define os traits base que todos os componentes do alimentador
//! devem implementar. A arquitetura segue o fluxo de um ciclo de verificação:
//!
//! | Etapa | Trait | Implementação |
//! |:------|:------|:--------------|
//! | Captura | [`Sensor`] | `feeder-photonic` |
//! | Classificação | [`Classifier`] | `feeder-vision` |
//! | Atuação | [`Actuator`] | `feeder-actuator` |
//!
//! ## Princípio de Design
//!
//! > *"Trait no core, implementação no módulo."*
//!
//! Os traits aqui são **abstrações puras**. As implementações concretas vivem
//! nos crates específicos, e o orquestrador só enxerga estes contratos.

use std::fmt::{self, Debug};
use std::time::{SystemTime, UNIX_EPOCH};

// ═══════════════════════════════════════════════════════════════════════════════
// TIPOS COMUNS
// ═══════════════════════════════════════════════════════════════════════════════

/// Timestamp em microsegundos desde epoch
pub type Timestamp = u64;

/// Timestamp atual em microsegundos
pub fn now_us() -> Timestamp {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or(0)
}

/// Veredito do classificador sobre o pote de ração
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BowlVerdict {
    /// Pote com no máximo 20% de ração: alimentar
    NeedsFood,
    /// Pote com ração suficiente, ou imagem inconclusiva
    Sufficient,
}

impl BowlVerdict {
    /// Interpreta a resposta textual do modelo.
    ///
    /// Apenas `"true"` (sem diferenciar maiúsculas, ignorando espaços nas
    /// bordas) significa alimentar. Qualquer outra resposta, inclusive vazia,
    /// é tratada como [`BowlVerdict::Sufficient`].
    pub fn from_answer(answer: &str) -> Self {
        if answer.trim().eq_ignore_ascii_case("true") {
            BowlVerdict::NeedsFood
        } else {
            BowlVerdict::Sufficient
        }
    }

    /// Precisa alimentar?
    pub fn needs_food(&self) -> bool {
        matches!(self, BowlVerdict::NeedsFood)
    }
}

impl From<bool> for BowlVerdict {
    fn from(needs_food: bool) -> Self {
        if needs_food {
            BowlVerdict::NeedsFood
        } else {
            BowlVerdict::Sufficient
        }
    }
}

impl fmt::Display for BowlVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BowlVerdict::NeedsFood => write!(f, "needs food"),
            BowlVerdict::Sufficient => write!(f, "sufficient"),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TRAIT BASE — Todo componente do alimentador
// ═══════════════════════════════════════════════════════════════════════════════

/// Trait base para qualquer componente do alimentador.
///
/// # Exemplo
///
/// ```ignore
/// use feeder_core::traits::FeederComponent;
///
/// #[derive(Debug)]
/// struct MyCamera;
///
/// impl FeederComponent for MyCamera {
///     fn name(&self) -> &str { "my-camera" }
/// }
/// ```
pub trait FeederComponent: Send + Sync + Debug {
    /// Nome único do componente (para logs e debug)
    fn name(&self) -> &str;

    /// Versão do componente
    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    /// Componente está pronto para uso?
    fn is_ready(&self) -> bool {
        true
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CAPTURA — Sensores
// ═══════════════════════════════════════════════════════════════════════════════

/// Erro de sensor
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SensorError {
    #[error("Sensor not initialized")]
    NotInitialized,
    #[error("Sensor read failed: {0}")]
    ReadFailed(String),
    #[error("Configuration invalid: {0}")]
    InvalidConfig(String),
    #[error("Hardware error: {0}")]
    Hardware(String),
    #[error("Timeout after {0}ms")]
    Timeout(u64),
}

/// Trait para sensores que produzem a foto do pote.
pub trait Sensor: FeederComponent {
    /// Tipo dos dados brutos lidos do sensor
    type RawData;

    /// Captura uma amostra
    fn read(&mut self) -> Result<Self::RawData, SensorError>;

    /// Calibra o sensor
    fn calibrate(&mut self) -> Result<(), SensorError> {
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CLASSIFICAÇÃO — Modelos de visão
// ═══════════════════════════════════════════════════════════════════════════════

/// Erro de classificador
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClassifierError {
    #[error("Request failed: {0}")]
    RequestFailed(String),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Response blocked: {0}")]
    Blocked(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Trait para classificadores que decidem se o pote precisa de ração.
pub trait Classifier: FeederComponent {
    /// Tipo de entrada aceita (normalmente a imagem capturada)
    type Input;

    /// Classifica a entrada
    fn classify(&mut self, input: &Self::Input) -> Result<BowlVerdict, ClassifierError>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// ATUAÇÃO — Disparo do alimentador
// ═══════════════════════════════════════════════════════════════════════════════

/// Erro de atuador
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActuatorError {
    #[error("Command failed: {0}")]
    CommandFailed(String),
    #[error("Actuator busy")]
    Busy,
    #[error("Actuator fault: {0}")]
    Fault(String),
    #[error("Invalid command: {0}")]
    InvalidCommand(String),
}

/// Status de atuador
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorStatus {
    /// Pronto para receber comandos
    Ready,
    /// Executando comando
    Busy,
    /// Último comando falhou
    Fault,
    /// Desligado
    Off,
}

/// Trait para atuadores que executam a ação física de alimentar.
pub trait Actuator: FeederComponent {
    /// Tipo de comando aceito
    type Command;

    /// Resultado de um comando bem sucedido
    type Outcome;

    /// Envia comando para o atuador
    fn send(&mut self, cmd: Self::Command) -> Result<Self::Outcome, ActuatorError>;

    /// Status atual do atuador
    fn status(&self) -> ActuatorStatus;

    /// Reseta atuador após falha
    fn reset(&mut self) -> Result<(), ActuatorError> {
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ERRO AGREGADO
// ═══════════════════════════════════════════════════════════════════════════════

/// Resultado de processamento de componente
pub type ComponentResult<T> = Result<T, ComponentError>;

/// Erro genérico de componente
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ComponentError {
    #[error("Sensor error: {0}")]
    Sensor(#[from] SensorError),
    #[error("Classifier error: {0}")]
    Classifier(#[from] ClassifierError),
    #[error("Actuator error: {0}")]
    Actuator(#[from] ActuatorError),
    #[error("Other error: {0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_from_answer() {
        assert_eq!(BowlVerdict::from_answer("true"), BowlVerdict::NeedsFood);
        assert_eq!(BowlVerdict::from_answer("  TRUE\n"), BowlVerdict::NeedsFood);
        assert_eq!(BowlVerdict::from_answer("True"), BowlVerdict::NeedsFood);
    }

    #[test]
    fn test_verdict_anything_else_is_sufficient() {
        assert_eq!(BowlVerdict::from_answer("false"), BowlVerdict::Sufficient);
        assert_eq!(BowlVerdict::from_answer(""), BowlVerdict::Sufficient);
        assert_eq!(BowlVerdict::from_answer("true."), BowlVerdict::Sufficient);
        assert_eq!(BowlVerdict::from_answer("**true**"), BowlVerdict::Sufficient);
        assert_eq!(BowlVerdict::from_answer("it is true"), BowlVerdict::Sufficient);
    }

    #[test]
    fn test_verdict_from_bool() {
        assert!(BowlVerdict::from(true).needs_food());
        assert!(!BowlVerdict::from(false).needs_food());
    }

    #[test]
    fn test_now_us_is_positive() {
        assert!(now_us() > 0);
    }

    #[test]
    fn test_component_error_conversion() {
        let err: ComponentError = SensorError::NotInitialized.into();
        assert!(err.to_string().contains("Sensor error"));

        let err: ComponentError = ActuatorError::Busy.into();
        assert_eq!(err.to_string(), "Actuator error: Actuator busy");
    }
}
