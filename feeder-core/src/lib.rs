//! # 🌀 Feeder-Core
//!
//! Núcleo do alimentador automático: contratos de componentes, erros comuns e
//! carregamento de configuração.
//!
//! > *"Fotografar, perguntar, alimentar, esperar."*
//!
//! ## O Ciclo
//!
//! 1. Um [`Sensor`](traits::Sensor) captura a foto do pote
//! 2. Um [`Classifier`](traits::Classifier) decide se o pote está vazio
//! 3. Um [`Actuator`](traits::Actuator) dispara o alimentador quando preciso
//! 4. O orquestrador registra o resultado e espera o próximo intervalo
//!
//! ## Módulos
//!
//! - [`traits`]: Traits fundamentais (Sensor, Classifier, Actuator)
//! - [`config`]: FeederConfig — arquivo TOML, `.env` e variáveis de ambiente
//!
//! ## Quick Start
//!
//! ```
//! use feeder_core::prelude::*;
//!
//! let config = FeederConfig::default();
//! assert!(config.validate().is_ok());
//!
//! let verdict = BowlVerdict::from_answer("true");
//! assert!(verdict.needs_food());
//! ```

pub mod traits;
pub mod config;
pub mod prelude;

pub use traits::{
    FeederComponent, Sensor, Classifier, Actuator, ActuatorStatus, BowlVerdict,
    SensorError, ClassifierError, ActuatorError, ComponentError, ComponentResult,
    Timestamp,
};
pub use config::{FeederConfig, ConfigError, ConfigResult};
