//! # Prelude — Re-exportações Convenientes
//!
//! Importação única para usar o Feeder-Core:
//!
//! ```
//! use feeder_core::prelude::*;
//! ```

// Traits fundamentais
pub use crate::traits::{
    // Base
    FeederComponent,
    Timestamp,
    BowlVerdict,
    now_us,
    // Captura
    Sensor,
    SensorError,
    // Classificação
    Classifier,
    ClassifierError,
    // Atuação
    Actuator,
    ActuatorError,
    ActuatorStatus,
    // Agregado
    ComponentError,
    ComponentResult,
};

// Configuração
pub use crate::config::{
    FeederConfig,
    CameraSettings,
    CameraSource,
    VisionSettings,
    FeederSettings,
    ScheduleSettings,
    ConfigError,
    ConfigResult,
};
