//! # 🎭 feeder-orchestration — Orquestração do Alimentador
//!
//! Liga câmera, classificador e atuador em um laço periódico com estado
//! start/stop e um histórico de atividades com horário.
//!
//! ## Arquitetura
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    FeederSession                            │
//! │  ┌───────────────────────────────────────────────────────┐  │
//! │  │            CheckCycle                                 │  │
//! │  │  Sensor → Classifier → Actuator (se NeedsFood)        │  │
//! │  └───────────────────────────────────────────────────────┘  │
//! │  ┌───────────────────────────────────────────────────────┐  │
//! │  │            ActivityLog                                │  │
//! │  │  "HH:MM:SS Bowl check done: Need to feed."            │  │
//! │  └───────────────────────────────────────────────────────┘  │
//! │  ┌───────────────────────────────────────────────────────┐  │
//! │  │            Scheduler                                  │  │
//! │  │  espera fixa (5 min) interrompida por stop()          │  │
//! │  └───────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Exemplo
//!
//! ```ignore
//! use feeder_orchestration::{CheckCycle, FeederSession, SessionConfig};
//!
//! let cycle = CheckCycle::new(camera, classifier, feeder);
//! let session = FeederSession::new(cycle, SessionConfig::default())?;
//!
//! session.log().subscribe(|entry| println!("{}", entry))?;
//! session.start()?;
//! // ...
//! session.stop()?;
//! ```

pub mod activity;
pub mod cycle;
pub mod scheduler;
pub mod session;
pub mod error;

pub use activity::{ActivityLog, LogEntry, LogHandler, LogKind, DEFAULT_LOG_CAPACITY};
pub use cycle::{CheckCycle, CycleOutcome};
pub use scheduler::{Scheduler, SchedulerConfig, SchedulerStats, StopHandle, Wake};
pub use session::{FeederSession, SessionConfig, SessionStats};
pub use error::{OrchestrationError, OrchestrationResult};

// Re-exporta traits do core
pub use feeder_core::prelude::*;

#[cfg(test)]
mod tests;
