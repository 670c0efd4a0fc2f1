//! # 🦾 feeder-actuator — Acionamento do Alimentador
//!
//! Implementa o trait `Actuator` do core reenviando uma requisição HTTP
//! capturada pelo navegador (arquivo HAR). É a mesma requisição que o app do
//! fabricante faz ao apertar "alimentar".
//!
//! ## Arquitetura
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            Actuator Layer               │
//! │  ┌──────────────┐  ┌─────────────────┐  │
//! │  │  HarRequest  │→ │HarReplayActuator│  │
//! │  │ entries[0]   │  │  ureq, 30s      │  │
//! │  └──────────────┘  └─────────────────┘  │
//! └─────────────────────────────────────────┘
//!                   ↓
//!        Servidor do alimentador (HTTP)
//! ```
//!
//! ## Replay
//!
//! - Método, URL, cabeçalhos e `postData` são enviados como capturados
//! - Pseudo-cabeçalhos HTTP/2 (`:authority`, `:path`...) e cabeçalhos que o
//!   cliente calcula (`host`, `content-length`, ...) são descartados
//! - `postData.mimeType` vira `Content-Type` quando nenhum cabeçalho o define
//! - Respostas fora de 2xx são erro
//!
//! ## Exemplo de Uso
//!
//! ```ignore
//! use feeder_actuator::{HarReplayActuator, ReplayConfig, FeedCommand};
//!
//! let har = std::fs::read_to_string("feed.har")?;
//! let feeder = HarReplayActuator::from_har(&har, ReplayConfig::default())?;
//! let receipt = feeder.feed(FeedCommand::Manual)?;
//! println!("HTTP {}", receipt.status);
//! ```

pub mod error;
pub mod types;
pub mod replay;

pub use error::{ActuatorError, ActuatorResult};
pub use types::{FeedCommand, FeedReceipt, HarHeader, HarPostData, HarRequest};
pub use replay::{HarReplayActuator, ReplayConfig, ReplayState};
