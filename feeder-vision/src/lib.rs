//! # 👁️ feeder-vision — Classificação do Pote
//!
//! Pergunta a um modelo multimodal (Gemini) se o pote de ração está vazio.
//! Implementa o trait `Classifier` do core sobre [`ImageData`](feeder_photonic::ImageData).
//!
//! ## Fluxo
//!
//! ```text
//! ImageData ──base64──▶ generateContent ──▶ "true"/"false" ──▶ BowlVerdict
//! ```
//!
//! A resposta só vira [`BowlVerdict::NeedsFood`](feeder_core::BowlVerdict) quando o
//! texto é exatamente `true`. Qualquer dúvida do modelo resulta em não alimentar.

pub mod error;
pub mod prompt;
pub mod gemini;

pub use error::{VisionError, VisionResult};
pub use prompt::BOWL_PROMPT;
pub use gemini::{
    GeminiClassifier, GeminiConfig, GenerateContentRequest, GenerateContentResponse,
    parse_response,
};
