//! # 📷 feeder-photonic — Captura Fotônica
//!
//! Implementa a câmera do alimentador usando o trait `Sensor`.
//! Responsável por obter uma foto estática do pote a cada ciclo.
//!
//! ## Origens suportadas
//!
//! - **Comando**: programa externo que escreve JPEG/PNG no stdout
//!   (`fswebcam`, `libcamera-still -o -`, `ffmpeg ... -f image2 -`)
//! - **Arquivo**: último quadro gravado por um capturador externo
//! - **URL**: endpoint de snapshot de câmera IP
//!
//! ## Exemplo
//!
//! ```ignore
//! use feeder_photonic::{CameraSensor, CameraConfig};
//! use feeder_core::traits::Sensor;
//!
//! let mut camera = CameraSensor::with_config(CameraConfig::default())?;
//! let image = camera.read()?;
//! println!("{} bytes ({})", image.len(), image.mime_type());
//! ```

pub mod error;
pub mod camera;
pub mod types;

pub use error::{PhotonicError, PhotonicResult};
pub use camera::{CameraSensor, CameraConfig};
pub use types::{ImageData, ImageFormat, MAX_IMAGE_BYTES};
