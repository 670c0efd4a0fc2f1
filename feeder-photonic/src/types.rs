//! Tipos de dados fotônicos

use std::fmt;
use serde::{Deserialize, Serialize};
use feeder_core::traits::{now_us, Timestamp};
use crate::error::{PhotonicError, PhotonicResult};

/// Limite de dados inline aceito pela API de visão (20 MiB)
pub const MAX_IMAGE_BYTES: usize = 20 * 1024 * 1024;

/// Formato de imagem reconhecido
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Jpeg,
    Png,
    Webp,
}

impl ImageFormat {
    /// Detecta o formato pelos bytes mágicos
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ImageFormat::Jpeg)
        } else if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            Some(ImageFormat::Png)
        } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            Some(ImageFormat::Webp)
        } else {
            None
        }
    }

    /// MIME type
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
            ImageFormat::Webp => "image/webp",
        }
    }

    /// Extensão de arquivo usual
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Png => "png",
            ImageFormat::Webp => "webp",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime_type())
    }
}

/// Foto capturada, já codificada
#[derive(Clone, PartialEq, Eq)]
pub struct ImageData {
    bytes: Vec<u8>,
    format: ImageFormat,
    captured_at: Timestamp,
}

impl ImageData {
    /// Valida e embala bytes codificados
    pub fn from_bytes(bytes: Vec<u8>) -> PhotonicResult<Self> {
        if bytes.is_empty() {
            return Err(PhotonicError::InvalidImage("empty payload".into()));
        }
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(PhotonicError::TooLarge(bytes.len()));
        }

        let format = ImageFormat::sniff(&bytes).ok_or_else(|| {
            PhotonicError::InvalidImage("unrecognized format (expected JPEG, PNG or WebP)".into())
        })?;

        Ok(Self {
            bytes,
            format,
            captured_at: now_us(),
        })
    }

    /// Bytes codificados
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    /// Momento da captura (µs desde epoch)
    pub fn captured_at(&self) -> Timestamp {
        self.captured_at
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

// Não despeja megabytes de bytes no Debug
impl fmt::Debug for ImageData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageData")
            .field("format", &self.format)
            .field("len", &self.bytes.len())
            .field("captured_at", &self.captured_at)
            .finish()
    }
}
