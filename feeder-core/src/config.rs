//! Configuração do alimentador
//!
//! Carrega valores na ordem: padrões → arquivo TOML (opcional) → `.env` e
//! variáveis de ambiente. Flags de linha de comando são aplicadas por último,
//! pelo binário.
//!
//! ## Variáveis de Ambiente
//! - `GEMINI_API_KEY`: chave da API Gemini
//! - `FEEDER_MODEL`: modelo multimodal (padrão: gemini-1.5-flash)
//! - `FEEDER_GEMINI_ENDPOINT`: base da API (padrão: v1beta pública)
//! - `FEED_PET_HAR`: conteúdo HAR da requisição que aciona o alimentador
//! - `FEED_PET_HAR_PATH`: caminho de um arquivo `.har`
//! - `FEEDER_INTERVAL_SECS`: intervalo entre verificações (padrão: 300)
//! - `FEEDER_CAMERA_COMMAND`: programa + argumentos que escrevem a foto no stdout
//! - `FEEDER_CAMERA_FILE`: arquivo com o último quadro capturado
//! - `FEEDER_CAMERA_URL`: endpoint HTTP de snapshot

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Modelo usado quando nada é configurado
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Base pública da API Generative Language
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Cinco minutos entre verificações
pub const DEFAULT_INTERVAL_SECS: u64 = 5 * 60;

/// Tempo máximo de uma consulta ao modelo
pub const DEFAULT_VISION_TIMEOUT_SECS: u64 = 30;

// Carrega .env na primeira leitura do ambiente
static DOTENV_INIT: Lazy<()> = Lazy::new(|| {
    let _ = dotenv::dotenv();
});

#[inline]
fn ensure_loaded() {
    let _ = &*DOTENV_INIT;
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Erros de configuração
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Failed to read {path}: {message}")]
    Io { path: String, message: String },

    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Missing configuration: {0}")]
    Missing(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

// ═══════════════════════════════════════════════════════════════════════════════
// SEÇÕES
// ═══════════════════════════════════════════════════════════════════════════════

/// Origem das fotos do pote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CameraSource {
    /// Programa externo que escreve um JPEG/PNG no stdout
    Command {
        program: String,
        #[serde(default)]
        args: Vec<String>,
    },
    /// Arquivo sobrescrito por um capturador externo
    File { path: PathBuf },
    /// Endpoint de snapshot de uma câmera IP
    Url { url: String },
}

impl Default for CameraSource {
    fn default() -> Self {
        CameraSource::Command {
            program: "fswebcam".to_string(),
            args: [
                "--no-banner",
                "-r",
                "{width}x{height}",
                "--jpeg",
                "85",
                "-",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// Configuração da câmera
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub source: CameraSource,
    pub width: u32,
    pub height: u32,
    pub timeout_secs: u64,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            source: CameraSource::default(),
            width: 640,
            height: 480,
            timeout_secs: 20,
        }
    }
}

/// Configuração do classificador
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for VisionSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: DEFAULT_VISION_TIMEOUT_SECS,
        }
    }
}

/// Configuração do acionamento
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeederSettings {
    /// Arquivo `.har` exportado do navegador
    pub har_path: Option<PathBuf>,
    /// Conteúdo HAR embutido (tem prioridade sobre `har_path`)
    pub har_inline: Option<String>,
    /// Timeout de conexão e leitura
    pub timeout_secs: u64,
}

impl Default for FeederSettings {
    fn default() -> Self {
        Self {
            har_path: None,
            har_inline: None,
            timeout_secs: 30,
        }
    }
}

/// Configuração do laço
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleSettings {
    pub interval_secs: u64,
    /// Tamanho máximo do histórico de atividades
    pub log_capacity: usize,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_INTERVAL_SECS,
            log_capacity: 500,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CONFIGURAÇÃO COMPLETA
// ═══════════════════════════════════════════════════════════════════════════════

/// Configuração completa do alimentador
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeederConfig {
    pub camera: CameraSettings,
    pub vision: VisionSettings,
    pub feeder: FeederSettings,
    pub schedule: ScheduleSettings,
}

impl FeederConfig {
    /// Carrega padrões + arquivo opcional + ambiente, e valida
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Lê configuração TOML de um arquivo
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    /// Lê configuração TOML de uma string
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Aplica variáveis de ambiente (carrega `.env` antes)
    pub fn apply_env(&mut self) -> ConfigResult<()> {
        ensure_loaded();
        self.apply_env_with(|key| env::var(key).ok())
    }

    /// Aplica variáveis a partir de uma função de busca
    pub fn apply_env_with<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get("GEMINI_API_KEY") {
            self.vision.api_key = Some(key.trim().to_string());
        }
        if let Some(model) = get("FEEDER_MODEL") {
            self.vision.model = model.trim().to_string();
        }
        if let Some(endpoint) = get("FEEDER_GEMINI_ENDPOINT") {
            self.vision.endpoint = endpoint.trim().to_string();
        }
        if let Some(har) = get("FEED_PET_HAR") {
            self.feeder.har_inline = Some(har);
        }
        if let Some(path) = get("FEED_PET_HAR_PATH") {
            self.feeder.har_path = Some(PathBuf::from(path.trim()));
        }
        if let Some(secs) = get("FEEDER_INTERVAL_SECS") {
            self.schedule.interval_secs = secs.trim().parse().map_err(
                |e: std::num::ParseIntError| ConfigError::InvalidValue {
                    key: "FEEDER_INTERVAL_SECS".into(),
                    message: e.to_string(),
                },
            )?;
        }

        let command = get("FEEDER_CAMERA_COMMAND");
        let file = get("FEEDER_CAMERA_FILE");
        let url = get("FEEDER_CAMERA_URL");

        let sources = [command.is_some(), file.is_some(), url.is_some()];
        if sources.iter().filter(|set| **set).count() > 1 {
            return Err(ConfigError::InvalidValue {
                key: "FEEDER_CAMERA_*".into(),
                message: "only one of FEEDER_CAMERA_COMMAND, FEEDER_CAMERA_FILE, FEEDER_CAMERA_URL may be set".into(),
            });
        }

        if let Some(command) = command {
            let mut parts = command.split_whitespace().map(str::to_string);
            if let Some(program) = parts.next() {
                self.camera.source = CameraSource::Command {
                    program,
                    args: parts.collect(),
                };
            }
        } else if let Some(path) = file {
            self.camera.source = CameraSource::File {
                path: PathBuf::from(path.trim()),
            };
        } else if let Some(url) = url {
            self.camera.source = CameraSource::Url {
                url: url.trim().to_string(),
            };
        }

        Ok(())
    }

    /// Valida campos independentes de credenciais
    pub fn validate(&self) -> ConfigResult<()> {
        if self.schedule.interval_secs == 0 {
            return Err(ConfigError::Invalid("interval_secs must be > 0".into()));
        }
        if self.schedule.log_capacity == 0 {
            return Err(ConfigError::Invalid("log_capacity must be > 0".into()));
        }
        if self.camera.width == 0 || self.camera.height == 0 {
            return Err(ConfigError::Invalid(
                "camera width and height must be > 0".into(),
            ));
        }
        match &self.camera.source {
            CameraSource::Command { program, .. } if program.trim().is_empty() => {
                return Err(ConfigError::Invalid("camera program is empty".into()));
            }
            CameraSource::File { path } if path.as_os_str().is_empty() => {
                return Err(ConfigError::Invalid("camera file path is empty".into()));
            }
            CameraSource::Url { url } if url.trim().is_empty() => {
                return Err(ConfigError::Invalid("camera url is empty".into()));
            }
            _ => {}
        }
        if self.vision.model.trim().is_empty() {
            return Err(ConfigError::Invalid("vision model is empty".into()));
        }
        Ok(())
    }

    /// Chave da API, exigida para classificar
    pub fn api_key(&self) -> ConfigResult<&str> {
        self.vision
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ConfigError::Missing("GEMINI_API_KEY".into()))
    }

    /// Conteúdo HAR, exigido para alimentar
    pub fn har_content(&self) -> ConfigResult<String> {
        if let Some(inline) = self.feeder.har_inline.as_ref().filter(|h| !h.trim().is_empty()) {
            return Ok(inline.clone());
        }

        match &self.feeder.har_path {
            Some(path) => fs::read_to_string(path).map_err(|e| ConfigError::Io {
                path: path.display().to_string(),
                message: e.to_string(),
            }),
            None => Err(ConfigError::Missing(
                "FEED_PET_HAR or FEED_PET_HAR_PATH".into(),
            )),
        }
    }

    /// Intervalo entre verificações
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.schedule.interval_secs)
    }
}

/// Mascara um segredo para exibição (`AIza…c9`)
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}…{}", head, tail)
}
