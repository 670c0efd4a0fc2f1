//! Implementação do sensor de câmera

use std::io::Read;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use feeder_core::config::{CameraSettings, CameraSource};
use feeder_core::traits::{FeederComponent, Sensor, SensorError};
use crate::error::{PhotonicError, PhotonicResult};
use crate::types::{ImageData, MAX_IMAGE_BYTES};

/// Intervalo de polling do processo de captura
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Configuração de câmera
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraConfig {
    pub source: CameraSource,
    pub width: u32,
    pub height: u32,
    /// Tempo máximo de uma captura
    pub timeout_ms: u64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        CameraConfig::from(&CameraSettings::default())
    }
}

impl From<&CameraSettings> for CameraConfig {
    fn from(settings: &CameraSettings) -> Self {
        Self {
            source: settings.source.clone(),
            width: settings.width,
            height: settings.height,
            timeout_ms: settings.timeout_secs.saturating_mul(1000),
        }
    }
}

/// Câmera que fotografa o pote
#[derive(Debug, Clone)]
pub struct CameraSensor {
    config: CameraConfig,
    frame_count: u64,
}

impl CameraSensor {
    /// Cria câmera com configuração específica
    pub fn with_config(config: CameraConfig) -> PhotonicResult<Self> {
        Self::validate(&config)?;
        Ok(Self {
            config,
            frame_count: 0,
        })
    }

    fn validate(config: &CameraConfig) -> PhotonicResult<()> {
        if config.width == 0 || config.height == 0 {
            return Err(PhotonicError::InvalidConfig(
                "Width and height must be > 0".into(),
            ));
        }
        if config.timeout_ms == 0 {
            return Err(PhotonicError::InvalidConfig("Timeout must be > 0".into()));
        }

        match &config.source {
            CameraSource::Command { program, .. } if program.trim().is_empty() => Err(
                PhotonicError::InvalidConfig("Capture program is empty".into()),
            ),
            CameraSource::File { path } if path.as_os_str().is_empty() => Err(
                PhotonicError::InvalidConfig("Frame file path is empty".into()),
            ),
            CameraSource::Url { url } if !url.starts_with("http://") && !url.starts_with("https://") => {
                Err(PhotonicError::InvalidConfig(format!(
                    "Snapshot url must be http(s): {}",
                    url
                )))
            }
            _ => Ok(()),
        }
    }

    /// Retorna resolução configurada
    pub fn resolution(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Número de fotos capturadas com sucesso
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    /// Captura uma foto
    pub fn capture(&mut self) -> PhotonicResult<ImageData> {
        if !self.source_available() {
            return Err(PhotonicError::NotReady);
        }

        let bytes = match &self.config.source {
            CameraSource::Command { program, args } => {
                let args = self.expand_args(args);
                self.capture_command(program, &args)?
            }
            CameraSource::File { path } => std::fs::read(path).map_err(|e| {
                PhotonicError::CaptureFailed(format!("{}: {}", path.display(), e))
            })?,
            CameraSource::Url { url } => self.capture_url(url)?,
        };

        let image = ImageData::from_bytes(bytes)?;
        self.frame_count += 1;

        tracing::debug!(
            camera = self.name(),
            bytes = image.len(),
            format = %image.format(),
            "frame captured"
        );

        Ok(image)
    }

    fn source_available(&self) -> bool {
        match &self.config.source {
            CameraSource::File { path } => path.is_file(),
            _ => true,
        }
    }

    fn timeout(&self) -> Duration {
        Duration::from_millis(self.config.timeout_ms)
    }

    /// Substitui `{width}` e `{height}` nos argumentos
    pub(crate) fn expand_args(&self, args: &[String]) -> Vec<String> {
        let width = self.config.width.to_string();
        let height = self.config.height.to_string();
        args.iter()
            .map(|a| a.replace("{width}", &width).replace("{height}", &height))
            .collect()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ORIGENS DE CAPTURA
// ═══════════════════════════════════════════════════════════════════════════════

impl CameraSensor {
    /// Executa o programa de captura e lê a foto do stdout
    fn capture_command(&self, program: &str, args: &[String]) -> PhotonicResult<Vec<u8>> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| PhotonicError::CameraInitFailed(format!("{}: {}", program, e)))?;

        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| PhotonicError::CaptureFailed("stdout not captured".into()))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| PhotonicError::CaptureFailed("stderr not captured".into()))?;

        // Pipes lidos em paralelo para o processo nunca bloquear na escrita
        let out_reader = thread::spawn(move || {
            let mut buf = Vec::new();
            let result = stdout
                .by_ref()
                .take(MAX_IMAGE_BYTES as u64 + 1)
                .read_to_end(&mut buf);
            // Descarta o excedente para o processo não travar no pipe cheio
            let _ = std::io::copy(&mut stdout, &mut std::io::sink());
            result.map(|_| buf)
        });
        let err_reader = thread::spawn(move || {
            let mut text = String::new();
            let _ = stderr.read_to_string(&mut text);
            text
        });

        let deadline = Instant::now() + self.timeout();
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) if Instant::now() >= deadline => {
                    let _ = child.kill();
                    let _ = child.wait();
                    tracing::warn!(program, timeout_ms = self.config.timeout_ms, "capture timed out");
                    return Err(PhotonicError::Timeout(self.config.timeout_ms));
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(e) => return Err(PhotonicError::CaptureFailed(e.to_string())),
            }
        };

        let bytes = out_reader
            .join()
            .map_err(|_| PhotonicError::CaptureFailed("stdout reader panicked".into()))?
            .map_err(|e| PhotonicError::CaptureFailed(e.to_string()))?;
        let stderr_text = err_reader.join().unwrap_or_default();

        if !status.success() {
            return Err(PhotonicError::CaptureFailed(format!(
                "{} exited with {}: {}",
                program,
                status,
                stderr_text.trim()
            )));
        }

        Ok(bytes)
    }

    /// Baixa um snapshot de câmera IP
    fn capture_url(&self, url: &str) -> PhotonicResult<Vec<u8>> {
        let agent = ureq::AgentBuilder::new().timeout(self.timeout()).build();

        let response = agent.get(url).call().map_err(|e| match e {
            ureq::Error::Status(code, _) => PhotonicError::Http(format!("HTTP {} from {}", code, url)),
            other => PhotonicError::Http(format!("GET {} failed: {}", url, other)),
        })?;

        let mut buf = Vec::new();
        response
            .into_reader()
            .take(MAX_IMAGE_BYTES as u64 + 1)
            .read_to_end(&mut buf)
            .map_err(|e| PhotonicError::Http(format!("Failed to read snapshot body: {}", e)))?;

        Ok(buf)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// IMPLEMENTAÇÃO DOS TRAITS DO CORE
// ═══════════════════════════════════════════════════════════════════════════════

impl FeederComponent for CameraSensor {
    fn name(&self) -> &str {
        "CameraSensor"
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn is_ready(&self) -> bool {
        self.source_available()
    }
}

impl Sensor for CameraSensor {
    type RawData = ImageData;

    fn read(&mut self) -> Result<Self::RawData, SensorError> {
        self.capture().map_err(SensorError::from)
    }

    fn calibrate(&mut self) -> Result<(), SensorError> {
        Self::validate(&self.config).map_err(SensorError::from)
    }
}
