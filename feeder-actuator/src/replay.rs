//! Atuador que reenvia a requisição capturada

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use feeder_core::config::FeederSettings;
use feeder_core::traits::{
    Actuator, ActuatorError as CoreActuatorError, ActuatorStatus, FeederComponent,
};
use crate::error::{ActuatorError, ActuatorResult};
use crate::types::{FeedCommand, FeedReceipt, HarRequest};

/// Tamanho máximo do corpo de resposta guardado
const BODY_EXCERPT: usize = 500;

/// Configuração do atuador
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayConfig {
    pub name: String,
    /// Timeout de conexão e leitura
    pub timeout: Duration,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            name: "har-feeder".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl From<&FeederSettings> for ReplayConfig {
    fn from(settings: &FeederSettings) -> Self {
        Self {
            timeout: Duration::from_secs(settings.timeout_secs.max(1)),
            ..Self::default()
        }
    }
}

/// Estado interno do atuador
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayState {
    pub status: ActuatorStatus,
    /// Alimentações confirmadas (2xx)
    pub feeds: u64,
    pub failures: u64,
    pub last_receipt: Option<FeedReceipt>,
    pub last_error: Option<String>,
}

impl ReplayState {
    pub fn new() -> Self {
        Self {
            status: ActuatorStatus::Ready,
            feeds: 0,
            failures: 0,
            last_receipt: None,
            last_error: None,
        }
    }
}

impl Default for ReplayState {
    fn default() -> Self {
        Self::new()
    }
}

/// Alimentador acionado por replay HTTP
#[derive(Clone)]
pub struct HarReplayActuator {
    request: HarRequest,
    config: ReplayConfig,
    agent: ureq::Agent,
    state: Arc<Mutex<ReplayState>>,
}

impl fmt::Debug for HarReplayActuator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HarReplayActuator")
            .field("request", &self.request.to_string())
            .field("config", &self.config)
            .finish()
    }
}

impl HarReplayActuator {
    /// Cria atuador para uma requisição já lida
    pub fn new(request: HarRequest, config: ReplayConfig) -> ActuatorResult<Self> {
        request.validate()?;
        if config.timeout.is_zero() {
            return Err(ActuatorError::InvalidConfig("timeout must be > 0".into()));
        }

        let agent = ureq::AgentBuilder::new()
            .timeout_connect(config.timeout)
            .timeout_read(config.timeout)
            .build();

        Ok(Self {
            request,
            config,
            agent,
            state: Arc::new(Mutex::new(ReplayState::new())),
        })
    }

    /// Cria atuador a partir do conteúdo de um arquivo `.har`
    pub fn from_har(content: &str, config: ReplayConfig) -> ActuatorResult<Self> {
        Self::new(HarRequest::from_har(content)?, config)
    }

    pub fn request(&self) -> &HarRequest {
        &self.request
    }

    pub fn config(&self) -> &ReplayConfig {
        &self.config
    }

    /// Cópia do estado interno
    pub fn state(&self) -> ActuatorResult<ReplayState> {
        Ok(self.lock()?.clone())
    }

    /// Alimentações confirmadas
    pub fn feed_count(&self) -> u64 {
        self.lock().map(|s| s.feeds).unwrap_or(0)
    }

    /// Último recibo de sucesso
    pub fn last_receipt(&self) -> Option<FeedReceipt> {
        self.lock().ok().and_then(|s| s.last_receipt.clone())
    }

    /// Reenvia a requisição capturada
    pub fn feed(&self, command: FeedCommand) -> ActuatorResult<FeedReceipt> {
        {
            let mut state = self.lock()?;
            if state.status == ActuatorStatus::Busy {
                return Err(ActuatorError::Busy);
            }
            state.status = ActuatorStatus::Busy;
        }

        let result = self.dispatch(command);

        let mut state = self.lock()?;
        match &result {
            Ok(receipt) => {
                state.status = ActuatorStatus::Ready;
                state.feeds += 1;
                state.last_receipt = Some(receipt.clone());
                state.last_error = None;
                tracing::info!(%command, status = receipt.status, "feed request accepted");
            }
            Err(e) => {
                // Fault é informativo: a próxima tentativa ainda é enviada
                state.status = ActuatorStatus::Fault;
                state.failures += 1;
                state.last_error = Some(e.to_string());
                tracing::warn!(%command, error = %e, "feed request failed");
            }
        }

        result
    }

    fn dispatch(&self, command: FeedCommand) -> ActuatorResult<FeedReceipt> {
        let mut request = self.agent.request(&self.request.method, &self.request.url);
        for header in self.request.replay_headers() {
            request = request.set(&header.name, &header.value);
        }
        if let Some(mime) = self.request.implied_content_type() {
            request = request.set("Content-Type", mime);
        }

        tracing::debug!(%command, request = %self.request, "replaying captured request");

        let result = match self.request.body() {
            Some(body) => request.send_string(body),
            None => request.call(),
        };

        match result {
            Ok(response) => {
                let status = response.status();
                let body = response.into_string().map_err(|e| {
                    ActuatorError::Transport(format!("Failed to read response body: {}", e))
                })?;
                if !(200..300).contains(&status) {
                    return Err(ActuatorError::HttpStatus {
                        status,
                        body: excerpt(&body),
                    });
                }
                Ok(FeedReceipt::new(status, excerpt(&body), command))
            }
            Err(ureq::Error::Status(status, response)) => Err(ActuatorError::HttpStatus {
                status,
                body: excerpt(&response.into_string().unwrap_or_default()),
            }),
            Err(e) => Err(ActuatorError::Transport(e.to_string())),
        }
    }

    fn lock(&self) -> ActuatorResult<MutexGuard<'_, ReplayState>> {
        self.state
            .lock()
            .map_err(|_| ActuatorError::Fault("state lock poisoned".into()))
    }
}

fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(BODY_EXCERPT) {
        Some((idx, _)) => format!("{}…", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// IMPLEMENTAÇÃO DOS TRAITS DO CORE
// ═══════════════════════════════════════════════════════════════════════════════

impl Actuator for HarReplayActuator {
    type Command = FeedCommand;
    type Outcome = FeedReceipt;

    fn send(&mut self, cmd: Self::Command) -> Result<Self::Outcome, CoreActuatorError> {
        self.feed(cmd).map_err(|e| e.into())
    }

    fn status(&self) -> ActuatorStatus {
        self.lock().map(|s| s.status).unwrap_or(ActuatorStatus::Fault)
    }

    fn reset(&mut self) -> Result<(), CoreActuatorError> {
        let mut state = self.lock()?;
        state.status = ActuatorStatus::Ready;
        state.last_error = None;
        Ok(())
    }
}

impl FeederComponent for HarReplayActuator {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn is_ready(&self) -> bool {
        !matches!(self.status(), ActuatorStatus::Busy | ActuatorStatus::Off)
    }
}
