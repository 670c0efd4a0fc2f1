//! Ciclo de verificação: foto → classificação → alimentação → registro

use chrono::Local;
use serde::{Deserialize, Serialize};
use feeder_actuator::FeedCommand;
use feeder_core::traits::{
    Actuator, ActuatorError, BowlVerdict, Classifier, ComponentResult, Sensor,
    SensorError,
};
use crate::activity::{ActivityLog, LogKind};
use crate::error::OrchestrationResult;

/// Resultado de um ciclo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CycleOutcome {
    /// Pote vazio e alimentador acionado
    Fed,
    /// Pote com ração suficiente
    NoNeed,
    /// Veredito positivo, mas o acionamento falhou
    FeedFailed(String),
    ClassifyFailed(String),
    PhotoFailed(String),
    CameraNotReady,
    /// Parada pedida no meio do ciclo; nada foi registrado
    Cancelled,
}

impl CycleOutcome {
    /// Linha do histórico correspondente
    pub fn log_kind(&self) -> Option<LogKind> {
        match self {
            CycleOutcome::Fed => Some(LogKind::NeedToFeed),
            CycleOutcome::NoNeed => Some(LogKind::NoNeedToFeed),
            CycleOutcome::FeedFailed(msg) | CycleOutcome::ClassifyFailed(msg) => {
                Some(LogKind::Error(msg.clone()))
            }
            CycleOutcome::PhotoFailed(_) => Some(LogKind::PhotoFailed),
            CycleOutcome::CameraNotReady => Some(LogKind::CameraNotReady),
            CycleOutcome::Cancelled => None,
        }
    }

    pub fn fed(&self) -> bool {
        matches!(self, CycleOutcome::Fed)
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            CycleOutcome::FeedFailed(_)
                | CycleOutcome::ClassifyFailed(_)
                | CycleOutcome::PhotoFailed(_)
                | CycleOutcome::CameraNotReady
        )
    }
}

/// Componentes de um ciclo
#[derive(Debug)]
pub struct CheckCycle<S, C, A> {
    camera: S,
    classifier: C,
    feeder: A,
}

impl<S, C, A> CheckCycle<S, C, A>
where
    S: Sensor,
    C: Classifier<Input = S::RawData>,
    A: Actuator<Command = FeedCommand>,
{
    pub fn new(camera: S, classifier: C, feeder: A) -> Self {
        Self {
            camera,
            classifier,
            feeder,
        }
    }

    /// Executa uma verificação. `cancelled` é consultado entre as etapas;
    /// depois que o alimentador foi acionado o ciclo não é mais cancelado.
    pub fn run<F>(&mut self, cancelled: F) -> CycleOutcome
    where
        F: Fn() -> bool,
    {
        if cancelled() {
            return CycleOutcome::Cancelled;
        }
        if !self.camera.is_ready() {
            tracing::warn!(camera = self.camera.name(), "camera not ready");
            return CycleOutcome::CameraNotReady;
        }

        let photo = match self.camera.read() {
            Ok(photo) => photo,
            Err(SensorError::NotInitialized) => return CycleOutcome::CameraNotReady,
            Err(e) => {
                tracing::warn!(error = %e, "photo capture failed");
                return CycleOutcome::PhotoFailed(e.to_string());
            }
        };
        if cancelled() {
            return CycleOutcome::Cancelled;
        }

        let verdict = match self.classifier.classify(&photo) {
            Ok(verdict) => verdict,
            Err(e) => {
                tracing::warn!(error = %e, "bowl classification failed");
                return CycleOutcome::ClassifyFailed(e.to_string());
            }
        };
        if cancelled() {
            return CycleOutcome::Cancelled;
        }

        tracing::info!(%verdict, "bowl checked");
        if !verdict.needs_food() {
            return CycleOutcome::NoNeed;
        }

        match self.feeder.send(FeedCommand::Scheduled) {
            Ok(_) => CycleOutcome::Fed,
            Err(e) => CycleOutcome::FeedFailed(e.to_string()),
        }
    }

    /// Executa e registra uma linha com o horário de início do ciclo
    pub fn run_logged<F>(&mut self, log: &ActivityLog, cancelled: F) -> OrchestrationResult<CycleOutcome>
    where
        F: Fn() -> bool,
    {
        let started_at = Local::now();
        let outcome = self.run(cancelled);
        if let Some(kind) = outcome.log_kind() {
            log.record_at(started_at, kind)?;
        }
        Ok(outcome)
    }

    /// Foto + veredito, sem alimentar
    pub fn check(&mut self) -> ComponentResult<BowlVerdict> {
        let photo = self.camera.read()?;
        Ok(self.classifier.classify(&photo)?)
    }

    /// Aciona o alimentador diretamente
    pub fn feed(&mut self, command: FeedCommand) -> Result<A::Outcome, ActuatorError> {
        self.feeder.send(command)
    }
}
