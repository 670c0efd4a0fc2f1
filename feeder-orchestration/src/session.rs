//! Sessão start/stop do alimentador

use std::sync::{Arc, Mutex, RwLock};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use feeder_actuator::FeedCommand;
use feeder_core::config::FeederConfig;
use feeder_core::traits::{Actuator, Classifier, Sensor};
use crate::activity::{ActivityLog, LogKind, DEFAULT_LOG_CAPACITY};
use crate::cycle::{CheckCycle, CycleOutcome};
use crate::error::{OrchestrationError, OrchestrationResult};
use crate::scheduler::{Scheduler, SchedulerConfig, SchedulerStats, StopHandle, Wake};

/// Configuração da sessão
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub interval: Duration,
    pub log_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            interval: SchedulerConfig::default().interval,
            log_capacity: DEFAULT_LOG_CAPACITY,
        }
    }
}

impl From<&FeederConfig> for SessionConfig {
    fn from(config: &FeederConfig) -> Self {
        Self {
            interval: config.interval(),
            log_capacity: config.schedule.log_capacity,
        }
    }
}

/// Contadores da sessão
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    /// Ciclos completos (cancelados não contam)
    pub cycles: u64,
    pub fed: u64,
    pub no_need: u64,
    pub photo_failures: u64,
    pub errors: u64,
    pub manual_feeds: u64,
    pub started_at: Option<DateTime<Local>>,
    pub last_outcome: Option<CycleOutcome>,
    pub scheduler: Option<SchedulerStats>,
}

impl SessionStats {
    fn record(&mut self, outcome: &CycleOutcome) {
        match outcome {
            CycleOutcome::Cancelled => return,
            CycleOutcome::Fed => self.fed += 1,
            CycleOutcome::NoNeed => self.no_need += 1,
            CycleOutcome::PhotoFailed(_) | CycleOutcome::CameraNotReady => {
                self.photo_failures += 1
            }
            CycleOutcome::ClassifyFailed(_) | CycleOutcome::FeedFailed(_) => self.errors += 1,
        }
        self.cycles += 1;
        self.last_outcome = Some(outcome.clone());
    }
}

struct Worker {
    handle: JoinHandle<()>,
    stop: StopHandle,
}

/// Laço de verificação com estado start/stop.
///
/// Handlers do histórico rodam na thread do laço e não devem chamar
/// `stop()` nem `feed_now()`.
pub struct FeederSession<S, C, A> {
    config: SessionConfig,
    cycle: Arc<Mutex<CheckCycle<S, C, A>>>,
    log: ActivityLog,
    running: Arc<RwLock<bool>>,
    stats: Arc<Mutex<SessionStats>>,
    worker: Mutex<Option<Worker>>,
}

impl<S, C, A> FeederSession<S, C, A>
where
    S: Sensor + 'static,
    C: Classifier<Input = S::RawData> + 'static,
    A: Actuator<Command = FeedCommand> + 'static,
{
    pub fn new(cycle: CheckCycle<S, C, A>, config: SessionConfig) -> OrchestrationResult<Self> {
        if config.interval.is_zero() {
            return Err(OrchestrationError::InvalidConfiguration(
                "interval must be > 0".into(),
            ));
        }
        if config.log_capacity == 0 {
            return Err(OrchestrationError::InvalidConfiguration(
                "log_capacity must be > 0".into(),
            ));
        }

        Ok(Self {
            log: ActivityLog::with_capacity(config.log_capacity),
            config,
            cycle: Arc::new(Mutex::new(cycle)),
            running: Arc::new(RwLock::new(false)),
            stats: Arc::new(Mutex::new(SessionStats::default())),
            worker: Mutex::new(None),
        })
    }

    /// Inicia o laço em uma thread própria; o primeiro ciclo roda imediatamente
    pub fn start(&self) -> OrchestrationResult<()> {
        let mut worker = self.worker.lock()?;
        {
            let mut running = self.running.write()?;
            if *running {
                return Err(OrchestrationError::AlreadyRunning);
            }
            *running = true;
        }

        let scheduler = Scheduler::new(SchedulerConfig {
            interval: self.config.interval,
        });
        let stop = scheduler.stop_handle();

        self.stats.lock()?.started_at = Some(Local::now());
        self.log.record(LogKind::Started)?;
        tracing::info!(interval_secs = self.config.interval.as_secs(), "feeder started");

        let cycle = Arc::clone(&self.cycle);
        let log = self.log.clone();
        let running = Arc::clone(&self.running);
        let stats = Arc::clone(&self.stats);

        let spawned = thread::Builder::new()
            .name("feeder-loop".into())
            .spawn(move || run_loop(cycle, log, running, stats, scheduler));

        match spawned {
            Ok(handle) => {
                *worker = Some(Worker { handle, stop });
                Ok(())
            }
            Err(e) => {
                *self.running.write()? = false;
                Err(OrchestrationError::Spawn(e.to_string()))
            }
        }
    }

    /// Alimenta agora, com ou sem o laço ativo
    pub fn feed_now(&self) -> OrchestrationResult<A::Outcome> {
        let result = self.cycle.lock()?.feed(FeedCommand::Manual);
        match result {
            Ok(outcome) => {
                self.stats.lock()?.manual_feeds += 1;
                self.log.record(LogKind::ManualFeed)?;
                Ok(outcome)
            }
            Err(e) => {
                self.log.record(LogKind::Error(e.to_string()))?;
                Err(e.into())
            }
        }
    }

    /// Executa um ciclo na thread atual
    pub fn run_once(&self) -> OrchestrationResult<CycleOutcome> {
        let outcome = self.cycle.lock()?.run_logged(&self.log, || false)?;
        self.stats.lock()?.record(&outcome);
        Ok(outcome)
    }
}

impl<S, C, A> FeederSession<S, C, A> {
    /// Para o laço. Ao retornar, nenhuma foto, classificação ou alimentação
    /// adicional acontece. Sem efeito se o laço não estiver ativo.
    pub fn stop(&self) -> OrchestrationResult<()> {
        let mut worker = self.worker.lock()?;
        *self.running.write()? = false;

        let Some(Worker { handle, stop }) = worker.take() else {
            return Ok(());
        };

        stop.stop();
        handle.join().map_err(|_| OrchestrationError::WorkerPanicked)?;

        self.log.record(LogKind::Stopped)?;
        tracing::info!("feeder stopped");
        Ok(())
    }

    pub fn is_running(&self) -> OrchestrationResult<bool> {
        Ok(*self.running.read()?)
    }

    /// Histórico compartilhado (clones observam as mesmas linhas)
    pub fn log(&self) -> &ActivityLog {
        &self.log
    }

    pub fn stats(&self) -> OrchestrationResult<SessionStats> {
        Ok(self.stats.lock()?.clone())
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
}

impl<S, C, A> Drop for FeederSession<S, C, A> {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            tracing::error!(error = %e, "failed to stop feeder loop");
        }
    }
}

impl<S, C, A> std::fmt::Debug for FeederSession<S, C, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeederSession")
            .field("config", &self.config)
            .field("running", &self.running.read().map(|r| *r).unwrap_or(false))
            .field("log", &self.log)
            .finish()
    }
}

fn run_loop<S, C, A>(
    cycle: Arc<Mutex<CheckCycle<S, C, A>>>,
    log: ActivityLog,
    running: Arc<RwLock<bool>>,
    stats: Arc<Mutex<SessionStats>>,
    mut scheduler: Scheduler,
) where
    S: Sensor,
    C: Classifier<Input = S::RawData>,
    A: Actuator<Command = FeedCommand>,
{
    let stopped = || running.read().map(|r| !*r).unwrap_or(true);

    while !stopped() {
        let started = Instant::now();

        let outcome = match cycle.lock() {
            Ok(mut cycle) => cycle.run_logged(&log, &stopped),
            Err(e) => Err(e.into()),
        };
        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(error = %e, "feeder loop aborted");
                if let Ok(mut running) = running.write() {
                    *running = false;
                }
                break;
            }
        };

        scheduler.record_execution_time(started.elapsed());
        if let Ok(mut stats) = stats.lock() {
            stats.record(&outcome);
            stats.scheduler = Some(scheduler.stats());
        }

        if outcome == CycleOutcome::Cancelled {
            break;
        }
        if scheduler.wait() == Wake::Stopped {
            break;
        }
    }

    tracing::debug!(ticks = scheduler.tick_count(), "feeder loop finished");
}
