//! Scheduler de atraso fixo com parada imediata

use std::time::{Duration, Instant};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use serde::{Deserialize, Serialize};
use feeder_core::config::DEFAULT_INTERVAL_SECS;

/// Configuração do scheduler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Espera entre o fim de um ciclo e o início do próximo
    pub interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECS),
        }
    }
}

/// Por que a espera terminou
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    /// Intervalo completo
    Tick,
    /// Parada solicitada
    Stopped,
}

/// Envia o sinal de parada ao scheduler
#[derive(Debug, Clone)]
pub struct StopHandle {
    tx: Sender<()>,
}

impl StopHandle {
    pub fn stop(&self) {
        match self.tx.try_send(()) {
            Ok(()) | Err(TrySendError::Full(_)) => {}
            Err(TrySendError::Disconnected(_)) => {
                tracing::trace!("scheduler already gone");
            }
        }
    }
}

/// Scheduler do laço de verificação
#[derive(Debug)]
pub struct Scheduler {
    config: SchedulerConfig,
    stop_tx: Sender<()>,
    stop_rx: Receiver<()>,
    stopped: bool,
    last_tick: Option<Instant>,
    tick_count: u64,
    executions: u32,
    total_execution_time: Duration,
    min_execution_time: Option<Duration>,
    max_execution_time: Option<Duration>,
}

impl Scheduler {
    /// Cria novo scheduler
    pub fn new(config: SchedulerConfig) -> Self {
        let (stop_tx, stop_rx) = bounded(1);
        Self {
            config,
            stop_tx,
            stop_rx,
            stopped: false,
            last_tick: None,
            tick_count: 0,
            executions: 0,
            total_execution_time: Duration::ZERO,
            min_execution_time: None,
            max_execution_time: None,
        }
    }

    pub fn with_interval(interval: Duration) -> Self {
        Self::new(SchedulerConfig { interval })
    }

    pub fn interval(&self) -> Duration {
        self.config.interval
    }

    /// Handle para parar a espera de outra thread
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            tx: self.stop_tx.clone(),
        }
    }

    /// Aguarda o intervalo ou o sinal de parada, o que vier primeiro.
    /// Depois de parado, retorna `Stopped` sem esperar.
    pub fn wait(&mut self) -> Wake {
        if self.stopped {
            return Wake::Stopped;
        }

        match self.stop_rx.recv_timeout(self.config.interval) {
            Err(RecvTimeoutError::Timeout) => {
                self.last_tick = Some(Instant::now());
                self.tick_count += 1;
                Wake::Tick
            }
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                self.stopped = true;
                Wake::Stopped
            }
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Registra duração de um ciclo
    pub fn record_execution_time(&mut self, duration: Duration) {
        self.executions = self.executions.saturating_add(1);
        self.total_execution_time += duration;

        if self.min_execution_time.is_none_or(|min| duration < min) {
            self.min_execution_time = Some(duration);
        }
        if self.max_execution_time.is_none_or(|max| duration > max) {
            self.max_execution_time = Some(duration);
        }
    }

    /// Retorna estatísticas do scheduler
    pub fn stats(&self) -> SchedulerStats {
        let avg_execution_time = if self.executions > 0 {
            self.total_execution_time / self.executions
        } else {
            Duration::ZERO
        };

        SchedulerStats {
            tick_count: self.tick_count,
            interval: self.config.interval,
            since_last_tick: self.last_tick.map(|t| t.elapsed()),
            avg_execution_time,
            min_execution_time: self.min_execution_time.unwrap_or(Duration::ZERO),
            max_execution_time: self.max_execution_time.unwrap_or(Duration::ZERO),
        }
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}

/// Estatísticas do scheduler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerStats {
    /// Intervalos completados
    pub tick_count: u64,
    pub interval: Duration,
    pub since_last_tick: Option<Duration>,
    pub avg_execution_time: Duration,
    pub min_execution_time: Duration,
    pub max_execution_time: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_scheduler_creation() {
        let scheduler = Scheduler::default();
        assert_eq!(scheduler.tick_count(), 0);
        assert_eq!(scheduler.interval(), Duration::from_secs(300));
        assert!(!scheduler.is_stopped());
    }

    #[test]
    fn test_wait_ticks_after_interval() {
        let mut scheduler = Scheduler::with_interval(Duration::from_millis(10));

        let start = Instant::now();
        assert_eq!(scheduler.wait(), Wake::Tick);
        assert!(start.elapsed() >= Duration::from_millis(10));
        assert_eq!(scheduler.wait(), Wake::Tick);
        assert_eq!(scheduler.tick_count(), 2);
    }

    #[test]
    fn test_stop_interrupts_wait() {
        let mut scheduler = Scheduler::with_interval(Duration::from_secs(60));
        let handle = scheduler.stop_handle();

        let stopper = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            handle.stop();
        });

        let start = Instant::now();
        assert_eq!(scheduler.wait(), Wake::Stopped);
        assert!(start.elapsed() < Duration::from_secs(5));
        stopper.join().unwrap();

        // Parada é definitiva
        assert_eq!(scheduler.wait(), Wake::Stopped);
        assert_eq!(scheduler.tick_count(), 0);
    }

    #[test]
    fn test_stop_before_wait() {
        let mut scheduler = Scheduler::with_interval(Duration::from_secs(60));
        let handle = scheduler.stop_handle();
        handle.stop();
        handle.stop();
        assert_eq!(scheduler.wait(), Wake::Stopped);
    }

    #[test]
    fn test_execution_time_recording() {
        let mut scheduler = Scheduler::default();

        scheduler.record_execution_time(Duration::from_millis(5));
        scheduler.record_execution_time(Duration::from_millis(10));
        scheduler.record_execution_time(Duration::from_millis(3));

        let stats = scheduler.stats();
        assert_eq!(stats.min_execution_time, Duration::from_millis(3));
        assert_eq!(stats.max_execution_time, Duration::from_millis(10));
        assert_eq!(stats.avg_execution_time, Duration::from_millis(6));
        assert!(stats.since_last_tick.is_none());
    }
}
