//! Histórico de atividades do alimentador

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use crate::error::OrchestrationResult;

/// Capacidade padrão do histórico
pub const DEFAULT_LOG_CAPACITY: usize = 500;

/// Handler de novas linhas (callback)
pub type LogHandler = Arc<dyn Fn(&LogEntry) + Send + Sync>;

/// O que aconteceu
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum LogKind {
    /// Pote vazio, alimentador acionado
    NeedToFeed,
    NoNeedToFeed,
    /// Falha de classificação ou de acionamento
    Error(String),
    PhotoFailed,
    CameraNotReady,
    ManualFeed,
    Started,
    Stopped,
}

impl LogKind {
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            LogKind::Error(_) | LogKind::PhotoFailed | LogKind::CameraNotReady
        )
    }
}

impl fmt::Display for LogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogKind::NeedToFeed => write!(f, "Bowl check done: Need to feed."),
            LogKind::NoNeedToFeed => write!(f, "Bowl check done: No need to feed."),
            LogKind::Error(message) => write!(f, "Error: {}", message),
            LogKind::PhotoFailed => write!(f, "Failed to take photo."),
            LogKind::CameraNotReady => write!(f, "Camera is not ready."),
            LogKind::ManualFeed => write!(f, "Manual feed sent."),
            LogKind::Started => write!(f, "Feeder started."),
            LogKind::Stopped => write!(f, "Feeder stopped."),
        }
    }
}

/// Linha do histórico
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub kind: LogKind,
}

impl LogEntry {
    pub fn new(kind: LogKind) -> Self {
        Self {
            timestamp: Local::now(),
            kind,
        }
    }
}

// `HH:MM:SS <mensagem>`
impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.timestamp.format("%H:%M:%S"), self.kind)
    }
}

/// Histórico limitado com assinantes
#[derive(Clone)]
pub struct ActivityLog {
    entries: Arc<Mutex<VecDeque<LogEntry>>>,
    handlers: Arc<Mutex<Vec<LogHandler>>>,
    capacity: usize,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_LOG_CAPACITY)
    }

    /// Cria com tamanho de histórico customizado (mínimo 1)
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(capacity.min(64)))),
            handlers: Arc::new(Mutex::new(Vec::new())),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Registra handler chamado a cada nova linha
    pub fn subscribe<F>(&self, handler: F) -> OrchestrationResult<()>
    where
        F: Fn(&LogEntry) + Send + Sync + 'static,
    {
        let mut handlers = self.handlers.lock()?;
        handlers.push(Arc::new(handler));
        Ok(())
    }

    /// Remove todos os handlers
    pub fn unsubscribe_all(&self) -> OrchestrationResult<()> {
        self.handlers.lock()?.clear();
        Ok(())
    }

    pub fn handler_count(&self) -> OrchestrationResult<usize> {
        Ok(self.handlers.lock()?.len())
    }

    /// Registra linha com o horário atual
    pub fn record(&self, kind: LogKind) -> OrchestrationResult<LogEntry> {
        self.push(LogEntry::new(kind))
    }

    /// Registra linha com horário explícito
    pub fn record_at(&self, timestamp: DateTime<Local>, kind: LogKind) -> OrchestrationResult<LogEntry> {
        self.push(LogEntry { timestamp, kind })
    }

    fn push(&self, entry: LogEntry) -> OrchestrationResult<LogEntry> {
        {
            let mut entries = self.entries.lock()?;
            entries.push_back(entry.clone());
            while entries.len() > self.capacity {
                entries.pop_front();
            }
        }

        tracing::debug!(line = %entry, "activity recorded");

        // Handlers rodam sem nenhum lock do histórico
        let handlers: Vec<LogHandler> = self.handlers.lock()?.clone();
        for handler in handlers {
            handler(&entry);
        }

        Ok(entry)
    }

    /// Cópia do histórico, mais antigo primeiro
    pub fn entries(&self) -> OrchestrationResult<Vec<LogEntry>> {
        Ok(self.entries.lock()?.iter().cloned().collect())
    }

    /// Linhas formatadas
    pub fn lines(&self) -> OrchestrationResult<Vec<String>> {
        Ok(self.entries.lock()?.iter().map(|e| e.to_string()).collect())
    }

    pub fn last(&self) -> OrchestrationResult<Option<LogEntry>> {
        Ok(self.entries.lock()?.back().cloned())
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) -> OrchestrationResult<()> {
        self.entries.lock()?.clear();
        Ok(())
    }
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ActivityLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActivityLog")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .finish()
    }
}
