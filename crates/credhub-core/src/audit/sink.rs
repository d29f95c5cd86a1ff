//! Audit event sinks.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use crate::error::AppError;
use crate::result::AppResult;

use super::AuditEvent;

/// Destination for audit events. Implementations must be append-only.
pub trait AuditSink: Send + Sync {
    /// Appends one event. Events are never mutated after write.
    fn append(&self, event: &AuditEvent) -> AppResult<()>;
}

/// Appends one JSON line per event to a file.
#[derive(Debug)]
pub struct FileSink {
    file: Mutex<File>,
}

impl FileSink {
    /// Opens (or creates) the log file in append mode, creating parent
    /// directories as needed.
    pub fn open(path: &str) -> AppResult<Self> {
        if let Some(dir) = Path::new(path).parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)?;
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl AuditSink for FileSink {
    fn append(&self, event: &AuditEvent) -> AppResult<()> {
        let mut line = serde_json::to_string(event)?;
        line.push('\n');

        let mut file = self
            .file
            .lock()
            .map_err(|_| AppError::internal("Audit log lock poisoned"))?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }
}

/// Captures events in memory for per-test log inspection.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all captured events.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().expect("sink lock poisoned").clone()
    }

    /// Returns captured events of the given kind.
    pub fn events_of_kind(&self, event: &str) -> Vec<AuditEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.event == event)
            .collect()
    }
}

impl AuditSink for MemorySink {
    fn append(&self, event: &AuditEvent) -> AppResult<()> {
        self.events
            .lock()
            .map_err(|_| AppError::internal("Audit sink lock poisoned"))?
            .push(event.clone());
        Ok(())
    }
}
