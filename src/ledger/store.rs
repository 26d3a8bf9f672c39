use super::LedgerState;
use crate::error::PipelineError;
use log::debug;
use std::fmt::Debug;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::NamedTempFile;

/// Where the ledger state lives between runs.
pub trait LedgerStore: Send + Sync + Debug {
    /// Loads the full state. A store that was never written yields the default.
    fn load(&self) -> Result<LedgerState, PipelineError>;

    /// Replaces the stored state.
    fn save(&self, state: &LedgerState) -> Result<(), PipelineError>;

    fn name(&self) -> &'static str;
}

/// Keeps the state in memory only.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    state: Mutex<LedgerState>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: LedgerState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }
}

impl LedgerStore for InMemoryLedgerStore {
    fn load(&self) -> Result<LedgerState, PipelineError> {
        self.state
            .lock()
            .map(|s| s.clone())
            .map_err(|_| PipelineError::Ledger("in-memory ledger lock poisoned".into()))
    }

    fn save(&self, state: &LedgerState) -> Result<(), PipelineError> {
        let mut guard = self
            .state
            .lock()
            .map_err(|_| PipelineError::Ledger("in-memory ledger lock poisoned".into()))?;
        *guard = state.clone();
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// Stores the state as pretty-printed JSON in a single file.
///
/// Writes go to a temporary file in the same directory which is then
/// renamed over the target.
#[derive(Debug, Clone)]
pub struct JsonFileLedgerStore {
    path: PathBuf,
}

impl JsonFileLedgerStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LedgerStore for JsonFileLedgerStore {
    fn load(&self) -> Result<LedgerState, PipelineError> {
        match fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(LedgerState::default()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Ledger {} not found, starting empty", self.path.display());
                Ok(LedgerState::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, state: &LedgerState) -> Result<(), PipelineError> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let mut tmp = NamedTempFile::new_in(&dir)?;
        serde_json::to_writer_pretty(&mut tmp, state)?;
        tmp.write_all(b"\n")?;
        tmp.flush()?;
        tmp.persist(&self.path).map_err(|e| PipelineError::Io(e.error))?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "json-file"
    }
}
