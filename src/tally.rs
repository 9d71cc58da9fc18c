//! Aggregate correct/incorrect counters shared by every game played.
//!
//! The game only needs `increment(outcome)`. [`FileTally`] keeps the counts
//! in a small JSON file and performs each increment as a read-modify-write
//! under an exclusive file lock, so concurrent games never lose an update.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::TallyError;

/// Which counter a guess bumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    Correct,
    Incorrect,
}

impl OutcomeKind {
    pub fn from_correct(correct: bool) -> Self {
        if correct {
            Self::Correct
        } else {
            Self::Incorrect
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub correct: u64,
    pub incorrect: u64,
}

impl Totals {
    fn bump(&mut self, outcome: OutcomeKind) {
        match outcome {
            OutcomeKind::Correct => self.correct += 1,
            OutcomeKind::Incorrect => self.incorrect += 1,
        }
    }
}

/// The external counter collaborator.
pub trait ScoreCounter: Send {
    /// Atomically add one to the counter for `outcome`; returns the new
    /// totals.
    fn increment(&self, outcome: OutcomeKind) -> Result<Totals, TallyError>;

    /// Current totals.
    fn totals(&self) -> Result<Totals, TallyError>;
}

/// Counts kept for the lifetime of the process only.
#[derive(Debug, Default)]
pub struct MemoryTally {
    totals: Mutex<Totals>,
}

impl ScoreCounter for MemoryTally {
    fn increment(&self, outcome: OutcomeKind) -> Result<Totals, TallyError> {
        let mut totals = self.totals.lock().unwrap_or_else(|e| e.into_inner());
        totals.bump(outcome);
        Ok(*totals)
    }

    fn totals(&self) -> Result<Totals, TallyError> {
        Ok(*self.totals.lock().unwrap_or_else(|e| e.into_inner()))
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct TallyFile {
    #[serde(flatten)]
    totals: Totals,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

/// Counts persisted in a JSON file.
#[derive(Debug, Clone)]
pub struct FileTally {
    path: PathBuf,
}

impl FileTally {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_locked(file: &mut File) -> Result<TallyFile, TallyError> {
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        if contents.trim().is_empty() {
            return Ok(TallyFile::default());
        }
        Ok(serde_json::from_str(&contents)?)
    }
}

impl ScoreCounter for FileTally {
    fn increment(&self, outcome: OutcomeKind) -> Result<Totals, TallyError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)?;
        FileExt::lock_exclusive(&file)?;

        let result = (|| -> Result<Totals, TallyError> {
            let mut state = Self::read_locked(&mut file)?;
            state.totals.bump(outcome);
            state.updated_at = Some(Utc::now());

            let bytes = serde_json::to_vec_pretty(&state)?;
            file.set_len(0)?;
            file.seek(SeekFrom::Start(0))?;
            file.write_all(&bytes)?;
            file.sync_data()?;
            Ok(state.totals)
        })();

        let _ = FileExt::unlock(&file);
        if let Ok(totals) = &result {
            debug!(path = %self.path.display(), ?outcome, ?totals, "tally updated");
        }
        result
    }

    fn totals(&self) -> Result<Totals, TallyError> {
        let mut file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Totals::default()),
            Err(e) => return Err(e.into()),
        };
        FileExt::lock_shared(&file)?;
        let result = Self::read_locked(&mut file);
        let _ = FileExt::unlock(&file);
        Ok(result?.totals)
    }
}
