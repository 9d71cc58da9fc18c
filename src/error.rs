//! Error types shared across the crate.
//!
//! Fetching, validation and selection each have their own error enum so the
//! selector can tell a transient transport failure (back off and retry) from
//! a record that merely failed a content rule (fetch again right away).

use std::fmt;

use thiserror::Error;

/// A failure to obtain a raw record from the content source.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),
    #[error("server returned {status} for {url}")]
    Status { status: u16, url: String },
    #[error("decode error: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        Self::Network(e.to_string())
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.to_string())
    }
}

/// A well-formed record that the game does not want to show.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationReject {
    #[error("title contains banned word {word:?}")]
    BannedWord { word: String },
    #[error("self post ({kind})")]
    SelfPost { kind: String },
    #[error("post is from unexpected subreddit {0:?}")]
    ForeignCategory(String),
}

/// A required field was missing after a successful fetch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("record is missing {0}")]
pub struct MalformedRecord(pub &'static str);

/// Why the validator refused a raw record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error(transparent)]
    Reject(#[from] ValidationReject),
    #[error(transparent)]
    Malformed(#[from] MalformedRecord),
}

/// The last failure seen before the selector gave up.
#[derive(Debug)]
pub enum LastFailure {
    Fetch(FetchError),
    Malformed(MalformedRecord),
}

impl fmt::Display for LastFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch(e) => e.fmt(f),
            Self::Malformed(e) => e.fmt(f),
        }
    }
}

#[derive(Debug, Error)]
pub enum SelectError {
    #[error("gave up after {attempts} failed attempts: {last}")]
    Exhausted { attempts: u32, last: LastFailure },
    #[error("selection cancelled")]
    Cancelled,
}

#[derive(Debug, Error)]
pub enum TallyError {
    #[error("tally I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("tally file is corrupt: {0}")]
    Format(#[from] serde_json::Error),
}
