//! Article source abstraction layer.
//!
//! This module defines the [`ArticleSource`] trait, the [`Candidate`] type
//! the rest of the game works with, and the wire types of a raw response.
//! The concrete source lives in [`reddit`].
//!
//! ## For contributors — adding a new source
//!
//! 1. Create a new file in this directory.
//! 2. Define a struct and implement [`ArticleSource`] for it, returning a
//!    [`RawRecord`] per call.
//! 3. Re-export it below and construct it in `main.rs`.
//!
//! The selector, validator and UI are all source-agnostic.

mod candidate;
mod listing;
mod reddit;

pub use candidate::{Candidate, Category};
pub use listing::{PostData, RawRecord};
pub use reddit::RedditSource;

use async_trait::async_trait;

use crate::error::FetchError;

/// Trait that every article source must implement.
///
/// The selector calls [`fetch()`](ArticleSource::fetch) from a background
/// task, so implementations must be [`Send`] + [`Sync`].
#[async_trait]
pub trait ArticleSource: Send + Sync {
    /// Human-readable label used in logs.
    fn name(&self) -> &str;

    /// Fetch one random raw record.
    ///
    /// Performs exactly one request and never retries; retrying is the
    /// selector's job.
    async fn fetch(&self) -> Result<RawRecord, FetchError>;
}
