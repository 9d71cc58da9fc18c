//! The two guessable categories and the validated article shown to the
//! player.
//!
//! A [`Candidate`] is only ever produced by [`crate::validate`]; everything
//! downstream of the selector (game state, rendering) works with this type
//! and never sees the raw listing JSON.

use std::fmt;
use std::str::FromStr;

use rand::Rng;

/// One of the two subreddits the player must tell apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    TheOnion,
    NotTheOnion,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::TheOnion, Category::NotTheOnion];

    /// Lower-cased canonical identifier, also the subreddit path segment.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::TheOnion => "theonion",
            Category::NotTheOnion => "nottheonion",
        }
    }

    /// Human-readable label for the UI.
    pub fn label(self) -> &'static str {
        match self {
            Category::TheOnion => "The Onion",
            Category::NotTheOnion => "Not The Onion",
        }
    }

    /// Pick a category uniformly at random.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        if rng.gen_bool(0.5) {
            Category::TheOnion
        } else {
            Category::NotTheOnion
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names neither category.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category {0:?}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == lower)
            .ok_or(UnknownCategory(s.to_string()))
    }
}

/// A validated article, ready to be shown to the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Headline, trimmed and guaranteed non-empty.
    pub title: String,

    /// Which subreddit the article came from.
    pub source_category: Category,

    /// Link to the original article or its discussion page.
    pub link: Option<String>,

    /// Preview image, if the post has one.
    pub image_url: Option<String>,
}
