//! Acceptance rules for raw records.
//!
//! Checks run in a fixed order and the first failing check wins:
//! missing title, banned words, self post, missing subreddit, foreign
//! subreddit.

use crate::error::{MalformedRecord, Rejection, ValidationReject};
use crate::source::{Candidate, Category, PostData, RawRecord};

/// Substrings that disqualify a headline by default.
pub const DEFAULT_BANNED_WORDS: [&str; 2] = ["Quiz:", "?"];

const PERMALINK_HOST: &str = "https://www.reddit.com";

/// Content rules applied to every fetched record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rules {
    /// Case-sensitive literal substrings a title must not contain.
    pub banned_words: Vec<String>,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            banned_words: DEFAULT_BANNED_WORDS.iter().map(|w| w.to_string()).collect(),
        }
    }
}

impl Rules {
    pub fn banned_word_in<'a>(&'a self, title: &str) -> Option<&'a str> {
        self.banned_words
            .iter()
            .map(String::as_str)
            .filter(|w| !w.is_empty())
            .find(|w| title.contains(w))
    }
}

/// Turn a raw record into a [`Candidate`], or say why not.
pub fn validate(raw: &RawRecord, rules: &Rules) -> Result<Candidate, Rejection> {
    let post = raw.first_post().ok_or(MalformedRecord("post"))?;
    let data = &post.data;

    let title = data
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(MalformedRecord("title"))?;

    if let Some(word) = rules.banned_word_in(title) {
        return Err(ValidationReject::BannedWord {
            word: word.to_string(),
        }
        .into());
    }

    let kind = post.kind.as_deref().unwrap_or_default();
    let domain = data.domain.as_deref().unwrap_or_default();
    if data.is_self || is_self_marker(kind) || is_self_marker(domain) {
        return Err(ValidationReject::SelfPost {
            kind: kind.to_string(),
        }
        .into());
    }

    let subreddit = data
        .subreddit
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(MalformedRecord("subreddit"))?;
    let source_category = subreddit
        .parse::<Category>()
        .map_err(|_| ValidationReject::ForeignCategory(subreddit.to_string()))?;

    Ok(Candidate {
        title: title.to_string(),
        source_category,
        link: link_of(data),
        image_url: data.preview_url().map(unescape_url),
    })
}

fn is_self_marker(marker: &str) -> bool {
    let marker = marker.to_lowercase();
    Category::ALL
        .iter()
        .any(|c| marker.contains(&format!("self.{c}")))
}

fn link_of(data: &PostData) -> Option<String> {
    if let Some(link) = data.link.as_deref().or(data.url.as_deref()) {
        return Some(link.to_string());
    }
    data.permalink.as_deref().map(|p| {
        if p.starts_with("http") {
            p.to_string()
        } else {
            format!("{PERMALINK_HOST}{p}")
        }
    })
}

/// Preview URLs come HTML-escaped.
fn unescape_url(url: &str) -> String {
    url.replace("&amp;", "&")
}
