use chrono::{DateTime, Local};

use crate::game::Presenter;
use crate::source::Candidate;
use crate::tally::Totals;

/// How many past guesses the history panel keeps.
const HISTORY_LIMIT: usize = 50;

/// A guessed article, kept for the history panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuessRecord {
    pub candidate: Candidate,
    pub correct: bool,
    pub guessed_at: DateTime<Local>,
}

/// Everything the UI renders. Updated only through [`Presenter`].
pub struct App {
    /// Headline currently awaiting a guess.
    pub headline: Option<String>,
    /// The article that was just guessed, unveiled.
    pub previous: Option<Candidate>,
    /// Result of the most recent guess.
    pub last_outcome: Option<bool>,
    /// Most recent first.
    pub history: Vec<GuessRecord>,
    pub attempts: u32,
    pub streak: u32,
    pub totals: Option<Totals>,
    /// Set when the selector gave up.
    pub failure: Option<String>,
    /// Whether the user has requested to quit.
    pub quit: bool,
    /// One-line status message.
    pub status: String,
}

impl App {
    pub fn new() -> Self {
        Self {
            headline: None,
            previous: None,
            last_outcome: None,
            history: Vec::new(),
            attempts: 0,
            streak: 0,
            totals: None,
            failure: None,
            quit: false,
            status: "Starting…".into(),
        }
    }

    pub fn is_waiting(&self) -> bool {
        self.headline.is_none() && self.failure.is_none()
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl Presenter for App {
    fn show_waiting(&mut self) {
        self.headline = None;
        self.failure = None;
        self.status = "Fetching an article…".into();
    }

    fn show_candidate(&mut self, title: &str) {
        self.headline = Some(title.to_string());
        self.failure = None;
        self.status = "Onion or not? o: The Onion  n: Not The Onion".into();
    }

    fn show_previous(&mut self, candidate: &Candidate) {
        self.previous = Some(candidate.clone());
        if let Some(correct) = self.last_outcome {
            self.history.insert(
                0,
                GuessRecord {
                    candidate: candidate.clone(),
                    correct,
                    guessed_at: Local::now(),
                },
            );
            self.history.truncate(HISTORY_LIMIT);
        }
    }

    fn show_outcome(&mut self, correct: bool) {
        self.last_outcome = Some(correct);
    }

    fn show_attempts(&mut self, attempts: u32) {
        self.attempts = attempts;
    }

    fn show_streak(&mut self, streak: u32) {
        self.streak = streak;
    }

    fn show_totals(&mut self, totals: Totals) {
        self.totals = Some(totals);
    }

    fn show_failure(&mut self, message: &str) {
        self.headline = None;
        self.failure = Some(message.to_string());
        self.status = "Could not fetch an article. r: retry".into();
    }
}
