//! Game controller: session score, the current candidate, and guess
//! scoring.
//!
//! The controller is a small state machine driven by two kinds of event:
//! a selector message (a candidate arrived, or selection failed) and a
//! player guess.
//!
//! ```text
//! Fetching ──Ready──► AwaitingGuess ──guess──► Fetching ...
//!    │                                            ▲
//!    └──Failed──► Failed ──────retry──────────────┘
//! ```
//!
//! The phase only tracks the selector. Guesses are always scored against
//! the most recently dealt candidate, which stays current until the next
//! `Ready` replaces it, so a guess made while the next article is still
//! loading is counted too.

use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

use crate::select::{NextCandidate, SelectMsg};
use crate::source::{Candidate, Category};
use crate::tally::{OutcomeKind, ScoreCounter, Totals};

/// Session-scoped counters. Fresh per game, never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Score {
    pub attempts: u32,
    pub streak: u32,
}

impl Score {
    /// Account for one guess.
    pub fn record(&mut self, correct: bool) {
        self.attempts += 1;
        if correct {
            self.streak += 1;
        } else {
            self.streak = 0;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub correct: bool,
}

/// One-way notifications to whatever shows the game to the player.
pub trait Presenter {
    fn show_waiting(&mut self);
    fn show_candidate(&mut self, title: &str);
    /// Unveil the article that was just guessed.
    fn show_previous(&mut self, candidate: &Candidate);
    fn show_outcome(&mut self, correct: bool);
    fn show_attempts(&mut self, attempts: u32);
    fn show_streak(&mut self, streak: u32);
    fn show_totals(&mut self, totals: Totals);
    fn show_failure(&mut self, message: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Fetching,
    AwaitingGuess,
    Failed(String),
}

pub struct Game {
    phase: Phase,
    current: Option<Candidate>,
    score: Score,
    tally: Box<dyn ScoreCounter>,
    requests: UnboundedSender<NextCandidate>,
}

impl Game {
    pub fn new(tally: Box<dyn ScoreCounter>, requests: UnboundedSender<NextCandidate>) -> Self {
        Self {
            phase: Phase::Fetching,
            current: None,
            score: Score::default(),
            tally,
            requests,
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn score(&self) -> Score {
        self.score
    }

    /// Kick off the first selection and show the starting state.
    pub fn start(&mut self, presenter: &mut dyn Presenter) {
        match self.tally.totals() {
            Ok(totals) => presenter.show_totals(totals),
            Err(e) => warn!(error = %e, "could not read tally"),
        }
        presenter.show_attempts(self.score.attempts);
        presenter.show_streak(self.score.streak);
        self.request_next(presenter);
    }

    /// Apply a message from the selector task.
    pub fn on_select_msg(&mut self, msg: SelectMsg, presenter: &mut dyn Presenter) {
        match msg {
            SelectMsg::Ready(candidate) => {
                presenter.show_candidate(&candidate.title);
                self.current = Some(candidate);
                self.phase = Phase::AwaitingGuess;
            }
            SelectMsg::Failed(message) => {
                presenter.show_failure(&message);
                self.phase = Phase::Failed(message);
            }
        }
    }

    /// Score a guess against the current candidate.
    ///
    /// Every call is scored and counted. Returns `None` (and changes
    /// nothing) only before the first candidate has been dealt.
    pub fn submit_guess(
        &mut self,
        guessed: Category,
        presenter: &mut dyn Presenter,
    ) -> Option<Outcome> {
        let candidate = self.current.clone()?;

        let correct = guessed == candidate.source_category;
        self.score.record(correct);
        info!(
            guess = %guessed,
            actual = %candidate.source_category,
            correct,
            attempts = self.score.attempts,
            streak = self.score.streak,
            "guess scored"
        );

        match self.tally.increment(OutcomeKind::from_correct(correct)) {
            Ok(totals) => presenter.show_totals(totals),
            Err(e) => warn!(error = %e, "could not update tally"),
        }

        presenter.show_outcome(correct);
        presenter.show_attempts(self.score.attempts);
        presenter.show_streak(self.score.streak);
        presenter.show_previous(&candidate);

        if self.phase != Phase::Fetching {
            self.request_next(presenter);
        }
        Some(Outcome { correct })
    }

    /// Try again after the selector gave up. No-op in any other phase.
    pub fn retry(&mut self, presenter: &mut dyn Presenter) {
        if matches!(self.phase, Phase::Failed(_)) {
            self.request_next(presenter);
        }
    }

    fn request_next(&mut self, presenter: &mut dyn Presenter) {
        self.phase = Phase::Fetching;
        presenter.show_waiting();
        if self.requests.send(NextCandidate).is_err() {
            let message = "article selector is not running".to_string();
            warn!("{message}");
            presenter.show_failure(&message);
            self.phase = Phase::Failed(message);
        }
    }
}
