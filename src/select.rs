//! Candidate selection.
//!
//! [`select_next`] drives an [`ArticleSource`] until the validator accepts a
//! record. Content rejections fetch again straight away; transport failures
//! and malformed records back off exponentially and give up after the
//! configured number of consecutive failures.
//!
//! [`spawn`] runs selection on a background task, one request at a time,
//! and reports results to the UI thread over a channel.
//!
//! ```text
//! ┌─────────┐ NextCandidate ┌────────────┐ fetch() ┌──────────┐
//! │ game.rs │ ────────────► │ select.rs  │ ──────► │ source/  │
//! │         │ ◄──────────── │  (task)    │ ◄────── │          │
//! └─────────┘   SelectMsg   └────────────┘         └──────────┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::{LastFailure, Rejection, SelectError};
use crate::source::{ArticleSource, Candidate};
use crate::validate::{validate, Rules};

/// Backoff settings for transport and malformed-record failures.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Consecutive failures tolerated before giving up (including the
    /// first try).
    pub max_attempts: u32,
    /// Delay after the first failure, in milliseconds.
    pub initial_delay_ms: u64,
    /// Upper bound on any single delay, in milliseconds.
    pub max_delay_ms: u64,
    /// Delay multiplier applied after each further failure.
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay_ms: 500,
            max_delay_ms: 8_000,
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after the `failure`-th consecutive failure (1-indexed).
    pub fn delay_for_attempt(&self, failure: u32) -> Duration {
        let exponent = failure.saturating_sub(1).min(32) as i32;
        let ms = self.initial_delay_ms as f64 * self.backoff_multiplier.max(1.0).powi(exponent);
        Duration::from_millis(ms.min(self.max_delay_ms as f64) as u64)
    }

    fn budget(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

/// Fetch and validate until a candidate is accepted or the retry budget
/// runs out.
pub async fn select_next(
    source: &dyn ArticleSource,
    rules: &Rules,
    policy: &RetryPolicy,
) -> Result<Candidate, SelectError> {
    let mut failures = 0u32;

    loop {
        let failure = match source.fetch().await {
            Ok(raw) => match validate(&raw, rules) {
                Ok(candidate) => {
                    info!(
                        title = %candidate.title,
                        category = %candidate.source_category,
                        "candidate accepted"
                    );
                    return Ok(candidate);
                }
                Err(Rejection::Reject(reason)) => {
                    debug!(%reason, "article didn't look right, skipping it");
                    failures = 0;
                    continue;
                }
                Err(Rejection::Malformed(e)) => {
                    warn!(source = source.name(), error = %e, "response missing elements");
                    LastFailure::Malformed(e)
                }
            },
            Err(e) => LastFailure::Fetch(e),
        };

        failures += 1;
        if failures >= policy.budget() {
            return Err(SelectError::Exhausted {
                attempts: failures,
                last: failure,
            });
        }

        let delay = policy.delay_for_attempt(failures);
        debug!(failures, ?delay, error = %failure, "backing off before next fetch");
        tokio::time::sleep(delay).await;
    }
}

/// [`select_next`], aborted as soon as `cancel` fires.
pub async fn select_until_cancelled(
    source: &dyn ArticleSource,
    rules: &Rules,
    policy: &RetryPolicy,
    cancel: &CancellationToken,
) -> Result<Candidate, SelectError> {
    tokio::select! {
        _ = cancel.cancelled() => Err(SelectError::Cancelled),
        result = select_next(source, rules, policy) => result,
    }
}

/// Ask the selector for one more candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextCandidate;

/// Messages sent from the selector task to the UI thread.
#[derive(Debug)]
pub enum SelectMsg {
    /// A candidate passed validation.
    Ready(Candidate),
    /// The retry budget ran out; the description is shown to the player.
    Failed(String),
}

/// Channels connecting the UI thread to the selector task.
pub struct SelectorHandle {
    pub requests: mpsc::UnboundedSender<NextCandidate>,
    pub messages: mpsc::UnboundedReceiver<SelectMsg>,
}

/// Spawn the selector task on the current tokio runtime.
///
/// Requests are served one at a time, so at most one fetch is ever in
/// flight. The task ends when `cancel` fires or either channel closes.
pub fn spawn(
    source: Arc<dyn ArticleSource>,
    rules: Rules,
    policy: RetryPolicy,
    cancel: CancellationToken,
) -> SelectorHandle {
    let (req_tx, mut req_rx) = mpsc::unbounded_channel::<NextCandidate>();
    let (msg_tx, msg_rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        loop {
            let request = tokio::select! {
                _ = cancel.cancelled() => None,
                r = req_rx.recv() => r,
            };
            if request.is_none() {
                break;
            }

            let result = select_until_cancelled(source.as_ref(), &rules, &policy, &cancel).await;
            let msg = match result {
                Ok(candidate) => SelectMsg::Ready(candidate),
                Err(SelectError::Cancelled) => break,
                Err(e) => {
                    error!(error = %e, "candidate selection failed");
                    SelectMsg::Failed(e.to_string())
                }
            };

            // If the receiver is gone the UI has exited.
            if msg_tx.send(msg).is_err() {
                break;
            }
        }
        debug!("selector stopped");
    });

    SelectorHandle {
        requests: req_tx,
        messages: msg_rx,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::error::FetchError;
    use crate::source::{Category, RawRecord};

    /// Replays a fixed list of responses, then fails.
    struct ScriptedSource {
        script: Mutex<VecDeque<Result<RawRecord, FetchError>>>,
        calls: AtomicUsize,
    }

    impl ScriptedSource {
        fn new(script: Vec<Result<RawRecord, FetchError>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ArticleSource for ScriptedSource {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn fetch(&self) -> Result<RawRecord, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(FetchError::Network("script exhausted".into())))
        }
    }

    /// Never answers.
    struct StalledSource;

    #[async_trait]
    impl ArticleSource for StalledSource {
        fn name(&self) -> &str {
            "stalled"
        }

        async fn fetch(&self) -> Result<RawRecord, FetchError> {
            std::future::pending().await
        }
    }

    fn post(kind: &str, title: &str, subreddit: &str) -> Result<RawRecord, FetchError> {
        Ok(serde_json::from_value(json!([
            {"data": {"children": [{"kind": kind, "data": {"title": title, "subreddit": subreddit}}]}}
        ]))
        .unwrap())
    }

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            initial_delay_ms: 1,
            max_delay_ms: 2,
            backoff_multiplier: 2.0,
        }
    }

    // -- backoff -------------------------------------------------------------

    #[test]
    fn delay_grows_geometrically_and_caps() {
        let p = RetryPolicy {
            max_attempts: 10,
            initial_delay_ms: 100,
            max_delay_ms: 1_000,
            backoff_multiplier: 2.0,
        };
        assert_eq!(p.delay_for_attempt(1), Duration::from_millis(100));
        assert_eq!(p.delay_for_attempt(2), Duration::from_millis(200));
        assert_eq!(p.delay_for_attempt(3), Duration::from_millis(400));
        assert_eq!(p.delay_for_attempt(4), Duration::from_millis(800));
        assert_eq!(p.delay_for_attempt(5), Duration::from_millis(1_000));
        assert_eq!(p.delay_for_attempt(500), Duration::from_millis(1_000));
    }

    #[test]
    fn zero_attempts_still_tries_once() {
        let p = RetryPolicy {
            max_attempts: 0,
            ..RetryPolicy::default()
        };
        assert_eq!(p.budget(), 1);
    }

    // -- select_next ---------------------------------------------------------

    #[tokio::test]
    async fn accepts_first_good_record() {
        let src = ScriptedSource::new(vec![post("t3", "Local man wins lottery", "nottheonion")]);
        let c = select_next(&src, &Rules::default(), &fast_policy(3)).await.unwrap();
        assert_eq!(c.source_category, Category::NotTheOnion);
        assert_eq!(src.calls(), 1);
    }

    #[tokio::test]
    async fn skips_banned_and_self_posts() {
        let src = ScriptedSource::new(vec![
            post("t3", "Quiz: Are you a chicken?", "TheOnion"),
            post("self.theonion", "Meta discussion", "TheOnion"),
            post("t3", "Nation Sighs", "TheOnion"),
        ]);
        let c = select_next(&src, &Rules::default(), &fast_policy(1)).await.unwrap();
        assert_eq!(c.title, "Nation Sighs");
        assert_eq!(src.calls(), 3);
    }

    #[tokio::test]
    async fn retries_after_fetch_error() {
        let src = ScriptedSource::new(vec![
            Err(FetchError::Network("connection reset".into())),
            Err(FetchError::Status {
                status: 429,
                url: "http://x".into(),
            }),
            post("t3", "Headline", "TheOnion"),
        ]);
        let c = select_next(&src, &Rules::default(), &fast_policy(3)).await.unwrap();
        assert_eq!(c.title, "Headline");
        assert_eq!(src.calls(), 3);
    }

    #[tokio::test]
    async fn retries_after_malformed_record() {
        let src = ScriptedSource::new(vec![
            post("t3", "No subreddit here", ""),
            post("t3", "Headline", "nottheonion"),
        ]);
        let c = select_next(&src, &Rules::default(), &fast_policy(3)).await.unwrap();
        assert_eq!(c.title, "Headline");
    }

    #[tokio::test]
    async fn gives_up_after_budget() {
        let src = ScriptedSource::new(vec![]);
        let err = select_next(&src, &Rules::default(), &fast_policy(3)).await.unwrap_err();
        match err {
            SelectError::Exhausted { attempts, last } => {
                assert_eq!(attempts, 3);
                assert!(matches!(last, LastFailure::Fetch(FetchError::Network(_))));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(src.calls(), 3);
    }

    #[tokio::test]
    async fn rejection_resets_failure_count() {
        let src = ScriptedSource::new(vec![
            Err(FetchError::Decode("bad".into())),
            post("t3", "Why?", "TheOnion"),
            Err(FetchError::Decode("bad".into())),
            post("t3", "Headline", "TheOnion"),
        ]);
        let c = select_next(&src, &Rules::default(), &fast_policy(2)).await.unwrap();
        assert_eq!(c.title, "Headline");
    }

    #[tokio::test]
    async fn cancel_aborts_stalled_fetch() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = select_until_cancelled(&StalledSource, &Rules::default(), &fast_policy(1), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, SelectError::Cancelled));
    }

    // -- background task -----------------------------------------------------

    #[tokio::test]
    async fn worker_serves_requests_in_order() {
        let src = Arc::new(ScriptedSource::new(vec![
            post("t3", "First", "TheOnion"),
            post("t3", "Second", "nottheonion"),
        ]));
        let cancel = CancellationToken::new();
        let mut handle = spawn(src.clone(), Rules::default(), fast_policy(1), cancel.clone());

        handle.requests.send(NextCandidate).unwrap();
        handle.requests.send(NextCandidate).unwrap();

        match handle.messages.recv().await {
            Some(SelectMsg::Ready(c)) => assert_eq!(c.title, "First"),
            other => panic!("unexpected message: {other:?}"),
        }
        match handle.messages.recv().await {
            Some(SelectMsg::Ready(c)) => assert_eq!(c.title, "Second"),
            other => panic!("unexpected message: {other:?}"),
        }
        cancel.cancel();
    }

    #[tokio::test]
    async fn worker_reports_exhaustion() {
        let src = Arc::new(ScriptedSource::new(vec![]));
        let cancel = CancellationToken::new();
        let mut handle = spawn(src, Rules::default(), fast_policy(2), cancel.clone());

        handle.requests.send(NextCandidate).unwrap();
        match handle.messages.recv().await {
            Some(SelectMsg::Failed(msg)) => assert!(msg.contains("2 failed attempts")),
            other => panic!("unexpected message: {other:?}"),
        }
        cancel.cancel();
    }

    #[tokio::test]
    async fn worker_stops_on_cancel() {
        let cancel = CancellationToken::new();
        let mut handle = spawn(
            Arc::new(StalledSource),
            Rules::default(),
            fast_policy(1),
            cancel.clone(),
        );
        handle.requests.send(NextCandidate).unwrap();
        cancel.cancel();
        // The task drops its sender on exit, closing the channel.
        assert!(handle.messages.recv().await.is_none());
    }
}
