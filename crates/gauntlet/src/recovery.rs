//! Error classification and best-effort automatic recovery
//!
//! Every failure the orchestrator sees funnels through [`ErrorRecoveryCoordinator::handle`],
//! which classifies it, attaches hand-authored user-facing feedback and an
//! ordered list of fallback actions, and, for a subset of transient kinds,
//! attempts a silent kind-specific remediation before surfacing anything.
//! Recovery failures are swallowed; the classified outcome goes out
//! unchanged. Every classified failure lands in a capped log used only for
//! read-only statistics.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use gauntlet_core::{
    ChallengeId, EligibilityState, ErrorContext, ErrorSeverity, NavigationErrorKind,
    NavigationOutcome,
};

use crate::store::ContextStore;

/// Maximum entries retained in the rolling error log
pub const ERROR_LOG_CAPACITY: usize = 50;

/// Minutes within which repeated same-kind, same-action failures count as retries
const RETRY_WINDOW_MINUTES: i64 = 5;

/// Pause before re-signaling a content-load failure as recovered
const CONTENT_RELOAD_DELAY: Duration = Duration::from_millis(250);

/// Everything the coordinator needs to know about a failure site
#[derive(Debug, Clone)]
pub struct FailureReport {
    /// The user action that triggered the failure (e.g. `navigate_next`)
    pub action: String,
    /// Technical detail for logs
    pub detail: String,
    /// Where the session cursor was
    pub current_challenge_id: Option<ChallengeId>,
    /// Tracked state of the current challenge, if any
    pub current_state: Option<EligibilityState>,
    /// How many challenges were eligible at failure time
    pub eligible_count: usize,
    /// First eligible identifier, if any
    pub first_eligible: Option<ChallengeId>,
    /// Whether navigation was possible at all
    pub navigation_possible: bool,
    /// When the failure happened
    pub timestamp: DateTime<Utc>,
}

/// One classified failure in the rolling log
#[derive(Debug, Clone)]
struct ErrorLogEntry {
    kind: NavigationErrorKind,
    action: String,
    timestamp: DateTime<Utc>,
}

/// Read-only failure statistics
#[derive(Debug, Clone, Default)]
pub struct ErrorStatistics {
    /// Failures classified over the coordinator's lifetime
    pub total: u64,
    /// Lifetime count per kind
    pub by_kind: HashMap<NavigationErrorKind, u64>,
    /// Failures in the last hour (from the rolling log)
    pub recent: usize,
    /// Kind with the highest lifetime count
    pub most_frequent: Option<NavigationErrorKind>,
}

/// User-facing feedback for one error kind
struct Feedback {
    title: &'static str,
    message: &'static str,
    severity: ErrorSeverity,
    show_technical_details: bool,
    auto_dismiss_ms: Option<u64>,
}

/// Fallback actions and recovery policy for one error kind
struct Strategy {
    primary_action: &'static str,
    secondary_actions: &'static [&'static str],
    attempt_auto_recovery: bool,
}

fn feedback_for(kind: NavigationErrorKind) -> Feedback {
    match kind {
        NavigationErrorKind::ChallengeNotFound => Feedback {
            title: "Challenge not found",
            message: "That challenge doesn't exist or was removed.",
            severity: ErrorSeverity::Error,
            show_technical_details: false,
            auto_dismiss_ms: None,
        },
        NavigationErrorKind::NoAvailableChallenges => Feedback {
            title: "Nothing left to play",
            message: "You've played every challenge that's available right now. Check back later for new ones!",
            severity: ErrorSeverity::Info,
            show_technical_details: false,
            auto_dismiss_ms: Some(6000),
        },
        NavigationErrorKind::NavigationLoopFailure => Feedback {
            title: "Navigation hiccup",
            message: "We had trouble finding your next challenge. Trying again usually fixes this.",
            severity: ErrorSeverity::Warning,
            show_technical_details: false,
            auto_dismiss_ms: Some(4000),
        },
        NavigationErrorKind::PermissionDenied => Feedback {
            title: "Challenge unavailable",
            message: "This challenge isn't available to you right now.",
            severity: ErrorSeverity::Warning,
            show_technical_details: false,
            auto_dismiss_ms: Some(4000),
        },
        NavigationErrorKind::SessionExpired => Feedback {
            title: "Session expired",
            message: "Your session timed out. Start a new one to keep playing.",
            severity: ErrorSeverity::Critical,
            show_technical_details: false,
            auto_dismiss_ms: None,
        },
        NavigationErrorKind::ContextLoss => Feedback {
            title: "Lost your place",
            message: "We lost track of where you were. You can pick up from your current challenge.",
            severity: ErrorSeverity::Warning,
            show_technical_details: false,
            auto_dismiss_ms: Some(5000),
        },
        NavigationErrorKind::FormDataLoss => Feedback {
            title: "Answer not saved",
            message: "Your in-progress answer couldn't be kept. Sorry - you'll need to retype it.",
            severity: ErrorSeverity::Warning,
            show_technical_details: false,
            auto_dismiss_ms: Some(5000),
        },
        NavigationErrorKind::UrlSyncFailure => Feedback {
            title: "Address out of sync",
            message: "The page address fell out of step with the game. Refreshing will fix it.",
            severity: ErrorSeverity::Info,
            show_technical_details: false,
            auto_dismiss_ms: Some(3000),
        },
        NavigationErrorKind::ContentLoadFailure => Feedback {
            title: "Couldn't load challenge",
            message: "The challenge content didn't load. We'll retry in a moment.",
            severity: ErrorSeverity::Warning,
            show_technical_details: false,
            auto_dismiss_ms: Some(4000),
        },
        NavigationErrorKind::StatePreservationFailure => Feedback {
            title: "Couldn't save progress",
            message: "Your progress snapshot couldn't be written. Your current game is unaffected.",
            severity: ErrorSeverity::Warning,
            show_technical_details: true,
            auto_dismiss_ms: Some(5000),
        },
        NavigationErrorKind::InvalidEntryPoint => Feedback {
            title: "Invalid link",
            message: "That link doesn't lead to a playable challenge. Starting from the beginning.",
            severity: ErrorSeverity::Error,
            show_technical_details: false,
            auto_dismiss_ms: None,
        },
    }
}

fn strategy_for(kind: NavigationErrorKind) -> Strategy {
    match kind {
        NavigationErrorKind::ChallengeNotFound => Strategy {
            primary_action: "Go to next challenge",
            secondary_actions: &["Return to menu"],
            attempt_auto_recovery: false,
        },
        NavigationErrorKind::NoAvailableChallenges => Strategy {
            primary_action: "Create a challenge",
            secondary_actions: &["Return to menu", "View your results"],
            attempt_auto_recovery: false,
        },
        NavigationErrorKind::NavigationLoopFailure => Strategy {
            primary_action: "Try again",
            secondary_actions: &["Return to menu"],
            attempt_auto_recovery: true,
        },
        NavigationErrorKind::PermissionDenied => Strategy {
            primary_action: "Go to next challenge",
            secondary_actions: &["Return to menu"],
            attempt_auto_recovery: false,
        },
        NavigationErrorKind::SessionExpired => Strategy {
            primary_action: "Start a new session",
            secondary_actions: &["Return to menu"],
            attempt_auto_recovery: false,
        },
        NavigationErrorKind::ContextLoss => Strategy {
            primary_action: "Continue with current state",
            secondary_actions: &["Return to menu"],
            attempt_auto_recovery: true,
        },
        NavigationErrorKind::FormDataLoss => Strategy {
            primary_action: "Retype your answer",
            secondary_actions: &["Skip this challenge"],
            attempt_auto_recovery: false,
        },
        NavigationErrorKind::UrlSyncFailure => Strategy {
            primary_action: "Refresh",
            secondary_actions: &["Continue playing"],
            attempt_auto_recovery: false,
        },
        NavigationErrorKind::ContentLoadFailure => Strategy {
            primary_action: "Retry loading",
            secondary_actions: &["Skip this challenge", "Return to menu"],
            attempt_auto_recovery: true,
        },
        NavigationErrorKind::StatePreservationFailure => Strategy {
            primary_action: "Continue without saving",
            secondary_actions: &["Return to menu"],
            attempt_auto_recovery: true,
        },
        NavigationErrorKind::InvalidEntryPoint => Strategy {
            primary_action: "Go to first challenge",
            secondary_actions: &["Return to menu"],
            attempt_auto_recovery: false,
        },
    }
}

/// Classifies failures, enriches them with feedback and fallback actions,
/// attempts automatic recovery for the transient kinds, and keeps a rolling
/// log for statistics.
pub struct ErrorRecoveryCoordinator {
    log: VecDeque<ErrorLogEntry>,
    total: u64,
    by_kind: HashMap<NavigationErrorKind, u64>,
    context_store: Option<Arc<dyn ContextStore>>,
    session_key: Option<String>,
}

impl std::fmt::Debug for ErrorRecoveryCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorRecoveryCoordinator")
            .field("logged", &self.log.len())
            .field("total", &self.total)
            .field("has_context_store", &self.context_store.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for ErrorRecoveryCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorRecoveryCoordinator {
    /// Create a coordinator with no durable context store
    #[must_use]
    pub fn new() -> Self {
        Self {
            log: VecDeque::with_capacity(ERROR_LOG_CAPACITY),
            total: 0,
            by_kind: HashMap::new(),
            context_store: None,
            session_key: None,
        }
    }

    /// Attach a durable context store for context-loss recovery
    #[must_use]
    pub fn with_context_store(
        mut self,
        store: Arc<dyn ContextStore>,
        session_key: impl Into<String>,
    ) -> Self {
        self.context_store = Some(store);
        self.session_key = Some(session_key.into());
        self
    }

    /// Classify a failure and produce the enriched outcome.
    ///
    /// When the kind's strategy allows it, a kind-specific recovery
    /// heuristic runs first; on success the outcome comes back as a silent
    /// success with `auto_recovered` set. Recovery failures never
    /// propagate.
    pub async fn handle(
        &mut self,
        kind: NavigationErrorKind,
        report: FailureReport,
    ) -> NavigationOutcome {
        let retry_count = self.count_recent_retries(kind, &report.action, report.timestamp);
        self.log_failure(kind, &report);

        tracing::warn!(
            code = kind.code(),
            action = %report.action,
            detail = %report.detail,
            retry_count,
            "navigation failure classified"
        );

        let feedback = feedback_for(kind);
        let strategy = strategy_for(kind);

        let mut fallback_options = Vec::with_capacity(1 + strategy.secondary_actions.len());
        fallback_options.push(strategy.primary_action.to_string());
        fallback_options.extend(strategy.secondary_actions.iter().map(ToString::to_string));

        let mut outcome = NavigationOutcome::failure(kind, feedback.message, fallback_options)
            .with_error_context(ErrorContext {
                title: feedback.title.to_string(),
                severity: feedback.severity,
                show_technical_details: feedback.show_technical_details,
                auto_dismiss_ms: feedback.auto_dismiss_ms,
                user_action: report.action.clone(),
                timestamp: report.timestamp,
                retryable: kind.is_retryable(),
                retry_count,
                suggested_wait_ms: kind.suggested_wait_ms(),
            });

        if strategy.attempt_auto_recovery {
            match self.attempt_recovery(kind, &report).await {
                Some(recovered) => {
                    tracing::info!(
                        code = kind.code(),
                        challenge = %recovered,
                        "automatic recovery succeeded"
                    );
                    outcome.mark_recovered(recovered);
                }
                None => {
                    tracing::warn!(code = kind.code(), "automatic recovery failed, surfacing error");
                }
            }
        }

        outcome
    }

    /// Kind-specific recovery heuristics. `None` means recovery failed and
    /// the classified outcome should be surfaced as-is.
    async fn attempt_recovery(
        &self,
        kind: NavigationErrorKind,
        report: &FailureReport,
    ) -> Option<ChallengeId> {
        match kind {
            // Jump to the first challenge that is still eligible.
            NavigationErrorKind::NavigationLoopFailure => report.first_eligible.clone(),

            // Prefer a durably persisted context; fall back to wherever the
            // caller currently is.
            NavigationErrorKind::ContextLoss => {
                let restored = match (&self.context_store, &self.session_key) {
                    (Some(store), Some(key)) => store
                        .load(key)
                        .await
                        .and_then(|ctx| ctx.current_challenge_id),
                    _ => None,
                };
                restored.or_else(|| report.current_challenge_id.clone())
            }

            // Give the content a moment, then re-signal the same challenge.
            NavigationErrorKind::ContentLoadFailure => {
                tokio::time::sleep(CONTENT_RELOAD_DELAY).await;
                report.current_challenge_id.clone()
            }

            // The live context is still authoritative; only the snapshot
            // write failed.
            NavigationErrorKind::StatePreservationFailure => {
                report.current_challenge_id.clone()
            }

            _ => None,
        }
    }

    fn log_failure(&mut self, kind: NavigationErrorKind, report: &FailureReport) {
        if self.log.len() == ERROR_LOG_CAPACITY {
            self.log.pop_front();
        }
        self.log.push_back(ErrorLogEntry {
            kind,
            action: report.action.clone(),
            timestamp: report.timestamp,
        });
        self.total += 1;
        *self.by_kind.entry(kind).or_insert(0) += 1;
    }

    /// Same-kind, same-action failures already logged within the window
    fn count_recent_retries(
        &self,
        kind: NavigationErrorKind,
        action: &str,
        now: DateTime<Utc>,
    ) -> u32 {
        let cutoff = now - chrono::Duration::minutes(RETRY_WINDOW_MINUTES);
        let count = self
            .log
            .iter()
            .filter(|entry| {
                entry.kind == kind && entry.action == action && entry.timestamp >= cutoff
            })
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    /// Read-only statistics over classified failures
    #[must_use]
    pub fn statistics(&self) -> ErrorStatistics {
        let cutoff = Utc::now() - chrono::Duration::hours(1);
        let recent = self
            .log
            .iter()
            .filter(|entry| entry.timestamp >= cutoff)
            .count();
        let most_frequent = self
            .by_kind
            .iter()
            .max_by_key(|(_, count)| **count)
            .map(|(kind, _)| *kind);

        ErrorStatistics {
            total: self.total,
            by_kind: self.by_kind.clone(),
            recent,
            most_frequent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(action: &str) -> FailureReport {
        FailureReport {
            action: action.to_string(),
            detail: "test failure".to_string(),
            current_challenge_id: Some(ChallengeId::new("current")),
            current_state: None,
            eligible_count: 2,
            first_eligible: Some(ChallengeId::new("first")),
            navigation_possible: true,
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn non_retryable_failure_surfaces_feedback_and_fallbacks() {
        let mut coordinator = ErrorRecoveryCoordinator::new();
        let outcome = coordinator
            .handle(NavigationErrorKind::NoAvailableChallenges, report("navigate_next"))
            .await;

        assert!(!outcome.success);
        assert_eq!(outcome.error, Some(NavigationErrorKind::NoAvailableChallenges));
        assert_eq!(outcome.fallback_options[0], "Create a challenge");
        let ctx = outcome.error_context.unwrap();
        assert!(!ctx.retryable);
        assert!(ctx.suggested_wait_ms.is_none());
        assert_eq!(ctx.retry_count, 0);
    }

    #[tokio::test]
    async fn loop_failure_recovers_to_first_eligible() {
        let mut coordinator = ErrorRecoveryCoordinator::new();
        let outcome = coordinator
            .handle(NavigationErrorKind::NavigationLoopFailure, report("navigate_next"))
            .await;

        assert!(outcome.success);
        assert!(outcome.auto_recovered);
        assert_eq!(outcome.challenge_id, Some(ChallengeId::new("first")));
        // The classification is kept for observability.
        assert_eq!(outcome.error, Some(NavigationErrorKind::NavigationLoopFailure));
    }

    #[tokio::test]
    async fn loop_failure_with_no_eligible_surfaces_the_error() {
        let mut coordinator = ErrorRecoveryCoordinator::new();
        let mut failing = report("navigate_next");
        failing.first_eligible = None;

        let outcome = coordinator
            .handle(NavigationErrorKind::NavigationLoopFailure, failing)
            .await;

        assert!(!outcome.success);
        assert!(!outcome.auto_recovered);
    }

    #[tokio::test]
    async fn content_load_failure_resignals_current_after_delay() {
        let mut coordinator = ErrorRecoveryCoordinator::new();
        let outcome = coordinator
            .handle(NavigationErrorKind::ContentLoadFailure, report("navigate_to_challenge"))
            .await;

        assert!(outcome.success);
        assert!(outcome.auto_recovered);
        assert_eq!(outcome.challenge_id, Some(ChallengeId::new("current")));
    }

    #[tokio::test]
    async fn retry_count_grows_for_repeated_kind_and_action() {
        let mut coordinator = ErrorRecoveryCoordinator::new();
        for expected in 0..3 {
            let outcome = coordinator
                .handle(NavigationErrorKind::SessionExpired, report("navigate_next"))
                .await;
            let ctx = outcome.error_context.unwrap();
            assert_eq!(ctx.retry_count, expected);
        }

        // A different action keeps its own count.
        let outcome = coordinator
            .handle(NavigationErrorKind::SessionExpired, report("navigate_previous"))
            .await;
        assert_eq!(outcome.error_context.unwrap().retry_count, 0);
    }

    #[tokio::test]
    async fn log_is_capped_and_statistics_track_every_kind() {
        let mut coordinator = ErrorRecoveryCoordinator::new();
        for _ in 0..ERROR_LOG_CAPACITY + 10 {
            coordinator
                .handle(NavigationErrorKind::UrlSyncFailure, report("navigate_next"))
                .await;
        }
        coordinator
            .handle(NavigationErrorKind::ChallengeNotFound, report("navigate_to_challenge"))
            .await;

        assert!(coordinator.log.len() <= ERROR_LOG_CAPACITY);

        let stats = coordinator.statistics();
        assert_eq!(stats.total, (ERROR_LOG_CAPACITY + 11) as u64);
        assert_eq!(
            stats.by_kind.get(&NavigationErrorKind::ChallengeNotFound),
            Some(&1)
        );
        assert_eq!(stats.most_frequent, Some(NavigationErrorKind::UrlSyncFailure));
        assert!(stats.recent <= ERROR_LOG_CAPACITY);
    }
}
