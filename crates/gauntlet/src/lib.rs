//! Gauntlet - challenge selection and navigation-recovery engine
//!
//! The engine decides which challenge a player should see next while the
//! pool keeps shifting under them: challenges get solved, abandoned,
//! exhausted of attempts, or excluded because the viewer created them.
//!
//! Three pieces, composed leaf to root:
//! - [`ChallengeSelector`] filters the pool down to eligible identifiers
//!   and answers next/previous with deterministic wraparound
//! - [`NavigationOrchestrator`] owns the session context, the bounded
//!   history and the snapshot store, and exposes the navigation operations
//! - [`ErrorRecoveryCoordinator`] classifies every failure, attaches
//!   user-facing feedback and fallback actions, and attempts best-effort
//!   automatic recovery for the transient kinds

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod handler;
pub mod orchestrator;
pub mod recovery;
pub mod selector;
pub mod store;

pub use gauntlet_core::{
    AttemptRecord, ChallengeId, ChallengeRecord, ChallengeStatus, EligibilityCriteria,
    EligibilityState, ErrorContext, ErrorSeverity, NavigationContext, NavigationErrorKind,
    NavigationOutcome, PlayerProgress, SelectionError, SessionMetadata, StateUpdate,
};

pub use handler::NavigationRequest;
pub use orchestrator::{NavigationOrchestrator, SNAPSHOT_CAPACITY};
pub use recovery::{
    ErrorRecoveryCoordinator, ErrorStatistics, FailureReport, ERROR_LOG_CAPACITY,
};
pub use selector::{ChallengeSelector, OwnershipFilter};
pub use store::{ContextStore, MemoryContextStore};
