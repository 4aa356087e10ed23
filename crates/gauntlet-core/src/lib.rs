//! Gauntlet-core - Data contracts for the challenge navigation engine
//!
//! This crate provides:
//! - Challenge records and per-challenge eligibility state
//! - Eligibility criteria
//! - The session navigation context and its bookkeeping
//! - Navigation outcomes and the closed error taxonomy

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod challenge;
pub mod context;
pub mod criteria;
pub mod error;
pub mod outcome;

pub use challenge::{
    AttemptRecord, ChallengeId, ChallengeRecord, ChallengeStatus, EligibilityState,
    PlayerProgress, StateUpdate, DEFAULT_ATTEMPTS_REMAINING,
};
pub use context::{NavigationContext, SessionMetadata, HISTORY_CAPACITY};
pub use criteria::EligibilityCriteria;
pub use error::{NavigationErrorKind, SelectionError};
pub use outcome::{ErrorContext, ErrorSeverity, NavigationOutcome};
