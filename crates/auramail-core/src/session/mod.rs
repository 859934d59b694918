//! Session management.
//!
//! The [`SessionGate`] owns the token and identity. Components that need
//! the identity wait on it with [`wait_for_readiness`] instead of looping.

mod gate;
mod poll;

pub use gate::{Identity, IdentityState, SessionGate, SessionOutcome, SessionRequest};
pub use poll::{DEFAULT_POLL_INTERVAL, Dependent, PollWake, wait_for_readiness};
