//! Poll-until-ready support for components that need the identity.

use std::time::Duration;

use tokio::sync::watch;

use super::Identity;

/// Default interval between readiness checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// A component that defers work until the session is ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dependent {
    /// Mailbox fetches.
    Mailbox,
    /// Proofread and send requests.
    Compose,
}

/// Why a readiness wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollWake {
    /// The interval elapsed.
    Timer,
    /// The identity became available.
    Ready,
}

/// Waits for one poll interval or for the identity, whichever comes first.
///
/// The future owns no state besides the receiver, so aborting the task
/// running it cancels the poll.
pub async fn wait_for_readiness(
    mut rx: watch::Receiver<Option<Identity>>,
    interval: Duration,
) -> PollWake {
    tokio::select! {
        Ok(_) = rx.wait_for(Option::is_some) => PollWake::Ready,
        () = tokio::time::sleep(interval) => PollWake::Timer,
    }
}
