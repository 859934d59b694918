//! User-visible notices.
//!
//! Every recoverable failure is reported as a [`Notice`] scoped to the
//! component that produced it. Identity-not-ready is never a notice: it is
//! handled by the readiness poll.

use std::fmt;

use crate::error::Error;

/// Component a notice belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Login and identity resolution.
    Session,
    /// Mailbox listing.
    Mailbox,
    /// Open message and its actions.
    Detail,
    /// Compose form.
    Compose,
}

/// Failure class of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeKind {
    /// Network or transport failure; previous state retained.
    Transport,
    /// Input rejected client-side before any request.
    Validation,
    /// Failure reported by the server.
    Server,
}

/// A dismissible, component-scoped message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Originating component.
    pub scope: Scope,
    /// Failure class.
    pub kind: NoticeKind,
    /// Text to show.
    pub message: String,
}

impl Notice {
    /// Creates a notice.
    #[must_use]
    pub fn new(scope: Scope, kind: NoticeKind, message: impl Into<String>) -> Self {
        Self {
            scope,
            kind,
            message: message.into(),
        }
    }

    /// Creates a server notice.
    #[must_use]
    pub fn server(scope: Scope, message: impl Into<String>) -> Self {
        Self::new(scope, NoticeKind::Server, message)
    }

    /// Classifies an error into a notice.
    #[must_use]
    pub fn from_error(scope: Scope, error: &Error) -> Self {
        let kind = match error {
            Error::Api(e) if e.is_transport() => NoticeKind::Transport,
            Error::Api(_) => NoticeKind::Server,
            Error::Validation(_)
            | Error::InvalidTransition { .. }
            | Error::InFlight(_)
            | Error::NoMessageOpen => NoticeKind::Validation,
        };
        Self::new(scope, kind, error.to_string())
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
