//! Session state: bearer token, resolved identity and readiness signal.

use std::fmt;

use auramail_api::{IdentityResponse, LoginResponse, Token};
use tokio::sync::watch;

use crate::error::Error;

/// Email address of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity(String);

impl Identity {
    /// Creates an identity from an email address.
    #[must_use]
    pub fn new(email: impl Into<String>) -> Self {
        Self(email.into())
    }

    /// Returns the email address.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of asking for the identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityState<'a> {
    /// Identity has been resolved.
    Ready(&'a Identity),
    /// Identity is not available yet.
    Pending,
}

/// A request the session needs the backend to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionRequest {
    /// Exchange credentials for a token.
    Login,
    /// Resolve the identity behind a token.
    GetIdentity(Token),
}

/// Outcome of applying a session response.
#[derive(Debug)]
pub enum SessionOutcome {
    /// Identity resolved; dependents may proceed.
    Ready(Identity),
    /// Token obtained but identity still needs resolving.
    NeedsIdentity(SessionRequest),
    /// Resolution failed; the gate stays not ready.
    Failed(Error),
}

/// Owns the token and identity and publishes readiness.
///
/// Token and identity are only ever written here. Other components read
/// readiness through [`SessionGate::subscribe`] or [`SessionGate::is_ready`].
#[derive(Debug)]
pub struct SessionGate {
    token: Option<Token>,
    identity: Option<Identity>,
    epoch: u64,
    resolving: bool,
    ready_tx: watch::Sender<Option<Identity>>,
}

impl Default for SessionGate {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionGate {
    /// Creates a gate with no credentials.
    #[must_use]
    pub fn new() -> Self {
        let (ready_tx, _) = watch::channel(None);
        Self {
            token: None,
            identity: None,
            epoch: 0,
            resolving: false,
            ready_tx,
        }
    }

    /// Seeds the gate with a token stored by a previous session.
    #[must_use]
    pub fn with_stored_token(mut self, token: Token) -> Self {
        if !token.is_empty() {
            self.token = Some(token);
        }
        self
    }

    /// Returns the first request needed to become ready.
    ///
    /// Returns `None` when already ready or when resolution is in flight.
    pub fn bootstrap(&mut self) -> Option<SessionRequest> {
        if self.identity.is_some() || self.resolving {
            return None;
        }
        self.resolving = true;
        let request = match &self.token {
            Some(token) => SessionRequest::GetIdentity(token.clone()),
            None => SessionRequest::Login,
        };
        tracing::debug!("Session bootstrap: {:?}", request_name(&request));
        Some(request)
    }

    /// Forgets an outstanding login or identity request after it was
    /// cancelled, so the next [`SessionGate::bootstrap`] issues a new one.
    pub fn abandon_resolution(&mut self) {
        self.resolving = false;
    }

    /// Returns the identity if it has been resolved.
    #[must_use]
    pub const fn resolve_identity(&self) -> IdentityState<'_> {
        match &self.identity {
            Some(identity) => IdentityState::Ready(identity),
            None => IdentityState::Pending,
        }
    }

    /// Returns true once the identity has been resolved.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.identity.is_some()
    }

    /// Returns true while a login or identity request is outstanding.
    #[must_use]
    pub const fn is_resolving(&self) -> bool {
        self.resolving
    }

    /// Returns the token, which may exist before the identity does.
    #[must_use]
    pub const fn token(&self) -> Option<&Token> {
        self.token.as_ref()
    }

    /// Returns the bearer token for data requests, only once ready.
    #[must_use]
    pub const fn bearer(&self) -> Option<&Token> {
        match (&self.token, &self.identity) {
            (Some(token), Some(_)) => Some(token),
            _ => None,
        }
    }

    /// Current session epoch. Incremented on every teardown.
    #[must_use]
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Returns true if `epoch` belongs to the current session.
    #[must_use]
    pub const fn is_current(&self, epoch: u64) -> bool {
        self.epoch == epoch
    }

    /// Subscribes to readiness changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.ready_tx.subscribe()
    }

    /// Applies a login response.
    pub fn on_login(&mut self, result: auramail_api::Result<LoginResponse>) -> SessionOutcome {
        self.resolving = false;
        match result {
            Ok(response) => {
                self.token = Some(response.token.clone());
                match response.email.filter(|e| !e.trim().is_empty()) {
                    Some(email) => SessionOutcome::Ready(self.publish(Identity::new(email))),
                    None => {
                        self.resolving = true;
                        SessionOutcome::NeedsIdentity(SessionRequest::GetIdentity(response.token))
                    }
                }
            }
            Err(e) => {
                tracing::warn!("Login failed: {}", e);
                SessionOutcome::Failed(e.into())
            }
        }
    }

    /// Applies an identity response.
    ///
    /// A 401 means the token is no longer valid and it is dropped, so the
    /// next [`SessionGate::bootstrap`] logs in again.
    pub fn on_identity(
        &mut self,
        result: auramail_api::Result<IdentityResponse>,
    ) -> SessionOutcome {
        self.resolving = false;
        match result {
            Ok(response) if !response.email.trim().is_empty() => {
                SessionOutcome::Ready(self.publish(Identity::new(response.email)))
            }
            Ok(_) => SessionOutcome::Failed(Error::validation("Server returned an empty identity")),
            Err(e) => {
                if e.status() == Some(401) {
                    tracing::info!("Stored token rejected, discarding it");
                    self.token = None;
                }
                tracing::warn!("Identity lookup failed: {}", e);
                SessionOutcome::Failed(e.into())
            }
        }
    }

    /// Clears token and identity together and starts a new epoch.
    ///
    /// Subscribers observe `None` before this returns. Returns the old
    /// token so the caller can revoke it server-side.
    pub fn teardown(&mut self) -> Option<Token> {
        let token = self.token.take();
        self.identity = None;
        self.resolving = false;
        self.epoch += 1;
        self.ready_tx.send_replace(None);
        tracing::info!("Session torn down (epoch {})", self.epoch);
        token
    }

    fn publish(&mut self, identity: Identity) -> Identity {
        tracing::info!("Identity ready: {}", identity);
        self.identity = Some(identity.clone());
        self.ready_tx.send_replace(Some(identity.clone()));
        identity
    }
}

const fn request_name(request: &SessionRequest) -> &'static str {
    match request {
        SessionRequest::Login => "login",
        SessionRequest::GetIdentity(_) => "identity",
    }
}
