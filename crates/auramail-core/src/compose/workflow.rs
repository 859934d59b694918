//! Compose, proofread and send state machine.
//!
//! ```text
//! Editing ──proofread──▶ Proofreading ──ok──▶ ProofreadReady
//!    ▲                        │                 │  │  │
//!    └────────error───────────┘   apply/dismiss─┘  │  └─retry─▶ Proofreading
//!    ▲                                             │
//!    └──error── Sending ◀──send── Editing          │
//!                  │ ok                            │
//!                  ▼                               │
//!               Closed ◀───────cancel──────────────┘
//! ```

use auramail_api::{OutgoingEmail, ProofreadResponse};

use super::draft::ComposeDraft;
use crate::error::{Error, Result};
use crate::notice::{Notice, Scope};

/// Identifies one compose session. Assigned by the owner of the workflows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DraftId(u64);

impl DraftId {
    /// Wraps a raw identifier.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// State of a compose workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComposeState {
    /// The user is editing the draft.
    #[default]
    Editing,
    /// A proofread request is outstanding.
    Proofreading,
    /// A proofread suggestion is waiting to be applied or dismissed.
    ProofreadReady,
    /// A send request is outstanding.
    Sending,
    /// Sent or cancelled.
    Closed,
}

impl ComposeState {
    /// Returns a lowercase name for messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Editing => "editing",
            Self::Proofreading => "proofreading",
            Self::ProofreadReady => "reviewing a suggestion",
            Self::Sending => "sending",
            Self::Closed => "closed",
        }
    }

    /// True while a request is outstanding.
    #[must_use]
    pub const fn is_loading(self) -> bool {
        matches!(self, Self::Proofreading | Self::Sending)
    }
}

/// A proofread request to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofreadTicket {
    /// Originating draft.
    pub draft: DraftId,
    /// Text to proofread.
    pub body: String,
}

/// A send request to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendTicket {
    /// Originating draft.
    pub draft: DraftId,
    /// Message to send.
    pub email: OutgoingEmail,
}

/// Result of applying a compose response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposeOutcome {
    /// A suggestion is ready.
    ProofreadReady,
    /// The message was sent and the workflow closed.
    Sent,
    /// The request failed; the draft is unchanged.
    Failed(Notice),
    /// The response belongs to another draft or state and was dropped.
    Stale,
}

/// Drives one compose form from open to close.
#[derive(Debug, Clone)]
pub struct ComposeWorkflow {
    id: DraftId,
    state: ComposeState,
    draft: ComposeDraft,
    error: Option<Notice>,
}

impl ComposeWorkflow {
    /// Starts a workflow on a draft.
    ///
    /// Responses are matched to the workflow by `id`, so it must differ
    /// from the ids of earlier workflows with requests still outstanding.
    #[must_use]
    pub fn new(id: DraftId, draft: ComposeDraft) -> Self {
        tracing::debug!("Compose {:?} opened ({:?})", id, draft.mode);
        Self {
            id,
            state: ComposeState::Editing,
            draft,
            error: None,
        }
    }

    /// Draft identifier.
    #[must_use]
    pub const fn id(&self) -> DraftId {
        self.id
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> ComposeState {
        self.state
    }

    /// Current draft contents.
    #[must_use]
    pub const fn draft(&self) -> &ComposeDraft {
        &self.draft
    }

    /// Last surfaced error.
    #[must_use]
    pub const fn error(&self) -> Option<&Notice> {
        self.error.as_ref()
    }

    /// Clears the surfaced error.
    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Replaces the recipients.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] outside `Editing`.
    pub fn set_to(&mut self, to: impl Into<String>) -> Result<()> {
        self.require(ComposeState::Editing, "edit")?;
        self.draft.to = to.into();
        Ok(())
    }

    /// Replaces the subject.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] outside `Editing`.
    pub fn set_subject(&mut self, subject: impl Into<String>) -> Result<()> {
        self.require(ComposeState::Editing, "edit")?;
        self.draft.subject = subject.into();
        Ok(())
    }

    /// Replaces the body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] outside `Editing`.
    pub fn set_body(&mut self, body: impl Into<String>) -> Result<()> {
        self.require(ComposeState::Editing, "edit")?;
        self.draft.body = body.into();
        Ok(())
    }

    /// Starts proofreading the body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] outside `Editing` and
    /// [`Error::Validation`] if the body is blank.
    pub fn proofread(&mut self) -> Result<ProofreadTicket> {
        self.require(ComposeState::Editing, "proofread")?;
        if self.draft.body.trim().is_empty() {
            return Err(self.reject(Error::validation("Nothing to proofread")));
        }
        Ok(self.start_proofread())
    }

    /// Proofreads the original body again, discarding the suggestion.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] outside `ProofreadReady`.
    pub fn retry_proofread(&mut self) -> Result<ProofreadTicket> {
        self.require(ComposeState::ProofreadReady, "retry proofreading")?;
        self.draft.proofread_suggestion = None;
        Ok(self.start_proofread())
    }

    /// Applies a proofread response.
    pub fn on_proofread(
        &mut self,
        ticket: &ProofreadTicket,
        result: auramail_api::Result<ProofreadResponse>,
    ) -> ComposeOutcome {
        if ticket.draft != self.id || self.state != ComposeState::Proofreading {
            return ComposeOutcome::Stale;
        }
        match result {
            Ok(response) => {
                self.draft.proofread_suggestion = Some(response.proofread_body);
                self.transition(ComposeState::ProofreadReady);
                ComposeOutcome::ProofreadReady
            }
            Err(e) => {
                self.transition(ComposeState::Editing);
                ComposeOutcome::Failed(self.surface(&Error::Api(e)))
            }
        }
    }

    /// Replaces the body with the suggestion and returns to editing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] outside `ProofreadReady`.
    pub fn apply_suggestion(&mut self) -> Result<()> {
        self.require(ComposeState::ProofreadReady, "apply a suggestion")?;
        if let Some(suggestion) = self.draft.proofread_suggestion.take() {
            self.draft.body = suggestion;
        }
        self.transition(ComposeState::Editing);
        Ok(())
    }

    /// Discards the suggestion and returns to editing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] outside `ProofreadReady`.
    pub fn dismiss_suggestion(&mut self) -> Result<()> {
        self.require(ComposeState::ProofreadReady, "dismiss a suggestion")?;
        self.draft.proofread_suggestion = None;
        self.transition(ComposeState::Editing);
        Ok(())
    }

    /// Validates the draft and starts sending it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] outside `Editing` and
    /// [`Error::Validation`] if a required field is missing.
    pub fn send(&mut self) -> Result<SendTicket> {
        self.require(ComposeState::Editing, "send")?;
        if let Err(e) = self.draft.validate() {
            return Err(self.reject(e));
        }
        self.error = None;
        self.transition(ComposeState::Sending);
        Ok(SendTicket {
            draft: self.id,
            email: self.draft.to_outgoing(),
        })
    }

    /// Applies a send response.
    ///
    /// Success closes the workflow and clears the draft. Failure returns
    /// to editing with every field intact.
    pub fn on_send(
        &mut self,
        ticket: &SendTicket,
        result: auramail_api::Result<()>,
    ) -> ComposeOutcome {
        if ticket.draft != self.id || self.state != ComposeState::Sending {
            return ComposeOutcome::Stale;
        }
        match result {
            Ok(()) => {
                tracing::info!("Message sent to {}", ticket.email.to);
                self.draft = ComposeDraft::default();
                self.transition(ComposeState::Closed);
                ComposeOutcome::Sent
            }
            Err(e) => {
                self.transition(ComposeState::Editing);
                ComposeOutcome::Failed(self.surface(&Error::Api(e)))
            }
        }
    }

    /// Closes the workflow without sending.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] while sending or once closed.
    pub fn cancel(&mut self) -> Result<()> {
        if matches!(self.state, ComposeState::Sending | ComposeState::Closed) {
            return Err(self.invalid("cancel"));
        }
        self.draft = ComposeDraft::default();
        self.transition(ComposeState::Closed);
        Ok(())
    }

    /// Returns to editing after the outstanding request was cancelled.
    ///
    /// The draft is kept as it was when the request was issued.
    pub fn abandon_request(&mut self) {
        if self.state.is_loading() {
            tracing::debug!("Compose {:?}: {} request abandoned", self.id, self.state.name());
            self.transition(ComposeState::Editing);
        }
    }

    fn start_proofread(&mut self) -> ProofreadTicket {
        self.error = None;
        self.transition(ComposeState::Proofreading);
        ProofreadTicket {
            draft: self.id,
            body: self.draft.body.clone(),
        }
    }

    fn require(&self, state: ComposeState, action: &'static str) -> Result<()> {
        if self.state == state {
            Ok(())
        } else {
            Err(self.invalid(action))
        }
    }

    const fn invalid(&self, action: &'static str) -> Error {
        Error::InvalidTransition {
            state: self.state.name(),
            action,
        }
    }

    fn reject(&mut self, error: Error) -> Error {
        self.surface(&error);
        error
    }

    fn surface(&mut self, error: &Error) -> Notice {
        let notice = Notice::from_error(Scope::Compose, error);
        tracing::warn!("Compose {:?}: {}", self.id, notice);
        self.error = Some(notice.clone());
        notice
    }

    fn transition(&mut self, state: ComposeState) {
        tracing::debug!(
            "Compose {:?}: {} -> {}",
            self.id,
            self.state.name(),
            state.name()
        );
        self.state = state;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::notice::NoticeKind;

    fn workflow_with_id(id: u64) -> ComposeWorkflow {
        let mut draft = ComposeDraft::reply("bob@example.com", "Lunch", "Noon?");
        draft.body = "Noon tomorow?".into();
        ComposeWorkflow::new(DraftId::new(id), draft)
    }

    fn workflow() -> ComposeWorkflow {
        workflow_with_id(1)
    }

    fn proofread_ok(text: &str) -> auramail_api::Result<ProofreadResponse> {
        Ok(ProofreadResponse {
            proofread_body: text.into(),
        })
    }

    #[test]
    fn test_starts_editing() {
        let wf = workflow();
        assert_eq!(wf.state(), ComposeState::Editing);
        assert_eq!(wf.draft().subject, "Re: Lunch");
        assert_eq!(wf.id(), DraftId::new(1));
    }

    #[test]
    fn test_blank_body_never_proofreads() {
        let mut wf = ComposeWorkflow::new(DraftId::new(1), ComposeDraft::new());
        wf.set_body("   ").unwrap();
        let err = wf.proofread().unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(wf.state(), ComposeState::Editing);
        assert_eq!(wf.error().unwrap().kind, NoticeKind::Validation);
    }

    #[test]
    fn test_apply_suggestion_replaces_body() {
        let mut wf = workflow();
        let ticket = wf.proofread().unwrap();
        assert_eq!(ticket.body, "Noon tomorow?");
        assert!(wf.proofread().is_err(), "one proofread at a time");

        assert_eq!(
            wf.on_proofread(&ticket, proofread_ok("Noon tomorrow?")),
            ComposeOutcome::ProofreadReady
        );
        assert_eq!(wf.state(), ComposeState::ProofreadReady);
        assert_eq!(wf.draft().body, "Noon tomorow?");

        wf.apply_suggestion().unwrap();
        assert_eq!(wf.state(), ComposeState::Editing);
        assert_eq!(wf.draft().body, "Noon tomorrow?");
        assert!(wf.draft().proofread_suggestion.is_none());
    }

    #[test]
    fn test_dismiss_suggestion_keeps_body() {
        let mut wf = workflow();
        let ticket = wf.proofread().unwrap();
        wf.on_proofread(&ticket, proofread_ok("Changed"));
        wf.dismiss_suggestion().unwrap();
        assert_eq!(wf.state(), ComposeState::Editing);
        assert_eq!(wf.draft().body, "Noon tomorow?");
        assert!(wf.draft().proofread_suggestion.is_none());
    }

    #[test]
    fn test_retry_proofreads_original() {
        let mut wf = workflow();
        let ticket = wf.proofread().unwrap();
        wf.on_proofread(&ticket, proofread_ok("First"));
        let retry = wf.retry_proofread().unwrap();
        assert_eq!(retry.body, "Noon tomorow?");
        assert_eq!(wf.state(), ComposeState::Proofreading);
        assert!(wf.draft().proofread_suggestion.is_none());
    }

    #[test]
    fn test_proofread_failure_returns_to_editing() {
        let mut wf = workflow();
        let ticket = wf.proofread().unwrap();
        let outcome = wf.on_proofread(&ticket, Err(auramail_api::Error::Timeout));
        assert!(matches!(outcome, ComposeOutcome::Failed(_)));
        assert_eq!(wf.state(), ComposeState::Editing);
        assert_eq!(wf.draft().body, "Noon tomorow?");
    }

    #[test]
    fn test_edits_rejected_outside_editing() {
        let mut wf = workflow();
        wf.proofread().unwrap();
        let err = wf.set_body("new").unwrap_err();
        assert_eq!(err.to_string(), "Cannot edit while proofreading");
        assert_eq!(wf.draft().body, "Noon tomorow?");
    }

    #[test]
    fn test_send_validation_blocks_request() {
        let mut wf = ComposeWorkflow::new(DraftId::new(1), ComposeDraft::new());
        wf.set_to("bob@example.com").unwrap();
        wf.set_body("Hi").unwrap();
        assert!(matches!(wf.send(), Err(Error::Validation(_))));
        assert_eq!(wf.state(), ComposeState::Editing);
    }

    #[test]
    fn test_failed_send_preserves_draft() {
        let mut wf = workflow();
        let before = wf.draft().clone();
        let ticket = wf.send().unwrap();
        assert_eq!(wf.state(), ComposeState::Sending);
        assert!(wf.cancel().is_err());

        let outcome = wf.on_send(&ticket, Err(auramail_api::Error::server(400, "Rejected")));
        assert!(matches!(outcome, ComposeOutcome::Failed(ref n) if n.message == "Rejected"));
        assert_eq!(wf.state(), ComposeState::Editing);
        assert_eq!(wf.draft(), &before);
        assert!(wf.error().is_some());
    }

    #[test]
    fn test_successful_send_closes_once() {
        let mut wf = workflow();
        let ticket = wf.send().unwrap();
        assert_eq!(ticket.email.to, "bob@example.com");
        assert_eq!(wf.on_send(&ticket, Ok(())), ComposeOutcome::Sent);
        assert_eq!(wf.state(), ComposeState::Closed);
        assert_eq!(wf.draft(), &ComposeDraft::default());
        assert_eq!(wf.on_send(&ticket, Ok(())), ComposeOutcome::Stale);
    }

    #[test]
    fn test_cancel_closes() {
        let mut wf = workflow();
        wf.cancel().unwrap();
        assert_eq!(wf.state(), ComposeState::Closed);
        assert!(wf.cancel().is_err());
    }

    #[test]
    fn test_ticket_from_other_draft_is_stale() {
        let mut first = workflow_with_id(1);
        let mut second = workflow_with_id(2);
        let ticket = first.proofread().unwrap();
        second.proofread().unwrap();
        assert_eq!(
            second.on_proofread(&ticket, proofread_ok("x")),
            ComposeOutcome::Stale
        );
    }

    #[test]
    fn test_abandoned_send_returns_to_editing() {
        let mut wf = workflow();
        let before = wf.draft().clone();
        let ticket = wf.send().unwrap();

        wf.abandon_request();
        assert_eq!(wf.state(), ComposeState::Editing);
        assert_eq!(wf.draft(), &before);
        assert_eq!(wf.on_send(&ticket, Ok(())), ComposeOutcome::Stale);
        assert!(wf.send().is_ok());
    }

    #[test]
    fn test_abandon_outside_request_is_noop() {
        let mut wf = workflow();
        wf.proofread().unwrap();
        wf.abandon_request();
        assert_eq!(wf.state(), ComposeState::Editing);

        let ticket = wf.proofread().unwrap();
        wf.on_proofread(&ticket, proofread_ok("Noon tomorrow?"));
        wf.abandon_request();
        assert_eq!(wf.state(), ComposeState::ProofreadReady);
    }
}
