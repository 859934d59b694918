//! Event-driven driver owning the session and every component.
//!
//! [`MailClient`] turns user intents into backend requests, runs them as
//! tasks, and applies their completions one at a time in
//! [`MailClient::next_event`]. All state changes therefore happen on the
//! task that owns the client, never concurrently.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use auramail_api::{
    DeleteResponse, EmailRecord, IdentityResponse, LoginResponse, MarkReadResponse, MessagesPage,
    ProofreadResponse, ReplyResponse, SummaryResponse, Token,
};
use tokio::task::{AbortHandle, JoinSet};

use crate::compose::{
    ComposeDraft, ComposeOutcome, ComposeWorkflow, DraftId, ProofreadTicket, SendTicket,
};
use crate::error::{Error, Result};
use crate::mailbox::{
    DEFAULT_PAGE_SIZE, FetchOutcome, FetchTicket, Folder, MailboxQueryController,
};
use crate::message::{
    MessageId, MessageMutationCoordinator, MutationEffect, MutationKind, MutationTicket,
};
use crate::notice::{Notice, Scope};
use crate::service::MailBackend;
use crate::session::{
    DEFAULT_POLL_INTERVAL, Dependent, Identity, PollWake, SessionGate, SessionOutcome,
    SessionRequest, wait_for_readiness,
};

/// Client configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientConfig {
    /// Messages per page.
    pub page_size: u32,
    /// Interval between identity readiness checks.
    pub poll_interval: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl ClientConfig {
    /// Sets the page size.
    #[must_use]
    pub const fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Sets the readiness poll interval.
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

/// Something the view should react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// The session is ready.
    IdentityReady(Identity),
    /// A mailbox page replaced the current page.
    PageLoaded {
        /// True for background refreshes.
        silent: bool,
    },
    /// The user-initiated mailbox load failed.
    MailboxFailed(Notice),
    /// A background refresh failed; the shown page is unchanged.
    RefreshFailed(Notice),
    /// The selected message's detail arrived.
    DetailLoaded(MessageId),
    /// The server confirmed a message as read.
    MarkedRead(MessageId),
    /// The server confirmed a delete.
    Deleted {
        /// Deleted message.
        id: MessageId,
        /// True if the detail view was closed.
        closed: bool,
    },
    /// An AI summary is ready for the open message.
    SummaryReady(MessageId),
    /// An AI reply draft is ready for the open message.
    ReplyReady(MessageId),
    /// A proofread suggestion is ready.
    ProofreadReady,
    /// The compose surface should be dismissed.
    ComposeClosed {
        /// True if closed by a confirmed send.
        sent: bool,
    },
    /// The server acknowledged a logout.
    LoggedOut,
    /// A recoverable failure to show the user.
    Notice(Notice),
}

enum MutationResult {
    Detail(auramail_api::Result<EmailRecord>),
    MarkRead(auramail_api::Result<MarkReadResponse>),
    Delete(auramail_api::Result<DeleteResponse>),
    Summary(auramail_api::Result<SummaryResponse>),
    Reply(auramail_api::Result<ReplyResponse>),
}

enum Completion {
    Login {
        epoch: u64,
        result: auramail_api::Result<LoginResponse>,
    },
    Identity {
        epoch: u64,
        result: auramail_api::Result<IdentityResponse>,
    },
    Fetched {
        epoch: u64,
        ticket: FetchTicket,
        result: auramail_api::Result<MessagesPage>,
    },
    Mutation {
        epoch: u64,
        ticket: MutationTicket,
        result: MutationResult,
    },
    Proofread {
        epoch: u64,
        ticket: ProofreadTicket,
        result: auramail_api::Result<ProofreadResponse>,
    },
    Sent {
        epoch: u64,
        ticket: SendTicket,
        result: auramail_api::Result<()>,
    },
    LoggedOut(auramail_api::Result<()>),
    PollFired {
        dependent: Dependent,
        wake: PollWake,
    },
}

/// A request waiting for the session to become ready.
#[derive(Debug)]
enum Parked {
    Fetch(FetchTicket),
    Proofread(ProofreadTicket),
    Send(SendTicket),
}

impl Parked {
    const fn dependent(&self) -> Dependent {
        match self {
            Self::Fetch(_) => Dependent::Mailbox,
            Self::Proofread(_) | Self::Send(_) => Dependent::Compose,
        }
    }
}

/// Mail client owning the session gate and all components.
pub struct MailClient<B: MailBackend> {
    backend: Arc<B>,
    config: ClientConfig,
    session: SessionGate,
    mailbox: MailboxQueryController,
    messages: MessageMutationCoordinator,
    compose: Option<ComposeWorkflow>,
    tasks: JoinSet<Completion>,
    polls: HashMap<Dependent, AbortHandle>,
    parked: HashMap<Dependent, Parked>,
    active_fetch: Option<AbortHandle>,
    drafts_opened: u64,
}

impl<B: MailBackend> MailClient<B> {
    /// Creates a client. Nothing is requested until [`MailClient::start`].
    #[must_use]
    pub fn new(backend: B, config: ClientConfig) -> Self {
        Self {
            backend: Arc::new(backend),
            config,
            session: SessionGate::new(),
            mailbox: MailboxQueryController::new(config.page_size),
            messages: MessageMutationCoordinator::new(),
            compose: None,
            tasks: JoinSet::new(),
            polls: HashMap::new(),
            parked: HashMap::new(),
            active_fetch: None,
            drafts_opened: 0,
        }
    }

    /// Seeds the session with a token from a previous run.
    #[must_use]
    pub fn with_stored_token(mut self, token: Token) -> Self {
        self.session = std::mem::take(&mut self.session).with_stored_token(token);
        self
    }

    /// Starts resolving the session and loads the current folder.
    ///
    /// The mailbox fetch waits for the identity if it is not ready yet.
    pub fn start(&mut self) {
        if let Some(request) = self.session.bootstrap() {
            self.dispatch_session(request);
        }
        let ticket = self.mailbox.refresh();
        self.dispatch_fetch(ticket);
    }

    /// Waits for the next completion and applies it.
    ///
    /// Returns `None` when nothing is outstanding.
    pub async fn next_event(&mut self) -> Option<ClientEvent> {
        loop {
            let completion = match self.tasks.join_next().await? {
                Ok(completion) => completion,
                Err(e) if e.is_cancelled() => continue,
                Err(e) => {
                    tracing::error!("Request task failed: {}", e);
                    continue;
                }
            };
            if let Some(event) = self.apply(completion) {
                return Some(event);
            }
        }
    }

    /// True while requests or poll timers are outstanding.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.tasks.is_empty()
    }

    /// Number of readiness polls outstanding, at most one per dependent.
    #[must_use]
    pub fn pending_polls(&self) -> usize {
        self.polls.len()
    }

    // === Mailbox ===

    /// Switches folder and loads its first page.
    pub fn set_folder(&mut self, folder: Folder) {
        self.messages.close();
        let ticket = self.mailbox.set_folder(folder);
        self.dispatch_fetch(ticket);
    }

    /// Loads page `n`, clamped to the known page count.
    pub fn set_page(&mut self, n: u32) {
        let ticket = self.mailbox.set_page(n);
        self.dispatch_fetch(ticket);
    }

    /// Loads the next page.
    pub fn next_page(&mut self) {
        let ticket = self.mailbox.next_page();
        self.dispatch_fetch(ticket);
    }

    /// Loads the previous page.
    pub fn previous_page(&mut self) {
        let ticket = self.mailbox.previous_page();
        self.dispatch_fetch(ticket);
    }

    /// Reloads the current page with the loading indicator.
    pub fn refresh(&mut self) {
        let ticket = self.mailbox.refresh();
        self.dispatch_fetch(ticket);
    }

    /// Reloads the current page in the background.
    pub fn refresh_silently(&mut self) {
        let ticket = self.mailbox.refresh_silently();
        self.dispatch_fetch(ticket);
    }

    /// Filters the current page locally.
    pub fn search(&mut self, query: impl Into<String>) {
        self.mailbox.set_search(query);
    }

    // === Messages ===

    /// Opens a message and loads its detail.
    pub fn open_message(&mut self, id: impl Into<MessageId>) {
        let Some(token) = self.ready_token("open") else {
            return;
        };
        if let Some(ticket) = self.messages.open(id.into()) {
            self.dispatch_mutation(token, ticket);
        }
    }

    /// Closes the open message.
    pub fn close_message(&mut self) {
        self.messages.close();
    }

    /// Marks a message read unless it already is.
    pub fn mark_read(&mut self, id: impl Into<MessageId>) {
        let Some(token) = self.ready_token("mark read") else {
            return;
        };
        let id = id.into();
        let known_read = self.mailbox.find(&id).is_some_and(|m| m.read);
        if let Some(ticket) = self.messages.mark_read(id, known_read) {
            self.dispatch_mutation(token, ticket);
        }
    }

    /// Deletes a message.
    pub fn delete(&mut self, id: impl Into<MessageId>) {
        let Some(token) = self.ready_token("delete") else {
            return;
        };
        if let Some(ticket) = self.messages.delete(id.into()) {
            self.dispatch_mutation(token, ticket);
        }
    }

    /// Requests an AI summary of the open message.
    ///
    /// A repeat request while one is outstanding is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoMessageOpen`] unless `id` is the loaded message.
    pub fn summarize(&mut self, id: impl Into<MessageId>) -> Result<()> {
        let id = self.loaded_message(id.into())?;
        if let Some(token) = self.ready_token("summarize")
            && let Some(ticket) = self.messages.summarize(id)
        {
            self.dispatch_mutation(token, ticket);
        }
        Ok(())
    }

    /// Requests an AI reply draft for the open message.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoMessageOpen`] unless `id` is the loaded message.
    pub fn generate_reply(&mut self, id: impl Into<MessageId>) -> Result<()> {
        let id = self.loaded_message(id.into())?;
        if let Some(token) = self.ready_token("generate reply")
            && let Some(ticket) = self.messages.generate_reply(id)
        {
            self.dispatch_mutation(token, ticket);
        }
        Ok(())
    }

    // === Compose ===

    /// Opens an empty draft.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] while another draft is sending.
    pub fn compose_new(&mut self) -> Result<()> {
        self.open_draft(ComposeDraft::new())
    }

    /// Opens a reply to the open message.
    ///
    /// The body is the generated reply if one is ready, otherwise the
    /// quoted original.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoMessageOpen`] without a loaded message and
    /// [`Error::InvalidTransition`] while another draft is sending.
    pub fn reply(&mut self) -> Result<()> {
        let detail = self.messages.detail().ok_or(Error::NoMessageOpen)?;
        let body = self
            .messages
            .generated_reply()
            .map_or_else(|| detail.quoted_body(), str::to_string);
        let draft = ComposeDraft::reply(&detail.summary.sender, &detail.summary.subject, &body);
        self.open_draft(draft)
    }

    /// Starts proofreading the draft body.
    ///
    /// # Errors
    ///
    /// Returns an error if no draft is open or the workflow rejects it.
    pub fn proofread(&mut self) -> Result<()> {
        let ticket = self.workflow_mut()?.proofread()?;
        self.dispatch_proofread(ticket);
        Ok(())
    }

    /// Proofreads the original body again.
    ///
    /// # Errors
    ///
    /// Returns an error if no suggestion is being reviewed.
    pub fn retry_proofread(&mut self) -> Result<()> {
        let ticket = self.workflow_mut()?.retry_proofread()?;
        self.dispatch_proofread(ticket);
        Ok(())
    }

    /// Applies the proofread suggestion.
    ///
    /// # Errors
    ///
    /// Returns an error if no suggestion is being reviewed.
    pub fn apply_suggestion(&mut self) -> Result<()> {
        self.workflow_mut()?.apply_suggestion()
    }

    /// Dismisses the proofread suggestion.
    ///
    /// # Errors
    ///
    /// Returns an error if no suggestion is being reviewed.
    pub fn dismiss_suggestion(&mut self) -> Result<()> {
        self.workflow_mut()?.dismiss_suggestion()
    }

    /// Validates and sends the draft.
    ///
    /// # Errors
    ///
    /// Returns an error if no draft is open, a field is missing, or the
    /// workflow is not editing.
    pub fn send(&mut self) -> Result<()> {
        let ticket = self.workflow_mut()?.send()?;
        self.dispatch_send(ticket);
        Ok(())
    }

    /// Closes the draft without sending.
    ///
    /// # Errors
    ///
    /// Returns an error if no draft is open or it is sending.
    pub fn cancel_compose(&mut self) -> Result<()> {
        self.workflow_mut()?.cancel()?;
        self.compose = None;
        self.parked.remove(&Dependent::Compose);
        if let Some(poll) = self.polls.remove(&Dependent::Compose) {
            poll.abort();
        }
        Ok(())
    }

    /// Open draft, for editing its fields.
    pub const fn compose_mut(&mut self) -> Option<&mut ComposeWorkflow> {
        self.compose.as_mut()
    }

    // === Session ===

    /// Logs out.
    ///
    /// Token and identity are cleared before this returns, and every
    /// outstanding request is cancelled. Responses that still arrive are
    /// discarded.
    pub fn logout(&mut self) {
        let token = self.session.teardown();
        self.tasks.abort_all();
        self.clear_deferred();
        self.mailbox.reset();
        self.messages.reset();
        self.compose = None;

        if let Some(token) = token {
            let backend = Arc::clone(&self.backend);
            self.tasks.spawn(async move { Completion::LoggedOut(backend.logout(&token).await) });
        }
    }

    /// Cancels every timer and request. The client stays usable.
    ///
    /// Loading indicators are cleared and a draft that was proofreading or
    /// sending returns to editing with its fields intact.
    pub fn teardown(&mut self) {
        tracing::debug!("Tearing down {} outstanding tasks", self.tasks.len());
        self.tasks.abort_all();
        self.tasks.detach_all();
        self.clear_deferred();
        self.session.abandon_resolution();
        self.mailbox.cancel_pending();
        self.messages.cancel_pending();
        if let Some(workflow) = self.compose.as_mut() {
            workflow.abandon_request();
        }
    }

    /// Dismisses the mailbox, detail and compose errors.
    pub fn dismiss_notices(&mut self) {
        self.mailbox.dismiss_error();
        self.mailbox.take_refresh_error();
        self.messages.dismiss_notice();
        if let Some(workflow) = self.compose.as_mut() {
            workflow.dismiss_error();
        }
    }

    // === Accessors ===

    /// Session state.
    #[must_use]
    pub const fn session(&self) -> &SessionGate {
        &self.session
    }

    /// Mailbox state.
    #[must_use]
    pub const fn mailbox(&self) -> &MailboxQueryController {
        &self.mailbox
    }

    /// Open-message state.
    #[must_use]
    pub const fn messages(&self) -> &MessageMutationCoordinator {
        &self.messages
    }

    /// Open draft.
    #[must_use]
    pub const fn compose(&self) -> Option<&ComposeWorkflow> {
        self.compose.as_ref()
    }

    /// Configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    // === Dispatch ===

    fn ready_token(&self, action: &str) -> Option<Token> {
        let token = self.session.bearer().cloned();
        if token.is_none() {
            tracing::debug!("Ignoring {}: session not ready", action);
        }
        token
    }

    fn loaded_message(&self, id: MessageId) -> Result<MessageId> {
        if self.messages.detail().is_some_and(|detail| detail.id() == &id) {
            Ok(id)
        } else {
            Err(Error::NoMessageOpen)
        }
    }

    fn workflow_mut(&mut self) -> Result<&mut ComposeWorkflow> {
        self.compose
            .as_mut()
            .ok_or_else(|| Error::validation("No draft is open"))
    }

    fn open_draft(&mut self, draft: ComposeDraft) -> Result<()> {
        if let Some(workflow) = &self.compose
            && workflow.state().is_loading()
        {
            return Err(Error::InvalidTransition {
                state: workflow.state().name(),
                action: "open another draft",
            });
        }
        self.parked.remove(&Dependent::Compose);
        self.drafts_opened += 1;
        let id = DraftId::new(self.drafts_opened);
        self.compose = Some(ComposeWorkflow::new(id, draft));
        Ok(())
    }

    fn dispatch_session(&mut self, request: SessionRequest) {
        let backend = Arc::clone(&self.backend);
        let epoch = self.session.epoch();
        match request {
            SessionRequest::Login => {
                self.tasks.spawn(async move {
                    Completion::Login {
                        epoch,
                        result: backend.login().await,
                    }
                });
            }
            SessionRequest::GetIdentity(token) => {
                self.tasks.spawn(async move {
                    Completion::Identity {
                        epoch,
                        result: backend.identity(&token).await,
                    }
                });
            }
        }
    }

    fn dispatch_fetch(&mut self, ticket: FetchTicket) {
        let Some(token) = self.session.bearer().cloned() else {
            self.park(Parked::Fetch(ticket));
            return;
        };
        let backend = Arc::clone(&self.backend);
        let epoch = self.session.epoch();
        let handle = self.tasks.spawn(async move {
            let page = ticket.query.page;
            let result = match ticket.query.filter.mail_filter() {
                Some(filter) => backend.fetch_messages(&token, page, filter).await,
                None => backend.fetch_sent_messages(&token, page).await,
            };
            Completion::Fetched {
                epoch,
                ticket,
                result,
            }
        });
        if !ticket.silent
            && let Some(previous) = self.active_fetch.replace(handle)
        {
            previous.abort();
        }
    }

    fn dispatch_mutation(&mut self, token: Token, ticket: MutationTicket) {
        let backend = Arc::clone(&self.backend);
        let epoch = self.session.epoch();
        self.tasks.spawn(async move {
            let id = ticket.id.as_str();
            let result = match ticket.kind {
                MutationKind::Open => {
                    MutationResult::Detail(backend.fetch_message(&token, id).await)
                }
                MutationKind::MarkRead => {
                    MutationResult::MarkRead(backend.mark_as_read(&token, id).await)
                }
                MutationKind::Delete => {
                    MutationResult::Delete(backend.delete_message(&token, id).await)
                }
                MutationKind::Summarize => {
                    MutationResult::Summary(backend.summarize(&token, id).await)
                }
                MutationKind::GenerateReply => {
                    MutationResult::Reply(backend.generate_reply(&token, id).await)
                }
            };
            Completion::Mutation {
                epoch,
                ticket,
                result,
            }
        });
    }

    fn dispatch_proofread(&mut self, ticket: ProofreadTicket) {
        let Some(token) = self.session.bearer().cloned() else {
            self.park(Parked::Proofread(ticket));
            return;
        };
        let backend = Arc::clone(&self.backend);
        let epoch = self.session.epoch();
        self.tasks.spawn(async move {
            let result = backend.proofread(&token, &ticket.body).await;
            Completion::Proofread {
                epoch,
                ticket,
                result,
            }
        });
    }

    fn dispatch_send(&mut self, ticket: SendTicket) {
        let Some(token) = self.session.bearer().cloned() else {
            self.park(Parked::Send(ticket));
            return;
        };
        let backend = Arc::clone(&self.backend);
        let epoch = self.session.epoch();
        self.tasks.spawn(async move {
            let result = backend.send_email(&token, &ticket.email).await;
            Completion::Sent {
                epoch,
                ticket,
                result,
            }
        });
    }

    fn dispatch_parked(&mut self, parked: Parked) {
        match parked {
            Parked::Fetch(ticket) => self.dispatch_fetch(ticket),
            Parked::Proofread(ticket) => self.dispatch_proofread(ticket),
            Parked::Send(ticket) => self.dispatch_send(ticket),
        }
    }

    // === Deferral ===

    fn park(&mut self, parked: Parked) {
        let dependent = parked.dependent();
        let keep_existing = matches!(
            (self.parked.get(&dependent), &parked),
            (Some(Parked::Fetch(existing)), Parked::Fetch(new)) if new.silent && !existing.silent
        );
        if keep_existing {
            tracing::debug!("Dropping silent refresh behind a deferred load");
        } else {
            tracing::debug!("Deferring {:?} until the session is ready", parked);
            self.parked.insert(dependent, parked);
        }
        self.arm_poll(dependent);
    }

    fn arm_poll(&mut self, dependent: Dependent) {
        if self.polls.contains_key(&dependent) {
            return;
        }
        let rx = self.session.subscribe();
        let interval = self.config.poll_interval;
        let handle = self.tasks.spawn(async move {
            let wake = wait_for_readiness(rx, interval).await;
            Completion::PollFired { dependent, wake }
        });
        self.polls.insert(dependent, handle);
    }

    fn clear_deferred(&mut self) {
        for (_, poll) in self.polls.drain() {
            poll.abort();
        }
        self.parked.clear();
        if let Some(fetch) = self.active_fetch.take() {
            fetch.abort();
        }
    }

    // === Completions ===

    fn apply(&mut self, completion: Completion) -> Option<ClientEvent> {
        match completion {
            Completion::Login { epoch, result } => {
                self.is_current(epoch)?;
                let outcome = self.session.on_login(result);
                self.on_session_outcome(outcome)
            }
            Completion::Identity { epoch, result } => {
                self.is_current(epoch)?;
                let outcome = self.session.on_identity(result);
                self.on_session_outcome(outcome)
            }
            Completion::Fetched {
                epoch,
                ticket,
                result,
            } => {
                self.is_current(epoch)?;
                self.on_fetched(ticket, result)
            }
            Completion::Mutation {
                epoch,
                ticket,
                result,
            } => {
                self.is_current(epoch)?;
                self.on_mutation(ticket, result)
            }
            Completion::Proofread {
                epoch,
                ticket,
                result,
            } => {
                self.is_current(epoch)?;
                match self.compose.as_mut()?.on_proofread(&ticket, result) {
                    ComposeOutcome::ProofreadReady => Some(ClientEvent::ProofreadReady),
                    ComposeOutcome::Failed(notice) => Some(ClientEvent::Notice(notice)),
                    ComposeOutcome::Sent | ComposeOutcome::Stale => None,
                }
            }
            Completion::Sent {
                epoch,
                ticket,
                result,
            } => {
                self.is_current(epoch)?;
                self.on_sent(&ticket, result)
            }
            Completion::LoggedOut(result) => match result {
                Ok(()) => Some(ClientEvent::LoggedOut),
                Err(e) => {
                    tracing::warn!("Server logout failed: {}", e);
                    Some(ClientEvent::Notice(Notice::from_error(
                        Scope::Session,
                        &Error::Api(e),
                    )))
                }
            },
            Completion::PollFired { dependent, wake } => {
                self.on_poll(dependent, wake);
                None
            }
        }
    }

    fn is_current(&self, epoch: u64) -> Option<()> {
        if self.session.is_current(epoch) {
            Some(())
        } else {
            tracing::debug!("Discarding response from session epoch {}", epoch);
            None
        }
    }

    fn on_session_outcome(&mut self, outcome: SessionOutcome) -> Option<ClientEvent> {
        match outcome {
            SessionOutcome::Ready(identity) => Some(ClientEvent::IdentityReady(identity)),
            SessionOutcome::NeedsIdentity(request) => {
                self.dispatch_session(request);
                None
            }
            SessionOutcome::Failed(e) => Some(ClientEvent::Notice(Notice::from_error(
                Scope::Session,
                &e,
            ))),
        }
    }

    fn on_poll(&mut self, dependent: Dependent, wake: PollWake) {
        self.polls.remove(&dependent);
        if !self.parked.contains_key(&dependent) {
            return;
        }
        if self.session.is_ready() {
            tracing::debug!("Session ready ({:?}), resuming {:?}", wake, dependent);
            if let Some(parked) = self.parked.remove(&dependent) {
                self.dispatch_parked(parked);
            }
        } else {
            tracing::debug!("Session not ready, polling again for {:?}", dependent);
            self.arm_poll(dependent);
        }
    }

    fn on_fetched(
        &mut self,
        ticket: FetchTicket,
        result: auramail_api::Result<MessagesPage>,
    ) -> Option<ClientEvent> {
        match self.mailbox.on_fetch_complete(ticket, result) {
            FetchOutcome::Applied => Some(ClientEvent::PageLoaded {
                silent: ticket.silent,
            }),
            FetchOutcome::Reclamped(follow_up) => {
                self.dispatch_fetch(follow_up);
                Some(ClientEvent::PageLoaded {
                    silent: ticket.silent,
                })
            }
            FetchOutcome::Stale => None,
            FetchOutcome::Failed {
                silent: true,
                notice,
            } => Some(ClientEvent::RefreshFailed(notice)),
            FetchOutcome::Failed {
                silent: false,
                notice,
            } => Some(ClientEvent::MailboxFailed(notice)),
        }
    }

    fn on_mutation(
        &mut self,
        ticket: MutationTicket,
        result: MutationResult,
    ) -> Option<ClientEvent> {
        let effect = match result {
            MutationResult::Detail(r) => self.messages.on_detail(&ticket, r),
            MutationResult::MarkRead(r) => self.messages.on_mark_read(&ticket, r),
            MutationResult::Delete(r) => self.messages.on_delete(&ticket, r),
            MutationResult::Summary(r) => self.messages.on_summary(&ticket, r),
            MutationResult::Reply(r) => self.messages.on_reply(&ticket, r),
        };

        match effect {
            MutationEffect::DetailLoaded { unread } => {
                if unread {
                    self.mark_read(ticket.id.clone());
                }
                Some(ClientEvent::DetailLoaded(ticket.id))
            }
            MutationEffect::RefreshList => {
                self.refresh_silently();
                Some(ClientEvent::MarkedRead(ticket.id))
            }
            MutationEffect::Deleted { closed } => {
                self.refresh_silently();
                Some(ClientEvent::Deleted {
                    id: ticket.id,
                    closed,
                })
            }
            MutationEffect::Populated => match ticket.kind {
                MutationKind::Summarize => Some(ClientEvent::SummaryReady(ticket.id)),
                _ => Some(ClientEvent::ReplyReady(ticket.id)),
            },
            MutationEffect::Failed(notice) => Some(ClientEvent::Notice(notice)),
            MutationEffect::None | MutationEffect::Discarded => None,
        }
    }

    fn on_sent(
        &mut self,
        ticket: &SendTicket,
        result: auramail_api::Result<()>,
    ) -> Option<ClientEvent> {
        match self.compose.as_mut()?.on_send(ticket, result) {
            ComposeOutcome::Sent => {
                self.compose = None;
                if self.mailbox.folder() == Folder::Sent {
                    self.refresh_silently();
                }
                Some(ClientEvent::ComposeClosed { sent: true })
            }
            ComposeOutcome::Failed(notice) => Some(ClientEvent::Notice(notice)),
            ComposeOutcome::ProofreadReady | ComposeOutcome::Stale => None,
        }
    }
}

impl<B: MailBackend> std::fmt::Debug for MailClient<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailClient")
            .field("config", &self.config)
            .field("session", &self.session)
            .field("mailbox", &self.mailbox)
            .field("messages", &self.messages)
            .field("compose", &self.compose)
            .field("tasks", &self.tasks.len())
            .finish_non_exhaustive()
    }
}
