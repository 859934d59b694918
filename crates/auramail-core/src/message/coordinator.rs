//! Single-message operations and the open-message state.

use std::collections::HashSet;

use auramail_api::{
    DeleteResponse, EmailRecord, MarkReadResponse, ReplyResponse, SummaryResponse,
};

use super::model::{MessageDetail, MessageId};
use crate::error::Error;
use crate::notice::{Notice, Scope};

/// Kind of single-message request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    /// Load the message detail.
    Open,
    /// Mark as read.
    MarkRead,
    /// Delete.
    Delete,
    /// AI summary.
    Summarize,
    /// AI reply draft.
    GenerateReply,
}

impl MutationKind {
    /// Returns a short name for logs and notices.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::MarkRead => "mark read",
            Self::Delete => "delete",
            Self::Summarize => "summarize",
            Self::GenerateReply => "generate reply",
        }
    }
}

/// A request the coordinator wants executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationTicket {
    /// Target message.
    pub id: MessageId,
    /// Request kind.
    pub kind: MutationKind,
}

/// What the caller must do after a response was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationEffect {
    /// Nothing further.
    None,
    /// The detail arrived for the selected message.
    DetailLoaded {
        /// True if the message is still unread.
        unread: bool,
    },
    /// The server confirmed a change; refresh the list silently.
    RefreshList,
    /// The server confirmed a delete; refresh the list silently.
    Deleted {
        /// True if the open detail view was closed.
        closed: bool,
    },
    /// Transient detail state was populated.
    Populated,
    /// The response was for a message no longer open and was dropped.
    Discarded,
    /// The request failed; nothing confirmed was changed.
    Failed(Notice),
}

/// Executes mark-read, delete and the AI actions for single messages.
///
/// Every request is single-flight per (message, kind). Results are applied
/// only after the server confirms them.
#[derive(Debug, Clone, Default)]
pub struct MessageMutationCoordinator {
    selected: Option<MessageId>,
    detail: Option<MessageDetail>,
    summary: Option<String>,
    generated_reply: Option<String>,
    notice: Option<Notice>,
    in_flight: HashSet<(MessageId, MutationKind)>,
}

impl MessageMutationCoordinator {
    /// Creates an idle coordinator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects a message and requests its detail.
    ///
    /// Returns `None` if the detail is already loaded or loading.
    pub fn open(&mut self, id: MessageId) -> Option<MutationTicket> {
        if self.selected.as_ref() == Some(&id) && self.detail.is_some() {
            return None;
        }
        if self.selected.as_ref() != Some(&id) {
            self.clear_selection();
            self.selected = Some(id.clone());
        }
        self.begin(id, MutationKind::Open)
    }

    /// Clears the selection and all transient detail state.
    pub fn close(&mut self) {
        self.clear_selection();
    }

    /// Marks a message read unless it is known to be read already.
    pub fn mark_read(&mut self, id: MessageId, known_read: bool) -> Option<MutationTicket> {
        let read = known_read || self.detail_for(&id).is_some_and(|d| d.summary.read);
        if read {
            tracing::debug!("Message {} already read, skipping", id);
            return None;
        }
        self.begin(id, MutationKind::MarkRead)
    }

    /// Requests deletion of a message.
    pub fn delete(&mut self, id: MessageId) -> Option<MutationTicket> {
        self.begin(id, MutationKind::Delete)
    }

    /// Requests an AI summary of a message.
    ///
    /// Returns `None` unless the message's detail is loaded, since the
    /// result could not be shown.
    pub fn summarize(&mut self, id: MessageId) -> Option<MutationTicket> {
        self.begin_for_detail(id, MutationKind::Summarize)
    }

    /// Requests an AI reply draft for a message.
    ///
    /// Returns `None` unless the message's detail is loaded.
    pub fn generate_reply(&mut self, id: MessageId) -> Option<MutationTicket> {
        self.begin_for_detail(id, MutationKind::GenerateReply)
    }

    /// Applies a detail response.
    pub fn on_detail(
        &mut self,
        ticket: &MutationTicket,
        result: auramail_api::Result<EmailRecord>,
    ) -> MutationEffect {
        self.finish(ticket);
        if !self.is_selected(&ticket.id) {
            return MutationEffect::Discarded;
        }
        match result {
            Ok(record) => {
                let detail = MessageDetail::from(record);
                let unread = !detail.summary.read;
                self.detail = Some(detail);
                MutationEffect::DetailLoaded { unread }
            }
            Err(e) => self.fail(ticket, e),
        }
    }

    /// Applies a mark-read response.
    pub fn on_mark_read(
        &mut self,
        ticket: &MutationTicket,
        result: auramail_api::Result<MarkReadResponse>,
    ) -> MutationEffect {
        self.finish(ticket);
        match result {
            Ok(MarkReadResponse { updated: true }) => {
                if let Some(detail) = self.detail_for_mut(&ticket.id) {
                    detail.summary.read = true;
                }
                tracing::debug!("Message {} marked read", ticket.id);
                MutationEffect::RefreshList
            }
            Ok(MarkReadResponse { updated: false }) => {
                tracing::debug!("Server left read flag of {} unchanged", ticket.id);
                MutationEffect::None
            }
            Err(e) => self.fail(ticket, e),
        }
    }

    /// Applies a delete response.
    ///
    /// Only a confirmed delete closes the detail view. Outstanding AI
    /// responses for the message are dropped when they arrive.
    pub fn on_delete(
        &mut self,
        ticket: &MutationTicket,
        result: auramail_api::Result<DeleteResponse>,
    ) -> MutationEffect {
        self.finish(ticket);
        match result {
            Ok(DeleteResponse { deleted: true }) => {
                let closed = self.is_selected(&ticket.id);
                if closed {
                    self.clear_selection();
                }
                tracing::info!("Message {} deleted", ticket.id);
                MutationEffect::Deleted { closed }
            }
            Ok(DeleteResponse { deleted: false }) => {
                let notice = Notice::server(
                    Scope::Detail,
                    "Message not found. It may already have been deleted.",
                );
                self.surface(&ticket.id, &notice);
                MutationEffect::Failed(notice)
            }
            Err(e) => self.fail(ticket, e),
        }
    }

    /// Applies a summary response.
    pub fn on_summary(
        &mut self,
        ticket: &MutationTicket,
        result: auramail_api::Result<SummaryResponse>,
    ) -> MutationEffect {
        self.finish(ticket);
        if self.detail_for(&ticket.id).is_none() {
            return MutationEffect::Discarded;
        }
        match result {
            Ok(response) => {
                self.summary = Some(response.summary);
                MutationEffect::Populated
            }
            Err(e) => self.fail(ticket, e),
        }
    }

    /// Applies a generated reply response.
    pub fn on_reply(
        &mut self,
        ticket: &MutationTicket,
        result: auramail_api::Result<ReplyResponse>,
    ) -> MutationEffect {
        self.finish(ticket);
        if self.detail_for(&ticket.id).is_none() {
            return MutationEffect::Discarded;
        }
        match result {
            Ok(response) => {
                self.generated_reply = Some(response.reply);
                MutationEffect::Populated
            }
            Err(e) => self.fail(ticket, e),
        }
    }

    /// Forgets everything, including outstanding requests.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Forgets outstanding requests after they were cancelled.
    ///
    /// The selection and loaded detail are kept.
    pub fn cancel_pending(&mut self) {
        self.in_flight.clear();
    }

    /// Selected message id.
    #[must_use]
    pub const fn selected(&self) -> Option<&MessageId> {
        self.selected.as_ref()
    }

    /// Loaded detail of the selected message.
    #[must_use]
    pub const fn detail(&self) -> Option<&MessageDetail> {
        self.detail.as_ref()
    }

    /// True while the selected message's detail is loading.
    #[must_use]
    pub fn is_detail_loading(&self) -> bool {
        self.selected
            .as_ref()
            .is_some_and(|id| self.is_in_flight(id, MutationKind::Open))
    }

    /// AI summary of the open message.
    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    /// AI reply draft for the open message.
    #[must_use]
    pub fn generated_reply(&self) -> Option<&str> {
        self.generated_reply.as_deref()
    }

    /// Notice for the open message.
    #[must_use]
    pub const fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Clears the detail notice.
    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// Returns true if a request of `kind` is outstanding for `id`.
    #[must_use]
    pub fn is_in_flight(&self, id: &MessageId, kind: MutationKind) -> bool {
        self.in_flight.contains(&(id.clone(), kind))
    }

    fn begin(&mut self, id: MessageId, kind: MutationKind) -> Option<MutationTicket> {
        if !self.in_flight.insert((id.clone(), kind)) {
            tracing::debug!("{} already in flight for {}", kind.name(), id);
            return None;
        }
        tracing::debug!("Issuing {} for {}", kind.name(), id);
        Some(MutationTicket { id, kind })
    }

    fn begin_for_detail(&mut self, id: MessageId, kind: MutationKind) -> Option<MutationTicket> {
        if self.detail_for(&id).is_none() {
            tracing::debug!("Ignoring {} for {}: message not open", kind.name(), id);
            return None;
        }
        self.begin(id, kind)
    }

    fn finish(&mut self, ticket: &MutationTicket) {
        self.in_flight.remove(&(ticket.id.clone(), ticket.kind));
    }

    fn fail(&mut self, ticket: &MutationTicket, error: auramail_api::Error) -> MutationEffect {
        let notice = Notice::from_error(Scope::Detail, &Error::Api(error));
        tracing::warn!("{} failed for {}: {}", ticket.kind.name(), ticket.id, notice);
        self.surface(&ticket.id, &notice);
        MutationEffect::Failed(notice)
    }

    fn surface(&mut self, id: &MessageId, notice: &Notice) {
        if self.is_selected(id) {
            self.notice = Some(notice.clone());
        }
    }

    fn is_selected(&self, id: &MessageId) -> bool {
        self.selected.as_ref() == Some(id)
    }

    fn detail_for(&self, id: &MessageId) -> Option<&MessageDetail> {
        self.detail.as_ref().filter(|d| d.id() == id)
    }

    fn detail_for_mut(&mut self, id: &MessageId) -> Option<&mut MessageDetail> {
        self.detail.as_mut().filter(|d| d.id() == id)
    }

    fn clear_selection(&mut self) {
        self.selected = None;
        self.detail = None;
        self.summary = None;
        self.generated_reply = None;
        self.notice = None;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::notice::NoticeKind;

    fn record(id: &str, read: bool) -> EmailRecord {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "subject": "Hello",
            "sender": "alice@example.com",
            "body": "Hi there",
            "read": read,
        }))
        .unwrap()
    }

    fn opened(id: &str, read: bool) -> MessageMutationCoordinator {
        let mut coordinator = MessageMutationCoordinator::new();
        let ticket = coordinator.open(MessageId::new(id)).unwrap();
        coordinator.on_detail(&ticket, Ok(record(id, read)));
        coordinator
    }

    #[test]
    fn test_open_loads_detail() {
        let mut coordinator = MessageMutationCoordinator::new();
        let ticket = coordinator.open(MessageId::new("m1")).unwrap();
        assert!(coordinator.is_detail_loading());
        assert!(coordinator.open(MessageId::new("m1")).is_none());

        let effect = coordinator.on_detail(&ticket, Ok(record("m1", false)));
        assert_eq!(effect, MutationEffect::DetailLoaded { unread: true });
        assert!(!coordinator.is_detail_loading());
        assert_eq!(coordinator.detail().unwrap().body, "Hi there");
    }

    #[test]
    fn test_detail_for_previous_selection_discarded() {
        let mut coordinator = MessageMutationCoordinator::new();
        let first = coordinator.open(MessageId::new("m1")).unwrap();
        coordinator.open(MessageId::new("m2")).unwrap();
        assert_eq!(
            coordinator.on_detail(&first, Ok(record("m1", true))),
            MutationEffect::Discarded
        );
        assert!(coordinator.detail().is_none());
        assert_eq!(coordinator.selected().unwrap().as_str(), "m2");
    }

    #[test]
    fn test_mark_read_is_idempotent() {
        let mut coordinator = opened("m1", false);
        let ticket = coordinator.mark_read(MessageId::new("m1"), false).unwrap();
        assert!(coordinator.mark_read(MessageId::new("m1"), false).is_none());

        let effect = coordinator.on_mark_read(&ticket, Ok(MarkReadResponse { updated: true }));
        assert_eq!(effect, MutationEffect::RefreshList);
        assert!(coordinator.detail().unwrap().summary.read);
        assert!(coordinator.mark_read(MessageId::new("m1"), false).is_none());
    }

    #[test]
    fn test_mark_read_skips_known_read() {
        let mut coordinator = MessageMutationCoordinator::new();
        assert!(coordinator.mark_read(MessageId::new("m1"), true).is_none());
        assert!(opened("m2", true).mark_read(MessageId::new("m2"), false).is_none());
    }

    #[test]
    fn test_mark_read_failure_keeps_flag() {
        let mut coordinator = opened("m1", false);
        let ticket = coordinator.mark_read(MessageId::new("m1"), false).unwrap();
        let effect = coordinator.on_mark_read(&ticket, Err(auramail_api::Error::Timeout));
        assert!(matches!(effect, MutationEffect::Failed(ref n) if n.kind == NoticeKind::Transport));
        assert!(!coordinator.detail().unwrap().summary.read);
        assert!(coordinator.notice().is_some());
    }

    #[test]
    fn test_confirmed_delete_closes_detail() {
        let mut coordinator = opened("m1", true);
        let ticket = coordinator.delete(MessageId::new("m1")).unwrap();
        let effect = coordinator.on_delete(&ticket, Ok(DeleteResponse { deleted: true }));
        assert_eq!(effect, MutationEffect::Deleted { closed: true });
        assert!(coordinator.selected().is_none());
        assert!(coordinator.detail().is_none());
    }

    #[test]
    fn test_unconfirmed_delete_keeps_detail_open() {
        let mut coordinator = opened("m1", true);
        let ticket = coordinator.delete(MessageId::new("m1")).unwrap();
        let effect = coordinator.on_delete(&ticket, Ok(DeleteResponse { deleted: false }));
        let MutationEffect::Failed(notice) = effect else {
            panic!("expected a notice");
        };
        assert_eq!(notice.kind, NoticeKind::Server);
        assert!(coordinator.detail().is_some());
        assert_eq!(coordinator.notice(), Some(&notice));
    }

    #[test]
    fn test_summarize_single_flight() {
        let mut coordinator = opened("m1", true);
        let ticket = coordinator.summarize(MessageId::new("m1")).unwrap();
        assert!(coordinator.summarize(MessageId::new("m1")).is_none());
        assert!(coordinator.generate_reply(MessageId::new("m1")).is_some());

        let effect = coordinator.on_summary(
            &ticket,
            Ok(SummaryResponse {
                summary: "Short".into(),
            }),
        );
        assert_eq!(effect, MutationEffect::Populated);
        assert_eq!(coordinator.summary(), Some("Short"));
        assert!(coordinator.summarize(MessageId::new("m1")).is_some());
    }

    #[test]
    fn test_ai_actions_require_loaded_detail() {
        let mut coordinator = MessageMutationCoordinator::new();
        assert!(coordinator.summarize(MessageId::new("m1")).is_none());
        assert!(coordinator.generate_reply(MessageId::new("m1")).is_none());

        coordinator.open(MessageId::new("m1")).unwrap();
        assert!(coordinator.summarize(MessageId::new("m1")).is_none());

        let mut coordinator = opened("m1", true);
        assert!(coordinator.summarize(MessageId::new("m2")).is_none());
        assert!(!coordinator.is_in_flight(&MessageId::new("m2"), MutationKind::Summarize));
        assert!(coordinator.summarize(MessageId::new("m1")).is_some());
    }

    #[test]
    fn test_summary_failure_leaves_no_summary() {
        let mut coordinator = opened("m1", true);
        let ticket = coordinator.summarize(MessageId::new("m1")).unwrap();
        coordinator.on_summary(&ticket, Err(auramail_api::Error::server(503, "Model busy")));
        assert!(coordinator.summary().is_none());
        assert_eq!(coordinator.notice().unwrap().message, "Model busy");
    }

    #[test]
    fn test_ai_results_dropped_after_delete() {
        let mut coordinator = opened("m1", true);
        let reply = coordinator.generate_reply(MessageId::new("m1")).unwrap();
        let delete = coordinator.delete(MessageId::new("m1")).unwrap();
        coordinator.on_delete(&delete, Ok(DeleteResponse { deleted: true }));

        let effect = coordinator.on_reply(
            &reply,
            Ok(ReplyResponse {
                reply: "Thanks".into(),
            }),
        );
        assert_eq!(effect, MutationEffect::Discarded);
        assert!(coordinator.generated_reply().is_none());
        assert!(!coordinator.is_in_flight(&MessageId::new("m1"), MutationKind::GenerateReply));
    }

    #[test]
    fn test_cancel_pending_allows_new_requests() {
        let mut coordinator = opened("m1", true);
        coordinator.summarize(MessageId::new("m1")).unwrap();
        assert!(coordinator.summarize(MessageId::new("m1")).is_none());

        coordinator.cancel_pending();
        assert!(!coordinator.is_in_flight(&MessageId::new("m1"), MutationKind::Summarize));
        assert!(coordinator.detail().is_some());
        assert!(coordinator.summarize(MessageId::new("m1")).is_some());
    }

    #[test]
    fn test_close_clears_transient_state() {
        let mut coordinator = opened("m1", true);
        let ticket = coordinator.generate_reply(MessageId::new("m1")).unwrap();
        coordinator.on_reply(
            &ticket,
            Ok(ReplyResponse {
                reply: "Thanks".into(),
            }),
        );
        assert_eq!(coordinator.generated_reply(), Some("Thanks"));
        coordinator.close();
        assert!(coordinator.generated_reply().is_none());
        assert!(coordinator.selected().is_none());
    }
}
