//! Plain-text rendering of client state.

use std::fmt::Write;

use auramail_core::{
    ClientEvent, ComposeState, ComposeWorkflow, MailboxQueryController, MessageMutationCoordinator,
    MessageSummary,
};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone};

const SUBJECT_WIDTH: usize = 48;
const SENDER_WIDTH: usize = 28;

/// Format a message date in the local timezone when it can be parsed.
fn format_date_local(date: &str, time: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc2822(date) {
        let local: DateTime<Local> = dt.with_timezone(&Local);
        return local.format("%a, %d %b %Y %H:%M").to_string();
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(date) {
        let local: DateTime<Local> = dt.with_timezone(&Local);
        return local.format("%a, %d %b %Y %H:%M").to_string();
    }

    // Separate date and time fields are already local to the server
    let combined = format!("{} {}", date.trim(), time.trim());
    for pattern in ["%Y-%m-%d %H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&combined, pattern)
            && let Some(local) = Local.from_local_datetime(&naive).earliest()
        {
            return local.format("%a, %d %b %Y %H:%M").to_string();
        }
    }

    combined.trim().to_string()
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(width.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

fn flags(message: &MessageSummary) -> String {
    let mut out = String::with_capacity(4);
    out.push(if message.read { ' ' } else { '*' });
    out.push(if message.is_suspicious() { '!' } else { ' ' });
    out.push(if message.has_attachments { '+' } else { ' ' });
    out.push(if message.starred { 's' } else { ' ' });
    out
}

/// Renders the current mailbox page.
pub fn render_mailbox(mailbox: &MailboxQueryController) -> String {
    let page = mailbox.current_page();
    let mut out = format!(
        "{} | page {}/{} | {} messages",
        mailbox.folder(),
        mailbox.page_number(),
        page.total_pages().max(1),
        page.total_count
    );
    if mailbox.is_loading() {
        out.push_str(" | loading...");
    }
    if !mailbox.search().is_empty() {
        let _ = write!(out, " | search: {}", mailbox.search());
    }
    out.push('\n');

    if let Some(error) = mailbox.error() {
        let _ = writeln!(out, "  Error: {error}");
        return out;
    }

    let items = mailbox.visible_items();
    if items.is_empty() {
        out.push_str("  (no messages)\n");
    }
    for message in items {
        let _ = writeln!(
            out,
            "{} {:<10} {:<sender$} {:<subject$} {}",
            flags(message),
            message.id.as_str(),
            truncate(&message.sender, SENDER_WIDTH),
            truncate(&message.subject, SUBJECT_WIDTH),
            format_date_local(&message.date, &message.time),
            sender = SENDER_WIDTH,
            subject = SUBJECT_WIDTH,
        );
    }
    out
}

/// Renders the open message with its transient AI state.
pub fn render_detail(messages: &MessageMutationCoordinator) -> String {
    let Some(detail) = messages.detail() else {
        return if messages.is_detail_loading() {
            "Loading message...\n".to_string()
        } else {
            "No message open\n".to_string()
        };
    };
    let summary = &detail.summary;

    let mut out = String::new();
    let _ = writeln!(out, "Subject: {}", summary.subject);
    let _ = writeln!(out, "From:    {}", summary.sender);
    let _ = writeln!(out, "To:      {}", summary.recipients.join(", "));
    let _ = writeln!(
        out,
        "Date:    {}",
        format_date_local(&summary.date, &summary.time)
    );
    if let Some(label) = &summary.label {
        let _ = writeln!(out, "Label:   {label}");
    }
    if summary.spam {
        out.push_str("Warning: detected as potential spam.\n");
    }
    if summary.phishing {
        out.push_str("Warning: this may be a phishing attempt. Be careful with links.\n");
    }
    out.push('\n');
    out.push_str(&detail.body);
    out.push('\n');

    if let Some(text) = messages.summary() {
        let _ = write!(out, "\nSummary:\n{text}\n");
    }
    if let Some(text) = messages.generated_reply() {
        let _ = write!(out, "\nSuggested reply (type 'reply' to use it):\n{text}\n");
    }
    if let Some(notice) = messages.notice() {
        let _ = writeln!(out, "\n! {notice}");
    }
    out
}

/// Renders the compose form.
pub fn render_compose(workflow: &ComposeWorkflow) -> String {
    let draft = workflow.draft();
    let mut out = String::new();
    let _ = writeln!(out, "[{}]", workflow.state().name());
    let _ = writeln!(out, "To:      {}", draft.to);
    let _ = writeln!(out, "Subject: {}", draft.subject);
    let _ = write!(out, "\n{}\n", draft.body);

    if workflow.state() == ComposeState::ProofreadReady
        && let Some(suggestion) = &draft.proofread_suggestion
    {
        let _ = write!(
            out,
            "\nProofread suggestion (apply | dismiss | retry):\n{suggestion}\n"
        );
    }
    if let Some(error) = workflow.error() {
        let _ = writeln!(out, "\n! {error}");
    }
    out
}

/// One-line description of an event, for events that need no full redraw.
pub fn describe_event(event: &ClientEvent) -> Option<String> {
    match event {
        ClientEvent::IdentityReady(identity) => Some(format!("Signed in as {identity}")),
        ClientEvent::MailboxFailed(notice) | ClientEvent::Notice(notice) => {
            Some(format!("! {notice}"))
        }
        ClientEvent::RefreshFailed(notice) => {
            Some(format!("(background refresh failed: {notice})"))
        }
        ClientEvent::MarkedRead(id) => Some(format!("Marked {id} as read")),
        ClientEvent::Deleted { id, .. } => Some(format!("Deleted {id}")),
        ClientEvent::ComposeClosed { sent: true } => Some("Message sent".to_string()),
        ClientEvent::ComposeClosed { sent: false } => Some("Draft discarded".to_string()),
        ClientEvent::LoggedOut => Some("Logged out".to_string()),
        ClientEvent::PageLoaded { .. }
        | ClientEvent::DetailLoaded(_)
        | ClientEvent::SummaryReady(_)
        | ClientEvent::ReplyReady(_)
        | ClientEvent::ProofreadReady => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use auramail_core::compose::DraftId;
    use auramail_core::{ComposeDraft, MessageId, Notice, Scope};

    #[test]
    fn test_unparseable_date_kept() {
        assert_eq!(format_date_local("yesterday", ""), "yesterday");
        assert_eq!(format_date_local("Jan 8", "10:30"), "Jan 8 10:30");
    }

    #[test]
    fn test_split_date_parsed() {
        let formatted = format_date_local("2026-01-08", "10:30");
        assert!(formatted.contains("08 Jan 2026"), "{formatted}");
        assert!(formatted.ends_with("10:30"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a very long subject line", 10), "a very ...");
    }

    #[test]
    fn test_empty_mailbox() {
        let out = render_mailbox(&MailboxQueryController::default());
        assert!(out.starts_with("Inbox | page 1/1 | 0 messages"));
        assert!(out.contains("(no messages)"));
    }

    #[test]
    fn test_compose_shows_suggestion_only_when_ready() {
        let draft = ComposeDraft::reply("a@b.c", "Hi", "Body");
        let workflow = ComposeWorkflow::new(DraftId::new(1), draft);
        let out = render_compose(&workflow);
        assert!(out.starts_with("[editing]"));
        assert!(out.contains("Subject: Re: Hi"));
        assert!(!out.contains("Proofread suggestion"));
    }

    #[test]
    fn test_describe_event() {
        let notice = Notice::server(Scope::Detail, "Message not found");
        assert_eq!(
            describe_event(&ClientEvent::Notice(notice)),
            Some("! Message not found".to_string())
        );
        assert_eq!(
            describe_event(&ClientEvent::MarkedRead(MessageId::new("m1"))),
            Some("Marked m1 as read".to_string())
        );
        assert!(describe_event(&ClientEvent::ProofreadReady).is_none());
    }
}
