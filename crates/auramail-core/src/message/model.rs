//! Message data models.

use std::fmt;

use auramail_api::EmailRecord;

/// Unique identifier for a message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(String);

impl MessageId {
    /// Creates an identifier from its raw value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MessageId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for MessageId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Summary of a message for display in the message list.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)] // Flags mirror the server's classification
pub struct MessageSummary {
    /// Unique identifier.
    pub id: MessageId,
    /// Message subject.
    pub subject: String,
    /// Sender address.
    pub sender: String,
    /// Recipient addresses, in order.
    pub recipients: Vec<String>,
    /// Short preview of message content.
    pub snippet: String,
    /// Date as display string.
    pub date: String,
    /// Time as display string.
    pub time: String,
    /// Whether the message has attachments.
    pub has_attachments: bool,
    /// Whether the message is starred.
    pub starred: bool,
    /// Label assigned by the classifier.
    pub label: Option<String>,
    /// Whether the message has been read.
    pub read: bool,
    /// Whether the message was classified as spam.
    pub spam: bool,
    /// Whether the message was classified as phishing.
    pub phishing: bool,
}

impl MessageSummary {
    /// Returns true if the message belongs to the spam folder.
    #[must_use]
    pub const fn is_suspicious(&self) -> bool {
        self.spam || self.phishing
    }

    /// Case-insensitive match against subject, sender, snippet and label.
    ///
    /// `needle` must already be lowercase.
    #[must_use]
    pub fn matches(&self, needle: &str) -> bool {
        self.subject.to_lowercase().contains(needle)
            || self.sender.to_lowercase().contains(needle)
            || self.snippet.to_lowercase().contains(needle)
            || self
                .label
                .as_ref()
                .is_some_and(|l| l.to_lowercase().contains(needle))
    }
}

impl From<EmailRecord> for MessageSummary {
    fn from(record: EmailRecord) -> Self {
        Self {
            id: MessageId(record.id),
            subject: record.subject,
            sender: record.sender,
            recipients: record.recipients,
            snippet: record.snippet,
            date: record.date,
            time: record.time,
            has_attachments: record.has_attachments,
            starred: record.star,
            label: record.label,
            read: record.read,
            spam: record.spam,
            phishing: record.phishing,
        }
    }
}

/// Full message content for the detail view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDetail {
    /// Summary fields.
    pub summary: MessageSummary,
    /// Plain text body.
    pub body: String,
}

impl MessageDetail {
    /// Returns the message identifier.
    #[must_use]
    pub const fn id(&self) -> &MessageId {
        &self.summary.id
    }

    /// Returns the body quoted for a reply.
    #[must_use]
    pub fn quoted_body(&self) -> String {
        format!("\n\n> {}", self.body.replace('\n', "\n> "))
    }
}

impl From<EmailRecord> for MessageDetail {
    fn from(mut record: EmailRecord) -> Self {
        let body = record.body.take().unwrap_or_default();
        Self {
            summary: MessageSummary::from(record),
            body,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Builds a summary with sensible defaults for tests.
    fn summary(id: &str, read: bool) -> MessageSummary {
        MessageSummary {
            id: MessageId::new(id),
            subject: format!("Subject {id}"),
            sender: "alice@example.com".into(),
            recipients: vec!["me@example.com".into()],
            snippet: "Preview".into(),
            date: "2026-01-08".into(),
            time: "10:30".into(),
            has_attachments: false,
            starred: false,
            label: None,
            read,
            spam: false,
            phishing: false,
        }
    }

    #[test]
    fn test_from_record() {
        let record: EmailRecord = serde_json::from_str(
            r#"{"id": "m1", "subject": "Hi", "sender": "a@b.c", "body": "Hello", "star": true, "spam": true}"#,
        )
        .unwrap();
        let detail = MessageDetail::from(record);
        assert_eq!(detail.id().as_str(), "m1");
        assert_eq!(detail.body, "Hello");
        assert!(detail.summary.starred);
        assert!(detail.summary.is_suspicious());
    }

    #[test]
    fn test_matches_is_case_insensitive() {
        let mut msg = summary("m1", false);
        msg.label = Some("Work".into());
        assert!(msg.matches("subject m1"));
        assert!(msg.matches("alice"));
        assert!(msg.matches("work"));
        assert!(!msg.matches("invoice"));
    }

    #[test]
    fn test_quoted_body() {
        let detail = MessageDetail {
            summary: summary("m1", true),
            body: "line one\nline two".into(),
        };
        assert_eq!(detail.quoted_body(), "\n\n> line one\n> line two");
    }
}
