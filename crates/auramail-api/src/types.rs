//! Wire types for the backend REST surface.

use serde::{Deserialize, Deserializer, Serialize};

use crate::token::Token;

/// Server-side predicate for the received-mail list query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MailFilter {
    /// Messages classified as neither spam nor phishing.
    ValidOnly,
    /// Messages classified as spam or phishing.
    SpamAndPhishing,
    /// Every received message.
    All,
}

impl MailFilter {
    /// Returns the query-string value for this filter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ValidOnly => "valid_only",
            Self::SpamAndPhishing => "spam_and_phishing",
            Self::All => "all",
        }
    }
}

/// One email record as returned by the list and detail endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailRecord {
    /// Opaque unique identifier.
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    /// Subject line.
    #[serde(default)]
    pub subject: String,
    /// Sender address.
    #[serde(default)]
    pub sender: String,
    /// Recipient addresses, in order.
    #[serde(default, deserialize_with = "one_or_many")]
    pub recipients: Vec<String>,
    /// Short preview of the body.
    #[serde(default)]
    pub snippet: String,
    /// Full body (only guaranteed on the detail endpoint).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Date as display string.
    #[serde(default)]
    pub date: String,
    /// Time as display string.
    #[serde(default)]
    pub time: String,
    /// Whether the message has attachments.
    #[serde(default)]
    pub has_attachments: bool,
    /// Whether the message is starred.
    #[serde(default, alias = "starred")]
    pub star: bool,
    /// Optional label assigned by the classifier.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub label: Option<String>,
    /// Whether the message has been read.
    #[serde(default)]
    pub read: bool,
    /// Whether the message was classified as spam.
    #[serde(default)]
    pub spam: bool,
    /// Whether the message was classified as phishing.
    #[serde(default)]
    pub phishing: bool,
}

/// One page of a mailbox listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagesPage {
    /// Records on this page.
    pub emails: Vec<EmailRecord>,
    /// Total number of records matching the query.
    #[serde(default)]
    pub total_emails: u64,
    /// Page number the server answered for (1-based).
    #[serde(default)]
    pub page: Option<u32>,
}

/// Response to a login request.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    /// Bearer token for later requests.
    pub token: Token,
    /// Resolved identity, when the server includes it.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub email: Option<String>,
}

/// Response to an identity lookup.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityResponse {
    /// Email address of the signed-in user.
    pub email: String,
}

/// Request body naming a single message.
#[derive(Debug, Clone, Serialize)]
pub struct MessageIdRequest<'a> {
    /// Message identifier.
    pub msg_id: &'a str,
}

/// Response to a mark-as-read request.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct MarkReadResponse {
    /// Whether the server changed the read flag.
    #[serde(default)]
    pub updated: bool,
}

/// Response to a delete request.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DeleteResponse {
    /// Whether the server deleted the message.
    #[serde(default)]
    pub deleted: bool,
}

/// Response to a summarize request.
#[derive(Debug, Clone, Deserialize)]
pub struct SummaryResponse {
    /// Generated summary.
    pub summary: String,
}

/// Response to a generate-reply request.
#[derive(Debug, Clone, Deserialize)]
pub struct ReplyResponse {
    /// Generated reply body.
    pub reply: String,
}

/// Request body for proofreading.
#[derive(Debug, Clone, Serialize)]
pub struct ProofreadRequest<'a> {
    /// Text to proofread.
    pub body: &'a str,
}

/// Response to a proofread request.
#[derive(Debug, Clone, Deserialize)]
pub struct ProofreadResponse {
    /// Suggested replacement text.
    pub proofread_body: String,
}

/// An email to send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingEmail {
    /// Recipient address(es).
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// Plain text body.
    pub body: String,
}

/// Response to a send request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SendResponse {
    /// Rejection reason, when the server refused to send.
    #[serde(default)]
    pub error: Option<String>,
}

/// Error body returned with non-success statuses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    /// Error message.
    #[serde(default)]
    pub error: Option<String>,
    /// Alternative message field used by some endpoints.
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    /// Returns the server-provided message, if any.
    #[must_use]
    pub fn into_message(self) -> Option<String> {
        self.error
            .or(self.message)
            .filter(|m| !m.trim().is_empty())
    }
}

/// Accepts either a JSON string or number for identifiers.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}

/// Accepts a single string or an array of strings.
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        One(String),
        Many(Vec<String>),
        Null(()),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::One(s) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
            .collect(),
        Raw::Many(v) => v,
        Raw::Null(()) => Vec::new(),
    })
}

/// Treats empty strings as absent.
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_query_values() {
        assert_eq!(MailFilter::ValidOnly.as_str(), "valid_only");
        assert_eq!(MailFilter::SpamAndPhishing.as_str(), "spam_and_phishing");
        assert_eq!(MailFilter::All.as_str(), "all");
        assert_eq!(
            serde_json::to_string(&MailFilter::SpamAndPhishing).unwrap(),
            "\"spam_and_phishing\""
        );
    }

    #[test]
    fn test_email_record_defaults() {
        let json = r#"{"id": "m1", "subject": "Hello"}"#;
        let record: EmailRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, "m1");
        assert_eq!(record.subject, "Hello");
        assert!(record.recipients.is_empty());
        assert!(!record.read);
        assert!(!record.spam);
        assert!(record.label.is_none());
        assert!(record.body.is_none());
    }

    #[test]
    fn test_email_record_lenient_fields() {
        let json = r#"{
            "id": 42,
            "sender": "alice@example.com",
            "recipients": "bob@example.com, carol@example.com",
            "label": "",
            "star": true,
            "phishing": true
        }"#;
        let record: EmailRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, "42");
        assert_eq!(
            record.recipients,
            vec!["bob@example.com".to_string(), "carol@example.com".to_string()]
        );
        assert!(record.label.is_none());
        assert!(record.star);
        assert!(record.phishing);
    }

    #[test]
    fn test_messages_page() {
        let json = r#"{"emails": [{"id": "a"}, {"id": "b"}], "total_emails": 42, "page": 2}"#;
        let page: MessagesPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.emails.len(), 2);
        assert_eq!(page.total_emails, 42);
        assert_eq!(page.page, Some(2));
    }

    #[test]
    fn test_messages_page_requires_emails() {
        assert!(serde_json::from_str::<MessagesPage>(r#"{"error": "Token expired"}"#).is_err());
        let page: MessagesPage = serde_json::from_str(r#"{"emails": []}"#).unwrap();
        assert_eq!(page.total_emails, 0);
    }

    #[test]
    fn test_login_response_without_email() {
        let login: LoginResponse = serde_json::from_str(r#"{"token": "t"}"#).unwrap();
        assert_eq!(login.token.as_str(), "t");
        assert!(login.email.is_none());
    }

    #[test]
    fn test_error_body_message() {
        let body: ErrorBody = serde_json::from_str(r#"{"error": "Invalid recipient"}"#).unwrap();
        assert_eq!(body.into_message().as_deref(), Some("Invalid recipient"));

        let body: ErrorBody = serde_json::from_str(r#"{"message": "Gone"}"#).unwrap();
        assert_eq!(body.into_message().as_deref(), Some("Gone"));

        let body: ErrorBody = serde_json::from_str(r#"{"error": ""}"#).unwrap();
        assert!(body.into_message().is_none());
    }

    #[test]
    fn test_request_bodies() {
        let json = serde_json::to_value(MessageIdRequest { msg_id: "m1" }).unwrap();
        assert_eq!(json, serde_json::json!({"msg_id": "m1"}));

        let json = serde_json::to_value(OutgoingEmail {
            to: "a@b.c".into(),
            subject: "Hi".into(),
            body: "Body".into(),
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"to": "a@b.c", "subject": "Hi", "body": "Body"})
        );
    }
}
