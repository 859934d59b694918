//! Compose form contents.

use auramail_api::OutgoingEmail;

use crate::error::{Error, Result};

/// Whether a draft starts from scratch or answers a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComposeMode {
    /// New message.
    #[default]
    New,
    /// Reply to an existing message.
    Reply,
}

/// Contents of the compose form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ComposeDraft {
    /// Recipient addresses, comma separated.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// Message body.
    pub body: String,
    /// New or reply.
    pub mode: ComposeMode,
    /// Proofread text waiting to be applied or dismissed.
    pub proofread_suggestion: Option<String>,
}

impl ComposeDraft {
    /// Creates an empty draft.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a reply draft.
    ///
    /// The subject gets a `Re:` prefix unless it already has one.
    #[must_use]
    pub fn reply(to: &str, subject: &str, body: &str) -> Self {
        let subject = if subject.trim_start().to_lowercase().starts_with("re:") {
            subject.to_string()
        } else {
            format!("Re: {subject}")
        };

        Self {
            to: to.to_string(),
            subject,
            body: body.to_string(),
            mode: ComposeMode::Reply,
            proofread_suggestion: None,
        }
    }

    /// Checks the fields required for sending.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] naming the first missing or malformed field.
    pub fn validate(&self) -> Result<()> {
        if self.to.trim().is_empty() {
            return Err(Error::validation("Please enter at least one recipient"));
        }

        for recipient in self.to.split(',') {
            let recipient = recipient.trim();
            if !recipient.is_empty() && !recipient.contains('@') {
                return Err(Error::validation(format!(
                    "Invalid email address: {recipient}"
                )));
            }
        }

        if self.subject.trim().is_empty() {
            return Err(Error::validation("Please enter a subject"));
        }

        if self.body.trim().is_empty() {
            return Err(Error::validation("Please enter a message"));
        }

        Ok(())
    }

    /// Builds the request body for sending.
    #[must_use]
    pub fn to_outgoing(&self) -> OutgoingEmail {
        let to = self
            .to
            .split(',')
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .collect::<Vec<_>>()
            .join(", ");

        OutgoingEmail {
            to,
            subject: self.subject.trim().to_string(),
            body: self.body.clone(),
        }
    }
}
