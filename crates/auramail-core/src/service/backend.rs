//! Backend abstraction used by [`MailClient`](crate::MailClient).

use auramail_api::{
    ApiClient, DeleteResponse, EmailRecord, IdentityResponse, LoginResponse, MailFilter,
    MarkReadResponse, MessagesPage, OutgoingEmail, ProofreadResponse, ReplyResponse, Result,
    SummaryResponse, Token,
};

/// The REST operations the client depends on.
///
/// Implemented by [`ApiClient`]; tests substitute scripted backends.
pub trait MailBackend: Send + Sync + 'static {
    /// Exchanges stored credentials for a token.
    fn login(&self) -> impl Future<Output = Result<LoginResponse>> + Send;

    /// Resolves the identity behind a token.
    fn identity(&self, token: &Token) -> impl Future<Output = Result<IdentityResponse>> + Send;

    /// Revokes a token.
    fn logout(&self, token: &Token) -> impl Future<Output = Result<()>> + Send;

    /// Lists received messages.
    fn fetch_messages(
        &self,
        token: &Token,
        page: u32,
        filter: MailFilter,
    ) -> impl Future<Output = Result<MessagesPage>> + Send;

    /// Lists sent messages.
    fn fetch_sent_messages(
        &self,
        token: &Token,
        page: u32,
    ) -> impl Future<Output = Result<MessagesPage>> + Send;

    /// Fetches one message including its body.
    fn fetch_message(
        &self,
        token: &Token,
        id: &str,
    ) -> impl Future<Output = Result<EmailRecord>> + Send;

    /// Marks a message read.
    fn mark_as_read(
        &self,
        token: &Token,
        id: &str,
    ) -> impl Future<Output = Result<MarkReadResponse>> + Send;

    /// Deletes a message.
    fn delete_message(
        &self,
        token: &Token,
        id: &str,
    ) -> impl Future<Output = Result<DeleteResponse>> + Send;

    /// Summarizes a message.
    fn summarize(
        &self,
        token: &Token,
        id: &str,
    ) -> impl Future<Output = Result<SummaryResponse>> + Send;

    /// Drafts a reply to a message.
    fn generate_reply(
        &self,
        token: &Token,
        id: &str,
    ) -> impl Future<Output = Result<ReplyResponse>> + Send;

    /// Proofreads a body of text.
    fn proofread(
        &self,
        token: &Token,
        body: &str,
    ) -> impl Future<Output = Result<ProofreadResponse>> + Send;

    /// Sends an email.
    fn send_email(
        &self,
        token: &Token,
        email: &OutgoingEmail,
    ) -> impl Future<Output = Result<()>> + Send;
}

impl MailBackend for ApiClient {
    fn login(&self) -> impl Future<Output = Result<LoginResponse>> + Send {
        Self::login(self)
    }

    fn identity(&self, token: &Token) -> impl Future<Output = Result<IdentityResponse>> + Send {
        Self::identity(self, token)
    }

    fn logout(&self, token: &Token) -> impl Future<Output = Result<()>> + Send {
        Self::logout(self, token)
    }

    fn fetch_messages(
        &self,
        token: &Token,
        page: u32,
        filter: MailFilter,
    ) -> impl Future<Output = Result<MessagesPage>> + Send {
        Self::fetch_messages(self, token, page, filter)
    }

    fn fetch_sent_messages(
        &self,
        token: &Token,
        page: u32,
    ) -> impl Future<Output = Result<MessagesPage>> + Send {
        Self::fetch_sent_messages(self, token, page)
    }

    fn fetch_message(
        &self,
        token: &Token,
        id: &str,
    ) -> impl Future<Output = Result<EmailRecord>> + Send {
        Self::fetch_message(self, token, id)
    }

    fn mark_as_read(
        &self,
        token: &Token,
        id: &str,
    ) -> impl Future<Output = Result<MarkReadResponse>> + Send {
        Self::mark_as_read(self, token, id)
    }

    fn delete_message(
        &self,
        token: &Token,
        id: &str,
    ) -> impl Future<Output = Result<DeleteResponse>> + Send {
        Self::delete_message(self, token, id)
    }

    fn summarize(
        &self,
        token: &Token,
        id: &str,
    ) -> impl Future<Output = Result<SummaryResponse>> + Send {
        Self::summarize(self, token, id)
    }

    fn generate_reply(
        &self,
        token: &Token,
        id: &str,
    ) -> impl Future<Output = Result<ReplyResponse>> + Send {
        Self::generate_reply(self, token, id)
    }

    fn proofread(
        &self,
        token: &Token,
        body: &str,
    ) -> impl Future<Output = Result<ProofreadResponse>> + Send {
        Self::proofread(self, token, body)
    }

    fn send_email(
        &self,
        token: &Token,
        email: &OutgoingEmail,
    ) -> impl Future<Output = Result<()>> + Send {
        Self::send_email(self, token, email)
    }
}
