//! HTTP client for the backend REST surface.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::{Error, Result};
use crate::token::Token;
use crate::types::{
    DeleteResponse, EmailRecord, ErrorBody, IdentityResponse, LoginResponse, MailFilter,
    MarkReadResponse, MessageIdRequest, MessagesPage, OutgoingEmail, ProofreadRequest,
    ProofreadResponse, ReplyResponse, SendResponse, SummaryResponse,
};

/// Default base URL of a locally running backend.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const LOGIN_PATH: &str = "api/auth/login";
const IDENTITY_PATH: &str = "api/auth/me";
const LOGOUT_PATH: &str = "api/auth/logout";
const FETCH_MESSAGES_PATH: &str = "api/fetch_emails";
const FETCH_SENT_PATH: &str = "api/fetch_sent_emails";
const MESSAGE_PATH: &str = "api/emails/";
const MARK_READ_PATH: &str = "api/mark_as_read";
const DELETE_PATH: &str = "api/delete_email";
const SUMMARIZE_PATH: &str = "api/summarize";
const GENERATE_REPLY_PATH: &str = "api/generate_reply";
const PROOFREAD_PATH: &str = "api/proofread";
const SEND_PATH: &str = "api/send_email";

/// Client for the mail and AI backend.
///
/// Every call except [`ApiClient::login`] takes the bearer token explicitly,
/// so a request can never go out before the caller holds a credential.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: Url,
    timeout: Duration,
    http_client: Client,
}

impl ApiClient {
    /// Creates a client for the given base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed or cannot be a base.
    pub fn new(base_url: &str) -> Result<Self> {
        let mut base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidConfig(format!(
                "{base_url} cannot be used as a base URL"
            )));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            base_url,
            timeout: DEFAULT_TIMEOUT,
            http_client: Client::new(),
        })
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Exchanges stored credentials for a token.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects it.
    pub async fn login(&self) -> Result<LoginResponse> {
        let url = self.endpoint(LOGIN_PATH)?;
        debug!("POST {}", url);
        let request = self.http_client.post(url);
        self.execute(request).await
    }

    /// Resolves the identity behind a token.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the token is rejected.
    pub async fn identity(&self, token: &Token) -> Result<IdentityResponse> {
        let url = self.endpoint(IDENTITY_PATH)?;
        debug!("GET {}", url);
        let request = self.authorized(self.http_client.get(url), token);
        self.execute(request).await
    }

    /// Ends the server-side session.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn logout(&self, token: &Token) -> Result<()> {
        let url = self.endpoint(LOGOUT_PATH)?;
        debug!("POST {}", url);
        let request = self.authorized(self.http_client.post(url), token);
        let response = self.send(request).await?;
        check_status(response).await.map(drop)
    }

    /// Fetches one page of received mail.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn fetch_messages(
        &self,
        token: &Token,
        page: u32,
        filter: MailFilter,
    ) -> Result<MessagesPage> {
        let url = self.endpoint(FETCH_MESSAGES_PATH)?;
        debug!("GET {} page={} filter={}", url, page, filter.as_str());
        let request = self
            .authorized(self.http_client.get(url), token)
            .query(&[("page", page.to_string().as_str()), ("filter", filter.as_str())]);
        self.execute(request).await
    }

    /// Fetches one page of sent mail.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn fetch_sent_messages(&self, token: &Token, page: u32) -> Result<MessagesPage> {
        let url = self.endpoint(FETCH_SENT_PATH)?;
        debug!("GET {} page={}", url, page);
        let request = self
            .authorized(self.http_client.get(url), token)
            .query(&[("page", page)]);
        self.execute(request).await
    }

    /// Fetches a single message including its body.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn fetch_message(&self, token: &Token, id: &str) -> Result<EmailRecord> {
        let mut url = self.endpoint(MESSAGE_PATH)?;
        url.path_segments_mut()
            .map_err(|()| Error::InvalidConfig("base URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .push(id);
        debug!("GET {}", url);
        let request = self.authorized(self.http_client.get(url), token);
        self.execute(request).await
    }

    /// Marks a message as read.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn mark_as_read(&self, token: &Token, id: &str) -> Result<MarkReadResponse> {
        self.post_json(MARK_READ_PATH, token, &MessageIdRequest { msg_id: id })
            .await
    }

    /// Deletes a message.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn delete_message(&self, token: &Token, id: &str) -> Result<DeleteResponse> {
        self.post_json(DELETE_PATH, token, &MessageIdRequest { msg_id: id })
            .await
    }

    /// Requests a summary of a message.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn summarize(&self, token: &Token, id: &str) -> Result<SummaryResponse> {
        self.post_json(SUMMARIZE_PATH, token, &MessageIdRequest { msg_id: id })
            .await
    }

    /// Requests a generated reply to a message.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn generate_reply(&self, token: &Token, id: &str) -> Result<ReplyResponse> {
        self.post_json(GENERATE_REPLY_PATH, token, &MessageIdRequest { msg_id: id })
            .await
    }

    /// Requests a proofread version of a body.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn proofread(&self, token: &Token, body: &str) -> Result<ProofreadResponse> {
        self.post_json(PROOFREAD_PATH, token, &ProofreadRequest { body })
            .await
    }

    /// Sends an email.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects the message.
    pub async fn send_email(&self, token: &Token, email: &OutgoingEmail) -> Result<()> {
        let url = self.endpoint(SEND_PATH)?;
        debug!("POST {} to={}", url, email.to);
        let request = self.authorized(self.http_client.post(url), token).json(email);
        let response = self.send(request).await?;
        let status = response.status().as_u16();
        let text = check_status(response).await?;

        // An empty body counts as success.
        let reply: SendResponse = if text.trim().is_empty() {
            SendResponse::default()
        } else {
            serde_json::from_str(&text)?
        };

        match reply.error {
            Some(message) if !message.trim().is_empty() => Err(Error::server(status, message)),
            _ => Ok(()),
        }
    }

    async fn post_json<B, T>(&self, path: &str, token: &Token, body: &B) -> Result<T>
    where
        B: serde::Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        debug!("POST {}", url);
        let request = self.authorized(self.http_client.post(url), token).json(body);
        self.execute(request).await
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url.join(path).map_err(Into::into)
    }

    #[allow(clippy::unused_self)] // Keeps call sites uniform with the other builders
    fn authorized(&self, request: RequestBuilder, token: &Token) -> RequestBuilder {
        request.header(reqwest::header::AUTHORIZATION, token.authorization())
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        request
            .timeout(self.timeout)
            .send()
            .await
            .map_err(transport_error)
    }

    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.send(request).await?;
        let status = response.status().as_u16();
        let text = check_status(response).await?;
        reject_embedded_error(status, &text)?;
        serde_json::from_str(&text).map_err(Into::into)
    }
}

/// Maps reqwest failures, keeping timeouts distinct.
fn transport_error(error: reqwest::Error) -> Error {
    if error.is_timeout() {
        Error::Timeout
    } else {
        Error::Http(error)
    }
}

/// Reads the body, mapping non-success statuses to errors.
async fn check_status(response: Response) -> Result<String> {
    let status = response.status();
    let text = response.text().await.map_err(transport_error)?;

    if status.is_success() {
        return Ok(text);
    }

    let message = serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .and_then(ErrorBody::into_message);

    Err(message.map_or_else(
        || Error::Status(status.as_u16()),
        |message| Error::server(status.as_u16(), message),
    ))
}

/// Maps a success body of the form `{"error": "..."}` to a server error.
fn reject_embedded_error(status: u16, text: &str) -> Result<()> {
    let message = serde_json::from_str::<ErrorBody>(text)
        .ok()
        .and_then(|body| body.error)
        .filter(|m| !m.trim().is_empty());

    match message {
        Some(message) => Err(Error::server(status, message)),
        None => Ok(()),
    }
}
