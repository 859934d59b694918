//! # auramail-api
//!
//! Typed REST client for the `AuraMail` backend: mailbox listing, message
//! mutations, and the AI actions (summarize, generate reply, proofread).
//!
//! ## Quick Start
//!
//! ```ignore
//! use auramail_api::{ApiClient, MailFilter};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ApiClient::new("http://127.0.0.1:5000")?;
//!
//!     let login = client.login().await?;
//!     let page = client
//!         .fetch_messages(&login.token, 1, MailFilter::ValidOnly)
//!         .await?;
//!
//!     println!("{} of {} messages", page.emails.len(), page.total_emails);
//!     Ok(())
//! }
//! ```
//!
//! ## Errors
//!
//! Non-success responses carrying `{"error": "..."}` become
//! [`Error::Server`] with the message verbatim; other failures keep their
//! status code in [`Error::Status`]. Timeouts are reported as [`Error::Timeout`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod client;
mod error;
pub mod token;
pub mod types;

pub use client::{ApiClient, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use error::{Error, Result};
pub use token::Token;
pub use types::{
    DeleteResponse, EmailRecord, IdentityResponse, LoginResponse, MailFilter, MarkReadResponse,
    MessagesPage, OutgoingEmail, ProofreadResponse, ReplyResponse, SummaryResponse,
};
