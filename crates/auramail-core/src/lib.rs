//! # auramail-core
//!
//! Client-side synchronization and workflow orchestration for `AuraMail`.
//!
//! This crate provides:
//! - **Session gate** - token and identity ownership with a readiness signal
//! - **Mailbox controller** - folder/page queries with stale-response suppression
//! - **Message coordinator** - confirm-then-apply mark-read, delete and AI actions
//! - **Compose workflow** - the proofread/send state machine
//! - **Mail client** - the event-driven driver that runs requests and applies results
//!
//! # Example
//!
//! ```ignore
//! use auramail_api::ApiClient;
//! use auramail_core::{ClientConfig, ClientEvent, Folder, MailClient};
//!
//! let api = ApiClient::new("http://127.0.0.1:5000")?;
//! let mut client = MailClient::new(api, ClientConfig::default());
//! client.start();
//!
//! while let Some(event) = client.next_event().await {
//!     if let ClientEvent::PageLoaded { .. } = event {
//!         println!("{} messages", client.mailbox().current_page().items.len());
//!         client.set_folder(Folder::Spam);
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod client;
pub mod compose;
mod error;
pub mod mailbox;
pub mod message;
pub mod notice;
pub mod service;
pub mod session;

pub use client::{ClientConfig, ClientEvent, MailClient};
pub use compose::{ComposeDraft, ComposeMode, ComposeState, ComposeWorkflow};
pub use error::{Error, Result};
pub use mailbox::{Folder, FolderFilter, MailboxPage, MailboxQueryController};
pub use message::{MessageDetail, MessageId, MessageMutationCoordinator, MessageSummary};
pub use notice::{Notice, NoticeKind, Scope};
pub use service::MailBackend;
pub use session::{Identity, IdentityState, SessionGate};
