//! Mailbox listing: folders, pages and the query controller.

mod controller;
mod model;

pub use controller::{DEFAULT_PAGE_SIZE, FetchOutcome, FetchTicket, MailboxQueryController};
pub use model::{Folder, FolderFilter, MailboxPage, MailboxQuery, clamp_page, total_pages};
