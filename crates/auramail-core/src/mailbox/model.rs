//! Mailbox (folder and page) data model.

use std::fmt;

use auramail_api::{MailFilter, MessagesPage};

use crate::message::MessageSummary;

/// A folder the user can navigate to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Folder {
    /// Messages that are neither spam nor phishing.
    #[default]
    Inbox,
    /// Spam and phishing messages.
    Spam,
    /// Every received message.
    All,
    /// Sent messages.
    Sent,
}

impl Folder {
    /// All folders in sidebar order.
    pub const ALL: [Self; 4] = [Self::Inbox, Self::Spam, Self::All, Self::Sent];

    /// Detect folder from its name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "inbox" => Some(Self::Inbox),
            "spam" | "junk" => Some(Self::Spam),
            "all" | "all email" | "all mail" => Some(Self::All),
            "sent" => Some(Self::Sent),
            _ => None,
        }
    }

    /// Returns the display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Inbox => "Inbox",
            Self::Spam => "Spam",
            Self::All => "All email",
            Self::Sent => "Sent",
        }
    }

    /// Returns the backend filter for this folder.
    #[must_use]
    pub const fn filter(self) -> FolderFilter {
        match self {
            Self::Inbox => FolderFilter::ValidOnly,
            Self::Spam => FolderFilter::SpamAndPhishing,
            Self::All => FolderFilter::All,
            Self::Sent => FolderFilter::Sent,
        }
    }
}

impl fmt::Display for Folder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Server-side predicate selecting which messages a list query returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FolderFilter {
    /// Neither spam nor phishing.
    ValidOnly,
    /// Spam or phishing.
    SpamAndPhishing,
    /// Every received message.
    All,
    /// Sent messages; served by a separate query.
    Sent,
}

impl FolderFilter {
    /// Returns the received-mail filter, or `None` for the sent query.
    #[must_use]
    pub const fn mail_filter(self) -> Option<MailFilter> {
        match self {
            Self::ValidOnly => Some(MailFilter::ValidOnly),
            Self::SpamAndPhishing => Some(MailFilter::SpamAndPhishing),
            Self::All => Some(MailFilter::All),
            Self::Sent => None,
        }
    }
}

/// A (filter, page) pair sent to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MailboxQuery {
    /// Folder filter.
    pub filter: FolderFilter,
    /// 1-based page number.
    pub page: u32,
}

/// Number of pages needed for `total_count` items.
#[must_use]
pub fn total_pages(total_count: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    let pages = total_count.div_ceil(u64::from(page_size));
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// Clamps a requested page into `[1, max(1, total_pages)]`.
#[must_use]
pub fn clamp_page(requested: u32, total_pages: u32) -> u32 {
    requested.clamp(1, total_pages.max(1))
}

/// One page of a mailbox listing.
///
/// Replaced wholesale on every successful fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailboxPage {
    /// Filter the page was fetched with.
    pub folder_filter: FolderFilter,
    /// 1-based page number.
    pub page_number: u32,
    /// Fixed page size.
    pub page_size: u32,
    /// Messages on this page, at most `page_size`.
    pub items: Vec<MessageSummary>,
    /// Total messages matching the filter.
    pub total_count: u64,
}

impl MailboxPage {
    /// Creates an empty page.
    #[must_use]
    pub const fn empty(folder_filter: FolderFilter, page_size: u32) -> Self {
        Self {
            folder_filter,
            page_number: 1,
            page_size,
            items: Vec::new(),
            total_count: 0,
        }
    }

    /// Builds a page from a server response.
    #[must_use]
    pub fn from_response(query: MailboxQuery, page_size: u32, response: MessagesPage) -> Self {
        let mut items: Vec<MessageSummary> =
            response.emails.into_iter().map(MessageSummary::from).collect();

        let limit = usize::try_from(page_size).unwrap_or(usize::MAX);
        if items.len() > limit {
            tracing::warn!(
                "Server returned {} items for page size {}, truncating",
                items.len(),
                page_size
            );
            items.truncate(limit);
        }

        Self {
            folder_filter: query.filter,
            page_number: response.page.filter(|p| *p > 0).unwrap_or(query.page),
            page_size,
            items,
            total_count: response.total_emails,
        }
    }

    /// Number of pages for the current total.
    #[must_use]
    pub fn total_pages(&self) -> u32 {
        total_pages(self.total_count, self.page_size)
    }

    /// Number of unread messages on this page.
    #[must_use]
    pub fn unread_count(&self) -> usize {
        self.items.iter().filter(|m| !m.read).count()
    }

    /// Finds a message on this page.
    #[must_use]
    pub fn find(&self, id: &crate::message::MessageId) -> Option<&MessageSummary> {
        self.items.iter().find(|m| &m.id == id)
    }
}
