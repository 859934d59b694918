//! Folder/page navigation and the authoritative message list.

use auramail_api::MessagesPage;

use super::model::{Folder, MailboxPage, MailboxQuery, clamp_page};
use crate::error::Error;
use crate::message::{MessageId, MessageSummary};
use crate::notice::{Notice, Scope};

/// Default number of messages per page.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// A fetch the controller wants executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    /// Sequence number captured at issue time.
    pub seq: u64,
    /// Query to run.
    pub query: MailboxQuery,
    /// True for background refreshes that do not toggle `loading`.
    pub silent: bool,
}

/// Result of applying a fetch response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The page replaced the current page.
    Applied,
    /// The page was applied but the page number no longer fits; fetch again.
    Reclamped(FetchTicket),
    /// The response was superseded and discarded.
    Stale,
    /// The fetch failed; the current page is unchanged.
    Failed {
        /// Whether the failed fetch was a background refresh.
        silent: bool,
        /// Notice describing the failure.
        notice: Notice,
    },
}

/// Maps (folder, page) to backend queries and owns the current page.
///
/// All fetches share one sequence counter. A user-initiated fetch is
/// applied only if it is the latest one issued; a silent refresh only if
/// it was issued after that and is the latest refresh. No response older
/// than the last applied one is ever applied.
#[derive(Debug, Clone)]
pub struct MailboxQueryController {
    folder: Folder,
    page_number: u32,
    page_size: u32,
    current_page: MailboxPage,
    loading: bool,
    error: Option<Notice>,
    refresh_error: Option<Notice>,
    search: String,
    next_seq: u64,
    latest_seq: u64,
    latest_silent: u64,
    applied_seq: u64,
}

impl Default for MailboxQueryController {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl MailboxQueryController {
    /// Creates a controller showing page 1 of the inbox.
    #[must_use]
    pub fn new(page_size: u32) -> Self {
        let page_size = page_size.max(1);
        let folder = Folder::default();
        Self {
            folder,
            page_number: 1,
            page_size,
            current_page: MailboxPage::empty(folder.filter(), page_size),
            loading: false,
            error: None,
            refresh_error: None,
            search: String::new(),
            next_seq: 0,
            latest_seq: 0,
            latest_silent: 0,
            applied_seq: 0,
        }
    }

    /// Switches folder, resetting to page 1.
    pub fn set_folder(&mut self, folder: Folder) -> FetchTicket {
        tracing::debug!("Switching folder {} -> {}", self.folder, folder);
        self.folder = folder;
        self.page_number = 1;
        self.search.clear();
        self.issue(false)
    }

    /// Moves to page `n` of the current folder, clamped to the known range.
    pub fn set_page(&mut self, n: u32) -> FetchTicket {
        let clamped = clamp_page(n, self.known_total_pages());
        if clamped != n {
            tracing::debug!("Requested page {} clamped to {}", n, clamped);
        }
        self.page_number = clamped;
        self.issue(false)
    }

    /// Moves to the next page; stays on the last page.
    pub fn next_page(&mut self) -> FetchTicket {
        self.set_page(self.page_number.saturating_add(1))
    }

    /// Moves to the previous page; stays on the first page.
    pub fn previous_page(&mut self) -> FetchTicket {
        self.set_page(self.page_number.saturating_sub(1))
    }

    /// Re-fetches the current page with the loading indicator.
    pub fn refresh(&mut self) -> FetchTicket {
        self.issue(false)
    }

    /// Re-fetches the current page without toggling `loading`.
    pub fn refresh_silently(&mut self) -> FetchTicket {
        self.issue(true)
    }

    /// Applies a fetch response.
    pub fn on_fetch_complete(
        &mut self,
        ticket: FetchTicket,
        result: auramail_api::Result<MessagesPage>,
    ) -> FetchOutcome {
        if ticket.silent {
            if ticket.seq != self.latest_silent
                || ticket.seq < self.latest_seq
                || ticket.seq <= self.applied_seq
            {
                tracing::debug!("Discarding stale refresh #{}", ticket.seq);
                return FetchOutcome::Stale;
            }
        } else {
            if ticket.seq != self.latest_seq {
                tracing::debug!("Discarding superseded fetch #{}", ticket.seq);
                return FetchOutcome::Stale;
            }
            self.loading = false;
            if ticket.seq <= self.applied_seq {
                return FetchOutcome::Stale;
            }
        }

        match result {
            Ok(response) => {
                let page = MailboxPage::from_response(ticket.query, self.page_size, response);
                tracing::debug!(
                    "Applied fetch #{}: {} items, {} total",
                    ticket.seq,
                    page.items.len(),
                    page.total_count
                );
                let total_pages = page.total_pages();
                self.current_page = page;
                self.applied_seq = ticket.seq;
                if ticket.silent {
                    self.refresh_error = None;
                } else {
                    self.error = None;
                }

                let clamped = clamp_page(self.page_number, total_pages);
                if clamped == self.page_number {
                    FetchOutcome::Applied
                } else {
                    tracing::info!(
                        "Page {} no longer exists, moving to {}",
                        self.page_number,
                        clamped
                    );
                    self.page_number = clamped;
                    FetchOutcome::Reclamped(self.issue(ticket.silent))
                }
            }
            Err(e) => {
                let notice = Notice::from_error(Scope::Mailbox, &Error::Api(e));
                tracing::warn!("Fetch #{} failed: {}", ticket.seq, notice);
                if ticket.silent {
                    self.refresh_error = Some(notice.clone());
                } else {
                    self.error = Some(notice.clone());
                }
                FetchOutcome::Failed {
                    silent: ticket.silent,
                    notice,
                }
            }
        }
    }

    /// Returns to the initial state, keeping the sequence counter.
    ///
    /// Every ticket issued before the reset becomes stale.
    pub fn reset(&mut self) {
        let next_seq = self.next_seq;
        *self = Self::new(self.page_size);
        self.next_seq = next_seq;
        self.latest_seq = next_seq;
        self.latest_silent = next_seq;
        self.applied_seq = next_seq;
    }

    /// Clears the loading flag after outstanding fetches were cancelled.
    ///
    /// The current page and the sequence counters are kept.
    pub fn cancel_pending(&mut self) {
        self.loading = false;
    }

    /// Sets the local search filter over the current page.
    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search = query.into().trim().to_lowercase();
    }

    /// Returns the items of the current page matching the search filter.
    #[must_use]
    pub fn visible_items(&self) -> Vec<&MessageSummary> {
        if self.search.is_empty() {
            return self.current_page.items.iter().collect();
        }
        self.current_page
            .items
            .iter()
            .filter(|m| m.matches(&self.search))
            .collect()
    }

    /// Finds a message on the current page.
    #[must_use]
    pub fn find(&self, id: &MessageId) -> Option<&MessageSummary> {
        self.current_page.find(id)
    }

    /// Current folder.
    #[must_use]
    pub const fn folder(&self) -> Folder {
        self.folder
    }

    /// Requested page number.
    #[must_use]
    pub const fn page_number(&self) -> u32 {
        self.page_number
    }

    /// Fixed page size.
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Last successfully fetched page.
    #[must_use]
    pub const fn current_page(&self) -> &MailboxPage {
        &self.current_page
    }

    /// True while a user-initiated fetch is outstanding.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Failure of the last user-initiated fetch.
    #[must_use]
    pub const fn error(&self) -> Option<&Notice> {
        self.error.as_ref()
    }

    /// Failure of the last background refresh.
    #[must_use]
    pub const fn refresh_error(&self) -> Option<&Notice> {
        self.refresh_error.as_ref()
    }

    /// Current search filter, lowercased.
    #[must_use]
    pub fn search(&self) -> &str {
        &self.search
    }

    /// Clears the load error.
    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Takes the background refresh error, clearing it.
    pub fn take_refresh_error(&mut self) -> Option<Notice> {
        self.refresh_error.take()
    }

    fn known_total_pages(&self) -> u32 {
        if self.current_page.folder_filter == self.folder.filter() {
            self.current_page.total_pages()
        } else {
            0
        }
    }

    fn issue(&mut self, silent: bool) -> FetchTicket {
        self.next_seq += 1;
        let seq = self.next_seq;
        if silent {
            self.latest_silent = seq;
        } else {
            self.latest_seq = seq;
            self.loading = true;
            self.error = None;
        }
        let query = MailboxQuery {
            filter: self.folder.filter(),
            page: self.page_number,
        };
        tracing::debug!(
            "Issued {} fetch #{} for {:?} page {}",
            if silent { "silent" } else { "user" },
            seq,
            query.filter,
            query.page
        );
        FetchTicket { seq, query, silent }
    }
}
