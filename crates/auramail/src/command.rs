//! Shell commands.
//!
//! Each input line becomes one [`Command`], the terminal counterpart of a
//! UI event.

use std::str::FromStr;

use auramail_core::Folder;

/// A user command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    // Navigation
    /// Switch folder.
    Folder(Folder),
    /// Go to a page.
    Page(u32),
    /// Next page.
    Next,
    /// Previous page.
    Prev,
    /// Reload the current page.
    Refresh,
    /// Filter the current page locally.
    Search(String),
    /// Show the current page again.
    List,

    // Message operations; `None` targets the open message
    /// Open a message.
    Open(String),
    /// Close the open message.
    Close,
    /// Mark a message read.
    Read(Option<String>),
    /// Delete a message.
    Delete(Option<String>),
    /// Summarize a message.
    Summarize(Option<String>),
    /// Generate a reply draft.
    Suggest(Option<String>),

    // Compose
    /// Start a new message.
    Compose,
    /// Reply to the open message.
    Reply,
    /// Set recipients.
    To(String),
    /// Set subject.
    Subject(String),
    /// Set body; `\n` starts a new line.
    Body(String),
    /// Proofread the body.
    Proofread,
    /// Proofread again.
    Retry,
    /// Apply the suggestion.
    Apply,
    /// Dismiss the suggestion.
    Dismiss,
    /// Send the draft.
    Send,
    /// Discard the draft.
    Cancel,

    // Session
    /// Log in again.
    Login,
    /// Log out.
    Logout,
    /// Show help.
    Help,
    /// Exit.
    Quit,
}

/// Usage text.
pub const HELP: &str = "\
Folders:   inbox | spam | all | sent
Paging:    page N | next | prev | refresh | list | search TEXT
Messages:  open ID | close | read [ID] | delete [ID] | summarize [ID] | suggest [ID]
Compose:   compose | reply | to ADDR | subject TEXT | body TEXT
           proofread | retry | apply | dismiss | send | cancel
Session:   login | logout | help | quit";

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(w, r)| (w, r.trim()));
        let arg = (!rest.is_empty()).then(|| rest.to_string());

        let command = match word.to_lowercase().as_str() {
            "inbox" | "spam" | "all" | "sent" => {
                let folder =
                    Folder::from_name(word).ok_or_else(|| format!("Unknown folder: {word}"))?;
                Self::Folder(folder)
            }
            "page" => Self::Page(
                rest.parse()
                    .map_err(|_| format!("Expected a page number, got '{rest}'"))?,
            ),
            "next" => Self::Next,
            "prev" | "previous" => Self::Prev,
            "refresh" => Self::Refresh,
            "search" => Self::Search(rest.to_string()),
            "list" | "ls" => Self::List,
            "open" => Self::Open(arg.ok_or("Usage: open ID")?),
            "close" | "back" => Self::Close,
            "read" => Self::Read(arg),
            "delete" | "rm" => Self::Delete(arg),
            "summarize" => Self::Summarize(arg),
            "suggest" => Self::Suggest(arg),
            "compose" | "new" => Self::Compose,
            "reply" => Self::Reply,
            "to" => Self::To(rest.to_string()),
            "subject" => Self::Subject(rest.to_string()),
            "body" => Self::Body(rest.replace("\\n", "\n")),
            "proofread" => Self::Proofread,
            "retry" => Self::Retry,
            "apply" => Self::Apply,
            "dismiss" => Self::Dismiss,
            "send" => Self::Send,
            "cancel" => Self::Cancel,
            "login" => Self::Login,
            "logout" => Self::Logout,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            "" => return Err(String::new()),
            other => return Err(format!("Unknown command '{other}', type 'help'")),
        };
        Ok(command)
    }
}
