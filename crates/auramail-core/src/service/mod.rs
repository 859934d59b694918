//! Service layer bridging the client with the REST backend.

mod backend;

pub use backend::MailBackend;
