//! Messages: data model and single-message operations.

mod coordinator;
mod model;

pub use coordinator::{MessageMutationCoordinator, MutationEffect, MutationKind, MutationTicket};
pub use model::{MessageDetail, MessageId, MessageSummary};
