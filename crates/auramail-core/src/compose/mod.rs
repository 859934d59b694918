//! Compose workflow: draft contents and the proofread/send state machine.

mod draft;
mod workflow;

pub use draft::{ComposeDraft, ComposeMode};
pub use workflow::{
    ComposeOutcome, ComposeState, ComposeWorkflow, DraftId, ProofreadTicket, SendTicket,
};
