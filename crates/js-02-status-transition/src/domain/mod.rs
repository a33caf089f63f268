//! Domain layer: lifecycle table, request types, errors.

pub mod errors;
pub mod requests;
pub mod state_machine;

pub use errors::{TransitionError, TransitionResult};
pub use requests::{DraftChanges, NewRecord, TransitionRequest};
pub use state_machine::{is_allowed, replay, PathViolation, ReasonRequirement, TransitionKind};
