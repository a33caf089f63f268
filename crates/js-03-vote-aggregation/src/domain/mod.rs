pub mod errors;
pub mod tally;

pub use errors::{VoteError, VoteResult};
pub use tally::VoteTally;
