//! # Vote Aggregation (js-03)
//!
//! Unique-per-user support / urgent votes and the denormalized
//! `vote_count` on each record.
//!
//! ## Invariants
//!
//! | Invariant | Enforcement |
//! |-----------|-------------|
//! | One vote per (record, user) | `VoteRepository::insert_vote` checks under the write lock |
//! | `vote_count` = live vote rows | row and count share one atomic batch |
//! | Drift is repairable | `VoteApi::reconcile` recounts from rows |

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod domain;
pub mod metrics;
pub mod ports;
pub mod service;

pub use domain::{VoteError, VoteResult, VoteTally};
pub use ports::inbound::VoteApi;
pub use service::VoteAggregator;
