//! # Vote Metrics
//!
//! - `jiseti_votes_cast_total` - Votes cast (by kind)
//! - `jiseti_votes_retracted_total` - Votes retracted

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec};

#[cfg(feature = "metrics")]
lazy_static! {
    pub static ref VOTES_CAST: IntCounterVec = register_int_counter_vec!(
        "jiseti_votes_cast_total",
        "Total number of votes cast",
        &["kind"]
    )
    .expect("Failed to create VOTES_CAST metric");

    pub static ref VOTES_RETRACTED: IntCounter = register_int_counter!(
        "jiseti_votes_retracted_total",
        "Total number of votes retracted"
    )
    .expect("Failed to create VOTES_RETRACTED metric");
}

#[cfg(feature = "metrics")]
pub fn record_vote_cast(kind: &str) {
    VOTES_CAST.with_label_values(&[kind]).inc();
}

#[cfg(feature = "metrics")]
pub fn record_vote_retracted() {
    VOTES_RETRACTED.inc();
}

#[cfg(not(feature = "metrics"))]
pub fn record_vote_cast(_kind: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_vote_retracted() {}
