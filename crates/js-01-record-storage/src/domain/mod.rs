//! Domain layer: key layout, row codec, history view and read models.

pub mod codec;
pub mod errors;
pub mod history;
pub mod keys;
pub mod stats;
