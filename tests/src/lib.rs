//! # Jiseti Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── src/integration/    # Cross-crate flows through the runtime container
//! │   ├── fixtures.rs     # Harness: CaseService over in-memory channels
//! │   ├── lifecycle.rs    # Record lifecycle and audit trail
//! │   ├── dispatch.rs     # Event queue → worker → channels
//! │   └── consistency.rs  # Concurrent writers, vote counter drift
//! └── benches/            # Criterion benchmarks
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p js-tests
//! cargo test -p js-tests integration::dispatch::
//! cargo bench -p js-tests
//! ```

pub mod integration;
