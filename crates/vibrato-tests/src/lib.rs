//! Vibrato End-to-End Test Infrastructure
//!
//! Helpers shared by the integration tests:
//!
//! - [`analysis`]: signal measurements on rendered samples and WAV files
//! - [`determinism`]: byte-identical output checks across runs
//! - [`fixtures`]: synthetic analyzed cycles and on-disk inputs
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p vibrato-tests
//! ```

pub mod analysis;
pub mod determinism;
pub mod fixtures;

pub use determinism::{compute_hash, verify_determinism, DeterminismResult};
