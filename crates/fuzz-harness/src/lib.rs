//! Skytrack Fuzz Harness
//!
//! Property-based testing support for the sky-tracking crates: f64
//! strategies for epochs, orbits and observers, plus run configuration.
//!
//! # Usage
//!
//! ```rust
//! use skytrack_fuzz::prelude::*;
//!
//! proptest! {
//!     #![proptest_config(FuzzConfig::from_env().to_proptest_config())]
//!     #[test]
//!     fn my_fuzz_test(lat in latitude_deg()) {
//!         prop_assert!(lat.abs() <= 90.0);
//!     }
//! }
//! ```

pub mod generators;
pub mod runner;

pub mod prelude {
    pub use crate::generators::*;
    pub use crate::runner::{FuzzConfig, FuzzResult, FuzzRunner};
    pub use proptest::prelude::*;
}

// Re-export proptest for convenience
pub use proptest;
