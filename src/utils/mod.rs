//! The `utils` module provides a collection of utility functions and common
//! definitions used across the `ccbe-client` crate.
//!
//! It holds the crate-wide error type and the logging bootstrap.

pub mod error;
pub mod logging;

pub use error::ClientError;
