//! The `health` module gates every connect attempt on the companion HTTP
//! health endpoint.
//!
//! [`HealthProbe`] is the seam the connection manager depends on;
//! [`HttpHealthProbe`] is the `reqwest` implementation used in production.

pub mod probe;

pub use probe::{HealthProbe, HttpHealthProbe};
