//! Analytics modules.
//!
//! Deterministic descriptive statistics over the loaded dataset:
//! single-pass or two-pass scans, no caching, no mutation.

pub mod metrics;
pub mod segments;

pub use metrics::*;
pub use segments::*;
