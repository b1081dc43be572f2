//! Insight generation.
//!
//! Turns the computed statistics into rule-based executive and
//! product-manager insights and assembles the full report.

pub mod generator;

pub use generator::{generate_report, high_risk_segments, rate_segments};
