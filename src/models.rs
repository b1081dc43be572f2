//! Data models for churn analytics.
//!
//! This module contains the core data structures used throughout
//! the application: customer records, the loaded dataset, computed
//! metrics, insights, and the report tree.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Customer geography.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Geography {
    France,
    Germany,
    Spain,
}

impl Geography {
    /// Parse a geography value from the dataset. Returns `None` for
    /// values outside the declared domain.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "france" => Some(Geography::France),
            "germany" => Some(Geography::Germany),
            "spain" => Some(Geography::Spain),
            _ => None,
        }
    }
}

impl fmt::Display for Geography {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Geography::France => write!(f, "France"),
            Geography::Germany => write!(f, "Germany"),
            Geography::Spain => write!(f, "Spain"),
        }
    }
}

/// Customer gender as recorded in the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Female,
    Male,
}

impl Gender {
    /// Parse a gender value from the dataset. Returns `None` for
    /// values outside the declared domain.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "female" => Some(Gender::Female),
            "male" => Some(Gender::Male),
            _ => None,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Female => write!(f, "Female"),
            Gender::Male => write!(f, "Male"),
        }
    }
}

/// One customer row from the churn dataset.
///
/// `exited` is the ground-truth churn label and is immutable after load.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerRecord {
    pub credit_score: i32,
    pub geography: Geography,
    pub gender: Gender,
    pub age: u32,
    /// Years with the bank.
    pub tenure: u32,
    pub balance: f64,
    pub num_of_products: u32,
    pub has_cr_card: bool,
    pub is_active_member: bool,
    pub estimated_salary: f64,
    pub exited: bool,
}

/// An ordered, read-only collection of customer records.
///
/// Loaded once per run; the analytics layer only ever borrows it.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<CustomerRecord>,
}

impl Dataset {
    pub fn new(records: Vec<CustomerRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[CustomerRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of records with the churn label set.
    pub fn churned_count(&self) -> usize {
        self.records.iter().filter(|r| r.exited).count()
    }
}

/// Risk level derived from a churn rate. Also used as insight priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Classify a churn rate (a fraction in [0,1]) against percent
    /// thresholds.
    pub fn classify(rate: f64, high_threshold_pct: f64, medium_threshold_pct: f64) -> Self {
        let pct = rate * 100.0;
        if pct >= high_threshold_pct {
            RiskLevel::High
        } else if pct >= medium_threshold_pct {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    /// Returns an emoji representation of the risk level.
    pub fn emoji(&self) -> &'static str {
        match self {
            RiskLevel::High => "🔴",
            RiskLevel::Medium => "🟡",
            RiskLevel::Low => "🟢",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "LOW"),
            RiskLevel::Medium => write!(f, "MEDIUM"),
            RiskLevel::High => write!(f, "HIGH"),
        }
    }
}

/// Implementation effort attached to a product recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Effort {
    Low,
    Medium,
    High,
}

impl Effort {
    pub fn emoji(&self) -> &'static str {
        match self {
            Effort::High => "⬆️",
            Effort::Medium => "➡️",
            Effort::Low => "⬇️",
        }
    }
}

impl fmt::Display for Effort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effort::Low => write!(f, "LOW"),
            Effort::Medium => write!(f, "MEDIUM"),
            Effort::High => write!(f, "HIGH"),
        }
    }
}

/// Overall churn metrics for a dataset.
///
/// `churn_rate` is a fraction in [0,1] and is 0.0 for an empty dataset;
/// callers must check the `empty` flag rather than read that zero as
/// meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChurnMetrics {
    pub total_customers: usize,
    pub churned_customers: usize,
    pub retained_customers: usize,
    pub churn_rate: f64,
    pub empty: bool,
}

/// A computed aggregate for one segment: grouping key, population and
/// churn rate. Rates are kept at full precision; rounding happens at
/// render time only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentMetric {
    /// Name of the grouping dimension(s), e.g. "Geography" or
    /// "Geography / Gender".
    pub dimension: String,
    /// The segment's value key, e.g. "Germany" or "Germany / Female".
    pub segment: String,
    pub count: usize,
    pub churn_rate: f64,
    pub share_of_total: f64,
}

/// A segment metric rated against the configured risk thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentInsight {
    pub dimension: String,
    pub segment: String,
    pub count: usize,
    pub churn_rate: f64,
    pub share_of_total: f64,
    pub risk: RiskLevel,
}

/// Descriptive statistics for one numeric field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSummary {
    pub field: String,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

/// Churned-vs-retained mean comparison for one numeric field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldComparison {
    pub field: String,
    pub churned_avg: f64,
    pub retained_avg: f64,
    pub difference: f64,
    pub difference_pct: f64,
}

/// Pearson correlation of one feature against the churn label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationEntry {
    pub field: String,
    pub correlation: f64,
}

/// Estimated revenue at risk from churned customers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinancialImpact {
    /// The assumed annual value per customer the estimate was computed
    /// with, carried alongside the result so the assumption stays
    /// visible to consumers.
    pub annual_customer_value: f64,
    pub revenue_at_risk: f64,
}

/// A strategic insight aimed at executives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutiveInsight {
    pub title: String,
    pub summary: String,
    pub key_metric: String,
    pub business_impact: String,
    pub priority: RiskLevel,
}

/// An actionable recommendation aimed at product managers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductInsight {
    pub title: String,
    pub finding: String,
    pub affected_segment: String,
    pub recommendation: String,
    pub expected_impact: String,
    pub implementation_effort: Effort,
}

/// Headline numbers and top risk indicators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutiveSummary {
    pub overview: ChurnMetrics,
    pub financial_impact: FinancialImpact,
    pub key_risk_indicators: Vec<SegmentInsight>,
    pub top_churn_correlations: Vec<CorrelationEntry>,
}

/// Full per-dimension breakdowns and field statistics.
///
/// Omitted from the report when the dataset is empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailedAnalytics {
    pub geography_analysis: Vec<SegmentInsight>,
    pub age_analysis: Vec<SegmentInsight>,
    pub product_analysis: Vec<SegmentInsight>,
    pub activity_analysis: Vec<SegmentInsight>,
    pub summary_statistics: Vec<FieldSummary>,
    pub churned_vs_retained: Vec<FieldComparison>,
    pub correlations: Vec<CorrelationEntry>,
}

/// Metadata about the analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// The data source the report was computed from (path or URL).
    pub source: String,
    pub generated_at: DateTime<Utc>,
    pub generator: String,
    pub total_records: usize,
    pub duration_seconds: f64,
}

/// The complete churn analysis report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub executive_summary: ExecutiveSummary,
    pub executive_insights: Vec<ExecutiveInsight>,
    pub product_insights: Vec<ProductInsight>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detailed_analytics: Option<DetailedAnalytics>,
}

/// Format a count with thousands separators for display.
pub fn with_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }

    out
}

/// Format a dollar amount with thousands separators and two decimals.
pub fn format_money(value: f64) -> String {
    let negative = value < 0.0;
    let rounded = format!("{:.2}", value.abs());
    let (whole, cents) = rounded.split_once('.').unwrap_or((rounded.as_str(), "00"));

    let grouped = with_thousands(whole.parse::<usize>().unwrap_or(0));
    if negative {
        format!("-${}.{}", grouped, cents)
    } else {
        format!("${}.{}", grouped, cents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_thousands() {
        assert_eq!(with_thousands(0), "0");
        assert_eq!(with_thousands(999), "999");
        assert_eq!(with_thousands(1_000), "1,000");
        assert_eq!(with_thousands(10_000), "10,000");
        assert_eq!(with_thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(0.0), "$0.00");
        assert_eq!(format_money(5000.0), "$5,000.00");
        assert_eq!(format_money(10_185_000.5), "$10,185,000.50");
        assert_eq!(format_money(-42.128), "-$42.13");
    }

    #[test]
    fn test_geography_parse() {
        assert_eq!(Geography::parse("France"), Some(Geography::France));
        assert_eq!(Geography::parse("germany"), Some(Geography::Germany));
        assert_eq!(Geography::parse(" Spain "), Some(Geography::Spain));
        assert_eq!(Geography::parse("Italy"), None);
        assert_eq!(Geography::parse(""), None);
    }

    #[test]
    fn test_gender_parse() {
        assert_eq!(Gender::parse("Female"), Some(Gender::Female));
        assert_eq!(Gender::parse("MALE"), Some(Gender::Male));
        assert_eq!(Gender::parse("other"), None);
    }

    #[test]
    fn test_risk_level_ordering() {
        assert!(RiskLevel::Low < RiskLevel::Medium);
        assert!(RiskLevel::Medium < RiskLevel::High);
    }

    #[test]
    fn test_risk_level_classify() {
        assert_eq!(RiskLevel::classify(0.30, 25.0, 15.0), RiskLevel::High);
        assert_eq!(RiskLevel::classify(0.25, 25.0, 15.0), RiskLevel::High);
        assert_eq!(RiskLevel::classify(0.20, 25.0, 15.0), RiskLevel::Medium);
        assert_eq!(RiskLevel::classify(0.15, 25.0, 15.0), RiskLevel::Medium);
        assert_eq!(RiskLevel::classify(0.10, 25.0, 15.0), RiskLevel::Low);
        assert_eq!(RiskLevel::classify(0.0, 25.0, 15.0), RiskLevel::Low);
    }

    #[test]
    fn test_risk_level_display() {
        assert_eq!(RiskLevel::High.to_string(), "HIGH");
        assert_eq!(RiskLevel::Medium.to_string(), "MEDIUM");
        assert_eq!(RiskLevel::Low.to_string(), "LOW");
    }

    #[test]
    fn test_dataset_counts() {
        let record = CustomerRecord {
            credit_score: 650,
            geography: Geography::France,
            gender: Gender::Female,
            age: 40,
            tenure: 5,
            balance: 75_000.0,
            num_of_products: 2,
            has_cr_card: true,
            is_active_member: true,
            estimated_salary: 100_000.0,
            exited: false,
        };

        let mut churned = record.clone();
        churned.exited = true;

        let dataset = Dataset::new(vec![record.clone(), record, churned]);
        assert_eq!(dataset.len(), 3);
        assert!(!dataset.is_empty());
        assert_eq!(dataset.churned_count(), 1);

        let empty = Dataset::default();
        assert!(empty.is_empty());
        assert_eq!(empty.churned_count(), 0);
    }
}
