//! Core churn statistics.
//!
//! Overall rate, Pearson correlations, per-field summaries, the
//! churned-vs-retained comparison, and the financial impact estimate.
//! All rates are fractions in [0,1]; rounding is left to the report
//! layer so chained computations never compound rounding error.

use crate::error::{ChurnError, Result};
use crate::models::{
    ChurnMetrics, CorrelationEntry, CustomerRecord, Dataset, FieldComparison, FieldSummary,
    FinancialImpact,
};
use std::fmt;
use tracing::debug;

/// A numeric (or boolean-as-0/1) projection of a customer record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericField {
    CreditScore,
    Age,
    Tenure,
    Balance,
    NumOfProducts,
    HasCrCard,
    IsActiveMember,
    EstimatedSalary,
    Exited,
}

impl NumericField {
    /// All non-label features, in schema order.
    pub const FEATURES: [NumericField; 8] = [
        NumericField::CreditScore,
        NumericField::Age,
        NumericField::Tenure,
        NumericField::Balance,
        NumericField::NumOfProducts,
        NumericField::HasCrCard,
        NumericField::IsActiveMember,
        NumericField::EstimatedSalary,
    ];

    /// Column name as it appears in the dataset.
    pub fn name(&self) -> &'static str {
        match self {
            NumericField::CreditScore => "CreditScore",
            NumericField::Age => "Age",
            NumericField::Tenure => "Tenure",
            NumericField::Balance => "Balance",
            NumericField::NumOfProducts => "NumOfProducts",
            NumericField::HasCrCard => "HasCrCard",
            NumericField::IsActiveMember => "IsActiveMember",
            NumericField::EstimatedSalary => "EstimatedSalary",
            NumericField::Exited => "Exited",
        }
    }

    /// Project the field to a number. Booleans map to 0/1.
    pub fn project(&self, record: &CustomerRecord) -> f64 {
        match self {
            NumericField::CreditScore => record.credit_score as f64,
            NumericField::Age => record.age as f64,
            NumericField::Tenure => record.tenure as f64,
            NumericField::Balance => record.balance,
            NumericField::NumOfProducts => record.num_of_products as f64,
            NumericField::HasCrCard => record.has_cr_card as u8 as f64,
            NumericField::IsActiveMember => record.is_active_member as u8 as f64,
            NumericField::EstimatedSalary => record.estimated_salary,
            NumericField::Exited => record.exited as u8 as f64,
        }
    }
}

impl fmt::Display for NumericField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Overall churn rate as a fraction in [0,1].
///
/// Returns 0.0 for an empty dataset; callers must check the `empty`
/// flag on [`ChurnMetrics`] instead of reading that zero as meaningful.
pub fn overall_rate(dataset: &Dataset) -> f64 {
    if dataset.is_empty() {
        return 0.0;
    }
    dataset.churned_count() as f64 / dataset.len() as f64
}

/// Compute the headline churn metrics for a dataset.
pub fn churn_metrics(dataset: &Dataset) -> ChurnMetrics {
    let total = dataset.len();
    let churned = dataset.churned_count();

    ChurnMetrics {
        total_customers: total,
        churned_customers: churned,
        retained_customers: total - churned,
        churn_rate: overall_rate(dataset),
        empty: total == 0,
    }
}

/// Estimated revenue at risk: churned count times the assumed annual
/// value per customer. The value is an explicit parameter; there is no
/// hidden default.
pub fn financial_impact(dataset: &Dataset, annual_customer_value: f64) -> FinancialImpact {
    FinancialImpact {
        annual_customer_value,
        revenue_at_risk: dataset.churned_count() as f64 * annual_customer_value,
    }
}

/// Pearson correlation coefficient between two fields.
///
/// Returns `UndefinedCorrelation` when either field has zero variance,
/// never NaN.
pub fn correlation(dataset: &Dataset, a: NumericField, b: NumericField) -> Result<f64> {
    if dataset.is_empty() {
        return Err(ChurnError::EmptyDataset);
    }

    let n = dataset.len() as f64;

    let (mut sum_a, mut sum_b) = (0.0, 0.0);
    for record in dataset.records() {
        sum_a += a.project(record);
        sum_b += b.project(record);
    }
    let (mean_a, mean_b) = (sum_a / n, sum_b / n);

    let (mut ss_a, mut ss_b, mut ss_ab) = (0.0, 0.0, 0.0);
    for record in dataset.records() {
        let da = a.project(record) - mean_a;
        let db = b.project(record) - mean_b;
        ss_a += da * da;
        ss_b += db * db;
        ss_ab += da * db;
    }

    if ss_a == 0.0 {
        return Err(ChurnError::UndefinedCorrelation(a.name().to_string()));
    }
    if ss_b == 0.0 {
        return Err(ChurnError::UndefinedCorrelation(b.name().to_string()));
    }

    Ok(ss_ab / (ss_a.sqrt() * ss_b.sqrt()))
}

/// Correlate every feature against the churn label, strongest first.
///
/// Fields with zero variance are skipped; an empty dataset yields an
/// empty list. Ordered by |r| descending, ties broken by field name.
pub fn correlation_analysis(dataset: &Dataset) -> Vec<CorrelationEntry> {
    let mut entries = Vec::new();

    for field in NumericField::FEATURES {
        match correlation(dataset, field, NumericField::Exited) {
            Ok(r) => entries.push(CorrelationEntry {
                field: field.name().to_string(),
                correlation: r,
            }),
            Err(e) => debug!("Skipping correlation for {}: {}", field, e),
        }
    }

    entries.sort_by(|a, b| {
        b.correlation
            .abs()
            .partial_cmp(&a.correlation.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.field.cmp(&b.field))
    });

    entries
}

/// Mean, median, sample standard deviation, min and max for every
/// numeric feature. Fails with `EmptyDataset` on a zero population.
pub fn summary_statistics(dataset: &Dataset) -> Result<Vec<FieldSummary>> {
    if dataset.is_empty() {
        return Err(ChurnError::EmptyDataset);
    }

    let summaries = NumericField::FEATURES
        .iter()
        .map(|field| {
            let values: Vec<f64> = dataset.records().iter().map(|r| field.project(r)).collect();
            summarize(field.name(), &values)
        })
        .collect();

    Ok(summaries)
}

fn summarize(field: &str, values: &[f64]) -> FieldSummary {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    let median = if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    };

    // Sample standard deviation; 0.0 for a single observation rather
    // than an undefined 0/0.
    let std_dev = if values.len() < 2 {
        0.0
    } else {
        let ss: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
        (ss / (n - 1.0)).sqrt()
    };

    FieldSummary {
        field: field.to_string(),
        mean,
        median,
        std_dev,
        min: sorted[0],
        max: sorted[sorted.len() - 1],
    }
}

/// Compare mean feature values between churned and retained customers.
///
/// Fails with `EmptyDataset` when either population is empty; the
/// percent difference is 0.0 when the retained mean is zero.
pub fn churned_vs_retained(dataset: &Dataset) -> Result<Vec<FieldComparison>> {
    let churned: Vec<&CustomerRecord> = dataset.records().iter().filter(|r| r.exited).collect();
    let retained: Vec<&CustomerRecord> = dataset.records().iter().filter(|r| !r.exited).collect();

    if churned.is_empty() || retained.is_empty() {
        return Err(ChurnError::EmptyDataset);
    }

    let comparisons = NumericField::FEATURES
        .iter()
        .map(|field| {
            let churned_avg = churned.iter().map(|&r| field.project(r)).sum::<f64>()
                / churned.len() as f64;
            let retained_avg = retained.iter().map(|&r| field.project(r)).sum::<f64>()
                / retained.len() as f64;
            let difference = churned_avg - retained_avg;
            let difference_pct = if retained_avg != 0.0 {
                difference / retained_avg * 100.0
            } else {
                0.0
            };

            FieldComparison {
                field: field.name().to_string(),
                churned_avg,
                retained_avg,
                difference,
                difference_pct,
            }
        })
        .collect();

    Ok(comparisons)
}
