//! Segment grouping and bucketed breakdowns.
//!
//! Groups the dataset by one or more categorical or bucketed fields
//! and computes a churn rate per segment, with a fully deterministic
//! ordering: churn rate descending, ties by count descending, then by
//! segment key.

use crate::models::{CustomerRecord, Dataset, SegmentMetric};
use std::collections::HashMap;

/// A field the dataset can be segmented by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentField {
    Geography,
    Gender,
    AgeGroup,
    BalanceTier,
    TenureGroup,
    Products,
    CreditCard,
    Activity,
}

impl SegmentField {
    /// Every supported grouping dimension.
    pub const ALL: [SegmentField; 8] = [
        SegmentField::Geography,
        SegmentField::Gender,
        SegmentField::AgeGroup,
        SegmentField::BalanceTier,
        SegmentField::TenureGroup,
        SegmentField::Products,
        SegmentField::CreditCard,
        SegmentField::Activity,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SegmentField::Geography => "Geography",
            SegmentField::Gender => "Gender",
            SegmentField::AgeGroup => "AgeGroup",
            SegmentField::BalanceTier => "BalanceTier",
            SegmentField::TenureGroup => "TenureGroup",
            SegmentField::Products => "NumOfProducts",
            SegmentField::CreditCard => "HasCrCard",
            SegmentField::Activity => "ActivityStatus",
        }
    }

    /// The segment value a record falls into for this field.
    pub fn value_of(&self, record: &CustomerRecord) -> String {
        match self {
            SegmentField::Geography => record.geography.to_string(),
            SegmentField::Gender => record.gender.to_string(),
            SegmentField::AgeGroup => age_group(record.age).to_string(),
            SegmentField::BalanceTier => balance_tier(record.balance).to_string(),
            SegmentField::TenureGroup => tenure_group(record.tenure).to_string(),
            SegmentField::Products => record.num_of_products.to_string(),
            SegmentField::CreditCard => {
                let label = if record.has_cr_card { "Has Card" } else { "No Card" };
                label.to_string()
            }
            SegmentField::Activity => {
                let label = if record.is_active_member { "Active" } else { "Inactive" };
                label.to_string()
            }
        }
    }
}

/// Fixed age bands. The last band is open-ended so every age lands in
/// exactly one group.
pub fn age_group(age: u32) -> &'static str {
    match age {
        0..=25 => "18-25",
        26..=35 => "26-35",
        36..=45 => "36-45",
        46..=55 => "46-55",
        56..=65 => "56-65",
        _ => "65+",
    }
}

/// Account balance tiers.
pub fn balance_tier(balance: f64) -> &'static str {
    if balance == 0.0 {
        "Zero Balance"
    } else if balance < 50_000.0 {
        "Low (<50K)"
    } else if balance < 100_000.0 {
        "Medium (50K-100K)"
    } else if balance < 150_000.0 {
        "High (100K-150K)"
    } else {
        "Premium (>150K)"
    }
}

/// Tenure bands in years. Zero tenure belongs to the first band so the
/// grouping partitions the whole dataset.
pub fn tenure_group(tenure: u32) -> &'static str {
    match tenure {
        0..=2 => "0-2 years",
        3..=4 => "2-4 years",
        5..=6 => "4-6 years",
        7..=8 => "6-8 years",
        _ => "8-10 years",
    }
}

/// Group the dataset by the given fields and compute per-segment churn
/// rates.
///
/// Composite keys join the field values with " / ". Only segments with
/// at least one record appear; small segments are not filtered (risk
/// thresholds are a presentation concern applied downstream). The
/// result ordering is deterministic: churn rate descending, ties by
/// count descending, then by segment key.
pub fn segment_breakdown(dataset: &Dataset, fields: &[SegmentField]) -> Vec<SegmentMetric> {
    if fields.is_empty() || dataset.is_empty() {
        return Vec::new();
    }

    let dimension = fields
        .iter()
        .map(|f| f.name())
        .collect::<Vec<_>>()
        .join(" / ");

    // key -> (count, churned)
    let mut groups: HashMap<String, (usize, usize)> = HashMap::new();
    for record in dataset.records() {
        let key = fields
            .iter()
            .map(|f| f.value_of(record))
            .collect::<Vec<_>>()
            .join(" / ");

        let entry = groups.entry(key).or_default();
        entry.0 += 1;
        if record.exited {
            entry.1 += 1;
        }
    }

    let total = dataset.len() as f64;
    let mut metrics: Vec<SegmentMetric> = groups
        .into_iter()
        .map(|(segment, (count, churned))| SegmentMetric {
            dimension: dimension.clone(),
            segment,
            count,
            churn_rate: churned as f64 / count as f64,
            share_of_total: count as f64 / total,
        })
        .collect();

    metrics.sort_by(|a, b| {
        b.churn_rate
            .partial_cmp(&a.churn_rate)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.count.cmp(&a.count))
            .then_with(|| a.segment.cmp(&b.segment))
    });

    metrics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Gender, Geography};

    fn record(
        geography: Geography,
        gender: Gender,
        num_of_products: u32,
        exited: bool,
    ) -> CustomerRecord {
        CustomerRecord {
            credit_score: 650,
            geography,
            gender,
            age: 40,
            tenure: 5,
            balance: 75_000.0,
            num_of_products,
            has_cr_card: true,
            is_active_member: true,
            estimated_salary: 100_000.0,
            exited,
        }
    }

    #[test]
    fn test_age_group_boundaries() {
        assert_eq!(age_group(18), "18-25");
        assert_eq!(age_group(25), "18-25");
        assert_eq!(age_group(26), "26-35");
        assert_eq!(age_group(45), "36-45");
        assert_eq!(age_group(65), "56-65");
        assert_eq!(age_group(66), "65+");
        assert_eq!(age_group(92), "65+");
    }

    #[test]
    fn test_balance_tier_boundaries() {
        assert_eq!(balance_tier(0.0), "Zero Balance");
        assert_eq!(balance_tier(0.01), "Low (<50K)");
        assert_eq!(balance_tier(49_999.99), "Low (<50K)");
        assert_eq!(balance_tier(50_000.0), "Medium (50K-100K)");
        assert_eq!(balance_tier(149_999.99), "High (100K-150K)");
        assert_eq!(balance_tier(150_000.0), "Premium (>150K)");
    }

    #[test]
    fn test_tenure_group_includes_zero() {
        assert_eq!(tenure_group(0), "0-2 years");
        assert_eq!(tenure_group(2), "0-2 years");
        assert_eq!(tenure_group(3), "2-4 years");
        assert_eq!(tenure_group(7), "6-8 years");
        assert_eq!(tenure_group(10), "8-10 years");
    }

    #[test]
    fn test_breakdown_counts_sum_to_dataset_size() {
        let records = vec![
            record(Geography::France, Gender::Female, 1, true),
            record(Geography::France, Gender::Male, 2, false),
            record(Geography::Germany, Gender::Female, 1, true),
            record(Geography::Spain, Gender::Male, 3, false),
            record(Geography::Spain, Gender::Female, 2, true),
        ];
        let dataset = Dataset::new(records);

        let breakdown = segment_breakdown(&dataset, &[SegmentField::Geography]);
        let total: usize = breakdown.iter().map(|m| m.count).sum();
        assert_eq!(total, dataset.len());

        let share: f64 = breakdown.iter().map(|m| m.share_of_total).sum();
        assert!((share - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_breakdown_sorted_by_rate() {
        let mut records = Vec::new();
        // France: 1/2 churned. Germany: 2/2 churned. Spain: 0/3 churned.
        records.push(record(Geography::France, Gender::Female, 1, true));
        records.push(record(Geography::France, Gender::Female, 1, false));
        records.push(record(Geography::Germany, Gender::Male, 1, true));
        records.push(record(Geography::Germany, Gender::Male, 1, true));
        records.push(record(Geography::Spain, Gender::Female, 1, false));
        records.push(record(Geography::Spain, Gender::Female, 1, false));
        records.push(record(Geography::Spain, Gender::Female, 1, false));

        let breakdown = segment_breakdown(&Dataset::new(records), &[SegmentField::Geography]);

        assert_eq!(breakdown[0].segment, "Germany");
        assert_eq!(breakdown[0].churn_rate, 1.0);
        assert_eq!(breakdown[1].segment, "France");
        assert_eq!(breakdown[2].segment, "Spain");
        assert_eq!(breakdown[2].churn_rate, 0.0);
    }

    #[test]
    fn test_breakdown_tie_breaking() {
        // Equal churn rates; count then key decide the order.
        let records = vec![
            record(Geography::France, Gender::Female, 1, true),
            record(Geography::France, Gender::Female, 1, false),
            record(Geography::Germany, Gender::Male, 1, true),
            record(Geography::Germany, Gender::Male, 1, false),
            record(Geography::Germany, Gender::Male, 1, true),
            record(Geography::Germany, Gender::Male, 1, false),
            record(Geography::Spain, Gender::Female, 1, true),
            record(Geography::Spain, Gender::Female, 1, false),
        ];

        let breakdown = segment_breakdown(&Dataset::new(records), &[SegmentField::Geography]);

        // All rates 0.5. Germany has count 4; France beats Spain on key.
        assert_eq!(breakdown[0].segment, "Germany");
        assert_eq!(breakdown[1].segment, "France");
        assert_eq!(breakdown[2].segment, "Spain");
    }

    #[test]
    fn test_fully_churned_segment_ranks_first() {
        let mut records = Vec::new();
        for _ in 0..60 {
            records.push(record(Geography::France, Gender::Female, 4, true));
        }
        for i in 0..940 {
            records.push(record(Geography::France, Gender::Female, 1, i % 10 == 0));
        }

        let breakdown = segment_breakdown(&Dataset::new(records), &[SegmentField::Products]);

        assert_eq!(breakdown[0].segment, "4");
        assert_eq!(breakdown[0].count, 60);
        assert_eq!(breakdown[0].churn_rate, 1.0);
    }

    #[test]
    fn test_multi_key_breakdown() {
        let records = vec![
            record(Geography::France, Gender::Female, 1, true),
            record(Geography::France, Gender::Male, 1, false),
            record(Geography::Germany, Gender::Female, 1, true),
        ];
        let dataset = Dataset::new(records);

        let breakdown =
            segment_breakdown(&dataset, &[SegmentField::Geography, SegmentField::Gender]);

        assert_eq!(breakdown.len(), 3);
        assert!(breakdown.iter().all(|m| m.dimension == "Geography / Gender"));
        assert!(breakdown.iter().any(|m| m.segment == "France / Female"));
        let total: usize = breakdown.iter().map(|m| m.count).sum();
        assert_eq!(total, dataset.len());
    }

    #[test]
    fn test_breakdown_is_deterministic() {
        let records: Vec<CustomerRecord> = (0..100)
            .map(|i| {
                let geography = match i % 3 {
                    0 => Geography::France,
                    1 => Geography::Germany,
                    _ => Geography::Spain,
                };
                record(geography, Gender::Female, (i % 4) + 1, i % 5 == 0)
            })
            .collect();
        let dataset = Dataset::new(records);

        let first = segment_breakdown(&dataset, &[SegmentField::Geography, SegmentField::Products]);
        let second =
            segment_breakdown(&dataset, &[SegmentField::Geography, SegmentField::Products]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_breakdown_empty_inputs() {
        assert!(segment_breakdown(&Dataset::default(), &[SegmentField::Geography]).is_empty());

        let dataset = Dataset::new(vec![record(Geography::France, Gender::Female, 1, false)]);
        assert!(segment_breakdown(&dataset, &[]).is_empty());
    }
}
