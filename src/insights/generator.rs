//! Rule-based insight generation.
//!
//! Derives executive and product-manager insights from the segment
//! breakdowns and comparisons, and assembles the complete [`Report`].
//! Every rule here works on computed statistics only; thresholds that
//! gate a recommendation are named constants below.

use crate::analytics::{self, SegmentField};
use crate::config::{AnalysisConfig, Config};
use crate::models::{
    format_money, with_thousands, Dataset, DetailedAnalytics, Effort, ExecutiveInsight,
    ExecutiveSummary, ProductInsight, Report, ReportMetadata, RiskLevel, SegmentInsight,
    SegmentMetric,
};
use chrono::Utc;

/// Churn rate (percent) above which a segment triggers a product
/// recommendation.
const RECOMMENDATION_GATE_PCT: f64 = 20.0;
/// Gate for the new-customer onboarding recommendation.
const ONBOARDING_GATE_PCT: f64 = 18.0;
/// Gate for the senior-experience recommendation.
const SENIOR_GATE_PCT: f64 = 25.0;
/// Churned customers scoring this many credit points below retained
/// ones trigger the credit-health recommendation.
const CREDIT_SCORE_GAP: f64 = 20.0;

/// Rate segment metrics against the configured risk thresholds.
pub fn rate_segments(
    metrics: Vec<SegmentMetric>,
    analysis: &AnalysisConfig,
) -> Vec<SegmentInsight> {
    metrics
        .into_iter()
        .map(|m| SegmentInsight {
            risk: RiskLevel::classify(
                m.churn_rate,
                analysis.high_risk_threshold,
                analysis.medium_risk_threshold,
            ),
            dimension: m.dimension,
            segment: m.segment,
            count: m.count,
            churn_rate: m.churn_rate,
            share_of_total: m.share_of_total,
        })
        .collect()
}

/// Single-dimension breakdown with risk levels attached.
fn rated_breakdown(
    dataset: &Dataset,
    field: SegmentField,
    analysis: &AnalysisConfig,
) -> Vec<SegmentInsight> {
    rate_segments(analytics::segment_breakdown(dataset, &[field]), analysis)
}

/// All high-risk segments across every supported dimension, highest
/// churn rate first.
pub fn high_risk_segments(dataset: &Dataset, analysis: &AnalysisConfig) -> Vec<SegmentInsight> {
    let mut high_risk: Vec<SegmentInsight> = SegmentField::ALL
        .iter()
        .flat_map(|field| rated_breakdown(dataset, *field, analysis))
        .filter(|s| s.risk == RiskLevel::High)
        .collect();

    high_risk.sort_by(|a, b| {
        b.churn_rate
            .partial_cmp(&a.churn_rate)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.count.cmp(&a.count))
            .then_with(|| (a.dimension.as_str(), a.segment.as_str()).cmp(&(b.dimension.as_str(), b.segment.as_str())))
    });

    high_risk
}

/// Headline numbers, top risk indicators and strongest correlations.
pub fn executive_summary(dataset: &Dataset, analysis: &AnalysisConfig) -> ExecutiveSummary {
    let mut key_risk_indicators = high_risk_segments(dataset, analysis);
    key_risk_indicators.truncate(analysis.top_risk_segments);

    let mut top_churn_correlations = analytics::correlation_analysis(dataset);
    top_churn_correlations.truncate(analysis.top_correlations);

    ExecutiveSummary {
        overview: analytics::churn_metrics(dataset),
        financial_impact: analytics::financial_impact(dataset, analysis.annual_customer_value),
        key_risk_indicators,
        top_churn_correlations,
    }
}

/// Strategic insights for executives.
pub fn executive_insights(dataset: &Dataset, analysis: &AnalysisConfig) -> Vec<ExecutiveInsight> {
    if dataset.is_empty() {
        return Vec::new();
    }

    let mut insights = Vec::new();

    let metrics = analytics::churn_metrics(dataset);
    let rate_pct = metrics.churn_rate * 100.0;
    let impact = analytics::financial_impact(dataset, analysis.annual_customer_value);

    insights.push(ExecutiveInsight {
        title: "Overall Customer Retention Status".to_string(),
        summary: format!(
            "Current churn rate of {:.2}% represents {} lost customers.",
            rate_pct,
            with_thousands(metrics.churned_customers)
        ),
        key_metric: format!("{:.2}% churn rate", rate_pct),
        business_impact: format!(
            "Estimated revenue impact of {} based on an assumed annual value of {} per customer.",
            format_money(impact.revenue_at_risk),
            format_money(impact.annual_customer_value)
        ),
        priority: if rate_pct > analysis.medium_risk_threshold {
            RiskLevel::High
        } else {
            RiskLevel::Medium
        },
    });

    let geography = rated_breakdown(dataset, SegmentField::Geography, analysis);
    if let Some(top) = geography.first() {
        insights.push(ExecutiveInsight {
            title: format!("Geographic Risk Alert: {}", top.segment),
            summary: format!(
                "The {} region shows the highest churn rate at {:.2}%, affecting {} customers.",
                top.segment,
                top.churn_rate * 100.0,
                with_thousands(top.count)
            ),
            key_metric: format!("{:.2}% regional churn", top.churn_rate * 100.0),
            business_impact: "Regional strategy review recommended. Consider market-specific \
                              retention programs."
                .to_string(),
            priority: top.risk,
        });
    }

    let activity = rated_breakdown(dataset, SegmentField::Activity, analysis);
    if let Some(inactive) = activity.iter().find(|s| s.segment == "Inactive") {
        insights.push(ExecutiveInsight {
            title: "Inactive Customer Risk".to_string(),
            summary: format!(
                "Inactive customers have a {:.2}% churn rate, representing {} customers at \
                 elevated risk.",
                inactive.churn_rate * 100.0,
                with_thousands(inactive.count)
            ),
            key_metric: format!("{} at-risk customers", with_thousands(inactive.count)),
            business_impact: "Customer engagement programs could significantly reduce churn in \
                              this segment."
                .to_string(),
            priority: inactive.risk,
        });
    }

    let high_risk = high_risk_segments(dataset, analysis);
    if !high_risk.is_empty() {
        let affected: usize = high_risk
            .iter()
            .take(analysis.top_risk_segments)
            .map(|s| s.count)
            .sum();
        insights.push(ExecutiveInsight {
            title: "High-Risk Segment Summary".to_string(),
            summary: format!(
                "{} customer segments identified as high-risk, affecting approximately {} \
                 customers across multiple dimensions.",
                high_risk.len(),
                with_thousands(affected)
            ),
            key_metric: format!("{} high-risk segments", high_risk.len()),
            business_impact: "Targeted intervention programs for these segments could improve \
                              overall retention by 5-10%."
                .to_string(),
            priority: RiskLevel::High,
        });
    }

    let age_groups = rated_breakdown(dataset, SegmentField::AgeGroup, analysis);
    if let Some(top) = age_groups.first() {
        insights.push(ExecutiveInsight {
            title: format!("Age Group Risk: {}", top.segment),
            summary: format!(
                "Customers aged {} show the highest churn rate at {:.2}%.",
                top.segment,
                top.churn_rate * 100.0
            ),
            key_metric: format!("{:.2}% age group churn", top.churn_rate * 100.0),
            business_impact: "Product and service offerings may need adjustment for this \
                              demographic segment."
                .to_string(),
            priority: top.risk,
        });
    }

    insights
}

/// Actionable recommendations for product managers. Threshold-gated;
/// may be empty for a healthy dataset.
pub fn product_insights(dataset: &Dataset, analysis: &AnalysisConfig) -> Vec<ProductInsight> {
    if dataset.is_empty() {
        return Vec::new();
    }

    let mut insights = Vec::new();

    let products = rated_breakdown(dataset, SegmentField::Products, analysis);
    if let Some(worst) = products
        .iter()
        .find(|p| p.churn_rate * 100.0 > RECOMMENDATION_GATE_PCT)
    {
        insights.push(ProductInsight {
            title: "Product Portfolio Optimization".to_string(),
            finding: format!(
                "Customers with {} products have a {:.2}% churn rate.",
                worst.segment,
                worst.churn_rate * 100.0
            ),
            affected_segment: format!(
                "{} customers ({:.2}% of total)",
                with_thousands(worst.count),
                worst.share_of_total * 100.0
            ),
            recommendation: "Review product bundling strategy. Consider creating product \
                             combinations that increase engagement and reduce churn."
                .to_string(),
            expected_impact: "5-8% reduction in churn for the affected segment".to_string(),
            implementation_effort: Effort::Medium,
        });
    }

    let activity = rated_breakdown(dataset, SegmentField::Activity, analysis);
    if let Some(inactive) = activity.iter().find(|s| {
        s.segment == "Inactive" && s.churn_rate * 100.0 > RECOMMENDATION_GATE_PCT
    }) {
        insights.push(ProductInsight {
            title: "Customer Engagement Enhancement".to_string(),
            finding: format!(
                "Inactive members churn at {:.2}%, significantly higher than active members.",
                inactive.churn_rate * 100.0
            ),
            affected_segment: format!(
                "{} inactive customers ({:.2}% of base)",
                with_thousands(inactive.count),
                inactive.share_of_total * 100.0
            ),
            recommendation: "Implement a re-engagement program: personalized notifications, \
                             special offers, and feature highlights to drive activity."
                .to_string(),
            expected_impact: "10-15% conversion from inactive to active, reducing churn by 3-5% \
                              in this segment"
                .to_string(),
            implementation_effort: Effort::Low,
        });
    }

    let balance = rated_breakdown(dataset, SegmentField::BalanceTier, analysis);
    if let Some(zero) = balance.iter().find(|b| {
        b.segment == "Zero Balance" && b.churn_rate * 100.0 > RECOMMENDATION_GATE_PCT
    }) {
        insights.push(ProductInsight {
            title: "Zero Balance Customer Retention".to_string(),
            finding: format!(
                "Customers with zero balance have a {:.2}% churn rate.",
                zero.churn_rate * 100.0
            ),
            affected_segment: format!(
                "{} customers ({:.2}% of base)",
                with_thousands(zero.count),
                zero.share_of_total * 100.0
            ),
            recommendation: "Introduce incentive programs for maintaining minimum balance: \
                             bonus interest rates, fee waivers, or loyalty points."
                .to_string(),
            expected_impact: "15-20% reduction in zero-balance customer churn".to_string(),
            implementation_effort: Effort::Medium,
        });
    }

    let tenure = rated_breakdown(dataset, SegmentField::TenureGroup, analysis);
    if let Some(new_customers) = tenure.iter().find(|t| {
        t.segment == "0-2 years" && t.churn_rate * 100.0 > ONBOARDING_GATE_PCT
    }) {
        insights.push(ProductInsight {
            title: "New Customer Onboarding Improvement".to_string(),
            finding: format!(
                "Customers with 0-2 years tenure have a {:.2}% churn rate.",
                new_customers.churn_rate * 100.0
            ),
            affected_segment: format!("{} new customers", with_thousands(new_customers.count)),
            recommendation: "Enhance onboarding experience: welcome program, guided product \
                             tours, early engagement touchpoints, and first-year benefits."
                .to_string(),
            expected_impact: "20-25% improvement in first-year retention".to_string(),
            implementation_effort: Effort::Medium,
        });
    }

    let age_groups = rated_breakdown(dataset, SegmentField::AgeGroup, analysis);
    if let Some(senior) = age_groups
        .iter()
        .find(|a| a.segment == "65+" && a.churn_rate * 100.0 > SENIOR_GATE_PCT)
    {
        insights.push(ProductInsight {
            title: "Senior Customer Experience".to_string(),
            finding: format!(
                "Senior customers (65+) have a {:.2}% churn rate.",
                senior.churn_rate * 100.0
            ),
            affected_segment: format!("{} senior customers", with_thousands(senior.count)),
            recommendation: "Develop senior-friendly features: simplified UI, dedicated support \
                             line, in-branch services, and retirement planning tools."
                .to_string(),
            expected_impact: "10-15% churn reduction for seniors".to_string(),
            implementation_effort: Effort::High,
        });
    }

    if let Ok(comparison) = analytics::churned_vs_retained(dataset) {
        if let Some(credit) = comparison.iter().find(|c| c.field == "CreditScore") {
            if credit.difference < -CREDIT_SCORE_GAP {
                insights.push(ProductInsight {
                    title: "Credit Score Risk Indicator".to_string(),
                    finding: format!(
                        "Churned customers have lower average credit scores by {:.0} points.",
                        credit.difference.abs()
                    ),
                    affected_segment: "Customers with below-average credit scores".to_string(),
                    recommendation: "Implement credit improvement programs: financial education, \
                                     credit monitoring tools, and personalized financial advice."
                        .to_string(),
                    expected_impact: "Improved customer financial health and 5-7% churn reduction"
                        .to_string(),
                    implementation_effort: Effort::High,
                });
            }
        }
    }

    let gender = rated_breakdown(dataset, SegmentField::Gender, analysis);
    if let Some(top) = gender
        .first()
        .filter(|g| g.churn_rate * 100.0 > RECOMMENDATION_GATE_PCT)
    {
        insights.push(ProductInsight {
            title: "Gender-Specific Retention Strategy".to_string(),
            finding: format!(
                "{} customers have a {:.2}% churn rate.",
                top.segment,
                top.churn_rate * 100.0
            ),
            affected_segment: format!(
                "{} {} customers",
                with_thousands(top.count),
                top.segment.to_lowercase()
            ),
            recommendation: "Conduct customer research to understand gender-specific needs and \
                             preferences. Develop targeted marketing and product features."
                .to_string(),
            expected_impact: "3-5% churn reduction through personalization".to_string(),
            implementation_effort: Effort::Medium,
        });
    }

    insights
}

/// Assemble the complete report.
pub fn generate_report(
    dataset: &Dataset,
    config: &Config,
    source: &str,
    duration_seconds: f64,
) -> Report {
    let analysis = &config.analysis;

    let (executive, product) = if config.report.include_insights {
        (
            executive_insights(dataset, analysis),
            product_insights(dataset, analysis),
        )
    } else {
        (Vec::new(), Vec::new())
    };

    let detailed_analytics = if config.report.include_detailed && !dataset.is_empty() {
        Some(DetailedAnalytics {
            geography_analysis: rated_breakdown(dataset, SegmentField::Geography, analysis),
            age_analysis: rated_breakdown(dataset, SegmentField::AgeGroup, analysis),
            product_analysis: rated_breakdown(dataset, SegmentField::Products, analysis),
            activity_analysis: rated_breakdown(dataset, SegmentField::Activity, analysis),
            summary_statistics: analytics::summary_statistics(dataset).unwrap_or_default(),
            churned_vs_retained: analytics::churned_vs_retained(dataset).unwrap_or_default(),
            correlations: analytics::correlation_analysis(dataset),
        })
    } else {
        None
    };

    Report {
        metadata: ReportMetadata {
            source: source.to_string(),
            generated_at: Utc::now(),
            generator: format!("churnlens v{}", env!("CARGO_PKG_VERSION")),
            total_records: dataset.len(),
            duration_seconds,
        },
        executive_summary: executive_summary(dataset, analysis),
        executive_insights: executive,
        product_insights: product,
        detailed_analytics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CustomerRecord, Gender, Geography};

    fn record(
        geography: Geography,
        age: u32,
        num_of_products: u32,
        is_active_member: bool,
        exited: bool,
    ) -> CustomerRecord {
        CustomerRecord {
            credit_score: if exited { 580 } else { 680 },
            geography,
            gender: if exited { Gender::Female } else { Gender::Male },
            age,
            tenure: 1,
            balance: if exited { 0.0 } else { 80_000.0 },
            num_of_products,
            has_cr_card: true,
            is_active_member,
            estimated_salary: 100_000.0,
            exited,
        }
    }

    /// A dataset where Germany, inactivity and 4-product customers all
    /// churn heavily.
    fn risky_dataset() -> Dataset {
        let mut records = Vec::new();
        for i in 0..60 {
            records.push(record(Geography::Germany, 70, 4, false, i % 10 != 0));
        }
        for i in 0..140 {
            records.push(record(Geography::France, 35, 1, true, i % 20 == 0));
        }
        Dataset::new(records)
    }

    #[test]
    fn test_rate_segments_applies_thresholds() {
        let analysis = AnalysisConfig::default();
        let metrics = vec![
            SegmentMetric {
                dimension: "Geography".to_string(),
                segment: "Germany".to_string(),
                count: 100,
                churn_rate: 0.32,
                share_of_total: 0.25,
            },
            SegmentMetric {
                dimension: "Geography".to_string(),
                segment: "France".to_string(),
                count: 300,
                churn_rate: 0.10,
                share_of_total: 0.75,
            },
        ];

        let rated = rate_segments(metrics, &analysis);
        assert_eq!(rated[0].risk, RiskLevel::High);
        assert_eq!(rated[1].risk, RiskLevel::Low);
    }

    #[test]
    fn test_high_risk_segments_all_high() {
        let analysis = AnalysisConfig::default();
        let high_risk = high_risk_segments(&risky_dataset(), &analysis);

        assert!(!high_risk.is_empty());
        assert!(high_risk.iter().all(|s| s.risk == RiskLevel::High));
        for pair in high_risk.windows(2) {
            assert!(pair[0].churn_rate >= pair[1].churn_rate);
        }
    }

    #[test]
    fn test_executive_summary_truncation() {
        let analysis = AnalysisConfig {
            top_risk_segments: 2,
            top_correlations: 1,
            ..AnalysisConfig::default()
        };

        let summary = executive_summary(&risky_dataset(), &analysis);
        assert!(summary.key_risk_indicators.len() <= 2);
        assert!(summary.top_churn_correlations.len() <= 1);
        assert!(!summary.overview.empty);
    }

    #[test]
    fn test_executive_insights_structure() {
        let analysis = AnalysisConfig::default();
        let insights = executive_insights(&risky_dataset(), &analysis);

        assert!(!insights.is_empty());
        for insight in &insights {
            assert!(!insight.title.is_empty());
            assert!(!insight.summary.is_empty());
            assert!(!insight.key_metric.is_empty());
            assert!(!insight.business_impact.is_empty());
        }

        // Overall rate is well above the medium threshold.
        assert_eq!(insights[0].priority, RiskLevel::High);
    }

    #[test]
    fn test_product_insights_gated_by_thresholds() {
        let analysis = AnalysisConfig::default();

        let insights = product_insights(&risky_dataset(), &analysis);
        assert!(insights
            .iter()
            .any(|i| i.title == "Product Portfolio Optimization"));
        assert!(insights
            .iter()
            .any(|i| i.title == "Customer Engagement Enhancement"));

        // A healthy dataset produces no recommendations.
        let healthy = Dataset::new(
            (0..100)
                .map(|_| record(Geography::France, 35, 2, true, false))
                .collect(),
        );
        assert!(product_insights(&healthy, &analysis).is_empty());
    }

    #[test]
    fn test_insights_empty_dataset() {
        let analysis = AnalysisConfig::default();
        assert!(executive_insights(&Dataset::default(), &analysis).is_empty());
        assert!(product_insights(&Dataset::default(), &analysis).is_empty());
    }

    #[test]
    fn test_generate_report_sections() {
        let config = Config::default();
        let report = generate_report(&risky_dataset(), &config, "test.csv", 0.1);

        assert_eq!(report.metadata.source, "test.csv");
        assert_eq!(report.metadata.total_records, 200);
        assert!(!report.executive_insights.is_empty());
        assert!(report.detailed_analytics.is_some());

        let detailed = report.detailed_analytics.unwrap();
        assert!(!detailed.geography_analysis.is_empty());
        assert!(!detailed.summary_statistics.is_empty());
        assert!(!detailed.correlations.is_empty());
    }

    #[test]
    fn test_generate_report_summary_only() {
        let mut config = Config::default();
        config.report.include_insights = false;
        config.report.include_detailed = false;

        let report = generate_report(&risky_dataset(), &config, "test.csv", 0.1);
        assert!(report.executive_insights.is_empty());
        assert!(report.product_insights.is_empty());
        assert!(report.detailed_analytics.is_none());
    }

    #[test]
    fn test_generate_report_empty_dataset() {
        let config = Config::default();
        let report = generate_report(&Dataset::default(), &config, "empty.csv", 0.0);

        assert!(report.executive_summary.overview.empty);
        assert_eq!(report.executive_summary.overview.churn_rate, 0.0);
        assert!(report.executive_insights.is_empty());
        assert!(report.detailed_analytics.is_none());
    }
}
