//! Text, Markdown and JSON report generation.
//!
//! This module renders the assembled report for the console, for
//! Markdown files, and as JSON. All numeric rounding happens here;
//! the report object itself carries full-precision values.

use crate::models::{
    format_money, with_thousands, ExecutiveInsight, ProductInsight, Report, SegmentInsight,
};
use anyhow::Result;

const RULE_HEAVY: &str = "============================================================";
const RULE_LIGHT: &str = "----------------------------------------";

fn pct(rate: f64) -> String {
    format!("{:.2}%", rate * 100.0)
}

/// Generate the formatted console text report.
pub fn generate_text_report(report: &Report) -> String {
    let mut output = String::new();

    output.push_str(&text_executive_summary(report));

    if !report.executive_insights.is_empty() {
        output.push_str(&text_executive_insights(&report.executive_insights));
    }
    if !report.product_insights.is_empty() {
        output.push_str(&text_product_insights(&report.product_insights));
    }

    output
}

/// The executive summary block of the text report.
fn text_executive_summary(report: &Report) -> String {
    let mut section = String::new();
    let summary = &report.executive_summary;
    let overview = &summary.overview;

    section.push_str(&format!("\n{}\n", RULE_HEAVY));
    section.push_str("EXECUTIVE SUMMARY - CUSTOMER CHURN ANALYSIS\n");
    section.push_str(&format!("{}\n", RULE_HEAVY));
    section.push_str(&format!(
        "\nReport Date: {}\n",
        report.metadata.generated_at.format("%Y-%m-%d")
    ));
    section.push_str(&format!("Source: {}\n", report.metadata.source));

    section.push_str("\n📊 OVERVIEW\n");
    section.push_str(&format!("{}\n", RULE_LIGHT));
    if overview.empty {
        section.push_str("The dataset is empty; rates below are not meaningful.\n");
    }
    section.push_str(&format!(
        "Total Customers: {}\n",
        with_thousands(overview.total_customers)
    ));
    section.push_str(&format!("Churn Rate: {}\n", pct(overview.churn_rate)));
    section.push_str(&format!(
        "Churned Customers: {}\n",
        with_thousands(overview.churned_customers)
    ));
    section.push_str(&format!(
        "Retained Customers: {}\n",
        with_thousands(overview.retained_customers)
    ));

    section.push_str("\n💰 FINANCIAL IMPACT\n");
    section.push_str(&format!("{}\n", RULE_LIGHT));
    section.push_str(&format!(
        "Estimated Revenue at Risk: {}\n",
        format_money(summary.financial_impact.revenue_at_risk)
    ));
    section.push_str(&format!(
        "Assumed Annual Customer Value: {}\n",
        format_money(summary.financial_impact.annual_customer_value)
    ));

    if !summary.key_risk_indicators.is_empty() {
        section.push_str("\n⚠️ KEY RISK INDICATORS\n");
        section.push_str(&format!("{}\n", RULE_LIGHT));
        for risk in &summary.key_risk_indicators {
            section.push_str(&format!(
                "  • {}: {} - {} ({} customers)\n",
                risk.dimension,
                risk.segment,
                pct(risk.churn_rate),
                with_thousands(risk.count)
            ));
        }
    }

    if !summary.top_churn_correlations.is_empty() {
        section.push_str("\n📈 TOP CHURN FACTORS\n");
        section.push_str(&format!("{}\n", RULE_LIGHT));
        for factor in &summary.top_churn_correlations {
            section.push_str(&format!(
                "  • {}: {:.4}\n",
                factor.field, factor.correlation
            ));
        }
    }

    section.push_str(&format!("\n{}\n", RULE_HEAVY));

    section
}

fn text_executive_insights(insights: &[ExecutiveInsight]) -> String {
    let mut section = String::new();

    section.push_str(&format!("\n{}\n", RULE_HEAVY));
    section.push_str("EXECUTIVE INSIGHTS\n");
    section.push_str(&format!("{}\n", RULE_HEAVY));

    for (i, insight) in insights.iter().enumerate() {
        section.push_str(&format!(
            "\n{}. {} {}\n",
            i + 1,
            insight.priority.emoji(),
            insight.title
        ));
        section.push_str(&format!("{}\n", "-".repeat(50)));
        section.push_str(&format!("Summary: {}\n", insight.summary));
        section.push_str(&format!("Key Metric: {}\n", insight.key_metric));
        section.push_str(&format!("Business Impact: {}\n", insight.business_impact));
        section.push_str(&format!("Priority: {}\n", insight.priority));
    }

    section
}

fn text_product_insights(insights: &[ProductInsight]) -> String {
    let mut section = String::new();

    section.push_str(&format!("\n{}\n", RULE_HEAVY));
    section.push_str("PRODUCT MANAGER INSIGHTS\n");
    section.push_str(&format!("{}\n", RULE_HEAVY));

    for (i, insight) in insights.iter().enumerate() {
        section.push_str(&format!(
            "\n{}. {} {}\n",
            i + 1,
            insight.implementation_effort.emoji(),
            insight.title
        ));
        section.push_str(&format!("{}\n", "-".repeat(50)));
        section.push_str(&format!("Finding: {}\n", insight.finding));
        section.push_str(&format!("Affected Segment: {}\n", insight.affected_segment));
        section.push_str(&format!("Recommendation: {}\n", insight.recommendation));
        section.push_str(&format!("Expected Impact: {}\n", insight.expected_impact));
        section.push_str(&format!(
            "Implementation Effort: {}\n",
            insight.implementation_effort
        ));
    }

    section
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report) -> String {
    let mut output = String::new();

    output.push_str("# ChurnLens Report\n\n");

    output.push_str(&markdown_metadata_section(report));
    output.push_str(&markdown_summary_section(report));

    if !report.executive_insights.is_empty() {
        output.push_str(&markdown_executive_insights(&report.executive_insights));
    }
    if !report.product_insights.is_empty() {
        output.push_str(&markdown_product_insights(&report.product_insights));
    }
    if report.detailed_analytics.is_some() {
        output.push_str(&markdown_detailed_section(report));
    }

    output.push_str(&markdown_footer());

    output
}

/// Generate the metadata section.
fn markdown_metadata_section(report: &Report) -> String {
    let metadata = &report.metadata;
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Source:** {}\n", metadata.source));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Generator:** `{}`\n", metadata.generator));
    section.push_str(&format!(
        "- **Records Analyzed:** {}\n",
        with_thousands(metadata.total_records)
    ));
    section.push_str(&format!(
        "- **Analysis Duration:** {:.1}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

/// Generate the executive summary section.
fn markdown_summary_section(report: &Report) -> String {
    let summary = &report.executive_summary;
    let overview = &summary.overview;
    let mut section = String::new();

    section.push_str("## Executive Summary\n\n");

    if overview.empty {
        section.push_str("> ⚠️ The dataset is empty; rates below are not meaningful.\n\n");
    }

    section.push_str("| Total Customers | Churn Rate | Churned | Retained |\n");
    section.push_str("|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | **{}** | {} | {} |\n\n",
        with_thousands(overview.total_customers),
        pct(overview.churn_rate),
        with_thousands(overview.churned_customers),
        with_thousands(overview.retained_customers)
    ));

    section.push_str(&format!(
        "**Estimated revenue at risk:** {} (assuming {} per customer per year)\n\n",
        format_money(summary.financial_impact.revenue_at_risk),
        format_money(summary.financial_impact.annual_customer_value)
    ));

    if !summary.key_risk_indicators.is_empty() {
        section.push_str("### Key Risk Indicators\n\n");
        section.push_str(&segment_table(&summary.key_risk_indicators));
    }

    if !summary.top_churn_correlations.is_empty() {
        section.push_str("### Top Churn Factors\n\n");
        section.push_str("| Factor | Correlation |\n");
        section.push_str("|:---|:---:|\n");
        for factor in &summary.top_churn_correlations {
            section.push_str(&format!(
                "| {} | {:.4} |\n",
                factor.field, factor.correlation
            ));
        }
        section.push('\n');
    }

    section
}

/// Render a table of rated segments.
fn segment_table(segments: &[SegmentInsight]) -> String {
    let mut table = String::new();

    table.push_str("| Dimension | Segment | Customers | Churn Rate | Risk |\n");
    table.push_str("|:---|:---|:---:|:---:|:---:|\n");
    for segment in segments {
        table.push_str(&format!(
            "| {} | {} | {} | {} | {} {} |\n",
            segment.dimension,
            segment.segment,
            with_thousands(segment.count),
            pct(segment.churn_rate),
            segment.risk.emoji(),
            segment.risk
        ));
    }
    table.push('\n');

    table
}

fn markdown_executive_insights(insights: &[ExecutiveInsight]) -> String {
    let mut section = String::new();

    section.push_str("## Executive Insights\n\n");
    for insight in insights {
        section.push_str(&format!(
            "#### {} {} - {}\n\n",
            insight.priority.emoji(),
            insight.priority,
            insight.title
        ));
        section.push_str(&format!("{}\n\n", insight.summary));
        section.push_str(&format!("**Key Metric:** {}\n\n", insight.key_metric));
        section.push_str(&format!(
            "**Business Impact:** {}\n\n",
            insight.business_impact
        ));
        section.push_str("---\n\n");
    }

    section
}

fn markdown_product_insights(insights: &[ProductInsight]) -> String {
    let mut section = String::new();

    section.push_str("## Product Manager Insights\n\n");
    for insight in insights {
        section.push_str(&format!("#### {} {}\n\n", insight.implementation_effort.emoji(), insight.title));
        section.push_str(&format!("{}\n\n", insight.finding));
        section.push_str(&format!(
            "**Affected Segment:** {}\n\n",
            insight.affected_segment
        ));
        section.push_str(&format!(
            "> 💡 **Recommendation:** {}\n\n",
            insight.recommendation
        ));
        section.push_str(&format!(
            "**Expected Impact:** {} | **Effort:** {}\n\n",
            insight.expected_impact, insight.implementation_effort
        ));
        section.push_str("---\n\n");
    }

    section
}

/// Generate the detailed analytics section.
fn markdown_detailed_section(report: &Report) -> String {
    let Some(ref detailed) = report.detailed_analytics else {
        return String::new();
    };
    let mut section = String::new();

    section.push_str("## Detailed Analytics\n\n");

    section.push_str("### Churn by Geography\n\n");
    section.push_str(&segment_table(&detailed.geography_analysis));

    section.push_str("### Churn by Age Group\n\n");
    section.push_str(&segment_table(&detailed.age_analysis));

    section.push_str("### Churn by Product Count\n\n");
    section.push_str(&segment_table(&detailed.product_analysis));

    section.push_str("### Churn by Activity Status\n\n");
    section.push_str(&segment_table(&detailed.activity_analysis));

    if !detailed.summary_statistics.is_empty() {
        section.push_str("### Feature Statistics\n\n");
        section.push_str("| Field | Mean | Median | Std Dev | Min | Max |\n");
        section.push_str("|:---|:---:|:---:|:---:|:---:|:---:|\n");
        for stats in &detailed.summary_statistics {
            section.push_str(&format!(
                "| {} | {:.2} | {:.2} | {:.2} | {:.2} | {:.2} |\n",
                stats.field, stats.mean, stats.median, stats.std_dev, stats.min, stats.max
            ));
        }
        section.push('\n');
    }

    if !detailed.churned_vs_retained.is_empty() {
        section.push_str("### Churned vs Retained\n\n");
        section.push_str("| Field | Churned Avg | Retained Avg | Difference | Difference % |\n");
        section.push_str("|:---|:---:|:---:|:---:|:---:|\n");
        for comparison in &detailed.churned_vs_retained {
            section.push_str(&format!(
                "| {} | {:.2} | {:.2} | {:.2} | {:.2}% |\n",
                comparison.field,
                comparison.churned_avg,
                comparison.retained_avg,
                comparison.difference,
                comparison.difference_pct
            ));
        }
        section.push('\n');
    }

    if !detailed.correlations.is_empty() {
        section.push_str("### Correlations with Churn\n\n");
        section.push_str("| Field | Correlation |\n");
        section.push_str("|:---|:---:|\n");
        for entry in &detailed.correlations {
            section.push_str(&format!("| {} | {:.4} |\n", entry.field, entry.correlation));
        }
        section.push('\n');
    }

    section
}

/// Generate the report footer.
fn markdown_footer() -> String {
    "---\n\n*Report generated by ChurnLens*\n".to_string()
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}
