//! Markdown tables of run and comparison summaries.
use tabled::settings::{Settings, Style};
use tabled::{Table, Tabled};

use crate::comparison::{Comparison, NoDataReason, Variant};
use crate::run::RunSummary;

/// Format relative error or error bound
pub fn fmt_ratio(value: &f64) -> String {
    if value.abs() < 1.0 {
        format!("{:.4}", value)
    } else {
        format!("{:.2e}", value)
    }
}

/// Format improvement factor
pub fn fmt_factor(value: &f64) -> String {
    format!("{:.2}", value)
}

#[derive(Tabled)]
struct SkippedRecord {
    p: u8,
    reason: &'static str,
}

fn describe(reason: NoDataReason) -> &'static str {
    match reason {
        NoDataReason::MissingSeries(Variant::Baseline) => "no baseline data",
        NoDataReason::MissingSeries(Variant::Improved) => "no improved data",
        NoDataReason::NoCommonSteps => "no common steps",
    }
}

fn markdown<T: Tabled>(rows: impl IntoIterator<Item = T>) -> String {
    let table_config = Settings::default().with(Style::markdown());
    Table::new(rows).with(table_config).to_string()
}

/// Render run summaries ordered by precision
pub fn render_runs(summaries: &[RunSummary]) -> String {
    let mut rows = summaries.to_vec();
    rows.sort_by_key(|s| s.p);
    markdown(rows)
}

/// Render computed comparisons followed by the skipped precisions, if any
pub fn render_comparisons(comparisons: &[Comparison]) -> String {
    let mut computed: Vec<_> = comparisons
        .iter()
        .filter_map(Comparison::computed)
        .copied()
        .collect();
    computed.sort_by_key(|c| c.p);

    let mut skipped: Vec<SkippedRecord> = comparisons
        .iter()
        .filter_map(|c| match *c {
            Comparison::NoData { p, reason } => Some(SkippedRecord {
                p,
                reason: describe(reason),
            }),
            Comparison::Computed(_) => None,
        })
        .collect();
    skipped.sort_by_key(|s| s.p);

    let mut output = markdown(computed);
    if !skipped.is_empty() {
        output.push_str("\n\nSkipped:\n\n");
        output.push_str(&markdown(skipped));
    }
    output
}
