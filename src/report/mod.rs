//! Report assembly and renderers.
//!
//! - [`assemble`]: per-dependency results → [`Report`] with summary counts.
//! - [`terminal`]: colored, tabular output with summary box; respects `--verbose` / `--quiet`.
//! - [`csv`]: one row per dependency for spreadsheets and CI artifacts.

use crate::models::{DependencyResult, Report, Summary, Verdict};

pub mod csv;
pub mod terminal;

/// Aggregate results into a [`Report`], keeping their order.
///
/// The run passes iff there is no [`Verdict::Violation`]; `NeedsReview`
/// entries are counted but do not fail it.
pub fn assemble(results: Vec<DependencyResult>) -> Report {
    let mut summary = Summary::default();
    for result in &results {
        match result.verdict {
            Verdict::Compliant => summary.compliant_count += 1,
            Verdict::Violation => summary.violation_count += 1,
            Verdict::NeedsReview => summary.review_count += 1,
        }
    }

    Report {
        results,
        overall_pass: summary.violation_count == 0,
        summary,
    }
}
