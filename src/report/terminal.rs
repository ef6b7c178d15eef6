use std::collections::HashMap;
use std::path::Path;

use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::models::{DependencyResult, Report, Verdict};

/// Render a colored terminal report.
pub fn render(report: &Report, manifest: &Path, verbose: bool, quiet: bool) {
    let summary = &report.summary;

    if quiet {
        println!(
            "Total: {}  Compliant: {}  Violation: {}  Review: {}  Result: {}",
            summary.total(),
            summary.compliant_count.to_string().green(),
            summary.violation_count.to_string().red(),
            summary.review_count.to_string().yellow(),
            overall(report.overall_pass),
        );
        return;
    }

    println!(
        "\n {} v{}",
        "license-verdict".bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!(" Manifest: {}\n", manifest.display());

    let compliant_licenses = summarize_licenses(&report.results, Verdict::Compliant);
    let violation_licenses = summarize_licenses(&report.results, Verdict::Violation);
    let review_licenses = summarize_licenses(&report.results, Verdict::NeedsReview);

    println!(" ┌────────────────────────────────────────────────────┐");
    println!(" │  {:<48} │", "SUMMARY".bold());
    println!(
        " │  {:<48} │",
        format!("Total dependencies : {}", summary.total())
    );
    println!(
        " │  {:<48} │",
        format!(
            "{}  Compliant       : {:>4}  {}",
            "✓".green(),
            summary.compliant_count,
            compliant_licenses
        )
    );
    println!(
        " │  {:<48} │",
        format!(
            "{}  Violation       : {:>4}  {}",
            "✗".red(),
            summary.violation_count,
            violation_licenses
        )
    );
    println!(
        " │  {:<48} │",
        format!(
            "{}  Needs review    : {:>4}  {}",
            "⚠".yellow(),
            summary.review_count,
            review_licenses
        )
    );
    println!(" │  {:<48} │", format!("Result             : {}", overall(report.overall_pass)));
    println!(" └────────────────────────────────────────────────────┘\n");

    if summary.violation_count > 0 {
        println!(" {} Policy violations:\n", "[VIOLATION]".red().bold());
        render_table(&report.results, Verdict::Violation);
        println!();
    }

    if summary.review_count > 0 {
        println!(" {} Dependencies needing review:\n", "[REVIEW]".yellow().bold());
        render_table(&report.results, Verdict::NeedsReview);
        println!();
    }

    if verbose && summary.compliant_count > 0 {
        println!(" {} Compliant dependencies:\n", "[COMPLIANT]".green().bold());
        render_table(&report.results, Verdict::Compliant);
        println!();
    }
}

fn overall(pass: bool) -> ColoredString {
    if pass {
        "PASS".green().bold()
    } else {
        "FAIL".red().bold()
    }
}

fn render_table(results: &[DependencyResult], verdict_filter: Verdict) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Name").add_attribute(Attribute::Bold),
            Cell::new("Constraint").add_attribute(Attribute::Bold),
            Cell::new("Ecosystem").add_attribute(Attribute::Bold),
            Cell::new("License").add_attribute(Attribute::Bold),
            Cell::new("Verdict").add_attribute(Attribute::Bold),
            Cell::new("Reason").add_attribute(Attribute::Bold),
        ]);

    for result in results.iter().filter(|r| r.verdict == verdict_filter) {
        let (verdict_str, verdict_color) = match result.verdict {
            Verdict::Compliant => ("✓ compliant", Color::Green),
            Verdict::Violation => ("✗ violation", Color::Red),
            Verdict::NeedsReview => ("⚠ review", Color::Yellow),
        };

        let license_color = if result.license.is_unknown() {
            Color::DarkGrey
        } else {
            Color::Reset
        };

        table.add_row(vec![
            Cell::new(&result.dependency.name),
            Cell::new(
                result
                    .dependency
                    .declared_version_constraint
                    .as_deref()
                    .unwrap_or("*"),
            ),
            Cell::new(result.dependency.ecosystem.to_string()),
            Cell::new(&result.license.canonical_license_id).fg(license_color),
            Cell::new(verdict_str)
                .fg(verdict_color)
                .set_alignment(CellAlignment::Center),
            Cell::new(&result.reason),
        ]);
    }

    println!("{}", table);
}

/// Top three licenses for a verdict, e.g. `[MIT (4), ISC (1)]`.
fn summarize_licenses(results: &[DependencyResult], verdict: Verdict) -> String {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for result in results.iter().filter(|r| r.verdict == verdict) {
        *counts
            .entry(result.license.canonical_license_id.as_str())
            .or_insert(0) += 1;
    }

    let mut pairs: Vec<(&str, usize)> = counts.into_iter().collect();
    pairs.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

    let summary: Vec<String> = pairs
        .iter()
        .take(3)
        .map(|(lic, cnt)| format!("{} ({})", lic, cnt))
        .collect();

    if summary.is_empty() {
        String::new()
    } else {
        format!("[{}]", summary.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Dependency, Ecosystem, LicenseInfo};

    fn result(license: &str, verdict: Verdict) -> DependencyResult {
        DependencyResult {
            dependency: Dependency::new("pkg", None, Ecosystem::Node),
            license: LicenseInfo {
                raw_license_text: Some(license.to_string()),
                canonical_license_id: license.to_string(),
                lookup_error: None,
            },
            verdict,
            reason: String::new(),
        }
    }

    #[test]
    fn test_summarize_licenses() {
        let results = vec![
            result("MIT", Verdict::Compliant),
            result("ISC", Verdict::Compliant),
            result("MIT", Verdict::Compliant),
            result("GPL-3.0", Verdict::Violation),
        ];
        assert_eq!(
            summarize_licenses(&results, Verdict::Compliant),
            "[MIT (2), ISC (1)]"
        );
        assert_eq!(summarize_licenses(&results, Verdict::NeedsReview), "");
    }
}
