use std::io::Write;

use anyhow::Result;

use crate::models::Report;

const HEADER: [&str; 5] = ["dependency", "ecosystem", "license", "verdict", "reason"];

/// Write one CSV row per dependency, in manifest order.
pub fn render<W: Write + ?Sized>(report: &Report, out: &mut W) -> Result<()> {
    writeln!(out, "{}", HEADER.join(","))?;

    for result in &report.results {
        let row = [
            escape(&result.dependency.name),
            escape(&result.dependency.ecosystem.to_string()),
            escape(&result.license.canonical_license_id),
            escape(&result.verdict.to_string()),
            escape(&result.reason),
        ];
        writeln!(out, "{}", row.join(","))?;
    }

    Ok(())
}

/// RFC 4180 quoting: fields with commas, quotes or line breaks are quoted and
/// embedded quotes doubled.
fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
