//! `license-verdict`: resolve dependency licenses and judge them against a policy.
//!
//! # Flow
//! 1. Parse CLI arguments ([`cli`]).
//! 2. Load config and build the [`policy::Policy`] ([`config::load_config`]);
//!    a bad policy stops here, before any dependency is looked at.
//! 3. Parse the manifest ([`manifest`]).
//! 4. Resolve each dependency's license from PyPI / npm ([`registry`]).
//! 5. Classify the raw license text ([`license`]) and evaluate it against the policy.
//! 6. Assemble and render the report ([`report`]).
//! 7. Exit `0` (pass), `1` (at least one violation) or `2` (fatal error).

mod cli;
mod config;
mod detector;
mod error;
mod license;
mod manifest;
mod models;
mod policy;
mod registry;
mod report;
mod scan;

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use cli::{Cli, ReportFormat};
use config::load_config;
use detector::detect_format;
use license::classifier::LicenseClassifier;
use manifest::ManifestFormat;
use models::Report;
use registry::Resolver;
use scan::Scanner;

const EXIT_VIOLATIONS: i32 = 1;
const EXIT_FATAL: i32 = 2;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match run(&cli).await {
        Ok(report) if report.overall_pass => {}
        Ok(_) => std::process::exit(EXIT_VIOLATIONS),
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            std::process::exit(EXIT_FATAL);
        }
    }
}

async fn run(cli: &Cli) -> Result<Report> {
    let from_stdin = cli.manifest.as_os_str() == "-";

    let format: ManifestFormat = match cli.format {
        Some(arg) => arg.into(),
        None => detect_format(&cli.manifest).ok_or_else(|| {
            anyhow!(
                "cannot tell the manifest format of {}; pass --format python|node",
                cli.manifest.display()
            )
        })?,
    };

    // Policy first: a broken policy must fail before any dependency is processed.
    let project_dir = if from_stdin {
        PathBuf::from(".")
    } else {
        project_dir(&cli.manifest)
    };
    let config = load_config(&project_dir, cli.config.as_deref())?;
    let policy = config.policy.build(cli.policy.as_deref())?;

    let mut settings = config.registry.clone();
    if let Some(secs) = cli.timeout {
        settings.timeout_ms = secs.saturating_mul(1000);
    }
    if let Some(n) = cli.concurrency {
        settings.concurrency = n;
    }
    settings.validate()?;

    let raw = read_manifest(&cli.manifest, from_stdin)?;

    if !cli.quiet {
        eprintln!(
            "  {} {} ({})",
            "→".cyan(),
            cli.manifest.display(),
            format
        );
    }

    let scanner = Scanner::new(
        Resolver::from_settings(&settings)?,
        LicenseClassifier::new()?,
    );

    let pb = if !cli.quiet {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )?
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let report = scanner.scan(&raw, format, &policy, pb.as_ref()).await?;

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    if !cli.quiet {
        let failed = report
            .results
            .iter()
            .filter(|r| r.license.lookup_error.is_some())
            .count();
        eprintln!(
            "  {} {} dependencies, {} registry lookups failed",
            "→".cyan(),
            report.results.len(),
            failed
        );
    }

    if cli.verbose {
        for result in &report.results {
            if let Some(cause) = &result.license.lookup_error {
                eprintln!(
                    "  {} {} ({}): {}",
                    "warning:".yellow().bold(),
                    result.dependency.name,
                    result.dependency.ecosystem,
                    cause
                );
            }
        }
    }

    match cli.report {
        ReportFormat::Terminal => {
            report::terminal::render(&report, &cli.manifest, cli.verbose, cli.quiet);
        }
        ReportFormat::Json => {
            let json = serde_json::to_string_pretty(&report)?;
            write_output(cli.output.as_deref(), |out| Ok(writeln!(out, "{}", json)?))?;
        }
        ReportFormat::Csv => {
            write_output(cli.output.as_deref(), |out| report::csv::render(&report, out))?;
        }
    }

    Ok(report)
}

/// Directory searched for `.license-verdict/config.toml`.
fn project_dir(manifest: &Path) -> PathBuf {
    manifest
        .canonicalize()
        .unwrap_or_else(|_| manifest.to_path_buf())
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn read_manifest(path: &Path, from_stdin: bool) -> Result<Vec<u8>> {
    if from_stdin {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .context("failed to read manifest from stdin")?;
        return Ok(buf);
    }

    std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}

fn write_output<F>(path: Option<&Path>, render: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> Result<()>,
{
    match path {
        Some(path) => {
            let mut file = std::fs::File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            render(&mut file)?;
            file.flush()?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            render(&mut lock)?;
        }
    }
    Ok(())
}
