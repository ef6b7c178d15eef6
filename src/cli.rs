use std::path::PathBuf;

use clap::Parser;

use crate::manifest::ManifestFormat;

#[derive(Parser, Debug)]
#[command(
    name = "license-verdict",
    about = "Resolve dependency licenses and check them against a license policy",
    version
)]
pub struct Cli {
    /// Manifest to check (requirements.txt or package.json); `-` reads stdin
    pub manifest: PathBuf,

    /// Manifest format [default: detected from the file name]
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<FormatArg>,

    /// Policy preset: default, permissive or strict (overrides the config file's preset)
    #[arg(long, value_name = "PRESET")]
    pub policy: Option<String>,

    /// Config file [default: <manifest dir>/.license-verdict/config.toml, fallback ~/.config/license-verdict/config.toml]
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Report format
    #[arg(long, default_value = "terminal", value_name = "FORMAT")]
    pub report: ReportFormat,

    /// Write the json/csv report to FILE instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Per-request registry timeout in seconds
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Maximum concurrent registry lookups
    #[arg(long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Show all dependencies (not just violations/reviews) and lookup failures
    #[arg(short, long)]
    pub verbose: bool,

    /// Only print summary line
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum ReportFormat {
    Terminal,
    Json,
    Csv,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum FormatArg {
    /// requirements.txt
    Python,
    /// package.json
    Node,
}

impl From<FormatArg> for ManifestFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Python => ManifestFormat::PythonRequirements,
            FormatArg::Node => ManifestFormat::NodePackageJson,
        }
    }
}
