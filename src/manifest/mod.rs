//! Manifest parsers: raw manifest bytes → ordered [`Dependency`] list.
//!
//! - [`python`]: `requirements.txt`-style line format.
//! - [`node`]: `package.json` (`dependencies` and `devDependencies`).
//!
//! Parsing is all-or-nothing: any malformed entry fails the whole manifest
//! with a [`ParseError`], so a report is never built from a partial list.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::models::Dependency;

pub mod node;
pub mod python;

pub trait ManifestParser {
    fn parse(&self, content: &str) -> Result<Vec<Dependency>, ParseError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ManifestFormat {
    PythonRequirements,
    NodePackageJson,
}

impl fmt::Display for ManifestFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManifestFormat::PythonRequirements => write!(f, "requirements.txt"),
            ManifestFormat::NodePackageJson => write!(f, "package.json"),
        }
    }
}

/// Parse raw manifest bytes in the declared format.
///
/// Duplicate entries are kept; each occurrence becomes its own [`Dependency`].
pub fn parse(raw: &[u8], format: ManifestFormat) -> Result<Vec<Dependency>, ParseError> {
    let content = std::str::from_utf8(raw)?;
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    match format {
        ManifestFormat::PythonRequirements => python::RequirementsParser::new().parse(content),
        ManifestFormat::NodePackageJson => node::PackageJsonParser::new().parse(content),
    }
}
