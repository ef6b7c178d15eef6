use serde_json::{Map, Value};

use crate::error::ParseError;
use crate::manifest::ManifestFormat;
use crate::models::{Dependency, Ecosystem};

const SECTIONS: [&str; 2] = ["dependencies", "devDependencies"];
const MAX_NAME_LEN: usize = 214;

/// Parser for `package.json` manifests.
///
/// Reads `dependencies` then `devDependencies`, each in document key order.
/// A package listed in both sections yields two entries.
pub struct PackageJsonParser;

impl PackageJsonParser {
    pub fn new() -> Self {
        Self
    }
}

impl super::ManifestParser for PackageJsonParser {
    fn parse(&self, content: &str) -> Result<Vec<Dependency>, ParseError> {
        let json: Value = serde_json::from_str(content)
            .map_err(|e| ParseError::syntax(ManifestFormat::NodePackageJson, e.to_string()))?;

        let root = json.as_object().ok_or_else(|| {
            ParseError::syntax(
                ManifestFormat::NodePackageJson,
                "top-level value must be an object",
            )
        })?;

        let mut deps = Vec::new();
        for section in SECTIONS {
            match root.get(section) {
                None | Some(Value::Null) => {}
                Some(Value::Object(pkgs)) => parse_section(section, pkgs, &mut deps)?,
                Some(_) => {
                    return Err(ParseError::syntax(
                        ManifestFormat::NodePackageJson,
                        format!("`{}` must be an object", section),
                    ))
                }
            }
        }

        Ok(deps)
    }
}

fn parse_section(
    section: &str,
    pkgs: &Map<String, Value>,
    deps: &mut Vec<Dependency>,
) -> Result<(), ParseError> {
    for (name, range) in pkgs {
        if name.trim().is_empty() {
            return Err(ParseError::EmptyName {
                location: section.to_string(),
            });
        }
        if !is_valid_name(name) {
            return Err(ParseError::InvalidName {
                location: section.to_string(),
                name: name.clone(),
            });
        }

        let range = range.as_str().ok_or_else(|| {
            ParseError::syntax(
                ManifestFormat::NodePackageJson,
                format!("{}: version of `{}` must be a string", section, name),
            )
        })?;
        let constraint = Some(range.trim())
            .filter(|r| !r.is_empty())
            .map(str::to_string);

        deps.push(Dependency::new(name.clone(), constraint, Ecosystem::Node));
    }
    Ok(())
}

/// npm package name: optionally scoped (`@scope/name`), URL-safe characters
/// only, not starting with `.` or `_`. Uppercase is tolerated for legacy packages.
fn is_valid_name(name: &str) -> bool {
    if name.len() > MAX_NAME_LEN || name.trim() != name {
        return false;
    }

    match name.strip_prefix('@') {
        Some(scoped) => match scoped.split_once('/') {
            Some((scope, pkg)) => is_valid_segment(scope) && is_valid_segment(pkg),
            None => false,
        },
        None => is_valid_segment(name),
    }
}

fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && !segment.starts_with('.')
        && !segment.starts_with('_')
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~'))
}
