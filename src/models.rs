use serde::{Deserialize, Serialize};

/// Canonical id used when no license could be determined.
pub const UNKNOWN_LICENSE: &str = "UNKNOWN";

/// A single declared dependency, as read from a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependency {
    pub name: String,
    pub declared_version_constraint: Option<String>,
    pub ecosystem: Ecosystem,
}

impl Dependency {
    pub fn new(name: impl Into<String>, constraint: Option<String>, ecosystem: Ecosystem) -> Self {
        Self {
            name: name.into(),
            declared_version_constraint: constraint,
            ecosystem,
        }
    }

    /// Key used to deduplicate registry lookups within one run.
    ///
    /// PyPI treats `Foo_Bar`, `foo-bar` and `foo.bar` as the same project;
    /// npm names are compared verbatim.
    pub fn lookup_key(&self) -> (Ecosystem, String) {
        let name = match self.ecosystem {
            Ecosystem::Python => normalize_python_name(&self.name),
            Ecosystem::Node => self.name.clone(),
        };
        (self.ecosystem, name)
    }
}

fn normalize_python_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_separator = false;
    for c in name.chars() {
        if matches!(c, '-' | '_' | '.') {
            if !in_separator {
                out.push('-');
            }
            in_separator = true;
        } else {
            out.push(c.to_ascii_lowercase());
            in_separator = false;
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ecosystem {
    Python,
    Node,
}

impl std::fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Ecosystem::Python => write!(f, "Python"),
            Ecosystem::Node => write!(f, "Node"),
        }
    }
}

/// License data for one dependency: the registry's raw text and its canonical id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseInfo {
    pub raw_license_text: Option<String>,
    pub canonical_license_id: String,
    /// Why the registry lookup produced nothing, when it failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lookup_error: Option<String>,
}

impl LicenseInfo {
    /// A resolved raw license, not yet classified.
    pub fn raw(text: Option<String>) -> Self {
        Self {
            raw_license_text: text,
            canonical_license_id: UNKNOWN_LICENSE.to_string(),
            lookup_error: None,
        }
    }

    /// A failed lookup; always classifies as UNKNOWN.
    pub fn unresolved(cause: impl Into<String>) -> Self {
        Self {
            raw_license_text: None,
            canonical_license_id: UNKNOWN_LICENSE.to_string(),
            lookup_error: Some(cause.into()),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.canonical_license_id == UNKNOWN_LICENSE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Compliant,
    Violation,
    NeedsReview,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Compliant => write!(f, "compliant"),
            Verdict::Violation => write!(f, "violation"),
            Verdict::NeedsReview => write!(f, "needs-review"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyResult {
    pub dependency: Dependency,
    pub license: LicenseInfo,
    pub verdict: Verdict,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub compliant_count: usize,
    pub violation_count: usize,
    pub review_count: usize,
}

impl Summary {
    pub fn total(&self) -> usize {
        self.compliant_count + self.violation_count + self.review_count
    }
}

/// Outcome of one analysis run. Results keep manifest order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub results: Vec<DependencyResult>,
    pub summary: Summary,
    pub overall_pass: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_python_lookup_key_is_normalized() {
        let a = Dependency::new("Foo_Bar", None, Ecosystem::Python);
        let b = Dependency::new("foo.bar", None, Ecosystem::Python);
        let c = Dependency::new("foo--bar", None, Ecosystem::Python);
        assert_eq!(a.lookup_key(), b.lookup_key());
        assert_eq!(a.lookup_key(), c.lookup_key());
        assert_eq!(a.lookup_key().1, "foo-bar");
    }

    #[test]
    fn test_node_lookup_key_is_verbatim() {
        let dep = Dependency::new("@types/node", None, Ecosystem::Node);
        assert_eq!(dep.lookup_key(), (Ecosystem::Node, "@types/node".to_string()));
    }

    #[test]
    fn test_unresolved_is_unknown() {
        let info = LicenseInfo::unresolved("timed out");
        assert!(info.is_unknown());
        assert_eq!(info.raw_license_text, None);
    }
}
