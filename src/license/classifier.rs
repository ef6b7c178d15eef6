use std::collections::HashMap;

use regex::Regex;

use crate::license::spdx::{CANONICAL_IDS, VARIANTS};
use crate::models::UNKNOWN_LICENSE;

/// License families recognised by the substring fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    Agpl,
    Lgpl,
    Gpl,
    Mpl,
    Epl,
    Apache,
    Bsd,
    Mit,
    Isc,
    Unlicense,
}

/// Maps raw license text to a canonical license id, or `UNKNOWN`.
///
/// Resolution order:
/// 1. absent, empty or literal "unknown" → `UNKNOWN`
/// 2. exact match against the variant table (case and whitespace insensitive)
/// 3. compound text (`OR`, `AND`, `/`, `|`) → `UNKNOWN`; picking one side of a
///    dual license is left to a human. Exceptions and riders (`WITH ...`,
///    `+no-false-attribs`) change the terms and are `UNKNOWN` too.
/// 4. family keyword + version heuristics (`GPL` without a version is
///    `GPL-UNVERSIONED`)
/// 5. `UNKNOWN`
///
/// Built once per run and shared read-only.
pub struct LicenseClassifier {
    table: HashMap<String, &'static str>,
    or_later: Regex,
    compound: Regex,
    modifier: Regex,
    version: Regex,
    families: Vec<(Family, Regex)>,
}

impl LicenseClassifier {
    pub fn new() -> Result<Self, regex::Error> {
        let mut table: HashMap<String, &'static str> = CANONICAL_IDS
            .iter()
            .map(|id| (id.to_lowercase(), *id))
            .collect();
        for (variant, id) in VARIANTS {
            table.insert((*variant).to_string(), *id);
        }

        let families = vec![
            (Family::Agpl, Regex::new(r"\bagpl|affero")?),
            (
                Family::Lgpl,
                Regex::new(r"\blgpl|\blesser\b|library general public")?,
            ),
            (Family::Gpl, Regex::new(r"\bgpl|general public licen[sc]e")?),
            (Family::Mpl, Regex::new(r"\bmpl|mozilla public")?),
            (Family::Epl, Regex::new(r"\bepl|eclipse public")?),
            (Family::Apache, Regex::new(r"\bapache")?),
            (Family::Bsd, Regex::new(r"\bbsd")?),
            (Family::Mit, Regex::new(r"\bmit\b")?),
            (Family::Isc, Regex::new(r"\biscl?\b")?),
            (Family::Unlicense, Regex::new(r"\bunlicense\b")?),
        ];

        Ok(Self {
            table,
            or_later: Regex::new(
                r"[\s-]or[\s-]+(?:any\s+)?(?:later|newer|greater)(?:\s+version)?",
            )?,
            compound: Regex::new(r"\b(?:or|and|with)\b|/|\|")?,
            modifier: Regex::new(r"\+\s*([a-z][a-z-]*)")?,
            version: Regex::new(r"\d+(?:\.\d+)?")?,
            families,
        })
    }

    /// Classify raw license text into a canonical id.
    pub fn classify(&self, raw: Option<&str>) -> String {
        self.classify_str(raw.unwrap_or_default()).to_string()
    }

    fn classify_str(&self, raw: &str) -> &'static str {
        let normalized = normalize(raw);
        if normalized.is_empty() || normalized == "unknown" {
            return UNKNOWN_LICENSE;
        }

        if let Some(id) = self.table.get(&normalized) {
            return *id;
        }

        let text = self.or_later.replace_all(&normalized, "+");
        if self.compound.is_match(&text) || self.has_modifier(&text) {
            return UNKNOWN_LICENSE;
        }

        self.heuristic(&text).unwrap_or(UNKNOWN_LICENSE)
    }

    /// A `+` followed by a word other than "license" is a rider, not "or later".
    fn has_modifier(&self, text: &str) -> bool {
        self.modifier
            .captures_iter(text)
            .any(|c| !c[1].starts_with("licen"))
    }

    fn heuristic(&self, text: &str) -> Option<&'static str> {
        let family = self
            .families
            .iter()
            .find(|(_, re)| re.is_match(text))
            .map(|(family, _)| *family)?;
        let version = self.version.find(text).map(|m| m.as_str());

        match family {
            Family::Agpl => match version {
                None => Some("AGPL-UNVERSIONED"),
                Some("3" | "3.0") => Some("AGPL-3.0"),
                Some(_) => None,
            },
            Family::Lgpl => match version {
                None => Some("LGPL-UNVERSIONED"),
                Some("2" | "2.0") => Some("LGPL-2.0"),
                Some("2.1") => Some("LGPL-2.1"),
                Some("3" | "3.0") => Some("LGPL-3.0"),
                Some(_) => None,
            },
            Family::Gpl => match version {
                None => Some("GPL-UNVERSIONED"),
                Some("2" | "2.0") => Some("GPL-2.0"),
                Some("3" | "3.0") => Some("GPL-3.0"),
                Some(_) => None,
            },
            Family::Mpl => matches!(version, Some("2" | "2.0")).then_some("MPL-2.0"),
            Family::Epl => matches!(version, Some("2" | "2.0")).then_some("EPL-2.0"),
            Family::Apache => matches!(version, Some("2" | "2.0")).then_some("Apache-2.0"),
            Family::Bsd => {
                if text.contains("2-clause")
                    || text.contains("2 clause")
                    || text.contains("simplified")
                {
                    Some("BSD-2-Clause")
                } else if text.contains("4-clause") || text.contains("original") {
                    None
                } else {
                    Some("BSD-3-Clause")
                }
            }
            Family::Mit => Some("MIT"),
            Family::Isc => Some("ISC"),
            Family::Unlicense => Some("Unlicense"),
        }
    }
}

/// Lowercase, collapse whitespace, and drop one pair of enclosing parentheses.
fn normalize(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let trimmed = collapsed
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .filter(|inner| !inner.contains('(') && !inner.contains(')'))
        .unwrap_or(&collapsed);
    trimmed.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(raw: &str) -> String {
        LicenseClassifier::new().unwrap().classify(Some(raw))
    }

    #[test]
    fn test_absent_and_empty_are_unknown() {
        let classifier = LicenseClassifier::new().unwrap();
        assert_eq!(classifier.classify(None), "UNKNOWN");
        assert_eq!(classifier.classify(Some("")), "UNKNOWN");
        assert_eq!(classifier.classify(Some("   ")), "UNKNOWN");
        assert_eq!(classifier.classify(Some("UNKNOWN")), "UNKNOWN");
    }

    #[test]
    fn test_known_variants() {
        assert_eq!(classify("MIT License"), "MIT");
        assert_eq!(classify("mit"), "MIT");
        assert_eq!(classify("  The   MIT  License "), "MIT");
        assert_eq!(classify("Apache 2.0"), "Apache-2.0");
        assert_eq!(classify("Apache License 2.0"), "Apache-2.0");
        assert_eq!(classify("Apache License, Version 2.0"), "Apache-2.0");
        assert_eq!(classify("BSD License"), "BSD-3-Clause");
        assert_eq!(classify("bsd-3-clause"), "BSD-3-Clause");
        assert_eq!(classify("Simplified BSD"), "BSD-2-Clause");
        assert_eq!(classify("GPL v3"), "GPL-3.0");
        assert_eq!(classify("GPLv2"), "GPL-2.0");
        assert_eq!(classify("LGPL-2.1-or-later"), "LGPL-2.1");
        assert_eq!(classify("Mozilla Public License 2.0 (MPL 2.0)"), "MPL-2.0");
        assert_eq!(classify("ISC License (ISCL)"), "ISC");
        assert_eq!(classify("The Unlicense (Unlicense)"), "Unlicense");
        assert_eq!(classify("(MIT)"), "MIT");
    }

    #[test]
    fn test_pypi_classifier_names() {
        assert_eq!(
            classify("GNU General Public License v2 or later (GPLv2+)"),
            "GPL-2.0"
        );
        assert_eq!(
            classify("GNU Library or Lesser General Public License (LGPL)"),
            "LGPL-UNVERSIONED"
        );
        assert_eq!(classify("Python Software Foundation License"), "PSF-2.0");
    }

    #[test]
    fn test_gpl_without_version() {
        assert_eq!(classify("GPL"), "GPL-UNVERSIONED");
        assert_eq!(classify("GNU GPL"), "GPL-UNVERSIONED");
        assert_eq!(classify("LGPL"), "LGPL-UNVERSIONED");
        assert_eq!(classify("Affero GPL"), "AGPL-UNVERSIONED");
    }

    #[test]
    fn test_heuristic_versions() {
        assert_eq!(classify("GNU GPL version 2 or any later version"), "GPL-2.0");
        assert_eq!(classify("GPL-3.0+"), "GPL-3.0");
        assert_eq!(classify("GNU Lesser GPL 2.1"), "LGPL-2.1");
        assert_eq!(classify("GNU Affero General Public License 3"), "AGPL-3.0");
        assert_eq!(classify("GPL 1.0"), "UNKNOWN");
        assert_eq!(classify("Apache Public License 2"), "Apache-2.0");
        assert_eq!(classify("Apache"), "UNKNOWN");
        assert_eq!(classify("MIT-style license"), "MIT");
    }

    #[test]
    fn test_compound_is_unknown() {
        assert_eq!(classify("MIT OR Apache-2.0"), "UNKNOWN");
        assert_eq!(classify("(MIT OR Apache-2.0)"), "UNKNOWN");
        assert_eq!(classify("MIT AND GPL-3.0"), "UNKNOWN");
        assert_eq!(classify("MIT/Apache-2.0"), "UNKNOWN");
        assert_eq!(classify("GPL or MIT"), "UNKNOWN");
    }

    #[test]
    fn test_exceptions_and_riders_are_unknown() {
        assert_eq!(classify("Apache-2.0 WITH Commons-Clause"), "UNKNOWN");
        assert_eq!(classify("Apache 2.0 with Commons Clause"), "UNKNOWN");
        assert_eq!(classify("MIT +no-false-attribs"), "UNKNOWN");
        assert_eq!(classify("GPL-2.0+ with linking exception"), "UNKNOWN");
        assert_eq!(classify("GPL-2.0-or-later WITH Classpath-exception-2.0"), "UNKNOWN");
    }

    #[test]
    fn test_plus_suffix_is_still_or_later() {
        assert_eq!(classify("GPL-3.0+"), "GPL-3.0");
        assert_eq!(classify("GPLv2+ license"), "GPL-2.0");
        assert_eq!(classify("LGPL 2.1 or later"), "LGPL-2.1");
    }

    #[test]
    fn test_unmatched_is_unknown() {
        assert_eq!(classify("CUSTOM-LICENSE-42"), "UNKNOWN");
        assert_eq!(classify("Proprietary"), "UNKNOWN");
        assert_eq!(classify("submitted for permission"), "UNKNOWN");
    }

    #[test]
    fn test_canonical_ids_are_fixed_points() {
        let classifier = LicenseClassifier::new().unwrap();
        for id in CANONICAL_IDS {
            let once = classifier.classify(Some(id));
            assert_eq!(once, *id);
            assert_eq!(classifier.classify(Some(&once)), once);
        }
        assert_eq!(classifier.classify(Some("UNKNOWN")), "UNKNOWN");
    }

    #[test]
    fn test_every_output_is_a_fixed_point() {
        let classifier = LicenseClassifier::new().unwrap();
        let inputs = [
            "MIT License",
            "GPL",
            "GNU GPL version 2 or any later version",
            "Affero GPL",
            "BSD 2 clause variant",
            "whatever",
        ];
        for input in inputs {
            let once = classifier.classify(Some(input));
            assert_eq!(classifier.classify(Some(&once)), once, "input {input}");
        }
    }
}
