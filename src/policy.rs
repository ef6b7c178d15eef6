use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::PolicyError;
use crate::license::spdx;
use crate::models::{Verdict, UNKNOWN_LICENSE};

/// Names accepted by [`Policy::preset`].
pub const PRESET_NAMES: &[&str] = &["default", "permissive", "strict"];

const PERMISSIVE: &[&str] = &[
    "MIT",
    "MIT-0",
    "Apache-2.0",
    "BSD-2-Clause",
    "BSD-3-Clause",
    "0BSD",
    "ISC",
    "Zlib",
    "Unlicense",
    "CC0-1.0",
    "PSF-2.0",
    "BSL-1.0",
];

const STRONG_COPYLEFT: &[&str] = &[
    "GPL-2.0",
    "GPL-3.0",
    "AGPL-3.0",
    "GPL-UNVERSIONED",
    "AGPL-UNVERSIONED",
];

const WEAK_COPYLEFT: &[&str] = &[
    "LGPL-2.0",
    "LGPL-2.1",
    "LGPL-3.0",
    "LGPL-UNVERSIONED",
    "MPL-2.0",
    "EPL-2.0",
];

/// What to do with a dependency whose license is unknown, or known but unlisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LicenseAction {
    /// Needs a human decision.
    Flag,
    Allow,
    Reject,
}

impl LicenseAction {
    fn verdict(self) -> Verdict {
        match self {
            LicenseAction::Flag => Verdict::NeedsReview,
            LicenseAction::Allow => Verdict::Compliant,
            LicenseAction::Reject => Verdict::Violation,
        }
    }
}

impl FromStr for LicenseAction {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flag" => Ok(LicenseAction::Flag),
            "allow" => Ok(LicenseAction::Allow),
            "reject" => Ok(LicenseAction::Reject),
            _ => Err(PolicyError::UnknownAction {
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for LicenseAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LicenseAction::Flag => write!(f, "flag"),
            LicenseAction::Allow => write!(f, "allow"),
            LicenseAction::Reject => write!(f, "reject"),
        }
    }
}

/// Allowed and restricted license sets plus the rules for everything else.
///
/// Only constructible through [`Policy::new`] (or the presets, which call it),
/// so the two sets are always disjoint and hold canonical ids only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    allowed_licenses: BTreeSet<String>,
    restricted_licenses: BTreeSet<String>,
    unknown_license_action: LicenseAction,
    unlisted_license_action: LicenseAction,
}

impl Policy {
    pub fn new<A, R>(
        allowed: A,
        restricted: R,
        unknown_license_action: LicenseAction,
        unlisted_license_action: LicenseAction,
    ) -> Result<Self, PolicyError>
    where
        A: IntoIterator,
        A::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        let allowed_licenses = collect_ids(allowed)?;
        let restricted_licenses = collect_ids(restricted)?;

        let overlap: Vec<String> = allowed_licenses
            .intersection(&restricted_licenses)
            .cloned()
            .collect();
        if !overlap.is_empty() {
            return Err(PolicyError::Overlap { licenses: overlap });
        }

        Ok(Self {
            allowed_licenses,
            restricted_licenses,
            unknown_license_action,
            unlisted_license_action,
        })
    }

    /// Built-in policy by name. See [`PRESET_NAMES`].
    ///
    /// - `default`: common permissive licenses allowed, GPL/AGPL restricted,
    ///   unknown licenses flagged.
    /// - `permissive`: the full permissive set allowed, strong copyleft restricted.
    /// - `strict`: as `permissive`, but weak copyleft is restricted too and
    ///   unknown or unlisted licenses are rejected outright.
    pub fn preset(name: &str) -> Result<Self, PolicyError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "default" => Policy::new(
                ["MIT", "Apache-2.0", "BSD-3-Clause", "ISC"],
                ["GPL-2.0", "GPL-3.0", "AGPL-3.0"],
                LicenseAction::Flag,
                LicenseAction::Flag,
            ),
            "permissive" => Policy::new(
                PERMISSIVE.iter().copied(),
                STRONG_COPYLEFT.iter().copied(),
                LicenseAction::Flag,
                LicenseAction::Flag,
            ),
            "strict" => Policy::new(
                PERMISSIVE.iter().copied(),
                STRONG_COPYLEFT.iter().chain(WEAK_COPYLEFT).copied(),
                LicenseAction::Reject,
                LicenseAction::Reject,
            ),
            _ => Err(PolicyError::UnknownPreset {
                name: name.to_string(),
            }),
        }
    }

    pub fn allowed_licenses(&self) -> &BTreeSet<String> {
        &self.allowed_licenses
    }

    pub fn restricted_licenses(&self) -> &BTreeSet<String> {
        &self.restricted_licenses
    }

    pub fn unknown_license_action(&self) -> LicenseAction {
        self.unknown_license_action
    }

    pub fn unlisted_license_action(&self) -> LicenseAction {
        self.unlisted_license_action
    }

    /// Judge a canonical license id. First matching rule wins:
    /// `UNKNOWN`, then restricted, then allowed, then unlisted.
    pub fn evaluate(&self, canonical_license_id: &str) -> (Verdict, String) {
        if canonical_license_id == UNKNOWN_LICENSE {
            return (
                self.unknown_license_action.verdict(),
                "license could not be determined".to_string(),
            );
        }

        if self.restricted_licenses.contains(canonical_license_id) {
            return (
                Verdict::Violation,
                format!("{} is restricted by policy", canonical_license_id),
            );
        }

        if self.allowed_licenses.contains(canonical_license_id) {
            return (
                Verdict::Compliant,
                format!("{} is allowed by policy", canonical_license_id),
            );
        }

        let verdict = self.unlisted_license_action.verdict();
        let reason = match self.unlisted_license_action {
            LicenseAction::Flag => {
                format!("{} is not covered by policy", canonical_license_id)
            }
            LicenseAction::Allow => format!(
                "{} is not covered by policy; unlisted licenses are allowed",
                canonical_license_id
            ),
            LicenseAction::Reject => format!(
                "{} is not covered by policy; unlisted licenses are rejected",
                canonical_license_id
            ),
        };
        (verdict, reason)
    }
}

/// Free-function form of [`Policy::evaluate`].
pub fn evaluate(canonical_license_id: &str, policy: &Policy) -> (Verdict, String) {
    policy.evaluate(canonical_license_id)
}

fn collect_ids<I>(ids: I) -> Result<BTreeSet<String>, PolicyError>
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    ids.into_iter()
        .map(|id| {
            let id: String = id.into();
            let trimmed = id.trim();
            if trimmed.is_empty() {
                return Err(PolicyError::EmptyLicenseId);
            }
            // Entries are matched against classifier output, so anything the
            // classifier cannot produce would never match.
            spdx::canonical_id(trimmed)
                .map(str::to_string)
                .ok_or_else(|| PolicyError::UnrecognisedLicenseId {
                    id: trimmed.to_string(),
                })
        })
        .collect()
}
