use thiserror::Error;

use crate::manifest::ManifestFormat;

/// A manifest could not be turned into a dependency list. Fatal to the run.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("manifest is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("invalid {format} manifest: {details}")]
    Syntax {
        format: ManifestFormat,
        details: String,
    },

    #[error("{location}: dependency name is empty")]
    EmptyName { location: String },

    #[error("{location}: invalid package name `{name}`")]
    InvalidName { location: String, name: String },
}

impl ParseError {
    pub fn syntax(format: ManifestFormat, details: impl Into<String>) -> Self {
        ParseError::Syntax {
            format,
            details: details.into(),
        }
    }
}

/// A policy could not be constructed. Raised before any dependency is processed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error("licenses listed as both allowed and restricted: {}", .licenses.join(", "))]
    Overlap { licenses: Vec<String> },

    #[error("unknown license action `{value}` (expected flag, allow or reject)")]
    UnknownAction { value: String },

    #[error("unknown policy preset `{name}` (expected one of: {})", crate::policy::PRESET_NAMES.join(", "))]
    UnknownPreset { name: String },

    #[error("policy contains an empty license id")]
    EmptyLicenseId,

    #[error("policy lists `{id}`, which is not a recognised license id")]
    UnrecognisedLicenseId { id: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_message_lists_licenses() {
        let err = PolicyError::Overlap {
            licenses: vec!["GPL-3.0".to_string(), "MIT".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "licenses listed as both allowed and restricted: GPL-3.0, MIT"
        );
    }

    #[test]
    fn test_unrecognised_id_message() {
        let err = PolicyError::UnrecognisedLicenseId {
            id: "WTFPL".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "policy lists `WTFPL`, which is not a recognised license id"
        );
    }

    #[test]
    fn test_invalid_name_message() {
        let err = ParseError::InvalidName {
            location: "line 3".to_string(),
            name: "bad name!".to_string(),
        };
        assert_eq!(err.to_string(), "line 3: invalid package name `bad name!`");
    }
}
