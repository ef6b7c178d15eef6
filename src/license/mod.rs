//! License text normalization.
//!
//! - [`spdx`]: the fixed table of canonical ids and their known spellings.
//! - [`classifier`]: [`LicenseClassifier`](classifier::LicenseClassifier), which
//!   maps raw registry text to a canonical id or `UNKNOWN`.

pub mod classifier;
pub mod spdx;
