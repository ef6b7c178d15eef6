use indicatif::ProgressBar;

use crate::error::ParseError;
use crate::license::classifier::LicenseClassifier;
use crate::manifest::{self, ManifestFormat};
use crate::models::{DependencyResult, Report};
use crate::policy::{self, Policy};
use crate::registry::Resolver;
use crate::report;

/// One analysis run: parse → resolve → classify → evaluate → assemble.
///
/// Only a [`ParseError`] can abort a run. Registry failures surface as
/// `UNKNOWN` licenses and are judged by the policy like any other result.
pub struct Scanner {
    resolver: Resolver,
    classifier: LicenseClassifier,
}

impl Scanner {
    pub fn new(resolver: Resolver, classifier: LicenseClassifier) -> Self {
        Self {
            resolver,
            classifier,
        }
    }

    pub async fn scan(
        &self,
        raw_manifest: &[u8],
        format: ManifestFormat,
        policy: &Policy,
        progress: Option<&ProgressBar>,
    ) -> Result<Report, ParseError> {
        let deps = manifest::parse(raw_manifest, format)?;
        let licenses = self.resolver.resolve_all(&deps, progress).await;

        let results = deps
            .into_iter()
            .zip(licenses)
            .map(|(dependency, mut license)| {
                license.canonical_license_id =
                    self.classifier.classify(license.raw_license_text.as_deref());

                let (verdict, mut reason) = policy::evaluate(&license.canonical_license_id, policy);
                if license.is_unknown() {
                    if let Some(cause) = &license.lookup_error {
                        reason = format!("{}: {}", reason, cause);
                    } else if let Some(raw) = &license.raw_license_text {
                        reason = format!("{} from \"{}\"", reason, raw);
                    }
                }

                DependencyResult {
                    dependency,
                    license,
                    verdict,
                    reason,
                }
            })
            .collect();

        Ok(report::assemble(results))
    }
}
