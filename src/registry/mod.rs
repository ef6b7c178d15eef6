//! License lookups against public package registries.
//!
//! Each ecosystem has a [`LicenseRegistry`] adapter ([`pypi`], [`npm`]) that
//! turns a registry response into a [`LicenseField`]. The [`Resolver`] sits in
//! front of them and owns the run-level concerns: deduplication, bounded
//! concurrency, per-lookup timeout, retries, and turning every failure into an
//! `UNKNOWN` [`LicenseInfo`] instead of an error.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use indicatif::ProgressBar;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;

use crate::config::RegistrySettings;
use crate::models::{Dependency, Ecosystem, LicenseInfo};

pub mod npm;
pub mod pypi;

const USER_AGENT: &str = concat!("license-verdict/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("lookup timed out after {0:?}")]
    Timeout(Duration),

    #[error("registry returned HTTP {0}")]
    Status(StatusCode),

    #[error("package not found in registry")]
    NotFound,

    #[error("malformed registry response: {0}")]
    Malformed(String),
}

impl RegistryError {
    /// Worth another attempt: network trouble, timeouts, throttling, server errors.
    pub fn is_transient(&self) -> bool {
        match self {
            RegistryError::Transport(_) | RegistryError::Timeout(_) => true,
            RegistryError::Status(status) => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            RegistryError::NotFound | RegistryError::Malformed(_) => false,
        }
    }
}

/// The shapes a registry's license metadata comes in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LicenseField {
    /// A plain license string.
    Text(String),
    /// npm's `{ "type": ..., "url": ... }` record; only `type` matters.
    Structured { kind: Option<String> },
    /// Taken from a PyPI `License :: ...` classifier.
    Classifier(String),
    Absent,
}

impl LicenseField {
    /// The license text to classify, if any.
    pub fn into_raw(self) -> Option<String> {
        let text = match self {
            LicenseField::Text(text) | LicenseField::Classifier(text) => Some(text),
            LicenseField::Structured { kind } => kind,
            LicenseField::Absent => None,
        };
        text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
    }
}

#[async_trait]
pub trait LicenseRegistry: Send + Sync {
    /// Fetch the license metadata of the latest published version of `name`.
    async fn fetch_license(&self, name: &str) -> Result<LicenseField, RegistryError>;
}

/// Build the HTTP client shared by the registry adapters.
pub fn http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
}

/// GET `url` and decode a JSON body, mapping 404 to [`RegistryError::NotFound`].
async fn get_json(client: &Client, url: &str) -> Result<Value, RegistryError> {
    let response = client
        .get(url)
        .header("Accept", "application/json")
        .send()
        .await?;

    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Err(RegistryError::NotFound);
    }
    if !status.is_success() {
        return Err(RegistryError::Status(status));
    }

    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| RegistryError::Malformed(e.to_string()))
}

/// Resolves dependencies to raw license text. Never fails: lookup problems
/// become an `UNKNOWN` [`LicenseInfo`] carrying the cause.
pub struct Resolver {
    python: Box<dyn LicenseRegistry>,
    node: Box<dyn LicenseRegistry>,
    timeout: Duration,
    retries: u32,
    concurrency: usize,
    backoff: Duration,
}

impl Resolver {
    pub fn new(
        python: impl LicenseRegistry + 'static,
        node: impl LicenseRegistry + 'static,
        settings: &RegistrySettings,
    ) -> Self {
        Self {
            python: Box::new(python),
            node: Box::new(node),
            timeout: settings.timeout(),
            retries: settings.retries,
            concurrency: settings.concurrency.max(1),
            backoff: Duration::from_millis(200),
        }
    }

    /// Resolver backed by the public PyPI and npm registries.
    pub fn from_settings(settings: &RegistrySettings) -> Result<Self, reqwest::Error> {
        let client = http_client(settings.timeout())?;
        Ok(Self::new(
            pypi::PypiRegistry::new(client.clone(), &settings.pypi_url),
            npm::NpmRegistry::new(client, &settings.npm_url),
            settings,
        ))
    }

    #[cfg(test)]
    fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    fn registry_for(&self, ecosystem: Ecosystem) -> &dyn LicenseRegistry {
        match ecosystem {
            Ecosystem::Python => self.python.as_ref(),
            Ecosystem::Node => self.node.as_ref(),
        }
    }

    /// One lookup with timeout and bounded retries.
    pub async fn resolve(&self, dep: &Dependency) -> LicenseInfo {
        let registry = self.registry_for(dep.ecosystem);
        let mut attempt: u32 = 0;

        loop {
            let lookup = registry.fetch_license(&dep.name);
            let outcome = match tokio::time::timeout(self.timeout, lookup).await {
                Ok(result) => result,
                Err(_) => Err(RegistryError::Timeout(self.timeout)),
            };

            match outcome {
                Ok(field) => {
                    return match field.into_raw() {
                        Some(text) => LicenseInfo::raw(Some(text)),
                        None => LicenseInfo::unresolved("registry metadata has no license"),
                    };
                }
                Err(e) if e.is_transient() && attempt < self.retries => {
                    attempt += 1;
                    tokio::time::sleep(self.backoff * attempt).await;
                }
                Err(e) => return LicenseInfo::unresolved(e.to_string()),
            }
        }
    }

    /// Resolve every dependency, returning one [`LicenseInfo`] per input in input order.
    ///
    /// Each unique (ecosystem, name) pair is looked up once; up to
    /// `concurrency` lookups run at a time.
    pub async fn resolve_all(
        &self,
        deps: &[Dependency],
        progress: Option<&ProgressBar>,
    ) -> Vec<LicenseInfo> {
        let mut slots: HashMap<(Ecosystem, String), usize> = HashMap::new();
        let mut unique: Vec<&Dependency> = Vec::new();
        for dep in deps {
            slots.entry(dep.lookup_key()).or_insert_with(|| {
                unique.push(dep);
                unique.len() - 1
            });
        }

        if let Some(pb) = progress {
            pb.set_length(unique.len() as u64);
        }

        let completed: Vec<(usize, LicenseInfo)> = stream::iter(unique.iter().enumerate())
            .map(|(slot, dep)| async move {
                let info = self.resolve(dep).await;
                if let Some(pb) = progress {
                    pb.inc(1);
                }
                (slot, info)
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        // Completion order is arbitrary; put results back by slot.
        let mut resolved: Vec<Option<LicenseInfo>> = vec![None; unique.len()];
        for (slot, info) in completed {
            resolved[slot] = Some(info);
        }

        deps.iter()
            .map(|dep| {
                slots
                    .get(&dep.lookup_key())
                    .and_then(|&slot| resolved[slot].clone())
                    .unwrap_or_else(|| LicenseInfo::unresolved("lookup did not complete"))
            })
            .collect()
    }
}
