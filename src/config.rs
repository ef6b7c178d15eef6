use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::error::PolicyError;
use crate::policy::{LicenseAction, Policy};

/// Root configuration structure, deserialized from `.license-verdict/config.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// License policy rules.
    #[serde(default)]
    pub policy: PolicyConfig,
    /// Registry lookup tuning.
    #[serde(default)]
    pub registry: RegistrySettings,
}

/// Policy as written in the config file. Every field is optional; unset
/// fields come from the base `preset`.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyConfig {
    /// Base preset name. Defaults to `"default"`.
    pub preset: Option<String>,
    /// Replaces the preset's allowed set.
    pub allowed: Option<Vec<String>>,
    /// Replaces the preset's restricted set.
    pub restricted: Option<Vec<String>>,
    /// `flag`, `allow` or `reject` for licenses that could not be determined.
    pub unknown: Option<String>,
    /// `flag`, `allow` or `reject` for licenses in neither set.
    pub unlisted: Option<String>,
}

impl PolicyConfig {
    /// Build the effective [`Policy`]. `preset_override` (from `--policy`)
    /// replaces the configured preset name.
    ///
    /// Everything goes through [`Policy::new`], so a bad config fails here
    /// instead of degrading to a default.
    pub fn build(&self, preset_override: Option<&str>) -> Result<Policy, PolicyError> {
        let preset_name = preset_override
            .or(self.preset.as_deref())
            .unwrap_or("default");
        let base = Policy::preset(preset_name)?;

        let unknown = match &self.unknown {
            Some(action) => action.parse::<LicenseAction>()?,
            None => base.unknown_license_action(),
        };
        let unlisted = match &self.unlisted {
            Some(action) => action.parse::<LicenseAction>()?,
            None => base.unlisted_license_action(),
        };

        let allowed = match &self.allowed {
            Some(ids) => ids.clone(),
            None => base.allowed_licenses().iter().cloned().collect(),
        };
        let restricted = match &self.restricted {
            Some(ids) => ids.clone(),
            None => base.restricted_licenses().iter().cloned().collect(),
        };

        Policy::new(allowed, restricted, unknown, unlisted)
    }
}

/// Registry lookup settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistrySettings {
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Extra attempts after a transient failure.
    pub retries: u32,
    /// Maximum lookups in flight.
    pub concurrency: usize,
    pub pypi_url: String,
    pub npm_url: String,
}

impl RegistrySettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// A zero timeout would fail every lookup; zero concurrency would run none.
    pub fn validate(&self) -> Result<()> {
        if self.timeout_ms == 0 {
            bail!("registry timeout must be greater than zero");
        }
        if self.concurrency == 0 {
            bail!("registry concurrency must be at least 1");
        }
        Ok(())
    }
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            retries: 1,
            concurrency: 8,
            pypi_url: "https://pypi.org".to_string(),
            npm_url: "https://registry.npmjs.org".to_string(),
        }
    }
}

/// Load configuration, searching in order:
///
/// 1. `config_override`: path passed via `--config`
/// 2. `<project_path>/.license-verdict/config.toml`
/// 3. `~/.config/license-verdict/config.toml`
/// 4. Built-in [`Config::default`]
pub fn load_config(project_path: &Path, config_override: Option<&Path>) -> Result<Config> {
    if let Some(path) = config_override {
        return read_config(path);
    }

    let project_config = project_path.join(".license-verdict").join("config.toml");
    if project_config.exists() {
        return read_config(&project_config);
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home
            .join(".config")
            .join("license-verdict")
            .join("config.toml");
        if home_config.exists() {
            return read_config(&home_config);
        }
    }

    Ok(Config::default())
}

fn read_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config: Config =
        toml::from_str(&content).with_context(|| format!("invalid config {}", path.display()))?;
    config
        .registry
        .validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(config)
}
