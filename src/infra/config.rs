use crate::domain::CatalogConfig;
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_CONFIG_NAME: &str = "config.yml";
pub const DEFAULT_RUNTIME_BINARY: &str = "docker";

pub fn default_config_dir() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".srcd")
}

pub fn default_config_path() -> PathBuf {
    default_config_dir().join(DEFAULT_CONFIG_NAME)
}

/// Expands a leading `~` the way a shell would.
pub fn expand_path(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path.to_string_lossy().as_ref()).into_owned())
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Runtime command line to drive (`docker`, `podman`)
    pub binary: Option<String>,
}

/// Contents of `~/.srcd/config.yml`. Every section is optional.
#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Pinned version overrides keyed by image repository
    #[serde(default)]
    pub components: BTreeMap<String, String>,
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

impl AppConfig {
    pub fn runtime_binary(&self) -> &str {
        self.runtime
            .binary
            .as_deref()
            .unwrap_or(DEFAULT_RUNTIME_BINARY)
    }

    /// Built-in catalog with the configured version overrides applied.
    pub fn catalog_config(&self) -> Result<CatalogConfig> {
        let mut config = CatalogConfig::default();

        for (image, version) in &self.components {
            if version.trim().is_empty() {
                bail!("Empty version configured for '{}'", image);
            }

            let Some(pinned) = config.images.iter_mut().find(|p| p.image == *image) else {
                bail!("Unknown component image '{}' in configuration", image);
            };

            debug!("pinning {} to {} (was {})", image, version, pinned.version);
            pinned.version = version.clone();
        }

        Ok(config)
    }
}

/// Loads the configuration file, falling back to defaults when it is absent.
pub fn load_app_config(path: &Path) -> Result<AppConfig> {
    let path = expand_path(path);

    if !path.exists() {
        debug!("no configuration at {:?}, using defaults", path);
        return Ok(AppConfig::default());
    }

    let content =
        fs::read_to_string(&path).with_context(|| format!("reading config at {:?}", path))?;

    if content.trim().is_empty() {
        return Ok(AppConfig::default());
    }

    serde_yml::from_str(&content).with_context(|| format!("parsing config at {:?}", path))
}
