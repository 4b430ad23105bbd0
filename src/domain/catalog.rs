use super::Component;
use anyhow::{Result, bail};
use std::collections::HashSet;

pub const RUNTIME_PREFIX: &str = "srcd-cli-";
pub const NETWORK_NAME: &str = "srcd-cli-network";
pub const BBLFSH_VOLUME: &str = "srcd-cli-bblfsh-storage";

pub const GITBASE_IMAGE: &str = "srcd/gitbase";
pub const GITBASE_WEB_IMAGE: &str = "srcd/gitbase-web";
pub const BBLFSHD_IMAGE: &str = "bblfsh/bblfshd";
pub const BBLFSH_WEB_IMAGE: &str = "bblfsh/web";

/// Image repository plus the version the catalog pins it to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinnedImage {
    pub image: String,
    pub version: String,
}

impl PinnedImage {
    pub fn new(image: &str, version: &str) -> Self {
        Self {
            image: image.to_string(),
            version: version.to_string(),
        }
    }
}

/// Immutable description of the product: which namespaces it owns, how its
/// runtime objects are named and which images it ships.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    /// First entry is the primary namespace
    pub namespaces: Vec<String>,
    pub runtime_prefix: String,
    pub network: String,
    pub images: Vec<PinnedImage>,
    /// Image repositories whose behavior depends on the caller's directory
    pub workdir_dependent: Vec<String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            namespaces: vec!["srcd".to_string(), "bblfsh".to_string()],
            runtime_prefix: RUNTIME_PREFIX.to_string(),
            network: NETWORK_NAME.to_string(),
            images: vec![
                PinnedImage::new(GITBASE_IMAGE, "v0.17.1"),
                PinnedImage::new(GITBASE_WEB_IMAGE, "v0.3.0"),
                PinnedImage::new(BBLFSHD_IMAGE, "v2.9.2-drivers"),
                PinnedImage::new(BBLFSH_WEB_IMAGE, "v0.7.0"),
            ],
            // bblfshd does not depend on the workdir but it does on the user dir
            workdir_dependent: vec![GITBASE_IMAGE.to_string(), BBLFSHD_IMAGE.to_string()],
        }
    }
}

/// The fixed list of known components.
#[derive(Debug, Clone)]
pub struct Catalog {
    config: CatalogConfig,
    components: Vec<Component>,
    workdir_dependent: HashSet<String>,
}

impl Catalog {
    pub fn new(config: CatalogConfig) -> Result<Self> {
        if config.namespaces.is_empty() {
            bail!("catalog needs at least one namespace");
        }
        if config.runtime_prefix.is_empty() {
            bail!("catalog needs a runtime name prefix");
        }

        let mut seen = HashSet::new();
        let mut components = Vec::with_capacity(config.images.len());

        for pinned in &config.images {
            if !is_in_namespaces(&config.namespaces, &pinned.image) {
                bail!("image '{}' is outside the product namespaces", pinned.image);
            }
            if pinned.version.trim().is_empty() {
                bail!("image '{}' has no pinned version", pinned.image);
            }
            if !seen.insert(pinned.image.clone()) {
                bail!("image '{}' is listed more than once", pinned.image);
            }

            let name = derive_name(&config.runtime_prefix, &config.namespaces[0], &pinned.image);
            components.push(Component::new(name, &pinned.image, &pinned.version));
        }

        let workdir_dependent = config.workdir_dependent.iter().cloned().collect();

        Ok(Self {
            config,
            components,
            workdir_dependent,
        })
    }

    /// Pinned components in catalog order
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Looks a pinned component up by container name or image repository
    pub fn find(&self, key: &str) -> Option<&Component> {
        self.components
            .iter()
            .find(|c| c.name == key || c.image == key)
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    pub fn network(&self) -> &str {
        &self.config.network
    }

    /// True if the image id (`repo[:tag]`) lives in one of the product namespaces
    pub fn is_srcd_component(&self, id: &str) -> bool {
        is_in_namespaces(&self.config.namespaces, id)
    }

    /// True if a container or volume name carries the product prefix
    pub fn is_from_engine(&self, name: &str) -> bool {
        name.starts_with(&self.config.runtime_prefix)
    }

    pub fn is_workdir_dependent(&self, cmp: &Component) -> bool {
        self.workdir_dependent.contains(&cmp.image)
    }
}

fn is_in_namespaces(namespaces: &[String], id: &str) -> bool {
    let namespace = id.split('/').next().unwrap_or_default();
    namespaces.iter().any(|ns| ns == namespace)
}

/// Container name for an image: the runtime prefix plus the last path
/// segment, qualified with the namespace unless the namespace is the primary
/// one or the segment already starts with it.
fn derive_name(prefix: &str, primary_namespace: &str, image: &str) -> String {
    let mut parts = image.rsplitn(2, '/');
    let segment = parts.next().unwrap_or(image);
    let namespace = parts
        .next()
        .and_then(|rest| rest.split('/').next())
        .unwrap_or(primary_namespace);

    if namespace == primary_namespace || segment.starts_with(namespace) {
        format!("{prefix}{segment}")
    } else {
        format!("{prefix}{namespace}-{segment}")
    }
}
