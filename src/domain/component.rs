use std::fmt;

/// A named, versioned product container definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Component {
    pub name: String,
    pub image: String,
    pub version: String,
}

impl Component {
    pub fn new(
        name: impl Into<String>,
        image: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            image: image.into(),
            version: version.into(),
        }
    }

    /// Another member of the same family, at `version`.
    pub fn with_version(&self, version: impl Into<String>) -> Self {
        Self {
            name: self.name.clone(),
            image: self.image.clone(),
            version: version.into(),
        }
    }

    pub fn image_with_version(&self) -> String {
        format!("{}:{}", self.image, self.version)
    }

    /// Components of the same family share the image repository.
    pub fn same_family(&self, other: &Component) -> bool {
        self.image == other.image
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.image_with_version())
    }
}

/// Container as reported by the runtime listing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContainerSummary {
    pub names: Vec<String>,
}

impl ContainerSummary {
    /// Primary name without the leading slash some runtimes add.
    pub fn primary_name(&self) -> Option<&str> {
        self.names.first().map(|n| n.trim_start_matches('/'))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeSummary {
    pub name: String,
}

/// Splits `repo[:tag]` into repository and version, defaulting to `latest`.
///
/// A colon that belongs to a registry port (`host:5000/repo`) is not a tag.
pub fn split_image_id(id: &str) -> (String, String) {
    match id.rfind(':') {
        Some(idx) if !id[idx + 1..].contains('/') => {
            (id[..idx].to_string(), id[idx + 1..].to_string())
        }
        _ => (id.to_string(), "latest".to_string()),
    }
}
