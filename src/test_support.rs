use crate::domain::{
    CallContext, ContainerRuntime, ContainerSummary, RuntimeError, VolumeSummary,
};
use std::collections::BTreeMap;
use std::sync::RwLock;

#[derive(Debug, Clone)]
pub struct MockContainer {
    pub name: String,
    pub image_with_version: String,
    pub running: bool,
}

/// In-memory runtime that records every call it receives.
///
/// `set_fail_on` accepts either an operation (`"remove_volume"`) or an
/// operation bound to a target (`"is_installed:srcd/gitbase"`).
#[derive(Debug)]
pub struct MockRuntime {
    containers: RwLock<Vec<MockContainer>>,
    images: RwLock<BTreeMap<String, Vec<String>>>,
    volumes: RwLock<Vec<String>>,
    network: RwLock<bool>,
    commands: RwLock<Vec<String>>,
    fail_on: RwLock<Option<String>>,
}

impl MockRuntime {
    pub fn new() -> Self {
        Self {
            containers: RwLock::new(Vec::new()),
            images: RwLock::new(BTreeMap::new()),
            volumes: RwLock::new(Vec::new()),
            network: RwLock::new(false),
            commands: RwLock::new(Vec::new()),
            fail_on: RwLock::new(None),
        }
    }

    pub fn add_container(&self, name: &str, image_with_version: &str, running: bool) {
        self.containers.write().unwrap().push(MockContainer {
            name: name.to_string(),
            image_with_version: image_with_version.to_string(),
            running,
        });
    }

    pub fn add_image(&self, image: &str, version: &str) {
        let mut images = self.images.write().unwrap();
        let versions = images.entry(image.to_string()).or_default();
        if !versions.iter().any(|v| v == version) {
            versions.push(version.to_string());
        }
    }

    pub fn add_volume(&self, name: &str) {
        self.volumes.write().unwrap().push(name.to_string());
    }

    pub fn set_network(&self, exists: bool) {
        *self.network.write().unwrap() = exists;
    }

    pub fn set_fail_on(&self, operation: &str) {
        *self.fail_on.write().unwrap() = Some(operation.to_string());
    }

    pub fn clear_fail_on(&self) {
        *self.fail_on.write().unwrap() = None;
    }

    pub fn get_commands(&self) -> Vec<String> {
        self.commands.read().unwrap().clone()
    }

    pub fn clear_commands(&self) {
        self.commands.write().unwrap().clear();
    }

    pub fn container_exists(&self, name: &str) -> bool {
        self.containers.read().unwrap().iter().any(|c| c.name == name)
    }

    pub fn volume_exists(&self, name: &str) -> bool {
        self.volumes.read().unwrap().iter().any(|v| v == name)
    }

    pub fn network_exists(&self) -> bool {
        *self.network.read().unwrap()
    }

    pub fn image_exists(&self, image: &str, version: &str) -> bool {
        self.images
            .read()
            .unwrap()
            .get(image)
            .is_some_and(|versions| versions.iter().any(|v| v == version))
    }

    fn record_command(&self, cmd: &str) {
        self.commands.write().unwrap().push(cmd.to_string());
    }

    fn check_fail(&self, operation: &str, target: &str) -> Result<(), RuntimeError> {
        if let Some(ref fail_on) = *self.fail_on.read().unwrap() {
            let bound = format!("{operation}:{target}");
            if fail_on == operation || *fail_on == bound {
                return Err(RuntimeError::Command {
                    context: operation.to_string(),
                    status: "exit status: 1".to_string(),
                    stderr: format!("Mock failure on: {}", bound),
                });
            }
        }
        Ok(())
    }
}

impl Default for MockRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerRuntime for MockRuntime {
    fn list_containers(&self) -> Result<Vec<ContainerSummary>, RuntimeError> {
        self.record_command("list_containers");
        self.check_fail("list_containers", "")?;

        Ok(self
            .containers
            .read()
            .unwrap()
            .iter()
            .map(|c| ContainerSummary {
                names: vec![format!("/{}", c.name)],
            })
            .collect())
    }

    fn remove_container(&self, name: &str) -> Result<(), RuntimeError> {
        self.record_command(&format!("remove_container:{}", name));
        self.check_fail("remove_container", name)?;

        let mut containers = self.containers.write().unwrap();
        let before = containers.len();
        containers.retain(|c| c.name != name);
        if containers.len() == before {
            return Err(RuntimeError::NotFound(format!("container {name}")));
        }
        Ok(())
    }

    fn is_running(&self, name: &str, image_with_version: &str) -> Result<bool, RuntimeError> {
        self.record_command(&format!("is_running:{}", name));
        self.check_fail("is_running", name)?;

        Ok(self
            .containers
            .read()
            .unwrap()
            .iter()
            .any(|c| c.name == name && c.running && c.image_with_version == image_with_version))
    }

    fn is_installed(
        &self,
        ctx: &CallContext,
        image: &str,
        version: &str,
    ) -> Result<bool, RuntimeError> {
        self.record_command(&format!("is_installed:{}:{}", image, version));
        ctx.check("checking image")?;
        self.check_fail("is_installed", image)?;

        Ok(self.image_exists(image, version))
    }

    fn versions_installed(
        &self,
        ctx: &CallContext,
        image: &str,
    ) -> Result<Vec<String>, RuntimeError> {
        self.record_command(&format!("versions_installed:{}", image));
        ctx.check("listing image versions")?;
        self.check_fail("versions_installed", image)?;

        Ok(self
            .images
            .read()
            .unwrap()
            .get(image)
            .cloned()
            .unwrap_or_default())
    }

    fn pull(&self, ctx: &CallContext, image: &str, version: &str) -> Result<(), RuntimeError> {
        self.record_command(&format!("pull:{}:{}", image, version));
        ctx.check("pulling image")?;
        self.check_fail("pull", image)?;

        self.add_image(image, version);
        Ok(())
    }

    fn list_volumes(&self, ctx: &CallContext) -> Result<Vec<VolumeSummary>, RuntimeError> {
        self.record_command("list_volumes");
        ctx.check("listing volumes")?;
        self.check_fail("list_volumes", "")?;

        Ok(self
            .volumes
            .read()
            .unwrap()
            .iter()
            .map(|name| VolumeSummary { name: name.clone() })
            .collect())
    }

    fn remove_volume(&self, ctx: &CallContext, name: &str) -> Result<(), RuntimeError> {
        self.record_command(&format!("remove_volume:{}", name));
        ctx.check("removing volume")?;
        self.check_fail("remove_volume", name)?;

        let mut volumes = self.volumes.write().unwrap();
        let before = volumes.len();
        volumes.retain(|v| v != name);
        if volumes.len() == before {
            return Err(RuntimeError::NotFound(format!("volume {name}")));
        }
        Ok(())
    }

    fn remove_network(&self, ctx: &CallContext) -> Result<(), RuntimeError> {
        self.record_command("remove_network");
        ctx.check("removing network")?;
        self.check_fail("remove_network", "")?;

        let mut network = self.network.write().unwrap();
        if !*network {
            return Err(RuntimeError::NotFound("network".to_string()));
        }
        *network = false;
        Ok(())
    }

    fn remove_image(
        &self,
        ctx: &CallContext,
        image_with_version: &str,
    ) -> Result<(), RuntimeError> {
        self.record_command(&format!("remove_image:{}", image_with_version));
        ctx.check("removing image")?;
        self.check_fail("remove_image", image_with_version)?;

        let (image, version) = crate::domain::split_image_id(image_with_version);
        let mut images = self.images.write().unwrap();
        let Some(versions) = images.get_mut(&image) else {
            return Err(RuntimeError::NotFound(format!("image {image_with_version}")));
        };

        let before = versions.len();
        versions.retain(|v| *v != version);
        if versions.len() == before {
            return Err(RuntimeError::NotFound(format!("image {image_with_version}")));
        }
        if versions.is_empty() {
            images.remove(&image);
        }
        Ok(())
    }
}
