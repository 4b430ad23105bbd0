use super::{CallContext, ContainerSummary, RuntimeError, VolumeSummary};
use std::fmt::Debug;

/// Trait for container runtime operations
///
/// Remove primitives return [`RuntimeError::NotFound`] when the object is
/// already gone; callers decide whether that counts as success.
pub trait ContainerRuntime: Send + Sync + Debug {
    /// List every container, running or not
    fn list_containers(&self) -> Result<Vec<ContainerSummary>, RuntimeError>;

    /// Force-remove a container by name
    fn remove_container(&self, name: &str) -> Result<(), RuntimeError>;

    /// True if the container `name` runs exactly `image_with_version`
    fn is_running(&self, name: &str, image_with_version: &str) -> Result<bool, RuntimeError>;

    /// True if `image:version` is present locally
    fn is_installed(
        &self,
        ctx: &CallContext,
        image: &str,
        version: &str,
    ) -> Result<bool, RuntimeError>;

    /// Every locally present tag of an image repository
    fn versions_installed(
        &self,
        ctx: &CallContext,
        image: &str,
    ) -> Result<Vec<String>, RuntimeError>;

    /// Pull `image:version`
    fn pull(&self, ctx: &CallContext, image: &str, version: &str) -> Result<(), RuntimeError>;

    /// List every volume
    fn list_volumes(&self, ctx: &CallContext) -> Result<Vec<VolumeSummary>, RuntimeError>;

    /// Remove a volume by name
    fn remove_volume(&self, ctx: &CallContext, name: &str) -> Result<(), RuntimeError>;

    /// Remove the product network
    fn remove_network(&self, ctx: &CallContext) -> Result<(), RuntimeError>;

    /// Remove an image by `repo:tag`
    fn remove_image(&self, ctx: &CallContext, image_with_version: &str)
    -> Result<(), RuntimeError>;
}
