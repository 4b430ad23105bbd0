use super::{Filter, Registry};
use crate::domain::{CallContext, ComponentError, ContainerRuntime, RuntimeError, split_image_id};
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub const IMAGE_REMOVAL_TIMEOUT: Duration = Duration::from_secs(60);

/// What a teardown actually removed. Resources that were already gone are
/// not counted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeardownReport {
    pub containers: usize,
    pub volumes: usize,
    pub network: bool,
    pub images: usize,
}

impl TeardownReport {
    pub fn is_empty(&self) -> bool {
        self.containers == 0 && self.volumes == 0 && !self.network && self.images == 0
    }
}

/// Installs single components and tears down everything the product left
/// on the runtime.
///
/// Teardown is sequential and stops at the first failing resource: later
/// stages never run once an earlier one failed, and nothing already removed
/// is restored.
pub struct Orchestrator {
    registry: Arc<Registry>,
    runtime: Arc<dyn ContainerRuntime>,
}

impl Orchestrator {
    pub fn new(registry: Arc<Registry>, runtime: Arc<dyn ContainerRuntime>) -> Self {
        Self { registry, runtime }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Pulls the image `id` (`repo[:tag]`) if it belongs to the product.
    pub fn install(&self, ctx: &CallContext, id: &str) -> Result<(), ComponentError> {
        let (image, version) = self.validate(id)?;
        info!("installing {}:{}", image, version);
        self.runtime.pull(ctx, &image, &version)?;
        Ok(())
    }

    /// Whether the exact image `id` is installed. A foreign id is an error,
    /// not `false`.
    pub fn is_installed(&self, ctx: &CallContext, id: &str) -> Result<bool, ComponentError> {
        let (image, version) = self.validate(id)?;
        Ok(self.runtime.is_installed(ctx, &image, &version)?)
    }

    /// Stops every product container.
    ///
    /// Containers are removed rather than stopped so the next start always
    /// uses the current configuration.
    pub fn stop(&self) -> Result<TeardownReport> {
        info!("stopping containers...");

        let mut report = TeardownReport::default();
        self.remove_containers(&mut report)
            .context("unable to stop all containers")?;

        Ok(report)
    }

    /// Removes product containers, volumes and network, then the installed
    /// images of every known version when `images` is set.
    pub fn prune(&self, ctx: &CallContext, images: bool) -> Result<TeardownReport> {
        let mut report = TeardownReport::default();

        info!("removing containers...");
        self.remove_containers(&mut report)
            .context("unable to remove all containers")?;

        info!("removing volumes...");
        self.remove_volumes(ctx, &mut report)
            .context("unable to remove volumes")?;

        info!("removing network...");
        match self.runtime.remove_network(ctx) {
            Ok(()) => report.network = true,
            Err(e) if e.is_not_found() => debug!("network already removed"),
            Err(e) => return Err(e).context("unable to remove network"),
        }

        if images {
            info!("removing images...");
            self.remove_images(ctx, &mut report)
                .context("unable to remove all images")?;
        }

        Ok(report)
    }

    fn validate(&self, id: &str) -> Result<(String, String), ComponentError> {
        if !self.registry.catalog().is_srcd_component(id) {
            return Err(ComponentError::NotSrcd(id.to_string()));
        }

        Ok(split_image_id(id))
    }

    fn remove_containers(&self, report: &mut TeardownReport) -> Result<(), RuntimeError> {
        let containers = self.runtime.list_containers()?;

        for container in &containers {
            let Some(name) = container.primary_name() else {
                continue;
            };

            if !self.registry.catalog().is_from_engine(name) {
                continue;
            }

            info!("removing container {}", name);
            match self.runtime.remove_container(name) {
                Ok(()) => report.containers += 1,
                Err(e) if e.is_not_found() => debug!("container {} already gone", name),
                Err(e) => return Err(e),
            }
        }

        Ok(())
    }

    fn remove_volumes(
        &self,
        ctx: &CallContext,
        report: &mut TeardownReport,
    ) -> Result<(), RuntimeError> {
        let volumes = self.runtime.list_volumes(ctx)?;

        for volume in &volumes {
            if !self.registry.catalog().is_from_engine(&volume.name) {
                continue;
            }

            info!("removing volume {}", volume.name);
            match self.runtime.remove_volume(ctx, &volume.name) {
                Ok(()) => report.volumes += 1,
                Err(e) if e.is_not_found() => debug!("volume {} already gone", volume.name),
                Err(e) => return Err(e),
            }
        }

        Ok(())
    }

    fn remove_images(&self, ctx: &CallContext, report: &mut TeardownReport) -> Result<()> {
        let components = self
            .registry
            .list(ctx, true, &[Filter::Installed])
            .context("unable to list images")?;

        for cmp in &components {
            let image = cmp.image_with_version();
            info!("removing image {}", image);

            let removal_ctx = ctx.with_timeout(IMAGE_REMOVAL_TIMEOUT);
            match self.runtime.remove_image(&removal_ctx, &image) {
                Ok(()) => report.images += 1,
                Err(e) if e.is_not_found() => debug!("image {} already gone", image),
                Err(e) => return Err(e.into()),
            }
        }

        Ok(())
    }
}
