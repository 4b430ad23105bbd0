use super::notice::DeferredNotice;
use crate::domain::{CallContext, Catalog, CatalogConfig, ContainerRuntime};
use crate::infra::DockerAdapter;
use crate::infra::config::load_app_config;
use crate::services::{Orchestrator, Registry, TeardownReport};
use anyhow::{Result, bail};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

const SLOW_OPERATION_NOTICE: Duration = Duration::from_secs(5);

/// Wires catalog, runtime and services together for one CLI invocation.
pub struct Engine {
    registry: Arc<Registry>,
    orchestrator: Orchestrator,
}

impl Engine {
    /// Builds the engine from the configuration file and the runtime binary
    /// it names.
    pub fn new(config_path: &Path) -> Result<Self> {
        let app_config = load_app_config(config_path)?;
        let catalog_config = app_config.catalog_config()?;

        let catalog = Catalog::new(catalog_config)?;
        let adapter = DockerAdapter::new(app_config.runtime_binary(), catalog.network());
        if !adapter.is_available() {
            bail!(
                "container runtime '{}' is not available, is it installed and in PATH?",
                adapter.binary()
            );
        }

        Ok(Self::assemble(catalog, Arc::new(adapter)))
    }

    pub fn with_runtime(
        catalog_config: CatalogConfig,
        runtime: Arc<dyn ContainerRuntime>,
    ) -> Result<Self> {
        let catalog = Catalog::new(catalog_config)?;
        Ok(Self::assemble(catalog, runtime))
    }

    fn assemble(catalog: Catalog, runtime: Arc<dyn ContainerRuntime>) -> Self {
        let registry = Arc::new(Registry::new(Arc::new(catalog), runtime.clone()));
        let orchestrator = Orchestrator::new(registry.clone(), runtime);
        Self {
            registry,
            orchestrator,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    pub fn stop(&self) -> Result<TeardownReport> {
        let notice = DeferredNotice::start("still removing containers...", SLOW_OPERATION_NOTICE);
        let report = self.orchestrator.stop()?;
        notice.finish();

        println!("✅ Removed {} container(s)", report.containers);
        Ok(report)
    }

    pub fn prune(&self, ctx: &CallContext, with_images: bool) -> Result<TeardownReport> {
        let notice = DeferredNotice::start("still cleaning up...", SLOW_OPERATION_NOTICE);
        let report = self.orchestrator.prune(ctx, with_images)?;
        notice.finish();

        if report.is_empty() {
            println!("✅ Nothing to clean up");
        } else {
            println!(
                "✅ Removed {} container(s), {} volume(s), {} image(s){}",
                report.containers,
                report.volumes,
                report.images,
                if report.network { " and the network" } else { "" }
            );
        }

        Ok(report)
    }
}
