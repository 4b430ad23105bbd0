use super::filter::{self, Filter, FilterScope, QUERY_TIMEOUT};
use crate::domain::{CallContext, Catalog, Component, ContainerRuntime, RuntimeError};
use std::sync::Arc;
use tracing::debug;

/// Resolves the known components against the runtime state.
pub struct Registry {
    catalog: Arc<Catalog>,
    runtime: Arc<dyn ContainerRuntime>,
}

impl Registry {
    pub fn new(catalog: Arc<Catalog>, runtime: Arc<dyn ContainerRuntime>) -> Self {
        Self { catalog, runtime }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Returns the known components, which may or may not be installed.
    ///
    /// With `all_versions`, every other locally installed version of each
    /// image is appended after the pinned components, grouped by catalog
    /// entry. A runtime failure while looking those versions up aborts the
    /// whole listing. `filters` are then applied as a logical AND.
    pub fn list(
        &self,
        ctx: &CallContext,
        all_versions: bool,
        filters: &[Filter],
    ) -> Result<Vec<Component>, RuntimeError> {
        let mut components = self.catalog.components().to_vec();

        if all_versions {
            let mut others = Vec::new();

            for cmp in self.catalog.components() {
                let query_ctx = ctx.with_timeout(QUERY_TIMEOUT);
                let versions = self.runtime.versions_installed(&query_ctx, &cmp.image)?;

                for version in versions {
                    if version == cmp.version {
                        continue;
                    }

                    debug!("found extra version {} of {}", version, cmp.image);
                    let extra = cmp.with_version(version);
                    if !others.contains(&extra) {
                        others.push(extra);
                    }
                }
            }

            components.extend(others);
        }

        let scope = FilterScope {
            catalog: &self.catalog,
            runtime: self.runtime.as_ref(),
            ctx,
        };

        Ok(filter::apply(components, filters, &scope))
    }
}
