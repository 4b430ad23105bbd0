use crate::domain::{CallContext, Catalog, Component, ContainerRuntime};
use std::time::Duration;
use tracing::debug;

pub const QUERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Predicate over a single component used to narrow [`Registry::list`].
///
/// `Installed` and `Running` ask the runtime and treat any runtime error as
/// `false`: a component whose state cannot be read is left out of the result
/// instead of failing the listing. Callers that need the error must query the
/// runtime directly.
///
/// [`Registry::list`]: super::Registry::list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    /// Image belongs to a workdir-dependent family
    WorkdirDependent,
    /// Exact image and version are installed
    Installed,
    /// A container named after the component runs the exact image and version
    Running,
}

/// Everything a filter may consult while evaluating.
pub(crate) struct FilterScope<'a> {
    pub catalog: &'a Catalog,
    pub runtime: &'a dyn ContainerRuntime,
    pub ctx: &'a CallContext,
}

impl Filter {
    pub(crate) fn matches(&self, cmp: &Component, scope: &FilterScope<'_>) -> bool {
        match self {
            Filter::WorkdirDependent => scope.catalog.is_workdir_dependent(cmp),
            Filter::Installed => {
                let ctx = scope.ctx.with_timeout(QUERY_TIMEOUT);
                match scope.runtime.is_installed(&ctx, &cmp.image, &cmp.version) {
                    Ok(installed) => installed,
                    Err(e) => {
                        debug!("treating {} as not installed: {}", cmp, e);
                        false
                    }
                }
            }
            Filter::Running => match scope.runtime.is_running(&cmp.name, &cmp.image_with_version()) {
                Ok(running) => running,
                Err(e) => {
                    debug!("treating {} as not running: {}", cmp, e);
                    false
                }
            },
        }
    }
}

/// Keeps the components that pass every filter, in their original order.
/// Filters run in the given order and stop at the first rejection.
pub(crate) fn apply(
    components: Vec<Component>,
    filters: &[Filter],
    scope: &FilterScope<'_>,
) -> Vec<Component> {
    if filters.is_empty() {
        return components;
    }

    components
        .into_iter()
        .filter(|cmp| filters.iter().all(|f| f.matches(cmp, scope)))
        .collect()
}
