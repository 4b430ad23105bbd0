use super::engine::Engine;
use super::notice::DeferredNotice;
use crate::domain::{CallContext, Catalog, Component, ComponentError};
use crate::services::Filter;
use anyhow::Result;
use clap::{Args, Subcommand};
use std::process::ExitCode;
use std::time::Duration;

const PULL_NOTICE: Duration = Duration::from_secs(5);

#[derive(Args)]
pub struct ComponentsCommand {
    #[command(subcommand)]
    pub command: ComponentsAction,
}

#[derive(Subcommand)]
pub enum ComponentsAction {
    /// List the known components
    List {
        /// Include every other installed version of each image
        #[arg(long)]
        all: bool,
        /// Only components whose image is installed
        #[arg(long)]
        installed: bool,
        /// Only components with a running container
        #[arg(long)]
        running: bool,
        /// Only components that depend on the working directory
        #[arg(long)]
        workdir_dependent: bool,
    },
    /// Pull a component image (`repo[:tag]` or a component name)
    Install { id: String },
    /// Exit with status 0 if the component image is installed
    IsInstalled { id: String },
}

pub fn run(cmd: ComponentsCommand, engine: &Engine, ctx: &CallContext) -> Result<ExitCode> {
    match cmd.command {
        ComponentsAction::List {
            all,
            installed,
            running,
            workdir_dependent,
        } => {
            let filters = filters_from_flags(installed, running, workdir_dependent);
            let components = engine.registry().list(ctx, all, &filters)?;
            print_components(&components);
            Ok(ExitCode::SUCCESS)
        }
        ComponentsAction::Install { id } => {
            let id = resolve_id(engine.registry().catalog(), &id);
            let notice = DeferredNotice::start(format!("still pulling {id}..."), PULL_NOTICE);
            engine.orchestrator().install(ctx, &id).map_err(explain)?;
            notice.finish();

            println!("✅ {id} installed");
            Ok(ExitCode::SUCCESS)
        }
        ComponentsAction::IsInstalled { id } => {
            let id = resolve_id(engine.registry().catalog(), &id);
            if engine.orchestrator().is_installed(ctx, &id).map_err(explain)? {
                println!("{id} is installed");
                Ok(ExitCode::SUCCESS)
            } else {
                println!("{id} is not installed");
                Ok(ExitCode::FAILURE)
            }
        }
    }
}

fn filters_from_flags(installed: bool, running: bool, workdir_dependent: bool) -> Vec<Filter> {
    let mut filters = Vec::new();
    // cheapest first, the others ask the runtime
    if workdir_dependent {
        filters.push(Filter::WorkdirDependent);
    }
    if installed {
        filters.push(Filter::Installed);
    }
    if running {
        filters.push(Filter::Running);
    }
    filters
}

/// A bare catalog name or image resolves to its pinned `image:version`.
fn resolve_id(catalog: &Catalog, id: &str) -> String {
    catalog
        .find(id)
        .map(Component::image_with_version)
        .unwrap_or_else(|| id.to_string())
}

fn explain(err: ComponentError) -> anyhow::Error {
    match err {
        ComponentError::NotSrcd(_) => {
            anyhow::anyhow!("{err}; only srcd and bblfsh images can be managed")
        }
        other => other.into(),
    }
}

fn print_components(components: &[Component]) {
    println!("{:<24} {:<20} {}", "NAME", "IMAGE", "VERSION");
    for cmp in components {
        println!("{:<24} {:<20} {}", cmp.name, cmp.image, cmp.version);
    }
}
