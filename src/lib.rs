pub mod cli;
pub mod domain;
pub mod infra;
pub mod services;

// Make test_support available for integration tests
pub mod test_support;

pub use domain::{
    CallContext, Catalog, CatalogConfig, Component, ComponentError, ContainerRuntime,
    RuntimeError,
};
pub use infra::DockerAdapter;
pub use services::{Filter, Orchestrator, Registry, TeardownReport};
