mod filter;
mod orchestrator;
mod registry;

pub use filter::{Filter, QUERY_TIMEOUT};
pub use orchestrator::{IMAGE_REMOVAL_TIMEOUT, Orchestrator, TeardownReport};
pub use registry::Registry;
