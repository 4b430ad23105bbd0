pub mod catalog;
mod component;
mod context;
mod error;
pub mod traits;

pub use catalog::{Catalog, CatalogConfig, PinnedImage};
pub use component::{Component, ContainerSummary, VolumeSummary, split_image_id};
pub use context::CallContext;
pub use error::{ComponentError, RuntimeError};
pub use traits::ContainerRuntime;
