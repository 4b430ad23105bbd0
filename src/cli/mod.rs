pub mod components;
pub mod engine;
pub mod notice;

pub use components::ComponentsCommand;
pub use engine::Engine;
pub use notice::DeferredNotice;
