pub mod cache;
pub mod catalog;
pub mod error;
pub mod loader;

pub use cache::RegistryCache;
pub use catalog::{AgentCatalog, AgentSpec};
pub use error::RegistryError;
pub use loader::load_catalog;
