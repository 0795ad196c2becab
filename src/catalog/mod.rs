// Control catalog: YAML file format, validation, and the startup seed step.

pub mod format;
pub mod loader;

pub use format::{CatalogControl, CatalogFile, CatalogFramework, CatalogLab};
pub use loader::{load_catalog, parse_catalog, seed_if_empty, SeedSummary};
