// Adapters layer: concrete implementations of the domain ports.

pub mod auth;
pub mod catalog;

pub use auth::InMemoryAuthBackend;
pub use catalog::{CsvCatalogSource, SeedCatalogSource};
