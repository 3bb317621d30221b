pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::Cli;

pub use adapters::{CsvCatalogSource, InMemoryAuthBackend, SeedCatalogSource};
pub use config::AppConfig;
pub use self::core::{
    catalog::Catalog,
    filter::{FilterConfig, PriceRange, SortKey},
    navigation::{NavState, Navigator, Screen},
    orders::OrderBook,
    provider::{OfferingList, WeekSchedule},
    session::Session,
};
pub use utils::error::{MarketError, Result};
