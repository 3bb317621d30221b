pub mod catalog;
pub mod filter;
pub mod navigation;
pub mod orders;
pub mod provider;
pub mod session;

pub use crate::domain::model::{RawListing, ServiceListing, User};
pub use crate::domain::ports::{AuthBackend, CatalogSource};
pub use crate::utils::error::Result;
