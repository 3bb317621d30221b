use crate::core::filter::{self, FilterConfig};
use crate::core::{CatalogSource, RawListing, ServiceListing};
use crate::domain::model::Category;
use crate::utils::error::{MarketError, Result};
use crate::utils::validation::Validate;
use std::collections::{BTreeSet, HashSet};

/// 唯讀的服務目錄，載入後不再變動
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    listings: Vec<ServiceListing>,
}

impl Catalog {
    /// 正規化所有紀錄；任何一筆格式錯誤或 id 重複都會拒絕整批資料
    pub fn from_raw(raw: Vec<RawListing>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(raw.len());
        let mut listings = Vec::with_capacity(raw.len());

        for record in raw {
            let listing = ServiceListing::try_from(record)?;
            if !seen.insert(listing.id.clone()) {
                return Err(MarketError::conflict(format!(
                    "duplicate listing id '{}'",
                    listing.id
                )));
            }
            listings.push(listing);
        }

        tracing::debug!("Catalog ingested {} listings", listings.len());
        Ok(Self { listings })
    }

    pub fn load<S: CatalogSource>(source: &S) -> Result<Self> {
        let raw = source.load()?;
        tracing::debug!("Loaded {} raw listings from source", raw.len());
        Self::from_raw(raw)
    }

    pub fn listings(&self) -> &[ServiceListing] {
        &self.listings
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    pub fn get(&self, id: &str) -> Result<&ServiceListing> {
        self.listings
            .iter()
            .find(|l| l.id == id)
            .ok_or_else(|| MarketError::not_found("Listing", id))
    }

    pub fn categories_present(&self) -> BTreeSet<Category> {
        self.listings.iter().map(|l| l.category).collect()
    }

    pub fn search(&self, config: &FilterConfig) -> Result<Vec<&ServiceListing>> {
        config.validate()?;
        let result = filter::apply(&self.listings, config);
        tracing::debug!(
            "Search kept {} of {} listings (category={:?}, query={:?}, sort={:?})",
            result.len(),
            self.listings.len(),
            config.category,
            config.query,
            config.sort_key
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(id: &str, category: &str) -> RawListing {
        RawListing {
            id: id.to_string(),
            name: format!("Servicio {}", id),
            category: category.to_string(),
            provider_name: "Ana López".to_string(),
            rating: "4.5".to_string(),
            reviews: 10,
            price: "Desde $100".to_string(),
            distance: "1.0 km".to_string(),
            latitude: None,
            longitude: None,
        }
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let err = Catalog::from_raw(vec![raw("2", "Electricidad"), raw("2", "Electricidad")])
            .unwrap_err();
        assert!(matches!(err, MarketError::ConflictError { .. }));
    }

    #[test]
    fn test_malformed_record_rejects_whole_load() {
        let mut bad = raw("3", "Pintura");
        bad.distance = "lejos".to_string();
        assert!(Catalog::from_raw(vec![raw("1", "Plomería"), bad]).is_err());
    }

    #[test]
    fn test_get_and_categories() {
        let catalog = Catalog::from_raw(vec![raw("1", "Plomería"), raw("2", "Pintura")]).unwrap();
        assert_eq!(catalog.get("2").unwrap().category, Category::Painting);
        assert!(matches!(
            catalog.get("99"),
            Err(MarketError::NotFoundError { .. })
        ));
        let present: Vec<_> = catalog.categories_present().into_iter().collect();
        assert_eq!(present, vec![Category::Plumbing, Category::Painting]);
    }

    #[test]
    fn test_search_rejects_invalid_config() {
        let catalog = Catalog::from_raw(vec![raw("1", "Plomería")]).unwrap();
        let config = FilterConfig {
            min_rating: 7.0,
            ..FilterConfig::default()
        };
        assert!(catalog.search(&config).is_err());
    }
}
