use crate::domain::model::{round_to_cents, CategoryFilter, ServiceListing};
use crate::utils::error::{MarketError, Result};
use crate::utils::validation::{validate_range, Validate};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// 評分由高到低
    Rating,
    /// 價格由低到高
    Price,
    /// 距離由近到遠
    Distance,
}

impl FromStr for SortKey {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rating" => Ok(SortKey::Rating),
            "price" => Ok(SortKey::Price),
            "distance" => Ok(SortKey::Distance),
            other => Err(MarketError::validation(format!(
                "unknown sort key '{}' (expected rating, price or distance)",
                other
            ))),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortKey::Rating => f.write_str("rating"),
            SortKey::Price => f.write_str("price"),
            SortKey::Distance => f.write_str("distance"),
        }
    }
}

/// 篩選畫面上的價格區間
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceRange {
    #[default]
    Any,
    Under100,
    From100To200,
    Over200,
}

impl PriceRange {
    pub const BUCKETS: [PriceRange; 3] = [
        PriceRange::Under100,
        PriceRange::From100To200,
        PriceRange::Over200,
    ];

    /// 以分為單位的閉區間；相鄰區間相差一分，價格比較前會先四捨五入到分
    pub fn bounds(self) -> (f64, Option<f64>) {
        match self {
            PriceRange::Any => (0.0, None),
            PriceRange::Under100 => (0.0, Some(99.99)),
            PriceRange::From100To200 => (100.0, Some(200.0)),
            PriceRange::Over200 => (200.01, None),
        }
    }
}

impl FromStr for PriceRange {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "any" => Ok(PriceRange::Any),
            "under-100" | "under_100" => Ok(PriceRange::Under100),
            "100-200" => Ok(PriceRange::From100To200),
            "over-200" | "over_200" => Ok(PriceRange::Over200),
            other => Err(MarketError::validation(format!(
                "unknown price range '{}' (expected any, under-100, 100-200 or over-200)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub category: CategoryFilter,
    pub query: String,
    pub min_rating: f64,
    pub min_price: f64,
    /// `None` 代表沒有上限
    pub max_price: Option<f64>,
    /// `None` 保留目錄原本的順序
    pub sort_key: Option<SortKey>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            category: CategoryFilter::All,
            query: String::new(),
            min_rating: 0.0,
            min_price: 0.0,
            max_price: None,
            sort_key: None,
        }
    }
}

impl FilterConfig {
    pub fn with_price_range(mut self, range: PriceRange) -> Self {
        let (min, max) = range.bounds();
        self.min_price = min;
        self.max_price = max;
        self
    }

    fn accepts(&self, listing: &ServiceListing, needle: &str) -> bool {
        let price = round_to_cents(listing.price);
        self.category.matches(listing.category)
            && matches_query(listing, needle)
            && listing.provider_rating >= self.min_rating
            && price >= self.min_price
            && self.max_price.map_or(true, |max| price <= max)
    }
}

impl Validate for FilterConfig {
    fn validate(&self) -> Result<()> {
        validate_range("min_rating", self.min_rating, 0.0, 5.0)
            .map_err(|e| MarketError::validation(e.to_string()))?;

        if !self.min_price.is_finite() || self.min_price < 0.0 {
            return Err(MarketError::validation(format!(
                "min_price must be a non-negative number, got {}",
                self.min_price
            )));
        }

        if let Some(max) = self.max_price {
            if !max.is_finite() || max < self.min_price {
                return Err(MarketError::validation(format!(
                    "max_price {} must be a number not below min_price {}",
                    max, self.min_price
                )));
            }
        }

        Ok(())
    }
}

fn matches_query(listing: &ServiceListing, needle: &str) -> bool {
    needle.is_empty()
        || listing.name.to_lowercase().contains(needle)
        || listing.provider_name.to_lowercase().contains(needle)
}

/// 依條件篩選後排序。排序為穩定排序，同分時保留原始順序。
pub fn apply<'a>(listings: &'a [ServiceListing], config: &FilterConfig) -> Vec<&'a ServiceListing> {
    let needle = config.query.trim().to_lowercase();

    let mut result: Vec<&ServiceListing> = listings
        .iter()
        .filter(|l| config.accepts(l, &needle))
        .collect();

    if let Some(key) = config.sort_key {
        sort_by_key(&mut result, key);
    }

    result
}

pub fn sort_by_key(listings: &mut [&ServiceListing], key: SortKey) {
    listings.sort_by(|a, b| compare(a, b, key));
}

fn compare(a: &ServiceListing, b: &ServiceListing, key: SortKey) -> Ordering {
    match key {
        SortKey::Rating => b.provider_rating.total_cmp(&a.provider_rating),
        SortKey::Price => a.price.total_cmp(&b.price),
        SortKey::Distance => a.distance_km.total_cmp(&b.distance_km),
    }
}
