use crate::utils::error::{MarketError, Result};
use chrono::{NaiveDate, NaiveTime};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// 服務分類。圖示與顏色由 `match` 窮舉，新增分類時編譯器會要求補齊。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Plumbing,
    Electrical,
    Carpentry,
    Cleaning,
    Painting,
    Gardening,
    Locksmith,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Plumbing,
        Category::Electrical,
        Category::Carpentry,
        Category::Cleaning,
        Category::Painting,
        Category::Gardening,
        Category::Locksmith,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Plumbing => "Plomería",
            Category::Electrical => "Electricidad",
            Category::Carpentry => "Carpintería",
            Category::Cleaning => "Limpieza",
            Category::Painting => "Pintura",
            Category::Gardening => "Jardinería",
            Category::Locksmith => "Cerrajería",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Category::Plumbing => "plumbing",
            Category::Electrical => "electrical",
            Category::Carpentry => "carpentry",
            Category::Cleaning => "cleaning",
            Category::Painting => "painting",
            Category::Gardening => "gardening",
            Category::Locksmith => "locksmith",
        }
    }

    /// Material icon glyph name
    pub fn icon(self) -> &'static str {
        match self {
            Category::Plumbing => "plumbing",
            Category::Electrical => "electrical-services",
            Category::Carpentry => "handyman",
            Category::Cleaning => "cleaning-services",
            Category::Painting => "format-paint",
            Category::Gardening => "yard",
            Category::Locksmith => "vpn-key",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Category::Plumbing => "#2196F3",
            Category::Electrical => "#FFC107",
            Category::Carpentry => "#795548",
            Category::Cleaning => "#4CAF50",
            Category::Painting => "#9C27B0",
            Category::Gardening => "#8BC34A",
            Category::Locksmith => "#607D8B",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = fold_accents(s.trim());
        Category::ALL
            .into_iter()
            .find(|c| fold_accents(c.label()) == wanted || c.slug() == wanted)
            .ok_or_else(|| MarketError::validation(format!("unknown category '{}'", s)))
    }
}

/// 小寫並移除西文重音，用於比對分類名稱
pub(crate) fn fold_accents(s: &str) -> String {
    s.chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' | 'à' | 'ä' => 'a',
            'é' | 'è' | 'ë' => 'e',
            'í' | 'ì' | 'ï' => 'i',
            'ó' | 'ò' | 'ö' => 'o',
            'ú' | 'ù' | 'ü' => 'u',
            other => other,
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "category")]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn matches(&self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(wanted) => *wanted == category,
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self> {
        match fold_accents(s.trim()).as_str() {
            "" | "all" | "todos" | "todas" => Ok(CategoryFilter::All),
            _ => s.parse().map(CategoryFilter::Only),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// 目錄輸入格式：價格與距離仍是顯示字串，例如 "Desde $150"、"0.5 km"
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawListing {
    pub id: String,
    pub name: String,
    pub category: String,
    pub provider_name: String,
    /// 以字串讀入，格式錯誤時才能回報為 `MalformedListing`
    pub rating: String,
    #[serde(default)]
    pub reviews: u32,
    pub price: String,
    pub distance: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceListing {
    pub id: String,
    pub name: String,
    pub category: Category,
    pub provider_name: String,
    pub provider_rating: f64,
    pub reviews: u32,
    pub price: f64,
    pub distance_km: f64,
    pub location: Option<Coordinates>,
}

impl ServiceListing {
    pub fn price_text(&self) -> String {
        if self.price.fract() == 0.0 {
            format!("Desde ${:.0}", self.price)
        } else {
            format!("Desde ${:.2}", self.price)
        }
    }

    pub fn distance_text(&self) -> String {
        if self.distance_km < 1.0 {
            format!("{:.0} m", self.distance_km * 1000.0)
        } else {
            format!("{:.1} km", self.distance_km)
        }
    }
}

impl TryFrom<RawListing> for ServiceListing {
    type Error = MarketError;

    fn try_from(raw: RawListing) -> Result<Self> {
        let malformed = |reason: String| MarketError::MalformedListing {
            id: raw.id.clone(),
            reason,
        };

        if raw.id.trim().is_empty() {
            return Err(malformed("id is empty".to_string()));
        }
        if raw.name.trim().is_empty() {
            return Err(malformed("name is empty".to_string()));
        }
        if raw.provider_name.trim().is_empty() {
            return Err(malformed("provider name is empty".to_string()));
        }

        let category: Category = raw
            .category
            .parse()
            .map_err(|_| malformed(format!("unknown category '{}'", raw.category)))?;

        let rating: f64 = raw
            .rating
            .trim()
            .parse()
            .map_err(|_| malformed(format!("unreadable rating '{}'", raw.rating)))?;
        if !(0.0..=5.0).contains(&rating) {
            return Err(malformed(format!("rating {} outside 0-5", rating)));
        }

        let price = parse_price_text(&raw.price)
            .map(round_to_cents)
            .ok_or_else(|| malformed(format!("unreadable price '{}'", raw.price)))?;
        let distance_km = parse_distance_text(&raw.distance)
            .ok_or_else(|| malformed(format!("unreadable distance '{}'", raw.distance)))?;

        let location = match (raw.latitude, raw.longitude) {
            (Some(latitude), Some(longitude)) => {
                let coords = Coordinates {
                    latitude,
                    longitude,
                };
                if !coords.is_valid() {
                    return Err(malformed("coordinates out of range".to_string()));
                }
                Some(coords)
            }
            (None, None) => None,
            _ => return Err(malformed("latitude and longitude must come together".to_string())),
        };

        Ok(Self {
            id: raw.id.trim().to_string(),
            name: raw.name.trim().to_string(),
            category,
            provider_name: raw.provider_name.trim().to_string(),
            provider_rating: rating,
            reviews: raw.reviews,
            price,
            distance_km,
            location,
        })
    }
}

/// 從 "Desde $1,250.50" 之類的字串取出數值。
///
/// 整個字串必須是 `[Desde] $<monto>`；千分位逗號必須是完整的三位一組。
pub fn parse_price_text(text: &str) -> Option<f64> {
    static PRICE: OnceLock<Regex> = OnceLock::new();
    let re = PRICE.get_or_init(|| {
        Regex::new(r"(?i)^\s*(?:desde\s*)?\$\s*(\d{1,3}(?:,\d{3})+(?:\.\d+)?|\d+(?:\.\d+)?)\s*$")
            .expect("price pattern is valid")
    });

    let caps = re.captures(text)?;
    let value: f64 = caps[1].replace(',', "").parse().ok()?;
    value.is_finite().then_some(value)
}

/// 價格以分為單位比較，區間之間才不會有縫隙
pub fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// 支援 "0.5 km"、"1,2 km"、"800 m"，回傳公里數
pub fn parse_distance_text(text: &str) -> Option<f64> {
    static DISTANCE: OnceLock<Regex> = OnceLock::new();
    let re = DISTANCE.get_or_init(|| {
        Regex::new(r"(?i)^\s*(\d+(?:[.,]\d+)?)\s*(km|m)\s*$").expect("distance pattern is valid")
    });

    let caps = re.captures(text)?;
    let value: f64 = caps[1].replace(',', ".").parse().ok()?;
    let km = if caps[2].eq_ignore_ascii_case("km") {
        value
    } else {
        value / 1000.0
    };
    km.is_finite().then_some(km)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Client,
    Provider,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Client => f.write_str("client"),
            Role::Provider => f.write_str("provider"),
        }
    }
}

impl FromStr for Role {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "client" | "cliente" => Ok(Role::Client),
            "provider" | "proveedor" => Ok(Role::Provider),
            other => Err(MarketError::validation(format!("unknown role '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub id: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub is_default: bool,
    pub coordinates: Coordinates,
}

impl Address {
    pub fn one_line(&self) -> String {
        format!("{}, {}, {} {}", self.street, self.city, self.state, self.zip_code)
    }
}

/// 新增或編輯地址時的輸入
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressDraft {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    #[serde(default)]
    pub is_default: bool,
    pub coordinates: Coordinates,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub addresses: Vec<Address>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAccount {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: Role,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    Pending,
    Accepted,
    Rejected,
    CounterOffer,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn label(self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pendiente",
            OrderStatus::Accepted => "Aceptado",
            OrderStatus::Rejected => "Rechazado",
            OrderStatus::CounterOffer => "Contraoferta",
            OrderStatus::Completed => "Completado",
            OrderStatus::Cancelled => "Cancelado",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            OrderStatus::Pending => "#FFA000",
            OrderStatus::Accepted => "#2196F3",
            OrderStatus::Rejected => "#F44336",
            OrderStatus::CounterOffer => "#FF7043",
            OrderStatus::Completed => "#4CAF50",
            OrderStatus::Cancelled => "#F44336",
        }
    }

    pub fn is_final(self) -> bool {
        matches!(
            self,
            OrderStatus::Rejected | OrderStatus::Completed | OrderStatus::Cancelled
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRequest {
    pub id: String,
    pub listing_id: String,
    pub service_name: String,
    pub client_id: String,
    pub client_name: String,
    pub provider_id: String,
    pub provider_name: String,
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
    pub status: OrderStatus,
    pub price: f64,
    pub address_line: String,
    pub notes: Option<String>,
}
