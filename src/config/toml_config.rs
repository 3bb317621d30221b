use crate::core::filter::{FilterConfig, PriceRange, SortKey};
use crate::core::session::RetryPolicy;
use crate::domain::model::CategoryFilter;
use crate::utils::error::{MarketError, Result};
use crate::utils::validation::{validate_file_extension, validate_path, validate_range, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub catalog: CatalogConfig,
    pub search: SearchConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// 未設定時使用內建示範資料
    pub path: Option<String>,
}

/// 搜尋畫面的預設篩選條件
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub category: String,
    pub query: String,
    pub min_rating: f64,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub price_range: Option<String>,
    pub sort: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            category: "all".to_string(),
            query: String::new(),
            min_rating: 0.0,
            min_price: None,
            max_price: None,
            price_range: None,
            sort: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub retry_attempts: u32,
    pub retry_delay_ms: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            retry_attempts: policy.attempts,
            retry_delay_ms: policy.delay.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
        }
    }
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;
        Ok(toml::from_str(&processed_content)?)
    }

    /// 替換環境變數 (例如 ${CATALOG_PATH})；未定義的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| MarketError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 將 `[search]` 轉成篩選條件；price_range 優先於個別價格上下限
    pub fn default_filter(&self) -> Result<FilterConfig> {
        let search = &self.search;
        let mut filter = FilterConfig {
            category: search.category.parse::<CategoryFilter>()?,
            query: search.query.clone(),
            min_rating: search.min_rating,
            min_price: search.min_price.unwrap_or(0.0),
            max_price: search.max_price,
            sort_key: search
                .sort
                .as_deref()
                .map(str::parse::<SortKey>)
                .transpose()?,
        };

        if let Some(range) = &search.price_range {
            filter = filter.with_price_range(range.parse::<PriceRange>()?);
        }

        filter.validate()?;
        Ok(filter)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.auth.retry_attempts,
            delay: Duration::from_millis(self.auth.retry_delay_ms),
        }
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        if let Some(path) = &self.catalog.path {
            validate_path("catalog.path", path)?;
            validate_file_extension("catalog.path", path, &["csv"])?;
        }

        validate_range("search.min_rating", self.search.min_rating, 0.0, 5.0)?;
        validate_range("auth.retry_attempts", self.auth.retry_attempts, 0, 10)?;
        validate_range("auth.retry_delay_ms", self.auth.retry_delay_ms, 0, 30_000)?;

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(MarketError::InvalidConfigValueError {
                field: "logging.level".to_string(),
                value: self.logging.level.clone(),
                reason: format!("Valid levels: {}", valid_levels.join(", ")),
            });
        }

        // 篩選條件本身的錯誤以設定錯誤回報
        self.default_filter().map_err(|e| MarketError::InvalidConfigValueError {
            field: "search".to_string(),
            value: format!("{:?}", self.search),
            reason: e.to_string(),
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert!(config.catalog.path.is_none());
        assert_eq!(config.logging.format, LogFormat::Compact);
        assert_eq!(config.default_filter().unwrap(), FilterConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_search_section() {
        let toml_content = r#"
[search]
category = "Plomería"
query = "juan"
min_rating = 4.5
price_range = "100-200"
sort = "price"

[auth]
retry_attempts = 3
retry_delay_ms = 10

[logging]
level = "debug"
format = "json"
"#;

        let config = AppConfig::from_toml_str(toml_content).unwrap();
        let filter = config.default_filter().unwrap();
        assert_eq!(
            filter.category,
            CategoryFilter::Only(crate::domain::model::Category::Plumbing)
        );
        assert_eq!(filter.min_price, 100.0);
        assert_eq!(filter.max_price, Some(200.0));
        assert_eq!(filter.sort_key, Some(SortKey::Price));
        assert_eq!(config.retry_policy().attempts, 3);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("SERVICEHUB_TEST_CATALOG", "/tmp/listings.csv");

        let config = AppConfig::from_toml_str(
            r#"
[catalog]
path = "${SERVICEHUB_TEST_CATALOG}"
"#,
        )
        .unwrap();
        assert_eq!(config.catalog.path.as_deref(), Some("/tmp/listings.csv"));

        std::env::remove_var("SERVICEHUB_TEST_CATALOG");
    }

    #[test]
    fn test_config_validation() {
        let config = AppConfig::from_toml_str(
            r#"
[search]
sort = "cheapest"
"#,
        )
        .unwrap();
        assert!(matches!(
            config.validate(),
            Err(MarketError::InvalidConfigValueError { .. })
        ));

        let config = AppConfig::from_toml_str(
            r#"
[logging]
level = "loud"
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[catalog]\npath = \"./data/listings.csv\"\n")
            .unwrap();

        let config = AppConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.catalog.path.as_deref(), Some("./data/listings.csv"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let err = AppConfig::from_toml_str("[search\n").unwrap_err();
        assert!(matches!(err, MarketError::ConfigError { .. }));
    }
}
