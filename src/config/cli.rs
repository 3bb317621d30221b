use crate::core::filter::{FilterConfig, PriceRange, SortKey};
use crate::domain::model::{CategoryFilter, Role};
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "servicehub")]
#[command(about = "Browse and filter the local services catalog")]
pub struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// CSV catalog to load instead of the built-in listings
    #[arg(long, global = true)]
    pub catalog: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Filter and sort the catalog
    Search(SearchArgs),
    /// Show the screens reachable for a role (omit --role for a signed-out user)
    Routes {
        #[arg(long)]
        role: Option<String>,
    },
    /// List categories with their listing counts
    Categories,
    /// Sign in against the demo accounts and show the resulting navigation
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
}

#[derive(Debug, Clone, Default, Args)]
pub struct SearchArgs {
    /// Free-text match on service or provider name
    pub query: Option<String>,

    #[arg(long)]
    pub category: Option<String>,

    #[arg(long)]
    pub min_rating: Option<f64>,

    #[arg(long)]
    pub min_price: Option<f64>,

    #[arg(long)]
    pub max_price: Option<f64>,

    /// any, under-100, 100-200 or over-200
    #[arg(long)]
    pub price_range: Option<String>,

    /// rating, price or distance
    #[arg(long)]
    pub sort: Option<String>,
}

impl SearchArgs {
    /// 命令列參數覆蓋設定檔的預設條件
    pub fn apply_to(&self, mut filter: FilterConfig) -> Result<FilterConfig> {
        if let Some(query) = &self.query {
            filter.query = query.clone();
        }
        if let Some(category) = &self.category {
            filter.category = category.parse::<CategoryFilter>()?;
        }
        if let Some(min_rating) = self.min_rating {
            filter.min_rating = min_rating;
        }
        if let Some(range) = &self.price_range {
            filter = filter.with_price_range(range.parse::<PriceRange>()?);
        }
        if let Some(min_price) = self.min_price {
            filter.min_price = min_price;
        }
        if let Some(max_price) = self.max_price {
            filter.max_price = Some(max_price);
        }
        if let Some(sort) = &self.sort {
            filter.sort_key = Some(sort.parse::<SortKey>()?);
        }

        filter.validate()?;
        Ok(filter)
    }
}

pub fn parse_role(role: Option<&str>) -> Result<Option<Role>> {
    role.map(str::parse::<Role>).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Category;

    #[test]
    fn test_search_args_override_defaults() {
        let cli = Cli::parse_from([
            "servicehub",
            "search",
            "juan",
            "--category",
            "plomeria",
            "--min-rating",
            "4.6",
            "--sort",
            "price",
        ]);
        let Command::Search(args) = cli.command else {
            panic!("expected search command");
        };

        let filter = args.apply_to(FilterConfig::default()).unwrap();
        assert_eq!(filter.query, "juan");
        assert_eq!(filter.category, CategoryFilter::Only(Category::Plumbing));
        assert_eq!(filter.min_rating, 4.6);
        assert_eq!(filter.sort_key, Some(SortKey::Price));
    }

    #[test]
    fn test_explicit_price_beats_range() {
        let args = SearchArgs {
            price_range: Some("100-200".to_string()),
            max_price: Some(150.0),
            ..SearchArgs::default()
        };
        let filter = args.apply_to(FilterConfig::default()).unwrap();
        assert_eq!(filter.min_price, 100.0);
        assert_eq!(filter.max_price, Some(150.0));
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let args = SearchArgs {
            min_rating: Some(6.0),
            ..SearchArgs::default()
        };
        assert!(args.apply_to(FilterConfig::default()).is_err());
    }

    #[test]
    fn test_parse_role() {
        assert_eq!(parse_role(None).unwrap(), None);
        assert_eq!(parse_role(Some("provider")).unwrap(), Some(Role::Provider));
        assert!(parse_role(Some("admin")).is_err());
    }
}
