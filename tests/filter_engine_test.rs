use servicehub::core::filter::{apply, sort_by_key};
use servicehub::domain::model::{Category, CategoryFilter, RawListing, ServiceListing};
use servicehub::{Catalog, FilterConfig, PriceRange, SeedCatalogSource, SortKey};

fn raw(id: &str, provider: &str, rating: &str, price: &str) -> RawListing {
    RawListing {
        id: id.to_string(),
        name: format!("Servicio {}", id),
        category: "Plomería".to_string(),
        provider_name: provider.to_string(),
        rating: rating.to_string(),
        reviews: 0,
        price: price.to_string(),
        distance: "1 km".to_string(),
        latitude: None,
        longitude: None,
    }
}

fn seed() -> Catalog {
    Catalog::load(&SeedCatalogSource).expect("seed catalog is valid")
}

fn ids(result: &[&ServiceListing]) -> Vec<String> {
    result.iter().map(|l| l.id.clone()).collect()
}

#[test]
fn test_rating_threshold_keeps_original_order() {
    let catalog = Catalog::from_raw(vec![
        raw("a", "Ana", "4.8", "Desde $150"),
        raw("b", "Beto", "4.5", "Desde $100"),
        raw("c", "Caro", "4.9", "Desde $200"),
    ])
    .unwrap();

    let filter = FilterConfig {
        min_rating: 4.6,
        ..FilterConfig::default()
    };
    let result = catalog.search(&filter).unwrap();
    assert_eq!(ids(&result), vec!["a", "c"]);

    let by_price = FilterConfig {
        sort_key: Some(SortKey::Price),
        ..filter
    };
    let result = catalog.search(&by_price).unwrap();
    let prices: Vec<f64> = result.iter().map(|l| l.price).collect();
    assert_eq!(prices, vec![150.0, 200.0]);
}

#[test]
fn test_unfiltered_search_is_permutation_of_bounded_catalog() {
    let catalog = seed();
    let filter = FilterConfig {
        min_rating: 4.6,
        max_price: Some(200.0),
        sort_key: Some(SortKey::Distance),
        ..FilterConfig::default()
    };

    let mut got = ids(&catalog.search(&filter).unwrap());
    let mut expected: Vec<String> = catalog
        .listings()
        .iter()
        .filter(|l| l.provider_rating >= 4.6 && l.price <= 200.0)
        .map(|l| l.id.clone())
        .collect();
    got.sort();
    expected.sort();
    assert_eq!(got, expected);
}

#[test]
fn test_every_result_respects_bounds() {
    let catalog = seed();
    for range in [
        PriceRange::Any,
        PriceRange::Under100,
        PriceRange::From100To200,
        PriceRange::Over200,
    ] {
        let filter = FilterConfig {
            min_rating: 4.5,
            ..FilterConfig::default()
        }
        .with_price_range(range);

        for listing in catalog.search(&filter).unwrap() {
            assert!(listing.provider_rating >= filter.min_rating);
            assert!(listing.price >= filter.min_price);
            if let Some(max) = filter.max_price {
                assert!(listing.price <= max, "{} over {:?}", listing.id, range);
            }
        }
    }
}

#[test]
fn test_sorting_is_idempotent() {
    let catalog = seed();
    for key in [SortKey::Rating, SortKey::Price, SortKey::Distance] {
        let filter = FilterConfig {
            sort_key: Some(key),
            ..FilterConfig::default()
        };
        let once = catalog.search(&filter).unwrap();
        let mut twice = once.clone();
        sort_by_key(&mut twice, key);
        assert_eq!(ids(&once), ids(&twice), "{:?}", key);
    }
}

#[test]
fn test_rating_sort_is_descending() {
    let catalog = seed();
    let filter = FilterConfig {
        sort_key: Some(SortKey::Rating),
        ..FilterConfig::default()
    };
    let result = catalog.search(&filter).unwrap();
    assert!(result
        .windows(2)
        .all(|w| w[0].provider_rating >= w[1].provider_rating));
}

#[test]
fn test_query_matches_provider_name_case_insensitively() {
    let catalog = seed();
    let filter = FilterConfig {
        query: "Juan".to_string(),
        ..FilterConfig::default()
    };
    let result = catalog.search(&filter).unwrap();
    assert!(!result.is_empty());
    for listing in &result {
        let haystack = format!("{} {}", listing.name, listing.provider_name).to_lowercase();
        assert!(haystack.contains("juan"));
    }

    let providers: Vec<&str> = result.iter().map(|l| l.provider_name.as_str()).collect();
    assert!(providers.contains(&"Juan Pérez"));
    assert!(providers.contains(&"Juana Castillo"));
}

#[test]
fn test_query_matches_service_name() {
    let catalog = seed();
    let filter = FilterConfig {
        query: "LIMPIEZA".to_string(),
        ..FilterConfig::default()
    };
    let result = catalog.search(&filter).unwrap();
    assert_eq!(ids(&result), vec!["6", "10"]);
}

#[test]
fn test_category_filter() {
    let catalog = seed();
    let filter = FilterConfig {
        category: CategoryFilter::Only(Category::Electrical),
        sort_key: Some(SortKey::Price),
        ..FilterConfig::default()
    };
    let result = catalog.search(&filter).unwrap();
    assert_eq!(ids(&result), vec!["2", "9"]);
    assert!(result.iter().all(|l| l.category == Category::Electrical));
}

#[test]
fn test_apply_on_plain_slice() {
    let catalog = seed();
    let all = apply(catalog.listings(), &FilterConfig::default());
    assert_eq!(all.len(), catalog.len());
}

#[test]
fn test_price_buckets_cover_fractional_prices() {
    let catalog = Catalog::from_raw(vec![
        raw("1", "Ana", "4.0", "$99.995"),
        raw("2", "Beto", "4.0", "$200.005"),
        raw("3", "Caro", "4.0", "Desde $99.99"),
        raw("4", "Dani", "4.0", "Desde $200.01"),
    ])
    .expect("fractional prices are accepted");

    for listing in catalog.listings() {
        let buckets = PriceRange::BUCKETS
            .iter()
            .filter(|&&range| {
                let filter = FilterConfig::default().with_price_range(range);
                catalog
                    .search(&filter)
                    .map(|hits| hits.iter().any(|l| l.id == listing.id))
                    .unwrap_or(false)
            })
            .count();
        assert_eq!(buckets, 1, "listing {} priced {}", listing.id, listing.price);
    }
}
