use crate::core::{CatalogSource, RawListing};
use crate::utils::error::Result;
use crate::utils::validation::{validate_file_extension, validate_path};
use std::path::PathBuf;

/// 從 CSV 檔讀取目錄，欄位名稱對應 `RawListing`
#[derive(Debug, Clone)]
pub struct CsvCatalogSource {
    path: PathBuf,
}

impl CsvCatalogSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CatalogSource for CsvCatalogSource {
    fn load(&self) -> Result<Vec<RawListing>> {
        let shown = self.path.to_string_lossy();
        validate_path("catalog.path", &shown)?;
        validate_file_extension("catalog.path", &shown, &["csv"])?;

        tracing::debug!("Reading catalog from {}", shown);
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&self.path)?;

        let mut records = Vec::new();
        for row in reader.deserialize() {
            let record: RawListing = row?;
            records.push(record);
        }
        Ok(records)
    }
}

/// 內建的示範資料
#[derive(Debug, Clone, Copy, Default)]
pub struct SeedCatalogSource;

impl CatalogSource for SeedCatalogSource {
    fn load(&self) -> Result<Vec<RawListing>> {
        Ok(SEED
            .iter()
            .map(
                |&(id, name, category, provider_name, rating, reviews, price, distance, lat, lon)| {
                    RawListing {
                        id: id.to_string(),
                        name: name.to_string(),
                        category: category.to_string(),
                        provider_name: provider_name.to_string(),
                        rating: rating.to_string(),
                        reviews,
                        price: price.to_string(),
                        distance: distance.to_string(),
                        latitude: Some(lat),
                        longitude: Some(lon),
                    }
                },
            )
            .collect())
    }
}

type SeedRow = (
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    f64,
    u32,
    &'static str,
    &'static str,
    f64,
    f64,
);

const SEED: &[SeedRow] = &[
    ("1", "Plomería Express", "Plomería", "Juan Pérez", 4.8, 156, "Desde $150", "0.5 km", 19.4326, -99.1332),
    ("2", "Electricidad Pro", "Electricidad", "María García", 4.9, 89, "Desde $200", "0.8 km", 19.4327, -99.1333),
    ("3", "Pintura Fácil", "Pintura", "Carlos Ramírez", 4.7, 64, "Desde $100", "1.2 km", 19.4328, -99.1334),
    ("4", "Jardinería Verde", "Jardinería", "Lucía Hernández", 4.6, 75, "Desde $80", "1.5 km", 19.4329, -99.1335),
    ("5", "Cerrajería Segura", "Cerrajería", "Pedro Juanes", 4.5, 41, "Desde $90", "1.8 km", 19.4330, -99.1336),
    ("6", "Limpieza de Casa", "Limpieza", "Ana López", 4.8, 120, "Desde $50", "2.1 km", 19.4331, -99.1337),
    ("7", "Carpintería Artesanal", "Carpintería", "Miguel Torres", 4.4, 37, "Desde $250", "2.6 km", 19.4335, -99.1340),
    ("8", "Plomero Profesional", "Plomería", "Roberto Díaz", 4.9, 85, "Desde $80", "3.0 km", 19.4340, -99.1345),
    ("9", "Instalaciones Eléctricas", "Electricidad", "Sofía Martínez", 4.3, 52, "Desde $400", "3.4 km", 19.4344, -99.1350),
    ("10", "Limpieza Comercial", "Limpieza", "Juana Castillo", 4.7, 234, "Desde $250", "4.0 km", 19.4350, -99.1360),
];
