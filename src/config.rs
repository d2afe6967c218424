use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::constants;
use crate::error::{PipelineError, Result};

/// Run configuration. Every field has a default taken from `constants`, so a
/// config file only needs the sections it overrides.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub bounds: GeoBounds,
    pub constraints: TripConstraints,
    pub outliers: OutlierConfig,
}

/// Geographic bounding box for coordinate validation.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct GeoBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl GeoBounds {
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&lat) && (self.min_lon..=self.max_lon).contains(&lon)
    }
}

impl Default for GeoBounds {
    fn default() -> Self {
        Self {
            min_lat: constants::NYC_MIN_LAT,
            max_lat: constants::NYC_MAX_LAT,
            min_lon: constants::NYC_MIN_LON,
            max_lon: constants::NYC_MAX_LON,
        }
    }
}

/// Hard bounds on trip duration and passenger count.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct TripConstraints {
    pub min_duration_secs: i64,
    pub max_duration_secs: i64,
    pub min_passengers: i64,
    pub max_passengers: i64,
}

impl Default for TripConstraints {
    fn default() -> Self {
        Self {
            min_duration_secs: constants::MIN_TRIP_DURATION_SECS,
            max_duration_secs: constants::MAX_TRIP_DURATION_SECS,
            min_passengers: constants::MIN_PASSENGERS,
            max_passengers: constants::MAX_PASSENGERS,
        }
    }
}

/// Parameters for the IQR outlier annotation stage.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct OutlierConfig {
    pub iqr_multiplier: f64,
    pub large_dataset_threshold: usize,
    pub max_sample_size: usize,
    /// RNG seed for threshold sampling on large datasets; set for
    /// reproducible runs.
    pub seed: Option<u64>,
}

impl Default for OutlierConfig {
    fn default() -> Self {
        Self {
            iqr_multiplier: constants::OUTLIER_IQR_MULTIPLIER,
            large_dataset_threshold: constants::LARGE_DATASET_THRESHOLD,
            max_sample_size: constants::OUTLIER_SAMPLE_SIZE,
            seed: None,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(path).map_err(|e| {
            PipelineError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config: Config = toml::from_str(&config_content)?;
        Ok(config)
    }

    /// Loads the given config file, or falls back to defaults when none was
    /// supplied. A supplied-but-unreadable file is an error.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_nyc_constants() {
        let config = Config::default();
        assert_eq!(config.bounds.min_lat, constants::NYC_MIN_LAT);
        assert_eq!(config.constraints.max_duration_secs, 3600);
        assert_eq!(config.outliers.iqr_multiplier, 2.0);
        assert_eq!(config.outliers.seed, None);
    }

    #[test]
    fn partial_toml_overrides_only_named_fields() {
        let config: Config = toml::from_str(
            r#"
            [outliers]
            seed = 42
            max_sample_size = 1000
            "#,
        )
        .unwrap();

        assert_eq!(config.outliers.seed, Some(42));
        assert_eq!(config.outliers.max_sample_size, 1000);
        assert_eq!(config.outliers.iqr_multiplier, 2.0);
        assert_eq!(config.bounds.max_lat, constants::NYC_MAX_LAT);
    }

    #[test]
    fn bounds_containment_is_inclusive() {
        let bounds = GeoBounds::default();
        assert!(bounds.contains(constants::NYC_MIN_LAT, constants::NYC_MIN_LON));
        assert!(bounds.contains(40.75, -73.98));
        assert!(!bounds.contains(41.0, -73.98));
        assert!(!bounds.contains(40.75, -122.33));
    }
}
