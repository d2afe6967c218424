//! Cleaning pipeline: dedup, missing-value defaulting, structural
//! validation, and outlier annotation.
//!
//! Stages run strictly in order and each consumes the survivor set of the
//! previous one. Structurally invalid records get a validity flag and are
//! removed; statistical outliers are flagged but kept.

use std::collections::HashSet;

use chrono::NaiveDateTime;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::info;

use crate::algorithms::stats::{detect_outliers_iqr, OutlierBounds};
use crate::config::{Config, GeoBounds, OutlierConfig, TripConstraints};
use crate::constants;
use crate::types::{OutlierFlag, TripRecord, ValidityFlag};

/// Counter bundle for a single cleaning run. Owned by the pipeline instance
/// that produced it; incremented monotonically while the run is in flight,
/// read-only afterwards.
#[derive(Debug, Default, Clone, Serialize)]
pub struct CleaningStats {
    pub total_records: usize,
    pub valid_records: usize,
    pub invalid_records: usize,
    pub duplicates_removed: usize,
    pub missing_values_fixed: usize,
    pub outliers_detected: usize,
    pub coordinate_errors: usize,
    pub datetime_errors: usize,
    pub duration_errors: usize,
}

impl CleaningStats {
    pub fn data_quality_pct(&self) -> f64 {
        if self.total_records == 0 {
            0.0
        } else {
            self.valid_records as f64 / self.total_records as f64 * 100.0
        }
    }
}

pub struct CleaningPipeline {
    bounds: GeoBounds,
    constraints: TripConstraints,
    outliers: OutlierConfig,
    stats: CleaningStats,
}

impl CleaningPipeline {
    pub fn new(config: &Config) -> Self {
        Self {
            bounds: config.bounds,
            constraints: config.constraints,
            outliers: config.outliers,
            stats: CleaningStats::default(),
        }
    }

    /// Pins the sampling RNG for reproducible outlier thresholds on large
    /// datasets. Overrides any seed from the config file.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.outliers.seed = Some(seed);
        self
    }

    pub fn stats(&self) -> &CleaningStats {
        &self.stats
    }

    pub fn bounds(&self) -> &GeoBounds {
        &self.bounds
    }

    /// Runs every cleaning stage in order and returns the survivor set.
    /// Output count is always ≤ input count.
    pub fn run(&mut self, records: Vec<TripRecord>) -> Vec<TripRecord> {
        self.stats.total_records = records.len();
        info!(records = records.len(), "starting cleaning pipeline");

        let records = self.remove_duplicates(records);
        let records = self.fill_missing_values(records);
        let records = self.validate_coordinates(records);
        let records = self.validate_datetimes(records);
        let records = self.validate_trip_bounds(records);
        let records = self.annotate_outliers(records);

        self.stats.valid_records = records.len();
        self.stats.invalid_records = self.stats.total_records - records.len();
        info!(
            valid = self.stats.valid_records,
            invalid = self.stats.invalid_records,
            "cleaning pipeline finished"
        );
        records
    }

    /// First occurrence of a composite key survives; later ones are dropped.
    fn remove_duplicates(&mut self, records: Vec<TripRecord>) -> Vec<TripRecord> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut unique = Vec::with_capacity(records.len());

        for record in records {
            let key = [
                record.get(constants::COL_PICKUP_DATETIME).unwrap_or(""),
                record.get(constants::COL_DROPOFF_DATETIME).unwrap_or(""),
                record.get(constants::COL_PICKUP_LONGITUDE).unwrap_or(""),
                record.get(constants::COL_PICKUP_LATITUDE).unwrap_or(""),
                record.get(constants::COL_TRIP_DURATION).unwrap_or(""),
            ]
            .join("|");

            if seen.insert(key) {
                unique.push(record);
            } else {
                self.stats.duplicates_removed += 1;
            }
        }

        info!(
            removed = self.stats.duplicates_removed,
            "duplicate removal complete"
        );
        unique
    }

    /// Substitutes documented defaults for absent or empty fields. Never
    /// removes a record; a record counts once no matter how many fields
    /// were substituted.
    fn fill_missing_values(&mut self, mut records: Vec<TripRecord>) -> Vec<TripRecord> {
        for record in &mut records {
            let mut fixed = false;
            for (column, default) in [
                (constants::COL_PASSENGER_COUNT, "1"),
                (constants::COL_STORE_AND_FWD_FLAG, "N"),
                (constants::COL_VENDOR_ID, "1"),
            ] {
                if record.get(column).map_or(true, str::is_empty) {
                    record.set(column, default);
                    fixed = true;
                }
            }
            if fixed {
                self.stats.missing_values_fixed += 1;
            }
        }

        info!(
            fixed = self.stats.missing_values_fixed,
            "missing value defaulting complete"
        );
        records
    }

    fn validate_coordinates(&mut self, records: Vec<TripRecord>) -> Vec<TripRecord> {
        let mut valid = Vec::with_capacity(records.len());

        for mut record in records {
            if self.coordinates_in_bounds(&record) {
                valid.push(record);
            } else {
                record.set(
                    constants::COL_VALIDITY_FLAG,
                    ValidityFlag::InvalidCoordinates.as_str(),
                );
                self.stats.coordinate_errors += 1;
            }
        }

        info!(
            removed = self.stats.coordinate_errors,
            "coordinate validation complete"
        );
        valid
    }

    fn coordinates_in_bounds(&self, record: &TripRecord) -> bool {
        [
            (constants::COL_PICKUP_LATITUDE, constants::COL_PICKUP_LONGITUDE),
            (
                constants::COL_DROPOFF_LATITUDE,
                constants::COL_DROPOFF_LONGITUDE,
            ),
        ]
        .iter()
        .all(|(lat_col, lon_col)| {
            match (record.parse_f64(lat_col), record.parse_f64(lon_col)) {
                (Some(lat), Some(lon)) => self.bounds.contains(lat, lon),
                _ => false,
            }
        })
    }

    /// Both timestamps must parse and dropoff must be strictly after pickup.
    /// Survivors gain a `calculated_duration` field with the actual elapsed
    /// seconds.
    fn validate_datetimes(&mut self, records: Vec<TripRecord>) -> Vec<TripRecord> {
        let mut valid = Vec::with_capacity(records.len());

        for mut record in records {
            match trip_interval_secs(&record) {
                Some(elapsed) => {
                    record.set(constants::COL_CALCULATED_DURATION, elapsed.to_string());
                    valid.push(record);
                }
                None => {
                    record.set(
                        constants::COL_VALIDITY_FLAG,
                        ValidityFlag::InvalidDatetime.as_str(),
                    );
                    self.stats.datetime_errors += 1;
                }
            }
        }

        info!(
            removed = self.stats.datetime_errors,
            "datetime validation complete"
        );
        valid
    }

    fn validate_trip_bounds(&mut self, records: Vec<TripRecord>) -> Vec<TripRecord> {
        let mut valid = Vec::with_capacity(records.len());

        for mut record in records {
            let duration = record.parse_i64(constants::COL_TRIP_DURATION);
            let passengers = record.parse_i64(constants::COL_PASSENGER_COUNT);
            let within = matches!(
                (duration, passengers),
                (Some(d), Some(p))
                    if (self.constraints.min_duration_secs..=self.constraints.max_duration_secs)
                        .contains(&d)
                        && (self.constraints.min_passengers..=self.constraints.max_passengers)
                            .contains(&p)
            );

            if within {
                valid.push(record);
            } else {
                record.set(
                    constants::COL_VALIDITY_FLAG,
                    ValidityFlag::InvalidDurationOrPassengers.as_str(),
                );
                self.stats.duration_errors += 1;
            }
        }

        info!(
            removed = self.stats.duration_errors,
            "duration/passenger validation complete"
        );
        valid
    }

    /// Flags duration outliers without removing them. On large survivor
    /// sets the IQR fences are estimated from a bounded random sample and
    /// then applied to the entire set.
    fn annotate_outliers(&mut self, mut records: Vec<TripRecord>) -> Vec<TripRecord> {
        let durations: Vec<f64> = records
            .iter()
            .map(|record| {
                record
                    .parse_f64(constants::COL_TRIP_DURATION)
                    .unwrap_or(0.0)
            })
            .collect();

        let Some(bounds) = self.duration_bounds(&durations) else {
            // Too few survivors for quartiles; everything is normal.
            for record in &mut records {
                record.set(constants::COL_OUTLIER_FLAG, OutlierFlag::Normal.as_str());
            }
            info!(outliers = 0, "outlier annotation complete");
            return records;
        };

        for (record, duration) in records.iter_mut().zip(&durations) {
            let flag = if bounds.is_outlier(*duration) {
                self.stats.outliers_detected += 1;
                OutlierFlag::DurationOutlier
            } else {
                OutlierFlag::Normal
            };
            record.set(constants::COL_OUTLIER_FLAG, flag.as_str());
        }

        info!(
            outliers = self.stats.outliers_detected,
            lower = bounds.lower,
            upper = bounds.upper,
            "outlier annotation complete"
        );
        records
    }

    fn duration_bounds(&self, durations: &[f64]) -> Option<OutlierBounds> {
        if durations.len() > self.outliers.large_dataset_threshold {
            let sample_size = self.outliers.max_sample_size.min(durations.len());
            info!(
                records = durations.len(),
                sample = sample_size,
                "large dataset, estimating outlier thresholds from a sample"
            );

            let mut rng = match self.outliers.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let sample: Vec<f64> = rand::seq::index::sample(&mut rng, durations.len(), sample_size)
                .into_iter()
                .map(|index| durations[index])
                .collect();

            let (_, bounds) = detect_outliers_iqr(&sample, self.outliers.iqr_multiplier);
            bounds
        } else {
            let (_, bounds) = detect_outliers_iqr(durations, self.outliers.iqr_multiplier);
            bounds
        }
    }
}

fn trip_interval_secs(record: &TripRecord) -> Option<i64> {
    let pickup = parse_datetime(record.get(constants::COL_PICKUP_DATETIME)?)?;
    let dropoff = parse_datetime(record.get(constants::COL_DROPOFF_DATETIME)?)?;
    if dropoff > pickup {
        Some((dropoff - pickup).num_seconds())
    } else {
        None
    }
}

fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, constants::DATETIME_FORMAT).ok()
}
