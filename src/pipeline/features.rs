//! Feature engineering pipeline: per-record derivation of distance, speed,
//! temporal, efficiency, zone, and pattern features.
//!
//! Pure enrichment: the output set always has exactly as many records as
//! the input set. Step order matters: speed consumes distance, efficiency
//! consumes speed, pattern tagging consumes all three. A field that fails
//! to parse falls back to a documented default; nothing here removes or
//! rejects a record.

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use serde::Serialize;
use tracing::info;

use crate::algorithms::geo::haversine_km;
use crate::algorithms::stats::percentile;
use crate::constants;
use crate::types::TripRecord;

/// Counter bundle for a single feature engineering run; owned by the
/// pipeline instance, read-only after the run.
#[derive(Debug, Default, Clone, Serialize)]
pub struct FeatureStats {
    pub records_processed: usize,
    pub features_created: usize,
    pub distance_calculations: usize,
    pub time_features: usize,
    pub efficiency_metrics: usize,
}

#[derive(Debug, Default)]
pub struct FeaturePipeline {
    stats: FeatureStats,
}

/// p10/p90 fences for the relative pattern tags, computed once over the
/// whole enriched set.
struct PatternThresholds {
    speed_low: f64,
    speed_high: f64,
    distance_low: f64,
    distance_high: f64,
    duration_low: f64,
    duration_high: f64,
}

impl FeaturePipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> &FeatureStats {
        &self.stats
    }

    /// Runs every derivation step in order. Output count always equals
    /// input count.
    pub fn run(&mut self, records: Vec<TripRecord>) -> Vec<TripRecord> {
        self.stats.records_processed = records.len();
        info!(records = records.len(), "starting feature engineering");

        let records = self.add_trip_distances(records);
        let records = self.add_trip_speeds(records);
        let records = self.add_temporal_features(records);
        let records = self.add_efficiency_metrics(records);
        let records = self.classify_zones(records);
        let records = self.tag_patterns(records);

        info!(
            features = self.stats.features_created,
            "feature engineering finished"
        );
        records
    }

    fn add_trip_distances(&mut self, mut records: Vec<TripRecord>) -> Vec<TripRecord> {
        for record in &mut records {
            match pickup_dropoff_coords(record) {
                Some((plat, plon, dlat, dlon)) => {
                    let distance_km = haversine_km(plat, plon, dlat, dlon);
                    record.set(constants::COL_TRIP_DISTANCE_KM, format!("{distance_km:.3}"));
                    self.stats.distance_calculations += 1;
                    self.stats.features_created += 1;
                }
                None => record.set(constants::COL_TRIP_DISTANCE_KM, "0.000"),
            }
        }

        info!(
            distances = self.stats.distance_calculations,
            "trip distances calculated"
        );
        records
    }

    fn add_trip_speeds(&mut self, mut records: Vec<TripRecord>) -> Vec<TripRecord> {
        for record in &mut records {
            let distance_km = record
                .parse_f64(constants::COL_TRIP_DISTANCE_KM)
                .unwrap_or(0.0);
            let duration_secs = record
                .parse_f64(constants::COL_TRIP_DURATION)
                .unwrap_or(0.0);

            let speed_kmh = if duration_secs > 0.0 {
                distance_km / (duration_secs / 3600.0)
            } else {
                0.0
            };
            record.set(constants::COL_TRIP_SPEED_KMH, format!("{speed_kmh:.2}"));
            self.stats.features_created += 1;
        }

        records
    }

    fn add_temporal_features(&mut self, mut records: Vec<TripRecord>) -> Vec<TripRecord> {
        for record in &mut records {
            let pickup = record
                .get(constants::COL_PICKUP_DATETIME)
                .and_then(|raw| {
                    NaiveDateTime::parse_from_str(raw, constants::DATETIME_FORMAT).ok()
                });

            match pickup {
                Some(pickup) => {
                    let hour = pickup.hour();
                    let weekend = matches!(pickup.weekday(), Weekday::Sat | Weekday::Sun);
                    let rush_hour =
                        !weekend && ((7..=9).contains(&hour) || (17..=19).contains(&hour));

                    record.set(constants::COL_PICKUP_HOUR, hour.to_string());
                    record.set(constants::COL_TIME_OF_DAY, time_of_day(hour));
                    record.set(constants::COL_DAY_OF_WEEK, pickup.format("%A").to_string());
                    record.set(constants::COL_IS_WEEKEND, bool_str(weekend));
                    record.set(constants::COL_PICKUP_MONTH, pickup.month().to_string());
                    record.set(constants::COL_IS_RUSH_HOUR, bool_str(rush_hour));
                    self.stats.time_features += 6;
                    self.stats.features_created += 6;
                }
                None => {
                    record.set(constants::COL_PICKUP_HOUR, "0");
                    record.set(constants::COL_TIME_OF_DAY, "Unknown");
                    record.set(constants::COL_DAY_OF_WEEK, "Unknown");
                    record.set(constants::COL_IS_WEEKEND, "False");
                    record.set(constants::COL_PICKUP_MONTH, "1");
                    record.set(constants::COL_IS_RUSH_HOUR, "False");
                }
            }
        }

        info!(
            time_features = self.stats.time_features,
            "temporal features extracted"
        );
        records
    }

    fn add_efficiency_metrics(&mut self, mut records: Vec<TripRecord>) -> Vec<TripRecord> {
        for record in &mut records {
            let distance_km = record
                .parse_f64(constants::COL_TRIP_DISTANCE_KM)
                .unwrap_or(0.0);
            let duration_secs = record
                .parse_f64(constants::COL_TRIP_DURATION)
                .unwrap_or(0.0);
            let speed_kmh = record
                .parse_f64(constants::COL_TRIP_SPEED_KMH)
                .unwrap_or(0.0);

            let duration_minutes = duration_secs / 60.0;
            let distance_per_minute = if duration_minutes > 0.0 {
                distance_km / duration_minutes
            } else {
                0.0
            };
            record.set(
                constants::COL_DISTANCE_PER_MINUTE,
                format!("{distance_per_minute:.4}"),
            );

            // Time spent not moving: actual duration minus the time the
            // trip would take at its observed speed. Zero speed means the
            // whole duration counts as idle.
            let idle_secs = if speed_kmh > 0.0 {
                let theoretical_secs = distance_km / speed_kmh * 3600.0;
                (duration_secs - theoretical_secs).max(0.0)
            } else {
                duration_secs
            };
            record.set(constants::COL_ESTIMATED_IDLE_TIME, format!("{idle_secs:.0}"));

            let efficiency = if speed_kmh > 0.0 {
                (speed_kmh / constants::MAX_REASONABLE_SPEED_KMH * 100.0).min(100.0)
            } else {
                0.0
            };
            record.set(constants::COL_EFFICIENCY_SCORE, format!("{efficiency:.1}"));

            // Actual duration against the expected duration at the
            // reference city speed.
            let complexity = if distance_km > 0.0 && duration_secs > 0.0 {
                let expected_secs = distance_km / constants::REFERENCE_SPEED_KMH * 3600.0;
                duration_secs / expected_secs
            } else {
                1.0
            };
            record.set(constants::COL_TRIP_COMPLEXITY, format!("{complexity:.2}"));

            self.stats.efficiency_metrics += 4;
            self.stats.features_created += 4;
        }

        info!(
            metrics = self.stats.efficiency_metrics,
            "efficiency metrics calculated"
        );
        records
    }

    fn classify_zones(&mut self, mut records: Vec<TripRecord>) -> Vec<TripRecord> {
        for record in &mut records {
            match pickup_dropoff_coords(record) {
                Some((plat, plon, dlat, dlon)) => {
                    let pickup_borough = nearest_borough(plat, plon);
                    let dropoff_borough = nearest_borough(dlat, dlon);
                    let trip_type = if pickup_borough == dropoff_borough {
                        "Intra-borough"
                    } else {
                        "Inter-borough"
                    };

                    record.set(constants::COL_PICKUP_BOROUGH, pickup_borough);
                    record.set(constants::COL_DROPOFF_BOROUGH, dropoff_borough);
                    record.set(constants::COL_TRIP_TYPE, trip_type);
                    self.stats.features_created += 3;
                }
                None => {
                    record.set(constants::COL_PICKUP_BOROUGH, "Unknown");
                    record.set(constants::COL_DROPOFF_BOROUGH, "Unknown");
                    record.set(constants::COL_TRIP_TYPE, "Unknown");
                }
            }
        }

        records
    }

    /// Tags each record against p10/p90 fences computed over the whole set,
    /// plus a few absolute thresholds.
    fn tag_patterns(&mut self, mut records: Vec<TripRecord>) -> Vec<TripRecord> {
        let mut speeds = Vec::with_capacity(records.len());
        let mut distances = Vec::with_capacity(records.len());
        let mut durations = Vec::with_capacity(records.len());
        for record in &records {
            if let Some((speed, distance, duration)) = parse_metrics(record) {
                speeds.push(speed);
                distances.push(distance);
                durations.push(duration);
            }
        }

        let thresholds = PatternThresholds {
            speed_low: percentile(&speeds, constants::PATTERN_LOW_PERCENTILE),
            speed_high: percentile(&speeds, constants::PATTERN_HIGH_PERCENTILE),
            distance_low: percentile(&distances, constants::PATTERN_LOW_PERCENTILE),
            distance_high: percentile(&distances, constants::PATTERN_HIGH_PERCENTILE),
            duration_low: percentile(&durations, constants::PATTERN_LOW_PERCENTILE),
            duration_high: percentile(&durations, constants::PATTERN_HIGH_PERCENTILE),
        };

        for record in &mut records {
            match parse_metrics(record) {
                Some((speed, distance, duration)) => {
                    let mut patterns: Vec<&str> = Vec::new();

                    if speed < thresholds.speed_low {
                        patterns.push("Slow");
                    } else if speed > thresholds.speed_high {
                        patterns.push("Fast");
                    }

                    if distance < thresholds.distance_low {
                        patterns.push("Short");
                    } else if distance > thresholds.distance_high {
                        patterns.push("Long");
                    }

                    if duration < thresholds.duration_low {
                        patterns.push("Quick");
                    } else if duration > thresholds.duration_high {
                        patterns.push("Extended");
                    }

                    if speed < constants::TRAFFIC_SPEED_KMH {
                        patterns.push("Traffic");
                    }
                    if distance < constants::LOCAL_DISTANCE_KM {
                        patterns.push("Local");
                    }
                    if duration > constants::JOURNEY_DURATION_SECS {
                        patterns.push("Journey");
                    }

                    let tag = if patterns.is_empty() {
                        "Normal".to_string()
                    } else {
                        patterns.join(";")
                    };
                    record.set(constants::COL_TRIP_PATTERNS, tag);
                    self.stats.features_created += 1;
                }
                None => record.set(constants::COL_TRIP_PATTERNS, "Unknown"),
            }
        }

        info!("trip patterns tagged");
        records
    }
}

fn pickup_dropoff_coords(record: &TripRecord) -> Option<(f64, f64, f64, f64)> {
    Some((
        record.parse_f64(constants::COL_PICKUP_LATITUDE)?,
        record.parse_f64(constants::COL_PICKUP_LONGITUDE)?,
        record.parse_f64(constants::COL_DROPOFF_LATITUDE)?,
        record.parse_f64(constants::COL_DROPOFF_LONGITUDE)?,
    ))
}

fn parse_metrics(record: &TripRecord) -> Option<(f64, f64, f64)> {
    Some((
        record.parse_f64(constants::COL_TRIP_SPEED_KMH)?,
        record.parse_f64(constants::COL_TRIP_DISTANCE_KM)?,
        record.parse_f64(constants::COL_TRIP_DURATION)?,
    ))
}

fn nearest_borough(lat: f64, lon: f64) -> &'static str {
    let mut closest = constants::BOROUGH_CENTERS[0].0;
    let mut closest_distance = f64::INFINITY;
    for (borough, center_lat, center_lon) in constants::BOROUGH_CENTERS {
        let distance = haversine_km(lat, lon, center_lat, center_lon);
        if distance < closest_distance {
            closest_distance = distance;
            closest = borough;
        }
    }
    closest
}

fn time_of_day(hour: u32) -> &'static str {
    match hour {
        5..=11 => "Morning",
        12..=16 => "Afternoon",
        17..=20 => "Evening",
        _ => "Night",
    }
}

// The downstream loader expects True/False capitalization.
fn bool_str(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}
