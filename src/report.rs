//! Human-readable run reports and JSON stat sidecars.

use std::fs;
use std::io::Write;
use std::path::Path;

use chrono::Local;
use serde::Serialize;
use tracing::info;

use crate::config::GeoBounds;
use crate::error::Result;
use crate::pipeline::{CleaningStats, FeatureStats};
use crate::types::TripRecord;

/// Feature descriptions rendered into the feature report; kept in output
/// column order.
const FEATURE_DESCRIPTIONS: [(&str, &str); 11] = [
    ("trip_distance_km", "Great circle distance between pickup and dropoff"),
    ("trip_speed_kmh", "Average speed calculated from distance and duration"),
    ("distance_per_minute", "Distance covered per minute of travel"),
    ("estimated_idle_time", "Estimated time spent not moving (traffic, stops)"),
    ("efficiency_score", "Trip efficiency score (0-100, higher is better)"),
    ("trip_complexity", "Ratio of actual to expected duration"),
    ("pickup_borough", "Estimated NYC borough for pickup location"),
    ("trip_type", "Intra-borough or inter-borough classification"),
    ("time_of_day", "Morning, Afternoon, Evening, or Night"),
    ("is_rush_hour", "Whether trip occurred during rush hours"),
    ("trip_patterns", "Speed, distance, and duration pattern classification"),
];

/// Field prefixes that identify derived/analytic columns in the sample
/// record section of the feature report.
const SAMPLE_FIELD_PREFIXES: [&str; 7] = [
    "trip_", "pickup_", "dropoff_", "is_", "time_", "efficiency", "distance_per",
];

pub fn write_cleaning_report(
    path: &Path,
    input: &Path,
    output: &Path,
    stats: &CleaningStats,
    bounds: &GeoBounds,
) -> Result<()> {
    let mut file = fs::File::create(path)?;

    writeln!(file, "NYC TAXI DATA CLEANING REPORT")?;
    writeln!(file, "{}", "=".repeat(50))?;
    writeln!(file)?;
    writeln!(file, "Input file: {}", input.display())?;
    writeln!(file, "Output file: {}", output.display())?;
    writeln!(
        file,
        "Cleaning date: {}",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    )?;
    writeln!(file)?;

    writeln!(file, "CLEANING STATISTICS:")?;
    writeln!(file, "{}", "-".repeat(30))?;
    writeln!(file, "Total Records: {}", stats.total_records)?;
    writeln!(file, "Valid Records: {}", stats.valid_records)?;
    writeln!(file, "Invalid Records: {}", stats.invalid_records)?;
    writeln!(file, "Duplicates Removed: {}", stats.duplicates_removed)?;
    writeln!(file, "Missing Values Fixed: {}", stats.missing_values_fixed)?;
    writeln!(file, "Outliers Detected: {}", stats.outliers_detected)?;
    writeln!(file, "Coordinate Errors: {}", stats.coordinate_errors)?;
    writeln!(file, "Datetime Errors: {}", stats.datetime_errors)?;
    writeln!(file, "Duration Errors: {}", stats.duration_errors)?;
    writeln!(file)?;
    writeln!(
        file,
        "Data Quality: {:.2}% valid records",
        stats.data_quality_pct()
    )?;
    writeln!(file)?;

    writeln!(file, "CLEANING ASSUMPTIONS:")?;
    writeln!(file, "{}", "-".repeat(30))?;
    writeln!(file, "• Missing passenger_count defaulted to 1")?;
    writeln!(file, "• Missing store_and_fwd_flag defaulted to 'N'")?;
    writeln!(file, "• Missing vendor_id defaulted to 1")?;
    writeln!(file, "• Trip duration must be between 1 minute and 1 hour")?;
    writeln!(file, "• Coordinates must be within NYC boundaries")?;
    writeln!(file, "• Outliers detected using IQR method (2.0 multiplier)")?;
    writeln!(file)?;

    writeln!(file, "NYC COORDINATE BOUNDS USED:")?;
    writeln!(file, "{}", "-".repeat(30))?;
    writeln!(file, "min_lat: {}", bounds.min_lat)?;
    writeln!(file, "max_lat: {}", bounds.max_lat)?;
    writeln!(file, "min_lon: {}", bounds.min_lon)?;
    writeln!(file, "max_lon: {}", bounds.max_lon)?;

    info!(path = %path.display(), "cleaning report saved");
    Ok(())
}

pub fn write_feature_report(
    path: &Path,
    input: &Path,
    output: &Path,
    stats: &FeatureStats,
    sample: Option<&TripRecord>,
) -> Result<()> {
    let mut file = fs::File::create(path)?;

    writeln!(file, "FEATURE ENGINEERING REPORT")?;
    writeln!(file, "{}", "=".repeat(50))?;
    writeln!(file)?;
    writeln!(file, "Input file: {}", input.display())?;
    writeln!(file, "Output file: {}", output.display())?;
    writeln!(
        file,
        "Processing date: {}",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    )?;
    writeln!(file)?;

    writeln!(file, "FEATURE STATISTICS:")?;
    writeln!(file, "{}", "-".repeat(30))?;
    writeln!(file, "Records Processed: {}", stats.records_processed)?;
    writeln!(file, "Features Created: {}", stats.features_created)?;
    writeln!(file, "Distance Calculations: {}", stats.distance_calculations)?;
    writeln!(file, "Time Features: {}", stats.time_features)?;
    writeln!(file, "Efficiency Metrics: {}", stats.efficiency_metrics)?;
    writeln!(file)?;

    writeln!(file, "DERIVED FEATURES CREATED:")?;
    writeln!(file, "{}", "-".repeat(30))?;
    writeln!(file, "1. Trip Distance (km) - Haversine distance calculation")?;
    writeln!(file, "2. Trip Speed (km/h) - Average speed during trip")?;
    writeln!(file, "3. Temporal Features - Hour, day, weekend, rush hour")?;
    writeln!(
        file,
        "4. Efficiency Metrics - Distance per minute, idle time, efficiency score"
    )?;
    writeln!(file, "5. Zone Classification - Borough identification")?;
    writeln!(
        file,
        "6. Trip Patterns - Speed, distance, and duration classifications"
    )?;
    writeln!(file)?;

    writeln!(file, "FEATURE DESCRIPTIONS:")?;
    writeln!(file, "{}", "-".repeat(30))?;
    for (feature, description) in FEATURE_DESCRIPTIONS {
        writeln!(file, "{}: {}", feature, description)?;
    }

    if let Some(sample) = sample {
        writeln!(file)?;
        writeln!(file, "SAMPLE STATISTICS:")?;
        writeln!(file, "{}", "-".repeat(30))?;
        writeln!(file, "Sample enhanced record:")?;
        for (column, value) in sample.iter() {
            if SAMPLE_FIELD_PREFIXES
                .iter()
                .any(|prefix| column.starts_with(prefix))
            {
                writeln!(file, "  {}: {}", column, value)?;
            }
        }
    }

    info!(path = %path.display(), "feature report saved");
    Ok(())
}

/// Dumps a stats bundle as pretty-printed JSON next to the text report.
pub fn write_stats_json<S: Serialize>(path: &Path, stats: &S) -> Result<()> {
    let json = serde_json::to_string_pretty(stats)?;
    fs::write(path, json)?;
    info!(path = %path.display(), "stats sidecar saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleaning_report_lists_counters_and_bounds() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cleaning_report.txt");

        let stats = CleaningStats {
            total_records: 12,
            valid_records: 7,
            invalid_records: 5,
            duplicates_removed: 2,
            coordinate_errors: 1,
            datetime_errors: 1,
            duration_errors: 1,
            ..CleaningStats::default()
        };
        write_cleaning_report(
            &path,
            Path::new("train.csv"),
            Path::new("cleaned.csv"),
            &stats,
            &GeoBounds::default(),
        )
        .unwrap();

        let report = fs::read_to_string(&path).unwrap();
        assert!(report.contains("Total Records: 12"));
        assert!(report.contains("Duplicates Removed: 2"));
        assert!(report.contains("Data Quality: 58.33% valid records"));
        assert!(report.contains("min_lat: 40.4774"));
    }

    #[test]
    fn feature_report_includes_the_sample_record_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("features_report.txt");

        let mut sample = TripRecord::new(2);
        sample.set("id", "id1");
        sample.set("trip_distance_km", "1.500");
        sample.set("vendor_id", "2");
        sample.set("is_weekend", "False");

        let stats = FeatureStats {
            records_processed: 1,
            features_created: 17,
            ..FeatureStats::default()
        };
        write_feature_report(
            &path,
            Path::new("cleaned.csv"),
            Path::new("enhanced.csv"),
            &stats,
            Some(&sample),
        )
        .unwrap();

        let report = fs::read_to_string(&path).unwrap();
        assert!(report.contains("Records Processed: 1"));
        assert!(report.contains("  trip_distance_km: 1.500"));
        assert!(report.contains("  is_weekend: False"));
        // Source-only columns stay out of the sample section.
        assert!(!report.contains("  id: id1"));
        assert!(!report.contains("  vendor_id: 2"));
    }

    #[test]
    fn stats_sidecar_is_valid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.json");

        let stats = CleaningStats {
            total_records: 3,
            ..CleaningStats::default()
        };
        write_stats_json(&path, &stats).unwrap();

        let parsed: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed["total_records"], 3);
    }
}
