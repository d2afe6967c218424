use std::fs;

use anyhow::Result;
use tempfile::tempdir;

use taxi_prep::config::Config;
use taxi_prep::dataset;
use taxi_prep::pipeline::{CleaningPipeline, FeaturePipeline};

const HEADER: &str = "id,vendor_id,pickup_datetime,dropoff_datetime,passenger_count,\
                      pickup_longitude,pickup_latitude,dropoff_longitude,dropoff_latitude,\
                      store_and_fwd_flag,trip_duration";

fn valid_row(id: u32, pickup_hour: u32, duration: u32) -> String {
    format!(
        "id{id},2,2016-03-14 {pickup_hour:02}:00:00,2016-03-14 {pickup_hour:02}:59:00,1,\
         -73.9821,40.7679,-73.9646,40.7656,N,{duration}"
    )
}

/// Twelve input rows: seven valid unique trips, two exact duplicates of the
/// first, one out-of-bounds coordinate, one inverted datetime pair, and one
/// over-limit duration.
fn twelve_row_input() -> String {
    let mut rows = vec![HEADER.to_string()];

    for hour in 0..7 {
        rows.push(valid_row(hour, hour, 400 + hour));
    }
    // Exact duplicates of the first trip (same composite key).
    rows.push(valid_row(100, 0, 400));
    rows.push(valid_row(101, 0, 400));
    // Seattle pickup, far outside the NYC bounding box.
    rows.push(
        "id102,2,2016-03-14 10:00:00,2016-03-14 10:30:00,1,\
         -122.3321,47.6062,-73.9646,40.7656,N,1800"
            .to_string(),
    );
    // Dropoff before pickup.
    rows.push(
        "id103,2,2016-03-14 11:00:00,2016-03-14 10:00:00,1,\
         -73.9821,40.7679,-73.9646,40.7656,N,600"
            .to_string(),
    );
    // Two hours, over the one-hour limit.
    rows.push(valid_row(104, 12, 7200));

    rows.join("\n") + "\n"
}

#[test]
fn cleaning_removes_structural_failures_and_keeps_the_rest() -> Result<()> {
    let dir = tempdir()?;
    let input = dir.path().join("train.csv");
    fs::write(&input, twelve_row_input())?;

    let records = dataset::read_records(&input)?;
    assert_eq!(records.len(), 12);

    let mut pipeline = CleaningPipeline::new(&Config::default());
    let cleaned = pipeline.run(records);
    let stats = pipeline.stats();

    assert_eq!(cleaned.len(), 7);
    assert_eq!(stats.total_records, 12);
    assert_eq!(stats.valid_records, 7);
    assert_eq!(stats.invalid_records, 5);
    assert_eq!(stats.duplicates_removed, 2);
    assert_eq!(stats.coordinate_errors, 1);
    assert_eq!(stats.datetime_errors, 1);
    assert_eq!(stats.duration_errors, 1);

    // Every survivor carries the datetime-derived duration and an outlier flag.
    for record in &cleaned {
        assert_eq!(record.get("calculated_duration"), Some("3540"));
        assert!(record.get("outlier_flag").is_some());
    }
    Ok(())
}

#[test]
fn cleaned_csv_round_trips_through_the_fixed_schema() -> Result<()> {
    let dir = tempdir()?;
    let input = dir.path().join("train.csv");
    let output = dir.path().join("cleaned_taxi_data.csv");
    fs::write(&input, twelve_row_input())?;

    let mut pipeline = CleaningPipeline::new(&Config::default());
    let cleaned = pipeline.run(dataset::read_records(&input)?);
    dataset::write_cleaned(&output, &cleaned)?;

    let written = fs::read_to_string(&output)?;
    let mut lines = written.lines();
    assert_eq!(
        lines.next().unwrap(),
        "id,vendor_id,pickup_datetime,dropoff_datetime,passenger_count,pickup_longitude,\
         pickup_latitude,dropoff_longitude,dropoff_latitude,store_and_fwd_flag,trip_duration,\
         calculated_duration,outlier_flag"
    );
    assert_eq!(lines.count(), 7);

    // The cleaned file reloads as valid pipeline input.
    let reloaded = dataset::read_records(&output)?;
    assert_eq!(reloaded.len(), 7);
    assert_eq!(reloaded[0].get("id"), Some("id0"));
    Ok(())
}

#[test]
fn feature_engineering_enriches_every_cleaned_record() -> Result<()> {
    let dir = tempdir()?;
    let input = dir.path().join("train.csv");
    let cleaned_path = dir.path().join("cleaned_taxi_data.csv");
    let enhanced_path = dir.path().join("enhanced_taxi_data.csv");
    fs::write(&input, twelve_row_input())?;

    let mut cleaning = CleaningPipeline::new(&Config::default());
    let cleaned = cleaning.run(dataset::read_records(&input)?);
    dataset::write_cleaned(&cleaned_path, &cleaned)?;

    let mut features = FeaturePipeline::new();
    let enriched = features.run(dataset::read_records(&cleaned_path)?);

    assert_eq!(enriched.len(), 7);
    assert_eq!(features.stats().records_processed, 7);
    assert_eq!(features.stats().distance_calculations, 7);

    for record in &enriched {
        for column in [
            "trip_distance_km",
            "trip_speed_kmh",
            "pickup_hour",
            "time_of_day",
            "day_of_week",
            "is_weekend",
            "pickup_month",
            "is_rush_hour",
            "distance_per_minute",
            "estimated_idle_time",
            "efficiency_score",
            "trip_complexity",
            "pickup_borough",
            "dropoff_borough",
            "trip_type",
            "trip_patterns",
        ] {
            assert!(
                record.get(column).is_some(),
                "missing derived column {column}"
            );
        }
        assert_eq!(record.get("pickup_borough"), Some("Manhattan"));
        assert_eq!(record.get("trip_type"), Some("Intra-borough"));
    }

    // Enriched output keeps every cleaned column and appends the derived ones.
    dataset::write_enriched(&enhanced_path, &enriched)?;
    let written = fs::read_to_string(&enhanced_path)?;
    let header = written.lines().next().unwrap();
    assert!(header.starts_with(
        "id,vendor_id,pickup_datetime,dropoff_datetime,passenger_count,pickup_longitude"
    ));
    assert!(header.contains("outlier_flag"));
    assert!(header.ends_with("trip_patterns"));
    assert_eq!(written.lines().count(), 8);
    Ok(())
}
