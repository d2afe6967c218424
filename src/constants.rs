/// Column name constants to ensure consistency across the pipelines.
/// Input columns arrive from the source CSV; derived columns are appended
/// by the cleaning and feature engineering stages.

// Source columns
pub const COL_ID: &str = "id";
pub const COL_VENDOR_ID: &str = "vendor_id";
pub const COL_PICKUP_DATETIME: &str = "pickup_datetime";
pub const COL_DROPOFF_DATETIME: &str = "dropoff_datetime";
pub const COL_PASSENGER_COUNT: &str = "passenger_count";
pub const COL_PICKUP_LONGITUDE: &str = "pickup_longitude";
pub const COL_PICKUP_LATITUDE: &str = "pickup_latitude";
pub const COL_DROPOFF_LONGITUDE: &str = "dropoff_longitude";
pub const COL_DROPOFF_LATITUDE: &str = "dropoff_latitude";
pub const COL_STORE_AND_FWD_FLAG: &str = "store_and_fwd_flag";
pub const COL_TRIP_DURATION: &str = "trip_duration";

// Columns added by the cleaning pipeline
pub const COL_VALIDITY_FLAG: &str = "validity_flag";
pub const COL_CALCULATED_DURATION: &str = "calculated_duration";
pub const COL_OUTLIER_FLAG: &str = "outlier_flag";

// Columns added by the feature engineering pipeline
pub const COL_TRIP_DISTANCE_KM: &str = "trip_distance_km";
pub const COL_TRIP_SPEED_KMH: &str = "trip_speed_kmh";
pub const COL_PICKUP_HOUR: &str = "pickup_hour";
pub const COL_TIME_OF_DAY: &str = "time_of_day";
pub const COL_DAY_OF_WEEK: &str = "day_of_week";
pub const COL_IS_WEEKEND: &str = "is_weekend";
pub const COL_PICKUP_MONTH: &str = "pickup_month";
pub const COL_IS_RUSH_HOUR: &str = "is_rush_hour";
pub const COL_DISTANCE_PER_MINUTE: &str = "distance_per_minute";
pub const COL_ESTIMATED_IDLE_TIME: &str = "estimated_idle_time";
pub const COL_EFFICIENCY_SCORE: &str = "efficiency_score";
pub const COL_TRIP_COMPLEXITY: &str = "trip_complexity";
pub const COL_PICKUP_BOROUGH: &str = "pickup_borough";
pub const COL_DROPOFF_BOROUGH: &str = "dropoff_borough";
pub const COL_TRIP_TYPE: &str = "trip_type";
pub const COL_TRIP_PATTERNS: &str = "trip_patterns";

/// Column order of the cleaned dataset; stable contract for the downstream loader.
pub const CLEANED_COLUMNS: [&str; 13] = [
    COL_ID,
    COL_VENDOR_ID,
    COL_PICKUP_DATETIME,
    COL_DROPOFF_DATETIME,
    COL_PASSENGER_COUNT,
    COL_PICKUP_LONGITUDE,
    COL_PICKUP_LATITUDE,
    COL_DROPOFF_LONGITUDE,
    COL_DROPOFF_LATITUDE,
    COL_STORE_AND_FWD_FLAG,
    COL_TRIP_DURATION,
    COL_CALCULATED_DURATION,
    COL_OUTLIER_FLAG,
];

/// Timestamp format used by both datetime columns.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// NYC approximate boundaries
pub const NYC_MIN_LAT: f64 = 40.4774;
pub const NYC_MAX_LAT: f64 = 40.9176;
pub const NYC_MIN_LON: f64 = -74.2591;
pub const NYC_MAX_LON: f64 = -73.7004;

// Reasonable trip constraints
pub const MIN_TRIP_DURATION_SECS: i64 = 60;
pub const MAX_TRIP_DURATION_SECS: i64 = 3600;
pub const MIN_PASSENGERS: i64 = 1;
pub const MAX_PASSENGERS: i64 = 8;

// Outlier detection parameters
pub const OUTLIER_IQR_MULTIPLIER: f64 = 2.0;
/// Above this record count, IQR thresholds are estimated from a random sample.
pub const LARGE_DATASET_THRESHOLD: usize = 100_000;
pub const OUTLIER_SAMPLE_SIZE: usize = 50_000;

/// NYC borough approximate centers for zone classification.
pub const BOROUGH_CENTERS: [(&str, f64, f64); 5] = [
    ("Manhattan", 40.7831, -73.9712),
    ("Brooklyn", 40.6782, -73.9442),
    ("Queens", 40.7282, -73.7949),
    ("Bronx", 40.8448, -73.8648),
    ("Staten Island", 40.5795, -74.1502),
];

// Feature engineering reference values
pub const MAX_REASONABLE_SPEED_KMH: f64 = 40.0;
pub const REFERENCE_SPEED_KMH: f64 = 20.0;
pub const TRAFFIC_SPEED_KMH: f64 = 5.0;
pub const LOCAL_DISTANCE_KM: f64 = 0.5;
pub const JOURNEY_DURATION_SECS: f64 = 1800.0;
pub const PATTERN_LOW_PERCENTILE: f64 = 10.0;
pub const PATTERN_HIGH_PERCENTILE: f64 = 90.0;

/// Log a progress line every this many input rows.
pub const READ_PROGRESS_INTERVAL: u64 = 50_000;
