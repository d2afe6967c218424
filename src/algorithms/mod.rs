//! Hand-rolled algorithmic primitives backing the pipelines.
//!
//! Everything in here is dependency-free on purpose: these are the sorting,
//! rank-statistic, selection, and distance kernels the cleaning and feature
//! engineering stages are built on, and the same definitions the downstream
//! query service mirrors against its own store.

pub mod geo;
pub mod group;
pub mod sort;
pub mod stats;
pub mod top_k;

pub use geo::haversine_km;
pub use group::group_by;
pub use sort::sort_by_key;
pub use stats::{describe, detect_outliers_iqr, percentile, OutlierBounds, Summary};
pub use top_k::top_k_by;
