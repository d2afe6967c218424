//! Sequential batch pipelines over in-memory trip record sets.
//!
//! Each pipeline instance owns its statistics bundle: counters are
//! incremented during a single run and read out afterwards, never shared
//! across runs or instances.

pub mod cleaning;
pub mod features;

pub use cleaning::{CleaningPipeline, CleaningStats};
pub use features::{FeaturePipeline, FeatureStats};
