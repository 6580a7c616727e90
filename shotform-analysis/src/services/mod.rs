//! Analysis services
//!
//! Each service owns one stage of the pipeline and is constructed from its
//! slice of the config. Services hold no shared mutable state; the pipeline
//! wires them together in order.

pub mod aggregator;
pub mod camera;
pub mod fluidity;
pub mod metrics;
pub mod segmenter;
pub mod shot_start;

pub use aggregator::ReportBuilder;
pub use camera::CameraClassifier;
pub use fluidity::FluidityAnalyzer;
pub use metrics::MetricsCalculator;
pub use segmenter::PhaseSegmenter;
pub use shot_start::{ShotStartDetector, StartEstimate};
