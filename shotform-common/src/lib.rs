//! # Shotform Common Library
//!
//! Shared code for the shotform workspace:
//! - Error taxonomy (`Error` / `Result`)
//! - Pose landmark vocabulary (joints, sides)
//! - Frame-level data model (landmarks, luma planes, metrics)
//! - Camera context and analysis report types

pub mod camera;
pub mod error;
pub mod frame;
pub mod joint;
pub mod report;

pub use camera::{CameraAngle, CameraContext, FeatureTag};
pub use error::{Error, Result};
pub use frame::{FrameMetrics, FrameRecord, Landmark, LumaPlane};
pub use joint::{Joint, Side};
pub use report::{
    AnalysisReport, FlawCandidate, FlawType, FluiditySummary, PhaseName, ShotPhase, StartMethod,
};
