//! shotform-analysis - Basketball shot form analysis
//!
//! Turns pose-extracted frame data for one shot attempt into a structured
//! report: where the shot starts, what the camera could see, how the motion
//! segments into phases, which mechanical flaws are present, and how fluid
//! the motion is.
//!
//! Entry point is [`pipeline::ShotAnalyzer`]; everything else is a service
//! it composes. All frame indices in the output are absolute positions in
//! the original, untrimmed video.

pub mod config;
pub mod detectors;
pub mod pipeline;
pub mod services;

pub use crate::config::AnalysisConfig;
pub use crate::pipeline::{InputFrame, ShotAnalyzer};
