//! Analysis report model
//!
//! The `AnalysisReport` is the sole artifact handed to external collaborators
//! (report renderer, video-overlay renderer, results view). Every frame index
//! in it is absolute: directly usable as a seek target into the original,
//! untrimmed video.

use serde::{Deserialize, Serialize};

use crate::camera::CameraContext;

/// Named shot phase, strictly ordered
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PhaseName {
    LoadDip,
    Release,
    FollowThrough,
}

impl PhaseName {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhaseName::LoadDip => "load_dip",
            PhaseName::Release => "release",
            PhaseName::FollowThrough => "follow_through",
        }
    }
}

/// One temporal segment of the shooting motion
///
/// Phases are contiguous and non-overlapping, covering the trimmed shot
/// window. All frame fields are absolute indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShotPhase {
    pub name: PhaseName,
    /// First frame of the phase (inclusive, absolute)
    pub start_frame: usize,
    /// Last frame of the phase (inclusive, absolute)
    pub end_frame: usize,
    /// The phase's most representative instant (absolute), e.g. deepest knee
    /// bend for Load/Dip, peak extension for Release
    pub key_moment_frame: usize,
}

impl ShotPhase {
    /// Whether an absolute frame index falls inside this phase
    pub fn contains(&self, frame: usize) -> bool {
        frame >= self.start_frame && frame <= self.end_frame
    }
}

/// Closed set of detectable mechanical flaws
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum FlawType {
    ElbowFlare,
    InsufficientKneeBend,
    ExcessiveKneeBend,
    PoorWristSnap,
    ShoulderMisalignment,
    GuideHandInterference,
    LacksFluidity,
}

impl FlawType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlawType::ElbowFlare => "elbow_flare",
            FlawType::InsufficientKneeBend => "insufficient_knee_bend",
            FlawType::ExcessiveKneeBend => "excessive_knee_bend",
            FlawType::PoorWristSnap => "poor_wrist_snap",
            FlawType::ShoulderMisalignment => "shoulder_misalignment",
            FlawType::GuideHandInterference => "guide_hand_interference",
            FlawType::LacksFluidity => "lacks_fluidity",
        }
    }
}

/// A confirmed, severity-scored deviation from ideal shooting mechanics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlawCandidate {
    pub flaw: FlawType,
    /// 0-100, clamped to the detector's declared maximum
    pub severity: f64,
    /// Frames within the evaluated window where the flaw was observed
    pub evidence_frame_count: usize,
    /// Frames the consistency gate required
    pub required_frame_count: usize,
    /// Best single frame for visualizing this flaw (absolute index)
    pub representative_frame: usize,
    /// Camera context at the time of detection
    pub camera_context: CameraContext,
    /// Plain-language explanation of what was observed
    pub description: String,
    /// Actionable coaching advice
    pub coaching_tip: String,
}

/// How the shot start frame was determined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartMethod {
    /// Wrist/knee velocity onset from pose landmarks
    Landmark,
    /// Sparse motion magnitude between consecutive frames
    OpticalMotion,
    /// Pixel-level luma difference between consecutive frames
    FrameDifference,
    /// No estimator cleared its confidence floor; clip assumed pre-trimmed
    Default,
}

impl StartMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            StartMethod::Landmark => "landmark",
            StartMethod::OpticalMotion => "optical_motion",
            StartMethod::FrameDifference => "frame_difference",
            StartMethod::Default => "default",
        }
    }
}

/// Motion-smoothness breakdown for the shot
///
/// Sub-scores are 0-100; `score` is their weighted composite. Spike and
/// break frames are absolute indices, usable as overlay targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FluiditySummary {
    /// Composite smoothness score, 0-100
    pub score: f64,
    /// Velocity-variance sub-score (weight 30%)
    pub velocity_score: f64,
    /// Acceleration-spike sub-score (weight 30%)
    pub acceleration_score: f64,
    /// Rhythm-consistency sub-score (weight 25%)
    pub rhythm_score: f64,
    /// Jerk-variance sub-score (weight 15%)
    pub jerk_score: f64,
    /// Frames where vertical wrist motion stopped and restarted abruptly
    pub rhythm_break_frames: Vec<usize>,
    /// Frames with acceleration spikes beyond mean + 2 sigma
    pub acceleration_spike_frames: Vec<usize>,
}

impl FluiditySummary {
    /// Summary for a clip too short to differentiate motion
    pub fn neutral() -> Self {
        Self {
            score: 100.0,
            velocity_score: 100.0,
            acceleration_score: 100.0,
            rhythm_score: 100.0,
            jerk_score: 100.0,
            rhythm_break_frames: Vec::new(),
            acceleration_spike_frames: Vec::new(),
        }
    }
}

/// Final artifact of one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Frame where shooting motion begins (absolute)
    pub shot_start_frame: usize,
    /// Which estimator chose the start frame
    pub start_method: StartMethod,
    /// Confidence of the chosen estimator (0.0 when defaulted)
    pub start_confidence: f64,
    pub camera: CameraContext,
    /// Exactly three phases: load_dip, release, follow_through
    pub phases: Vec<ShotPhase>,
    /// Confirmed flaws, severity-descending, capped
    pub flaws: Vec<FlawCandidate>,
    pub fluidity: FluiditySummary,
}
