//! Frame-level data model
//!
//! A `FrameRecord` is created once per decoded video frame and is treated as
//! read-only after the metrics calculator has populated it. Its
//! `absolute_frame_index` is the frame's position in the original, untrimmed
//! video; trimming the shot window slices the record vector and never
//! rewrites indices, so every index that reaches the report is directly
//! usable as a seek target into the source video.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::joint::Joint;

/// One pose landmark in normalized image coordinates
///
/// `x` and `y` are in 0.0-1.0 with y growing downward. `visibility` is the
/// extractor's confidence that the landmark was actually observed; a
/// coordinate with low visibility is not evidence of anything.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    pub visibility: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64, visibility: f64) -> Self {
        Self { x, y, visibility }
    }

    /// Euclidean distance to another landmark (ignores visibility)
    pub fn distance_to(&self, other: &Landmark) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Downsampled grayscale plane for one frame
///
/// Optional input used only by the pixel-level shot start estimators. The
/// decode layer chooses the downsample factor; the detector only compares
/// planes of identical dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LumaPlane {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl LumaPlane {
    /// Mean absolute per-pixel difference against another plane
    ///
    /// Returns `None` when dimensions differ (e.g. a resolution change
    /// mid-clip), which the caller treats as "no signal", not an error.
    pub fn mean_abs_diff(&self, other: &LumaPlane) -> Option<f64> {
        if self.width != other.width || self.height != other.height || self.data.is_empty() {
            return None;
        }
        let total: u64 = self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(a, b)| a.abs_diff(*b) as u64)
            .sum();
        Some(total as f64 / self.data.len() as f64)
    }
}

/// Per-frame semantic measurements
///
/// Fixed, closed key set: a metric that could not be computed for a frame is
/// an explicit `None`, never a missing dictionary entry. A field is `Some`
/// only when every landmark it depends on cleared the visibility threshold,
/// so consumers may trust any present value without re-checking provenance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameMetrics {
    /// Shooting-arm elbow extension angle (shoulder-elbow-wrist), degrees
    pub elbow_angle: Option<f64>,
    /// Shooting-side knee extension angle (hip-knee-ankle), degrees
    pub knee_angle: Option<f64>,
    /// Shooting-hand wrist angle (elbow-wrist-index), degrees
    pub wrist_angle: Option<f64>,
    /// Shoulder line angle relative to horizontal, degrees
    pub shoulder_line_angle: Option<f64>,
    /// Shooting-elbow lateral distance from the body centerline,
    /// as a fraction of shoulder width (front-view flare signal)
    pub elbow_lateral_ratio: Option<f64>,
    /// Angle of the shoulder-midpoint to elbow vector away from vertical,
    /// degrees (front-view flare signal)
    pub elbow_deviation_angle: Option<f64>,
    /// Shooting-wrist height above the image bottom (1.0 - y)
    pub wrist_height: Option<f64>,
    /// Shooting-side knee height above the image bottom (1.0 - y)
    pub knee_height: Option<f64>,
    /// Shooting-side hip height above the image bottom (1.0 - y)
    pub hip_height: Option<f64>,
    /// Guide-hand wrist height minus shooting-wrist height, as a fraction of
    /// shoulder width. Positive = guide hand above the ball line.
    pub guide_hand_offset: Option<f64>,
}

/// One decoded frame with its landmarks and computed metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    /// Position in the original, untrimmed video
    pub absolute_frame_index: usize,
    /// Named joints from the pose extractor
    pub landmarks: BTreeMap<Joint, Landmark>,
    /// Optional downsampled grayscale plane (shot start detection only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub luma: Option<LumaPlane>,
    /// Semantic measurements, populated by the metrics calculator
    #[serde(default)]
    pub metrics: FrameMetrics,
}

impl FrameRecord {
    pub fn new(absolute_frame_index: usize, landmarks: BTreeMap<Joint, Landmark>) -> Self {
        Self {
            absolute_frame_index,
            landmarks,
            luma: None,
            metrics: FrameMetrics::default(),
        }
    }

    /// Landmark for a joint, only if it clears the visibility threshold
    pub fn visible_landmark(&self, joint: Joint, min_visibility: f64) -> Option<&Landmark> {
        self.landmarks
            .get(&joint)
            .filter(|lm| lm.visibility >= min_visibility)
    }

    /// Whether any landmark in this frame clears the visibility threshold
    pub fn has_usable_landmarks(&self, min_visibility: f64) -> bool {
        self.landmarks
            .values()
            .any(|lm| lm.visibility >= min_visibility)
    }

    /// Mean visibility across all reported landmarks (0.0 when empty)
    pub fn mean_visibility(&self) -> f64 {
        if self.landmarks.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.landmarks.values().map(|lm| lm.visibility).sum();
        sum / self.landmarks.len() as f64
    }
}
