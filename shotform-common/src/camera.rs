//! Camera context model
//!
//! The viewing angle and the set of body features it can reliably observe.
//! Computed once per analysis run, read-only afterward. The
//! `visible_features` set gates which flaw detectors are allowed to run at
//! all: a detector whose required feature is absent is skipped, not merely
//! suppressed, so the pipeline never makes claims about body parts the
//! camera could not have observed.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Classified viewing angle of the clip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraAngle {
    LeftSide,
    RightSide,
    Front,
    Angled,
    Unknown,
}

impl CameraAngle {
    pub fn as_str(&self) -> &'static str {
        match self {
            CameraAngle::LeftSide => "left_side",
            CameraAngle::RightSide => "right_side",
            CameraAngle::Front => "front",
            CameraAngle::Angled => "angled",
            CameraAngle::Unknown => "unknown",
        }
    }
}

/// Body features a camera angle can reliably observe
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum FeatureTag {
    /// Shooting-arm joints (shoulder, elbow, wrist) trackable
    ShootingArm,
    /// Guide-hand joints trackable
    GuideHand,
    /// Both shoulders trackable (squaring/alignment checks)
    BothShoulders,
    /// Hips, knees, and ankles trackable
    LowerBody,
    /// A full body profile is visible from the side
    FullBodySide,
}

/// Inferred viewing angle plus the features it exposes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraContext {
    pub angle: CameraAngle,
    pub visible_features: BTreeSet<FeatureTag>,
    /// Classification confidence, 0.0-1.0
    pub confidence: f64,
}

impl CameraContext {
    /// Context for a clip where nothing could be classified
    pub fn unknown() -> Self {
        Self {
            angle: CameraAngle::Unknown,
            visible_features: BTreeSet::new(),
            confidence: 0.0,
        }
    }

    /// Whether every feature in `required` is observable from this context
    pub fn exposes_all(&self, required: &[FeatureTag]) -> bool {
        required.iter().all(|tag| self.visible_features.contains(tag))
    }
}
