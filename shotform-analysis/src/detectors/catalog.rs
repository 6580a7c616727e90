//! Detector catalog
//!
//! The declared set of flaw detectors: which feature visibility and camera
//! angles each one needs, which phase and key-moment window it evaluates, and
//! the user-facing text attached to a confirmed flaw. Thresholds and gates
//! come from `DetectorConfig`; adding a detector means adding a declaration
//! here, not engine code.

use shotform_common::{CameraAngle, FeatureTag, FlawType, PhaseName};

use super::{DetectorSpec, FlawCheck};
use crate::config::DetectorConfig;

/// Every angle with a usable classification
const ANY_KNOWN_ANGLE: [CameraAngle; 4] = [
    CameraAngle::LeftSide,
    CameraAngle::RightSide,
    CameraAngle::Front,
    CameraAngle::Angled,
];

/// Angles where the shoulder line is measured square-on rather than in
/// profile
const SHOULDER_ANGLES: [CameraAngle; 2] = [CameraAngle::Front, CameraAngle::Angled];

pub(super) fn build_specs(cfg: &DetectorConfig) -> Vec<DetectorSpec> {
    let mut specs = Vec::new();

    if cfg.elbow_flare.enabled {
        specs.push(DetectorSpec {
            flaw: FlawType::ElbowFlare,
            requires_visibility: vec![FeatureTag::ShootingArm],
            camera_angles: ANY_KNOWN_ANGLE.to_vec(),
            phase: PhaseName::Release,
            key_moment_window: None,
            max_severity: cfg.elbow_flare.max_severity,
            min_evidence_fraction: cfg.elbow_flare.min_evidence_fraction,
            min_avg_severity: cfg.elbow_flare.min_avg_severity,
            check: FlawCheck::ElbowFlare {
                side_angle_min: cfg.elbow_flare.side_angle_min,
                lateral_ratio_threshold: cfg.elbow_flare.lateral_ratio_threshold,
            },
        });
    }

    if cfg.insufficient_knee_bend.enabled {
        specs.push(DetectorSpec {
            flaw: FlawType::InsufficientKneeBend,
            requires_visibility: vec![FeatureTag::LowerBody],
            camera_angles: ANY_KNOWN_ANGLE.to_vec(),
            phase: PhaseName::LoadDip,
            key_moment_window: Some(cfg.insufficient_knee_bend.key_moment_window),
            max_severity: cfg.insufficient_knee_bend.max_severity,
            min_evidence_fraction: cfg.insufficient_knee_bend.min_evidence_fraction,
            min_avg_severity: cfg.insufficient_knee_bend.min_avg_severity,
            check: FlawCheck::InsufficientKneeBend {
                knee_angle_max: cfg.insufficient_knee_bend.knee_angle_max,
            },
        });
    }

    if cfg.excessive_knee_bend.enabled {
        specs.push(DetectorSpec {
            flaw: FlawType::ExcessiveKneeBend,
            requires_visibility: vec![FeatureTag::LowerBody],
            camera_angles: ANY_KNOWN_ANGLE.to_vec(),
            phase: PhaseName::LoadDip,
            key_moment_window: Some(cfg.excessive_knee_bend.key_moment_window),
            max_severity: cfg.excessive_knee_bend.max_severity,
            min_evidence_fraction: cfg.excessive_knee_bend.min_evidence_fraction,
            min_avg_severity: cfg.excessive_knee_bend.min_avg_severity,
            check: FlawCheck::ExcessiveKneeBend {
                knee_angle_min: cfg.excessive_knee_bend.knee_angle_min,
            },
        });
    }

    if cfg.poor_wrist_snap.enabled {
        specs.push(DetectorSpec {
            flaw: FlawType::PoorWristSnap,
            requires_visibility: vec![FeatureTag::ShootingArm],
            camera_angles: ANY_KNOWN_ANGLE.to_vec(),
            phase: PhaseName::FollowThrough,
            key_moment_window: Some(cfg.poor_wrist_snap.key_moment_window),
            max_severity: cfg.poor_wrist_snap.max_severity,
            min_evidence_fraction: cfg.poor_wrist_snap.min_evidence_fraction,
            min_avg_severity: cfg.poor_wrist_snap.min_avg_severity,
            check: FlawCheck::PoorWristSnap {
                wrist_angle_max: cfg.poor_wrist_snap.wrist_angle_max,
            },
        });
    }

    if cfg.shoulder_misalignment.enabled {
        specs.push(DetectorSpec {
            flaw: FlawType::ShoulderMisalignment,
            requires_visibility: vec![FeatureTag::BothShoulders],
            camera_angles: SHOULDER_ANGLES.to_vec(),
            phase: PhaseName::Release,
            key_moment_window: None,
            max_severity: cfg.shoulder_misalignment.max_severity,
            min_evidence_fraction: cfg.shoulder_misalignment.min_evidence_fraction,
            min_avg_severity: cfg.shoulder_misalignment.min_avg_severity,
            check: FlawCheck::ShoulderMisalignment {
                tilt_max_degrees: cfg.shoulder_misalignment.tilt_max_degrees,
            },
        });
    }

    if cfg.guide_hand_interference.enabled {
        specs.push(DetectorSpec {
            flaw: FlawType::GuideHandInterference,
            requires_visibility: vec![FeatureTag::GuideHand, FeatureTag::ShootingArm],
            camera_angles: ANY_KNOWN_ANGLE.to_vec(),
            phase: PhaseName::Release,
            key_moment_window: Some(cfg.guide_hand_interference.key_moment_window),
            max_severity: cfg.guide_hand_interference.max_severity,
            min_evidence_fraction: cfg.guide_hand_interference.min_evidence_fraction,
            min_avg_severity: cfg.guide_hand_interference.min_avg_severity,
            check: FlawCheck::GuideHandInterference {
                offset_threshold: cfg.guide_hand_interference.offset_threshold,
            },
        });
    }

    if cfg.lacks_fluidity.enabled {
        specs.push(DetectorSpec {
            flaw: FlawType::LacksFluidity,
            // Works from whatever joints the fluidity analyzer could track
            requires_visibility: Vec::new(),
            camera_angles: vec![
                CameraAngle::LeftSide,
                CameraAngle::RightSide,
                CameraAngle::Front,
                CameraAngle::Angled,
                CameraAngle::Unknown,
            ],
            phase: PhaseName::Release,
            key_moment_window: None,
            max_severity: cfg.lacks_fluidity.max_severity,
            min_evidence_fraction: 0.0,
            min_avg_severity: 0.0,
            check: FlawCheck::Fluidity {
                score_threshold: cfg.lacks_fluidity.score_threshold,
                min_events: cfg.lacks_fluidity.min_evidence_events,
            },
        });
    }

    specs
}

/// What was observed, in plain language
pub fn description(flaw: FlawType) -> &'static str {
    match flaw {
        FlawType::ElbowFlare => {
            "The shooting elbow drifts away from the body centerline during the release."
        }
        FlawType::InsufficientKneeBend => {
            "The knees stay nearly straight through the dip, limiting lower-body power."
        }
        FlawType::ExcessiveKneeBend => {
            "The knees collapse well past a stable loading depth, slowing the release."
        }
        FlawType::PoorWristSnap => {
            "The shooting wrist never snaps forward through the follow-through."
        }
        FlawType::ShoulderMisalignment => {
            "The shoulders are tilted off square at the point of release."
        }
        FlawType::GuideHandInterference => {
            "The guide hand rides above the ball and pushes during the release."
        }
        FlawType::LacksFluidity => {
            "The shooting motion stops and restarts instead of flowing as one continuous piece."
        }
    }
}

/// What to work on
pub fn coaching_tip(flaw: FlawType) -> &'static str {
    match flaw {
        FlawType::ElbowFlare => {
            "Keep the elbow tucked under the ball so the forearm stays in a vertical plane toward the rim."
        }
        FlawType::InsufficientKneeBend => {
            "Sink deeper into the dip and let the legs, not the arm, drive the shot."
        }
        FlawType::ExcessiveKneeBend => {
            "Load to a quick quarter-squat and come straight up out of it without pausing."
        }
        FlawType::PoorWristSnap => {
            "Finish with the fingers pointing down at the rim and hold the follow-through."
        }
        FlawType::ShoulderMisalignment => {
            "Square both shoulders to the rim before starting the upward motion."
        }
        FlawType::GuideHandInterference => {
            "Keep the off hand on the side of the ball and peel it away before the release."
        }
        FlawType::LacksFluidity => {
            "Groove one continuous rhythm from the dip to the release, slowing down until it is smooth."
        }
    }
}
