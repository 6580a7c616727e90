//! Camera angle classification
//!
//! Aggregates landmark visibility across the trimmed frame sequence to decide
//! the viewing angle and which body features are trustworthy. Classification
//! happens once per run; the resulting `CameraContext` is read-only and gates
//! the flaw detector registry.

use std::collections::BTreeSet;

use shotform_common::{CameraAngle, CameraContext, FeatureTag, FrameRecord, Joint, Side};
use tracing::debug;

/// Fraction of side landmarks that must clear the visibility threshold for a
/// frame to count toward that side
const SIDE_JOINT_QUORUM: usize = 4;

/// Both sides visible in at least this fraction of frames means a
/// front-facing or angled view
const FRONT_VIEW_FRACTION: f64 = 0.5;

/// Nose offset from the ear midline beyond this fraction of shoulder width
/// reads as a turned (angled) head rather than a square front view
const PROFILE_OFFSET_RATIO: f64 = 0.15;

/// Classifies the viewing angle from landmark visibility
pub struct CameraClassifier {
    min_visibility: f64,
    shooting_hand: Side,
}

/// Per-run visibility tallies, one counter per feature of interest
#[derive(Default)]
struct VisibilityTally {
    left_side: usize,
    right_side: usize,
    shooting_arm: usize,
    guide_hand: usize,
    both_shoulders: usize,
    lower_body: usize,
    profile_signal: usize,
    profile_offset_sum: f64,
    frames: usize,
}

impl CameraClassifier {
    pub fn new(min_visibility: f64, shooting_hand: Side) -> Self {
        Self {
            min_visibility,
            shooting_hand,
        }
    }

    /// Classify the clip's viewing angle and derive observable features
    pub fn classify(&self, frames: &[FrameRecord]) -> CameraContext {
        if frames.is_empty() {
            return CameraContext::unknown();
        }

        let tally = self.tally(frames);
        let n = tally.frames as f64;
        let left_frac = tally.left_side as f64 / n;
        let right_frac = tally.right_side as f64 / n;

        let (angle, confidence) = if left_frac >= FRONT_VIEW_FRACTION
            && right_frac >= FRONT_VIEW_FRACTION
        {
            // Both sides trackable: front or angled, disambiguated by how far
            // the nose sits off the ear midline
            let angle = if tally.profile_signal > 0 {
                let mean_offset = tally.profile_offset_sum / tally.profile_signal as f64;
                if mean_offset > PROFILE_OFFSET_RATIO {
                    CameraAngle::Angled
                } else {
                    CameraAngle::Front
                }
            } else {
                CameraAngle::Angled
            };
            (angle, left_frac.min(right_frac))
        } else if left_frac >= FRONT_VIEW_FRACTION {
            (CameraAngle::LeftSide, left_frac * (1.0 - right_frac).max(0.5))
        } else if right_frac >= FRONT_VIEW_FRACTION {
            (CameraAngle::RightSide, right_frac * (1.0 - left_frac).max(0.5))
        } else {
            (CameraAngle::Unknown, left_frac.max(right_frac))
        };

        let visible_features = self.derive_features(&tally, n, angle);

        debug!(
            angle = angle.as_str(),
            left_frac,
            right_frac,
            confidence,
            feature_count = visible_features.len(),
            "Camera angle classified"
        );

        CameraContext {
            angle,
            visible_features,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    fn tally(&self, frames: &[FrameRecord]) -> VisibilityTally {
        let mut tally = VisibilityTally {
            frames: frames.len(),
            ..Default::default()
        };
        let shoot = self.shooting_hand;
        let guide = shoot.opposite();

        for frame in frames {
            let visible =
                |joint: Joint| frame.visible_landmark(joint, self.min_visibility).is_some();

            for (side, counter) in [
                (Side::Left, &mut tally.left_side),
                (Side::Right, &mut tally.right_side),
            ] {
                let count = [
                    Joint::shoulder(side),
                    Joint::elbow(side),
                    Joint::wrist(side),
                    Joint::hip(side),
                    Joint::knee(side),
                    Joint::ankle(side),
                ]
                .into_iter()
                .filter(|&j| visible(j))
                .count();
                if count >= SIDE_JOINT_QUORUM {
                    *counter += 1;
                }
            }

            if visible(Joint::shoulder(shoot))
                && visible(Joint::elbow(shoot))
                && visible(Joint::wrist(shoot))
            {
                tally.shooting_arm += 1;
            }
            if visible(Joint::elbow(guide)) && visible(Joint::wrist(guide)) {
                tally.guide_hand += 1;
            }
            if visible(Joint::LeftShoulder) && visible(Joint::RightShoulder) {
                tally.both_shoulders += 1;
            }
            if visible(Joint::hip(shoot)) && visible(Joint::knee(shoot)) && visible(Joint::ankle(shoot))
            {
                tally.lower_body += 1;
            }

            // Face-profile signal: nose offset from the ear midline,
            // normalized by shoulder width
            if let (Some(nose), Some(le), Some(re), Some(ls), Some(rs)) = (
                frame.visible_landmark(Joint::Nose, self.min_visibility),
                frame.visible_landmark(Joint::LeftEar, self.min_visibility),
                frame.visible_landmark(Joint::RightEar, self.min_visibility),
                frame.visible_landmark(Joint::LeftShoulder, self.min_visibility),
                frame.visible_landmark(Joint::RightShoulder, self.min_visibility),
            ) {
                let width = ls.distance_to(rs);
                if width > f64::EPSILON {
                    let ear_mid_x = (le.x + re.x) / 2.0;
                    tally.profile_signal += 1;
                    tally.profile_offset_sum += (nose.x - ear_mid_x).abs() / width;
                }
            }
        }

        tally
    }

    fn derive_features(
        &self,
        tally: &VisibilityTally,
        n: f64,
        angle: CameraAngle,
    ) -> BTreeSet<FeatureTag> {
        let mut features = BTreeSet::new();

        if tally.shooting_arm as f64 / n >= FRONT_VIEW_FRACTION {
            features.insert(FeatureTag::ShootingArm);
        }
        if tally.both_shoulders as f64 / n >= FRONT_VIEW_FRACTION {
            features.insert(FeatureTag::BothShoulders);
        }
        if tally.lower_body as f64 / n >= FRONT_VIEW_FRACTION {
            features.insert(FeatureTag::LowerBody);
        }

        // A side view exposing one arm occludes the other hand no matter what
        // coordinates the extractor reports: coordinates without reliable
        // confidence are not visible, and neither is the far side of a body
        // in profile.
        let guide_side = self.shooting_hand.opposite();
        let guide_trackable = tally.guide_hand as f64 / n >= FRONT_VIEW_FRACTION;
        let guide_exposed = match angle {
            CameraAngle::Front | CameraAngle::Angled => guide_trackable,
            CameraAngle::LeftSide => guide_trackable && guide_side == Side::Left,
            CameraAngle::RightSide => guide_trackable && guide_side == Side::Right,
            CameraAngle::Unknown => false,
        };
        if guide_exposed {
            features.insert(FeatureTag::GuideHand);
        }

        if matches!(angle, CameraAngle::LeftSide | CameraAngle::RightSide)
            && features.contains(&FeatureTag::ShootingArm)
            && features.contains(&FeatureTag::LowerBody)
        {
            features.insert(FeatureTag::FullBodySide);
        }

        features
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shotform_common::Landmark;
    use std::collections::BTreeMap;

    /// Build a frame with the given joints fully visible and all other
    /// reported joints at low confidence
    fn frame_with(index: usize, visible: &[Joint], hidden: &[Joint]) -> FrameRecord {
        let mut landmarks = BTreeMap::new();
        for (i, &joint) in visible.iter().enumerate() {
            landmarks.insert(joint, Landmark::new(0.4 + 0.01 * i as f64, 0.5, 0.95));
        }
        for (i, &joint) in hidden.iter().enumerate() {
            landmarks.insert(joint, Landmark::new(0.4 + 0.01 * i as f64, 0.5, 0.1));
        }
        FrameRecord::new(index, landmarks)
    }

    fn right_side_joints() -> Vec<Joint> {
        vec![
            Joint::RightShoulder,
            Joint::RightElbow,
            Joint::RightWrist,
            Joint::RightHip,
            Joint::RightKnee,
            Joint::RightAnkle,
        ]
    }

    fn left_side_joints() -> Vec<Joint> {
        right_side_joints().iter().map(|j| j.mirror()).collect()
    }

    #[test]
    fn test_right_side_view() {
        let visible = right_side_joints();
        let hidden = left_side_joints();
        let frames: Vec<FrameRecord> = (0..20)
            .map(|i| frame_with(i, &visible, &hidden))
            .collect();

        let classifier = CameraClassifier::new(0.5, Side::Right);
        let ctx = classifier.classify(&frames);

        assert_eq!(ctx.angle, CameraAngle::RightSide);
        assert!(ctx.confidence > 0.4);
        assert!(ctx.visible_features.contains(&FeatureTag::ShootingArm));
        assert!(ctx.visible_features.contains(&FeatureTag::FullBodySide));
        // Guide hand (left) is on the far side of a right-profile view
        assert!(!ctx.visible_features.contains(&FeatureTag::GuideHand));
    }

    #[test]
    fn test_guide_hand_never_exposed_by_occluding_side_view() {
        // Even when the extractor reports confident guide-hand coordinates,
        // a right-side view of a right-handed shooter cannot expose it
        let mut visible = right_side_joints();
        visible.push(Joint::LeftElbow);
        visible.push(Joint::LeftWrist);
        let frames: Vec<FrameRecord> =
            (0..20).map(|i| frame_with(i, &visible, &[])).collect();

        let classifier = CameraClassifier::new(0.5, Side::Right);
        let ctx = classifier.classify(&frames);

        assert_eq!(ctx.angle, CameraAngle::RightSide);
        assert!(!ctx.visible_features.contains(&FeatureTag::GuideHand));
    }

    #[test]
    fn test_front_view() {
        let mut visible = right_side_joints();
        visible.extend(left_side_joints());
        // Nose centered between the ears: square front view
        visible.push(Joint::Nose);
        visible.push(Joint::LeftEar);
        visible.push(Joint::RightEar);
        let frames: Vec<FrameRecord> = (0..20)
            .map(|i| {
                let mut f = frame_with(i, &visible, &[]);
                f.landmarks.insert(Joint::LeftShoulder, Landmark::new(0.40, 0.40, 0.95));
                f.landmarks.insert(Joint::RightShoulder, Landmark::new(0.60, 0.40, 0.95));
                f.landmarks.insert(Joint::LeftEar, Landmark::new(0.46, 0.25, 0.95));
                f.landmarks.insert(Joint::RightEar, Landmark::new(0.54, 0.25, 0.95));
                f.landmarks.insert(Joint::Nose, Landmark::new(0.50, 0.27, 0.95));
                f
            })
            .collect();

        let classifier = CameraClassifier::new(0.5, Side::Right);
        let ctx = classifier.classify(&frames);

        assert_eq!(ctx.angle, CameraAngle::Front);
        assert!(ctx.visible_features.contains(&FeatureTag::GuideHand));
        assert!(ctx.visible_features.contains(&FeatureTag::BothShoulders));
        assert!(!ctx.visible_features.contains(&FeatureTag::FullBodySide));
    }

    #[test]
    fn test_empty_input_is_unknown() {
        let classifier = CameraClassifier::new(0.5, Side::Right);
        let ctx = classifier.classify(&[]);
        assert_eq!(ctx.angle, CameraAngle::Unknown);
        assert_eq!(ctx.confidence, 0.0);
        assert!(ctx.visible_features.is_empty());
    }
}
