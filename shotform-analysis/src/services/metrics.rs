//! Per-frame joint metric computation
//!
//! Pure per-frame function: landmarks in, `FrameMetrics` out, no cross-frame
//! state. Cross-frame derivatives (velocity, acceleration) are computed by
//! consumers from sequential records, never here.
//!
//! Every metric carries its provenance requirement implicitly: a field is
//! `Some` only when all landmarks it depends on cleared the visibility
//! threshold, so downstream detectors can trust any present value.

use std::collections::BTreeMap;

use shotform_common::{FrameMetrics, Joint, Landmark, Side};

/// Computes semantic measurements for one frame
pub struct MetricsCalculator {
    min_visibility: f64,
    shooting_hand: Side,
}

impl MetricsCalculator {
    pub fn new(min_visibility: f64, shooting_hand: Side) -> Self {
        Self {
            min_visibility,
            shooting_hand,
        }
    }

    /// Compute all metrics for one frame's landmarks
    pub fn compute(&self, landmarks: &BTreeMap<Joint, Landmark>) -> FrameMetrics {
        let shoot = self.shooting_hand;
        let guide = shoot.opposite();

        let get = |joint: Joint| -> Option<&Landmark> {
            landmarks
                .get(&joint)
                .filter(|lm| lm.visibility >= self.min_visibility)
        };

        let shoulder = get(Joint::shoulder(shoot));
        let elbow = get(Joint::elbow(shoot));
        let wrist = get(Joint::wrist(shoot));
        let index = get(Joint::index_finger(shoot));
        let hip = get(Joint::hip(shoot));
        let knee = get(Joint::knee(shoot));
        let ankle = get(Joint::ankle(shoot));
        let left_shoulder = get(Joint::LeftShoulder);
        let right_shoulder = get(Joint::RightShoulder);
        let guide_wrist = get(Joint::wrist(guide));

        let elbow_angle = match (shoulder, elbow, wrist) {
            (Some(s), Some(e), Some(w)) => Some(three_point_angle(s, e, w)),
            _ => None,
        };

        let knee_angle = match (hip, knee, ankle) {
            (Some(h), Some(k), Some(a)) => Some(three_point_angle(h, k, a)),
            _ => None,
        };

        let wrist_angle = match (elbow, wrist, index) {
            (Some(e), Some(w), Some(i)) => Some(three_point_angle(e, w, i)),
            _ => None,
        };

        // Shoulder width anchors both front-view normalizations
        let shoulder_width = match (left_shoulder, right_shoulder) {
            (Some(l), Some(r)) => {
                let width = l.distance_to(r);
                if width > f64::EPSILON {
                    Some((l, r, width))
                } else {
                    None
                }
            }
            _ => None,
        };

        let shoulder_line_angle = shoulder_width.map(|(l, r, _)| shoulder_tilt(l, r));

        let (elbow_lateral_ratio, elbow_deviation_angle) = match (shoulder_width, elbow) {
            (Some((l, r, width)), Some(e)) => {
                let mid_x = (l.x + r.x) / 2.0;
                let mid_y = (l.y + r.y) / 2.0;
                let dx = e.x - mid_x;
                let dy = e.y - mid_y;
                let ratio = dx.abs() / width;
                // Angle away from the vertical through the shoulder midpoint
                let deviation = dx.abs().atan2(dy.abs()).to_degrees();
                (Some(ratio), Some(deviation))
            }
            _ => (None, None),
        };

        let guide_hand_offset = match (shoulder_width, wrist, guide_wrist) {
            (Some((_, _, width)), Some(w), Some(g)) => {
                // Positive when the guide wrist sits above the ball line
                Some((w.y - g.y) / width)
            }
            _ => None,
        };

        FrameMetrics {
            elbow_angle,
            knee_angle,
            wrist_angle,
            shoulder_line_angle,
            elbow_lateral_ratio,
            elbow_deviation_angle,
            wrist_height: wrist.map(|w| 1.0 - w.y),
            knee_height: knee.map(|k| 1.0 - k.y),
            hip_height: hip.map(|h| 1.0 - h.y),
            guide_hand_offset,
        }
    }
}

/// Angle at `b` between segments b->a and b->c, in degrees (0-180)
fn three_point_angle(a: &Landmark, b: &Landmark, c: &Landmark) -> f64 {
    let v1 = (a.x - b.x, a.y - b.y);
    let v2 = (c.x - b.x, c.y - b.y);
    let dot = v1.0 * v2.0 + v1.1 * v2.1;
    let mag1 = (v1.0 * v1.0 + v1.1 * v1.1).sqrt();
    let mag2 = (v2.0 * v2.0 + v2.1 * v2.1).sqrt();
    if mag1 < f64::EPSILON || mag2 < f64::EPSILON {
        return 0.0;
    }
    (dot / (mag1 * mag2)).clamp(-1.0, 1.0).acos().to_degrees()
}

/// Signed shoulder-line tilt from horizontal, degrees in [-90, 90]
fn shoulder_tilt(left: &Landmark, right: &Landmark) -> f64 {
    let dx = right.x - left.x;
    let dy = right.y - left.y;
    let mut angle = dy.atan2(dx).to_degrees();
    // Fold into tilt-from-horizontal regardless of left/right ordering
    if angle > 90.0 {
        angle -= 180.0;
    } else if angle < -90.0 {
        angle += 180.0;
    }
    angle
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lm(x: f64, y: f64) -> Landmark {
        Landmark::new(x, y, 1.0)
    }

    fn base_landmarks() -> BTreeMap<Joint, Landmark> {
        let mut m = BTreeMap::new();
        m.insert(Joint::LeftShoulder, lm(0.40, 0.40));
        m.insert(Joint::RightShoulder, lm(0.60, 0.40));
        m.insert(Joint::RightElbow, lm(0.62, 0.52));
        m.insert(Joint::RightWrist, lm(0.64, 0.64));
        m.insert(Joint::RightIndex, lm(0.66, 0.70));
        m.insert(Joint::RightHip, lm(0.58, 0.65));
        m.insert(Joint::RightKnee, lm(0.58, 0.78));
        m.insert(Joint::RightAnkle, lm(0.58, 0.92));
        m.insert(Joint::LeftWrist, lm(0.45, 0.60));
        m
    }

    #[test]
    fn test_three_point_angle_straight_line() {
        let a = lm(0.0, 0.0);
        let b = lm(0.5, 0.0);
        let c = lm(1.0, 0.0);
        assert!((three_point_angle(&a, &b, &c) - 180.0).abs() < 1e-6);
    }

    #[test]
    fn test_three_point_angle_right_angle() {
        let a = lm(0.0, 0.0);
        let b = lm(0.5, 0.0);
        let c = lm(0.5, 0.5);
        assert!((three_point_angle(&a, &b, &c) - 90.0).abs() < 1e-6);
    }

    #[test]
    fn test_straight_knee_angle() {
        let calc = MetricsCalculator::new(0.5, Side::Right);
        let metrics = calc.compute(&base_landmarks());
        // Hip, knee, ankle are collinear vertically
        let knee = metrics.knee_angle.unwrap();
        assert!((knee - 180.0).abs() < 1.0, "knee angle was {}", knee);
    }

    #[test]
    fn test_level_shoulder_line() {
        let calc = MetricsCalculator::new(0.5, Side::Right);
        let metrics = calc.compute(&base_landmarks());
        assert!(metrics.shoulder_line_angle.unwrap().abs() < 1e-6);
    }

    #[test]
    fn test_tilted_shoulder_line() {
        let calc = MetricsCalculator::new(0.5, Side::Right);
        let mut landmarks = base_landmarks();
        landmarks.insert(Joint::RightShoulder, lm(0.60, 0.33));
        let metrics = calc.compute(&landmarks);
        // Right shoulder lifted by 0.07 over a 0.2 span: ~19.3 degrees
        let tilt = metrics.shoulder_line_angle.unwrap();
        assert!(tilt.abs() > 15.0 && tilt.abs() < 25.0, "tilt was {}", tilt);
    }

    #[test]
    fn test_lateral_ratio_for_flared_elbow() {
        let calc = MetricsCalculator::new(0.5, Side::Right);
        let mut landmarks = base_landmarks();
        // Elbow 0.19 from the 0.50 centerline, shoulder width 0.20
        landmarks.insert(Joint::RightElbow, lm(0.69, 0.52));
        let metrics = calc.compute(&landmarks);
        let ratio = metrics.elbow_lateral_ratio.unwrap();
        assert!((ratio - 0.95).abs() < 0.01, "ratio was {}", ratio);
        assert!(metrics.elbow_deviation_angle.unwrap() > 45.0);
    }

    #[test]
    fn test_low_visibility_yields_none() {
        let calc = MetricsCalculator::new(0.5, Side::Right);
        let mut landmarks = base_landmarks();
        landmarks.insert(Joint::RightWrist, Landmark::new(0.64, 0.64, 0.2));
        let metrics = calc.compute(&landmarks);
        // Everything depending on the shooting wrist degrades to None
        assert!(metrics.elbow_angle.is_none());
        assert!(metrics.wrist_angle.is_none());
        assert!(metrics.wrist_height.is_none());
        assert!(metrics.guide_hand_offset.is_none());
        // Independent metrics survive
        assert!(metrics.knee_angle.is_some());
        assert!(metrics.shoulder_line_angle.is_some());
    }

    #[test]
    fn test_guide_hand_offset_sign() {
        let calc = MetricsCalculator::new(0.5, Side::Right);
        let mut landmarks = base_landmarks();
        // Guide wrist well above the shooting wrist
        landmarks.insert(Joint::LeftWrist, lm(0.45, 0.50));
        let metrics = calc.compute(&landmarks);
        assert!(metrics.guide_hand_offset.unwrap() > 0.0);

        // Guide wrist below the shooting wrist
        landmarks.insert(Joint::LeftWrist, lm(0.45, 0.80));
        let metrics = calc.compute(&landmarks);
        assert!(metrics.guide_hand_offset.unwrap() < 0.0);
    }
}
