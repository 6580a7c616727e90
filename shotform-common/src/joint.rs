//! Pose landmark vocabulary
//!
//! Closed set of joints produced by the external pose extractor. The pipeline
//! never invents joints outside this set, so a missing joint is an explicit
//! `None`, not a silent dictionary miss.

use serde::{Deserialize, Serialize};

/// Body side, from the subject's own perspective
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// The opposite side
    pub fn opposite(&self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

/// Named joints reported by the pose extractor
///
/// Serialized snake_case to match the extractor's wire format
/// (e.g. `right_wrist`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Joint {
    Nose,
    LeftEye,
    RightEye,
    LeftEar,
    RightEar,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftIndex,
    RightIndex,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

impl Joint {
    /// Body side this joint belongs to, if it has one
    pub fn side(&self) -> Option<Side> {
        use Joint::*;
        match self {
            Nose => None,
            LeftEye | LeftEar | LeftShoulder | LeftElbow | LeftWrist | LeftIndex | LeftHip
            | LeftKnee | LeftAnkle => Some(Side::Left),
            RightEye | RightEar | RightShoulder | RightElbow | RightWrist | RightIndex
            | RightHip | RightKnee | RightAnkle => Some(Side::Right),
        }
    }

    /// The same joint on the opposite side (nose maps to itself)
    pub fn mirror(&self) -> Joint {
        use Joint::*;
        match self {
            Nose => Nose,
            LeftEye => RightEye,
            RightEye => LeftEye,
            LeftEar => RightEar,
            RightEar => LeftEar,
            LeftShoulder => RightShoulder,
            RightShoulder => LeftShoulder,
            LeftElbow => RightElbow,
            RightElbow => LeftElbow,
            LeftWrist => RightWrist,
            RightWrist => LeftWrist,
            LeftIndex => RightIndex,
            RightIndex => LeftIndex,
            LeftHip => RightHip,
            RightHip => LeftHip,
            LeftKnee => RightKnee,
            RightKnee => LeftKnee,
            LeftAnkle => RightAnkle,
            RightAnkle => LeftAnkle,
        }
    }

    /// Shoulder joint for a side
    pub fn shoulder(side: Side) -> Joint {
        match side {
            Side::Left => Joint::LeftShoulder,
            Side::Right => Joint::RightShoulder,
        }
    }

    /// Elbow joint for a side
    pub fn elbow(side: Side) -> Joint {
        match side {
            Side::Left => Joint::LeftElbow,
            Side::Right => Joint::RightElbow,
        }
    }

    /// Wrist joint for a side
    pub fn wrist(side: Side) -> Joint {
        match side {
            Side::Left => Joint::LeftWrist,
            Side::Right => Joint::RightWrist,
        }
    }

    /// Index-finger joint for a side
    pub fn index_finger(side: Side) -> Joint {
        match side {
            Side::Left => Joint::LeftIndex,
            Side::Right => Joint::RightIndex,
        }
    }

    /// Hip joint for a side
    pub fn hip(side: Side) -> Joint {
        match side {
            Side::Left => Joint::LeftHip,
            Side::Right => Joint::RightHip,
        }
    }

    /// Knee joint for a side
    pub fn knee(side: Side) -> Joint {
        match side {
            Side::Left => Joint::LeftKnee,
            Side::Right => Joint::RightKnee,
        }
    }

    /// Ankle joint for a side
    pub fn ankle(side: Side) -> Joint {
        match side {
            Side::Left => Joint::LeftAnkle,
            Side::Right => Joint::RightAnkle,
        }
    }

    /// Ear joint for a side
    pub fn ear(side: Side) -> Joint {
        match side {
            Side::Left => Joint::LeftEar,
            Side::Right => Joint::RightEar,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mirror_round_trip() {
        assert_eq!(Joint::LeftWrist.mirror(), Joint::RightWrist);
        assert_eq!(Joint::LeftWrist.mirror().mirror(), Joint::LeftWrist);
        assert_eq!(Joint::Nose.mirror(), Joint::Nose);
    }

    #[test]
    fn test_side_assignment() {
        assert_eq!(Joint::LeftKnee.side(), Some(Side::Left));
        assert_eq!(Joint::RightShoulder.side(), Some(Side::Right));
        assert_eq!(Joint::Nose.side(), None);
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&Joint::RightWrist).unwrap();
        assert_eq!(json, "\"right_wrist\"");
        let joint: Joint = serde_json::from_str("\"left_knee\"").unwrap();
        assert_eq!(joint, Joint::LeftKnee);
    }
}
