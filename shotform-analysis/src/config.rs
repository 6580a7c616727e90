//! Analysis configuration
//!
//! Every empirically-tuned threshold in the pipeline lives here as a
//! configurable default, loadable from TOML. The whole config is a plain
//! value passed into the pipeline at construction time; there are no
//! process-wide flags, so concurrent analyses may run with different configs
//! without interfering.

use std::path::Path;

use serde::Deserialize;
use shotform_common::{Error, Result, Side};

/// Top-level analysis configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    /// Which hand the subject shoots with
    #[serde(default = "default_shooting_hand")]
    pub shooting_hand: Side,

    /// Minimum landmark visibility for a coordinate to count as observed
    #[serde(default = "default_min_visibility")]
    pub min_visibility: f64,

    /// Maximum trimmed-window length in frames, bounding worst-case work
    #[serde(default = "default_max_frames")]
    pub max_frames: usize,

    /// Maximum number of flaws in the final report
    #[serde(default = "default_max_reported_flaws")]
    pub max_reported_flaws: usize,

    #[serde(default)]
    pub shot_start: ShotStartConfig,

    #[serde(default)]
    pub segmenter: SegmenterConfig,

    #[serde(default)]
    pub fluidity: FluidityConfig,

    #[serde(default)]
    pub detectors: DetectorConfig,
}

fn default_shooting_hand() -> Side {
    Side::Right
}
fn default_min_visibility() -> f64 {
    0.5
}
fn default_max_frames() -> usize {
    100
}
fn default_max_reported_flaws() -> usize {
    4
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            shooting_hand: default_shooting_hand(),
            min_visibility: default_min_visibility(),
            max_frames: default_max_frames(),
            max_reported_flaws: default_max_reported_flaws(),
            shot_start: ShotStartConfig::default(),
            segmenter: SegmenterConfig::default(),
            fluidity: FluidityConfig::default(),
            detectors: DetectorConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AnalysisConfig =
            toml::from_str(&content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate value ranges
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.min_visibility) {
            return Err(Error::Config(format!(
                "min_visibility out of range: {}",
                self.min_visibility
            )));
        }
        if self.max_frames < 3 {
            return Err(Error::Config(format!(
                "max_frames too small for segmentation: {}",
                self.max_frames
            )));
        }
        if self.max_reported_flaws == 0 {
            return Err(Error::Config("max_reported_flaws must be >= 1".to_string()));
        }
        self.detectors.validate()?;
        Ok(())
    }
}

/// Shot start detector tuning
#[derive(Debug, Clone, Deserialize)]
pub struct ShotStartConfig {
    /// Maximum prefix of frames scanned for the start of motion
    #[serde(default = "default_scan_frame_cap")]
    pub scan_frame_cap: usize,

    /// Rolling-baseline window length in frames
    #[serde(default = "default_baseline_window")]
    pub baseline_window: usize,

    /// Activity must exceed this multiple of the rolling baseline to trigger
    #[serde(default = "default_activity_multiplier")]
    pub activity_multiplier: f64,

    /// Lookback applied to landmark/optical triggers, seconds
    #[serde(default = "default_lookback_sec")]
    pub lookback_sec: f64,

    /// Shorter lookback applied to the pixel-difference trigger, seconds
    #[serde(default = "default_pixel_lookback_sec")]
    pub pixel_lookback_sec: f64,

    /// Confidence floor for the landmark estimator
    #[serde(default = "default_landmark_floor")]
    pub landmark_confidence_floor: f64,

    /// Confidence floor for the optical-motion estimator
    #[serde(default = "default_optical_floor")]
    pub optical_confidence_floor: f64,

    /// Confidence floor for the frame-difference estimator
    #[serde(default = "default_pixel_floor")]
    pub pixel_confidence_floor: f64,
}

fn default_scan_frame_cap() -> usize {
    300
}
fn default_baseline_window() -> usize {
    10
}
fn default_activity_multiplier() -> f64 {
    3.0
}
fn default_lookback_sec() -> f64 {
    0.5
}
fn default_pixel_lookback_sec() -> f64 {
    0.3
}
fn default_landmark_floor() -> f64 {
    0.5
}
fn default_optical_floor() -> f64 {
    0.35
}
fn default_pixel_floor() -> f64 {
    0.4
}

impl Default for ShotStartConfig {
    fn default() -> Self {
        Self {
            scan_frame_cap: default_scan_frame_cap(),
            baseline_window: default_baseline_window(),
            activity_multiplier: default_activity_multiplier(),
            lookback_sec: default_lookback_sec(),
            pixel_lookback_sec: default_pixel_lookback_sec(),
            landmark_confidence_floor: default_landmark_floor(),
            optical_confidence_floor: default_optical_floor(),
            pixel_confidence_floor: default_pixel_floor(),
        }
    }
}

/// Phase segmenter tuning
#[derive(Debug, Clone, Deserialize)]
pub struct SegmenterConfig {
    /// Delay between peak wrist height and the start of follow-through,
    /// seconds (at least two frames are always used)
    #[serde(default = "default_follow_through_delay_sec")]
    pub follow_through_delay_sec: f64,
}

fn default_follow_through_delay_sec() -> f64 {
    0.1
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            follow_through_delay_sec: default_follow_through_delay_sec(),
        }
    }
}

/// Fluidity analyzer tuning
#[derive(Debug, Clone, Deserialize)]
pub struct FluidityConfig {
    /// Weight of the velocity-smoothness sub-score
    #[serde(default = "default_velocity_weight")]
    pub velocity_weight: f64,

    /// Weight of the acceleration-smoothness sub-score
    #[serde(default = "default_acceleration_weight")]
    pub acceleration_weight: f64,

    /// Weight of the rhythm-consistency sub-score
    #[serde(default = "default_rhythm_weight")]
    pub rhythm_weight: f64,

    /// Weight of the jerk-smoothness sub-score
    #[serde(default = "default_jerk_weight")]
    pub jerk_weight: f64,

    /// Abrupt speed change = speed above this multiple of the rolling average
    #[serde(default = "default_speed_spike_multiplier")]
    pub speed_spike_multiplier: f64,

    /// Ignore acceleration spikes below this magnitude (normalized units/s^2),
    /// so a numerically flat series is not penalized for noise
    #[serde(default = "default_min_spike_magnitude")]
    pub min_spike_magnitude: f64,

    /// Reference jerk standard deviation mapping to a 50-point jerk score
    /// (normalized units/s^3)
    #[serde(default = "default_jerk_reference")]
    pub jerk_reference: f64,

    /// |vertical wrist velocity| below this fraction of its peak counts as a
    /// stop when bracketed by active motion
    #[serde(default = "default_rhythm_stop_fraction")]
    pub rhythm_stop_fraction: f64,

    /// |vertical wrist velocity| above this fraction of its peak counts as
    /// active motion
    #[serde(default = "default_rhythm_active_fraction")]
    pub rhythm_active_fraction: f64,
}

fn default_velocity_weight() -> f64 {
    0.30
}
fn default_acceleration_weight() -> f64 {
    0.30
}
fn default_rhythm_weight() -> f64 {
    0.25
}
fn default_jerk_weight() -> f64 {
    0.15
}
fn default_speed_spike_multiplier() -> f64 {
    1.5
}
fn default_min_spike_magnitude() -> f64 {
    0.5
}
fn default_jerk_reference() -> f64 {
    200.0
}
fn default_rhythm_stop_fraction() -> f64 {
    0.25
}
fn default_rhythm_active_fraction() -> f64 {
    0.5
}

impl Default for FluidityConfig {
    fn default() -> Self {
        Self {
            velocity_weight: default_velocity_weight(),
            acceleration_weight: default_acceleration_weight(),
            rhythm_weight: default_rhythm_weight(),
            jerk_weight: default_jerk_weight(),
            speed_spike_multiplier: default_speed_spike_multiplier(),
            min_spike_magnitude: default_min_spike_magnitude(),
            jerk_reference: default_jerk_reference(),
            rhythm_stop_fraction: default_rhythm_stop_fraction(),
            rhythm_active_fraction: default_rhythm_active_fraction(),
        }
    }
}

/// Per-detector gates and thresholds
///
/// Each detector reads its own fields from this value at registry
/// construction; disabling a detector here removes it from the registry
/// entirely for that run.
#[derive(Debug, Clone, Deserialize)]
pub struct DetectorConfig {
    #[serde(default)]
    pub elbow_flare: ElbowFlareConfig,
    #[serde(default)]
    pub insufficient_knee_bend: InsufficientKneeBendConfig,
    #[serde(default)]
    pub excessive_knee_bend: ExcessiveKneeBendConfig,
    #[serde(default)]
    pub poor_wrist_snap: PoorWristSnapConfig,
    #[serde(default)]
    pub shoulder_misalignment: ShoulderMisalignmentConfig,
    #[serde(default)]
    pub guide_hand_interference: GuideHandInterferenceConfig,
    #[serde(default)]
    pub lacks_fluidity: LacksFluidityConfig,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            elbow_flare: ElbowFlareConfig::default(),
            insufficient_knee_bend: InsufficientKneeBendConfig::default(),
            excessive_knee_bend: ExcessiveKneeBendConfig::default(),
            poor_wrist_snap: PoorWristSnapConfig::default(),
            shoulder_misalignment: ShoulderMisalignmentConfig::default(),
            guide_hand_interference: GuideHandInterferenceConfig::default(),
            lacks_fluidity: LacksFluidityConfig::default(),
        }
    }
}

impl DetectorConfig {
    fn validate(&self) -> Result<()> {
        for (name, fraction) in [
            ("elbow_flare", self.elbow_flare.min_evidence_fraction),
            (
                "insufficient_knee_bend",
                self.insufficient_knee_bend.min_evidence_fraction,
            ),
            (
                "excessive_knee_bend",
                self.excessive_knee_bend.min_evidence_fraction,
            ),
            ("poor_wrist_snap", self.poor_wrist_snap.min_evidence_fraction),
            (
                "shoulder_misalignment",
                self.shoulder_misalignment.min_evidence_fraction,
            ),
            (
                "guide_hand_interference",
                self.guide_hand_interference.min_evidence_fraction,
            ),
        ] {
            if !(0.0..=1.0).contains(&fraction) {
                return Err(Error::Config(format!(
                    "{}: min_evidence_fraction out of range: {}",
                    name, fraction
                )));
            }
        }
        Ok(())
    }
}

/// Elbow flare (dual-method: side-view extension angle, front-view lateral
/// deviation)
#[derive(Debug, Clone, Deserialize)]
pub struct ElbowFlareConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Side view: elbow extension below this angle during release flags flare
    #[serde(default = "default_flare_side_angle_min")]
    pub side_angle_min: f64,
    /// Front view: elbow lateral deviation above this fraction of shoulder
    /// width flags flare
    #[serde(default = "default_flare_lateral_ratio")]
    pub lateral_ratio_threshold: f64,
    #[serde(default = "default_flare_max_severity")]
    pub max_severity: f64,
    #[serde(default = "default_evidence_fraction")]
    pub min_evidence_fraction: f64,
    #[serde(default = "default_flare_min_avg_severity")]
    pub min_avg_severity: f64,
}

fn default_flare_side_angle_min() -> f64 {
    165.0
}
fn default_flare_lateral_ratio() -> f64 {
    0.25
}
fn default_flare_max_severity() -> f64 {
    50.0
}
fn default_flare_min_avg_severity() -> f64 {
    12.0
}

impl Default for ElbowFlareConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            side_angle_min: default_flare_side_angle_min(),
            lateral_ratio_threshold: default_flare_lateral_ratio(),
            max_severity: default_flare_max_severity(),
            min_evidence_fraction: default_evidence_fraction(),
            min_avg_severity: default_flare_min_avg_severity(),
        }
    }
}

/// Insufficient knee bend at the deepest point of the dip
#[derive(Debug, Clone, Deserialize)]
pub struct InsufficientKneeBendConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Knee angle above this value at the deepest bend flags the flaw
    #[serde(default = "default_knee_angle_max")]
    pub knee_angle_max: f64,
    /// Frames either side of the deepest-bend key moment to evaluate
    #[serde(default = "default_knee_window")]
    pub key_moment_window: usize,
    #[serde(default = "default_knee_max_severity")]
    pub max_severity: f64,
    #[serde(default = "default_evidence_fraction")]
    pub min_evidence_fraction: f64,
    #[serde(default = "default_knee_min_avg_severity")]
    pub min_avg_severity: f64,
}

fn default_knee_angle_max() -> f64 {
    130.0
}
fn default_knee_window() -> usize {
    5
}
fn default_knee_max_severity() -> f64 {
    40.0
}
fn default_knee_min_avg_severity() -> f64 {
    10.0
}

impl Default for InsufficientKneeBendConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            knee_angle_max: default_knee_angle_max(),
            key_moment_window: default_knee_window(),
            max_severity: default_knee_max_severity(),
            min_evidence_fraction: default_evidence_fraction(),
            min_avg_severity: default_knee_min_avg_severity(),
        }
    }
}

/// Excessive knee bend (over-loading, slows the release)
#[derive(Debug, Clone, Deserialize)]
pub struct ExcessiveKneeBendConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Knee angle below this value at the deepest bend flags the flaw
    #[serde(default = "default_knee_angle_min")]
    pub knee_angle_min: f64,
    #[serde(default = "default_knee_window")]
    pub key_moment_window: usize,
    #[serde(default = "default_excessive_knee_max_severity")]
    pub max_severity: f64,
    #[serde(default = "default_evidence_fraction")]
    pub min_evidence_fraction: f64,
    #[serde(default = "default_knee_min_avg_severity")]
    pub min_avg_severity: f64,
}

fn default_knee_angle_min() -> f64 {
    90.0
}
fn default_excessive_knee_max_severity() -> f64 {
    30.0
}

impl Default for ExcessiveKneeBendConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            knee_angle_min: default_knee_angle_min(),
            key_moment_window: default_knee_window(),
            max_severity: default_excessive_knee_max_severity(),
            min_evidence_fraction: default_evidence_fraction(),
            min_avg_severity: default_knee_min_avg_severity(),
        }
    }
}

/// Poor wrist snap in the follow-through
#[derive(Debug, Clone, Deserialize)]
pub struct PoorWristSnapConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Wrist angle above this value at peak flexion means the wrist never
    /// snapped (180 = fully straight)
    #[serde(default = "default_wrist_angle_max")]
    pub wrist_angle_max: f64,
    /// Frames either side of the peak-flexion key moment to evaluate
    #[serde(default = "default_wrist_window")]
    pub key_moment_window: usize,
    #[serde(default = "default_wrist_max_severity")]
    pub max_severity: f64,
    #[serde(default = "default_evidence_fraction")]
    pub min_evidence_fraction: f64,
    /// Higher floor than flare: wrist snap affects shot outcome more directly
    #[serde(default = "default_wrist_min_avg_severity")]
    pub min_avg_severity: f64,
}

fn default_wrist_angle_max() -> f64 {
    120.0
}
fn default_wrist_window() -> usize {
    2
}
fn default_wrist_max_severity() -> f64 {
    45.0
}
fn default_wrist_min_avg_severity() -> f64 {
    20.0
}

impl Default for PoorWristSnapConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            wrist_angle_max: default_wrist_angle_max(),
            key_moment_window: default_wrist_window(),
            max_severity: default_wrist_max_severity(),
            min_evidence_fraction: default_evidence_fraction(),
            min_avg_severity: default_wrist_min_avg_severity(),
        }
    }
}

/// Shoulders not squared to the basket during release
#[derive(Debug, Clone, Deserialize)]
pub struct ShoulderMisalignmentConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Shoulder-line tilt from horizontal above this angle flags the flaw
    #[serde(default = "default_shoulder_tilt_max")]
    pub tilt_max_degrees: f64,
    #[serde(default = "default_shoulder_max_severity")]
    pub max_severity: f64,
    #[serde(default = "default_evidence_fraction")]
    pub min_evidence_fraction: f64,
    #[serde(default = "default_shoulder_min_avg_severity")]
    pub min_avg_severity: f64,
}

fn default_shoulder_tilt_max() -> f64 {
    20.0
}
fn default_shoulder_max_severity() -> f64 {
    40.0
}
fn default_shoulder_min_avg_severity() -> f64 {
    10.0
}

impl Default for ShoulderMisalignmentConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tilt_max_degrees: default_shoulder_tilt_max(),
            max_severity: default_shoulder_max_severity(),
            min_evidence_fraction: default_evidence_fraction(),
            min_avg_severity: default_shoulder_min_avg_severity(),
        }
    }
}

/// Guide hand pushing or lifting the ball during release
#[derive(Debug, Clone, Deserialize)]
pub struct GuideHandInterferenceConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Guide wrist this fraction of shoulder width above the shooting wrist
    /// flags interference
    #[serde(default = "default_guide_offset_max")]
    pub offset_threshold: f64,
    /// Frames either side of the release key moment to evaluate
    #[serde(default = "default_guide_window")]
    pub key_moment_window: usize,
    #[serde(default = "default_guide_max_severity")]
    pub max_severity: f64,
    #[serde(default = "default_evidence_fraction")]
    pub min_evidence_fraction: f64,
    #[serde(default = "default_guide_min_avg_severity")]
    pub min_avg_severity: f64,
}

fn default_guide_offset_max() -> f64 {
    0.15
}
fn default_guide_window() -> usize {
    3
}
fn default_guide_max_severity() -> f64 {
    35.0
}
fn default_guide_min_avg_severity() -> f64 {
    10.0
}

impl Default for GuideHandInterferenceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            offset_threshold: default_guide_offset_max(),
            key_moment_window: default_guide_window(),
            max_severity: default_guide_max_severity(),
            min_evidence_fraction: default_evidence_fraction(),
            min_avg_severity: default_guide_min_avg_severity(),
        }
    }
}

/// Composite fluidity score below threshold
#[derive(Debug, Clone, Deserialize)]
pub struct LacksFluidityConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Fluidity score below this value flags the flaw
    #[serde(default = "default_fluidity_threshold")]
    pub score_threshold: f64,
    #[serde(default = "default_fluidity_max_severity")]
    pub max_severity: f64,
    /// Minimum spike/break evidence events required
    #[serde(default = "default_fluidity_min_events")]
    pub min_evidence_events: usize,
}

fn default_fluidity_threshold() -> f64 {
    70.0
}
fn default_fluidity_max_severity() -> f64 {
    45.0
}
fn default_fluidity_min_events() -> usize {
    1
}

impl Default for LacksFluidityConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            score_threshold: default_fluidity_threshold(),
            max_severity: default_fluidity_max_severity(),
            min_evidence_events: default_fluidity_min_events(),
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_evidence_fraction() -> f64 {
    0.6
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.shooting_hand, Side::Right);
        assert_eq!(config.max_frames, 100);
        assert_eq!(config.max_reported_flaws, 4);
        assert_eq!(config.shot_start.scan_frame_cap, 300);
        assert!((config.detectors.lacks_fluidity.score_threshold - 70.0).abs() < f64::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
shooting_hand = "left"
max_reported_flaws = 2

[detectors.elbow_flare]
enabled = false
lateral_ratio_threshold = 0.30
"#
        )
        .unwrap();

        let config = AnalysisConfig::load(file.path()).unwrap();
        assert_eq!(config.shooting_hand, Side::Left);
        assert_eq!(config.max_reported_flaws, 2);
        assert!(!config.detectors.elbow_flare.enabled);
        assert!((config.detectors.elbow_flare.lateral_ratio_threshold - 0.30).abs() < 1e-9);
        // Untouched sections keep defaults
        assert!(config.detectors.poor_wrist_snap.enabled);
        assert_eq!(config.max_frames, 100);
    }

    #[test]
    fn test_validate_rejects_bad_fraction() {
        let mut config = AnalysisConfig::default();
        config.detectors.elbow_flare.min_evidence_fraction = 1.5;
        assert!(config.validate().is_err());
    }
}
