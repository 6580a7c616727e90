//! End-to-end pipeline scenarios
//!
//! Synthetic front-view and side-view clips of a right-handed shooter, built
//! from constant-speed joint paths so detector and fluidity outcomes are
//! deterministic. The clip model: ball dips for 6 frames, rises for 24,
//! then the wrist carries forward; knees bend to their deepest point at
//! frame 18 and recover.

use std::collections::BTreeMap;

use shotform_analysis::{AnalysisConfig, InputFrame, ShotAnalyzer};
use shotform_common::{
    AnalysisReport, CameraAngle, FeatureTag, FlawType, Joint, Landmark, StartMethod,
};

const FPS: f64 = 30.0;
const SHOT_LEN: usize = 36;

fn analyzer() -> ShotAnalyzer {
    ShotAnalyzer::new(AnalysisConfig::default()).unwrap()
}

/// Smooth wrist path: down 6 frames, straight up 24, forward 5, all at the
/// same per-frame speed so the motion is perfectly fluid
fn smooth_wrist(t: usize) -> (f64, f64) {
    let tf = t as f64;
    let y = if t <= 6 {
        0.50 + 0.012 * tf
    } else if t <= 30 {
        0.572 - 0.012 * (tf - 6.0)
    } else {
        0.284
    };
    let x = if t <= 30 { 0.48 } else { 0.48 - 0.012 * (tf - 30.0) };
    (x, y)
}

/// Jerky wrist path: same dip, but the rise happens in sudden drops at
/// frames 14 and 22, each followed by a two-frame stall
fn jerky_wrist_path() -> Vec<(f64, f64)> {
    let mut y = vec![0.50];
    for t in 1..SHOT_LEN {
        let dy = if t <= 6 {
            0.012
        } else if matches!(t, 14 | 22) {
            -0.072
        } else if matches!(t, 15 | 16 | 23 | 24) {
            0.0
        } else {
            -0.012
        };
        y.push(y[t - 1] + dy);
    }
    y.into_iter().map(|y| (0.48, y)).collect()
}

/// Knee bend excursion, deepest (about 107 degrees) at frame 18
fn knee_bend(t: usize) -> f64 {
    let tf = t as f64;
    if t <= 18 {
        0.15 * tf / 18.0
    } else {
        0.15 * (SHOT_LEN as f64 - tf) / 18.0
    }
}

struct ClipStyle {
    /// Lateral offset applied to the shooting elbow (flare)
    elbow_shift: f64,
    /// Hide the left side of the body, as a right-profile camera would
    side_view: bool,
}

impl Default for ClipStyle {
    fn default() -> Self {
        Self {
            elbow_shift: 0.0,
            side_view: false,
        }
    }
}

fn pose_frame(wrist: (f64, f64), bend: f64, style: &ClipStyle) -> InputFrame {
    let (wx, wy) = wrist;
    let left_vis = if style.side_view { 0.1 } else { 0.95 };
    let mut lm = BTreeMap::new();
    let mut put = |joint: Joint, x: f64, y: f64, vis: f64| {
        lm.insert(joint, Landmark::new(x, y, vis));
    };

    put(Joint::Nose, 0.50, 0.27, 0.95);
    put(Joint::LeftEar, 0.46, 0.25, left_vis);
    put(Joint::RightEar, 0.54, 0.25, 0.95);
    put(Joint::LeftShoulder, 0.42, 0.40, left_vis);
    put(Joint::RightShoulder, 0.58, 0.40, 0.95);
    put(Joint::LeftHip, 0.44, 0.55, left_vis);
    put(Joint::RightHip, 0.56, 0.55, 0.95);
    put(Joint::LeftKnee, 0.44 - bend, 0.75, left_vis);
    put(Joint::RightKnee, 0.56 + bend, 0.75, 0.95);
    put(Joint::LeftAnkle, 0.44, 0.95, left_vis);
    put(Joint::RightAnkle, 0.56, 0.95, 0.95);

    // Shooting arm: elbow on the shoulder-wrist line unless shifted
    let ex = (0.58 + wx) / 2.0 + style.elbow_shift;
    let ey = (0.40 + wy) / 2.0;
    put(Joint::RightWrist, wx, wy, 0.95);
    put(Joint::RightElbow, ex, ey, 0.95);
    put(Joint::RightIndex, wx - 0.02, wy + 0.04, 0.95);

    // Guide arm mirrors the motion; in the side-view clip the extractor
    // still reports confident coordinates for it, lifted above the ball
    if style.side_view {
        put(Joint::LeftWrist, wx - 0.05, wy - 0.05, 0.95);
        put(Joint::LeftElbow, (0.42 + wx - 0.05) / 2.0, ey, 0.95);
        put(Joint::LeftIndex, wx - 0.03, wy - 0.01, 0.95);
    } else {
        put(Joint::LeftWrist, wx - 0.10, wy + 0.03, 0.95);
        put(Joint::LeftElbow, (0.42 + wx - 0.10) / 2.0, ey + 0.015, 0.95);
        put(Joint::LeftIndex, wx - 0.08, wy + 0.07, 0.95);
    }

    InputFrame::new(lm)
}

fn smooth_clip(style: &ClipStyle) -> Vec<InputFrame> {
    (0..SHOT_LEN)
        .map(|t| pose_frame(smooth_wrist(t), knee_bend(t), style))
        .collect()
}

fn assert_phases_cover(report: &AnalysisReport, first: usize, last: usize) {
    assert_eq!(report.phases.len(), 3);
    assert_eq!(report.phases[0].start_frame, first);
    assert_eq!(report.phases[2].end_frame, last);
    assert_eq!(report.phases[0].end_frame + 1, report.phases[1].start_frame);
    assert_eq!(report.phases[1].end_frame + 1, report.phases[2].start_frame);
    for phase in &report.phases {
        assert!(phase.contains(phase.key_moment_frame));
    }
}

#[test]
fn test_clean_front_view_shot_reports_no_flaws() {
    let report = analyzer()
        .analyze(smooth_clip(&ClipStyle::default()), FPS)
        .unwrap();

    assert_eq!(report.camera.angle, CameraAngle::Front);
    assert!(report.camera.visible_features.contains(&FeatureTag::GuideHand));
    assert!(report.flaws.is_empty(), "unexpected flaws: {:?}", report.flaws);
    assert!(report.fluidity.score > 90.0, "score {}", report.fluidity.score);
    // Pre-trimmed clip: no estimator finds an onset, start defaults to 0
    assert_eq!(report.shot_start_frame, 0);
    assert_phases_cover(&report, 0, SHOT_LEN - 1);
}

#[test]
fn test_extreme_elbow_flare_scores_high_severity() {
    let style = ClipStyle {
        elbow_shift: 0.12,
        ..ClipStyle::default()
    };
    let report = analyzer().analyze(smooth_clip(&style), FPS).unwrap();

    let flare = report
        .flaws
        .iter()
        .find(|f| f.flaw == FlawType::ElbowFlare)
        .expect("elbow flare should be reported");
    assert!(flare.severity >= 45.0, "severity {}", flare.severity);
    assert!(flare.severity <= 50.0);
    assert!(
        report.phases[1].contains(flare.representative_frame),
        "representative frame {} outside release",
        flare.representative_frame
    );
    assert!(flare.evidence_frame_count >= flare.required_frame_count);
    assert!(!flare.description.is_empty());
    assert!(!flare.coaching_tip.is_empty());
}

#[test]
fn test_side_view_never_reports_guide_hand() {
    // Right-profile view of a right-handed shooter: the extractor reports
    // confident guide-hand coordinates riding above the ball, but the view
    // occludes the guide hand, so the detector must not run at all
    let style = ClipStyle {
        side_view: true,
        ..ClipStyle::default()
    };
    let report = analyzer().analyze(smooth_clip(&style), FPS).unwrap();

    assert_eq!(report.camera.angle, CameraAngle::RightSide);
    assert!(!report.camera.visible_features.contains(&FeatureTag::GuideHand));
    assert!(report
        .camera
        .visible_features
        .contains(&FeatureTag::FullBodySide));
    assert!(report
        .flaws
        .iter()
        .all(|f| f.flaw != FlawType::GuideHandInterference));
    assert!(report.flaws.is_empty(), "unexpected flaws: {:?}", report.flaws);
}

#[test]
fn test_jerky_motion_reports_lacks_fluidity() {
    let style = ClipStyle::default();
    let frames: Vec<InputFrame> = jerky_wrist_path()
        .into_iter()
        .enumerate()
        .map(|(t, wrist)| pose_frame(wrist, knee_bend(t), &style))
        .collect();
    let report = analyzer().analyze(frames, FPS).unwrap();

    assert!(report.fluidity.score < 40.0, "score {}", report.fluidity.score);
    assert!(!report.fluidity.acceleration_spike_frames.is_empty());

    assert_eq!(report.flaws.len(), 1, "flaws: {:?}", report.flaws);
    let flaw = &report.flaws[0];
    assert_eq!(flaw.flaw, FlawType::LacksFluidity);
    assert!(flaw.severity > 0.0 && flaw.severity <= 45.0);
    assert!(flaw.evidence_frame_count >= flaw.required_frame_count);
    assert!((0..SHOT_LEN).contains(&flaw.representative_frame));
}

#[test]
fn test_static_long_clip_defaults_start_and_caps_window() {
    // 300 frames of a subject standing nearly still: no estimator clears
    // its floor, and the analysis window is capped at max_frames
    let style = ClipStyle::default();
    let frames: Vec<InputFrame> = (0..300)
        .map(|i| {
            let jitter = 0.0005 * ((i % 2) as f64);
            pose_frame((0.48, 0.50 + jitter), 0.0, &style)
        })
        .collect();
    let report = analyzer().analyze(frames, FPS).unwrap();

    assert_eq!(report.shot_start_frame, 0);
    assert_eq!(report.start_method, StartMethod::Default);
    assert_eq!(report.start_confidence, 0.0);
    assert_phases_cover(&report, 0, 99);
}

#[test]
fn test_absolute_indices_survive_trimming() {
    // 40 idle frames, then the shot: every frame index in the report must
    // be an absolute position in the untrimmed clip, inside the window
    let style = ClipStyle::default();
    let mut frames: Vec<InputFrame> =
        (0..40).map(|_| pose_frame(smooth_wrist(0), 0.0, &style)).collect();
    frames.extend(smooth_clip(&style));
    let total = frames.len();

    let report = analyzer().analyze(frames, FPS).unwrap();

    assert_eq!(report.start_method, StartMethod::Landmark);
    assert!(report.start_confidence >= 0.5);
    // Trigger at the first moving pair, minus the 0.5 s lookback
    assert_eq!(report.shot_start_frame, 26);

    let window = report.shot_start_frame..total;
    assert_phases_cover(&report, report.shot_start_frame, total - 1);
    for phase in &report.phases {
        assert!(window.contains(&phase.start_frame));
        assert!(window.contains(&phase.end_frame));
        assert!(window.contains(&phase.key_moment_frame));
    }
    for flaw in &report.flaws {
        assert!(
            window.contains(&flaw.representative_frame),
            "flaw {} frame {} outside {:?}",
            flaw.flaw.as_str(),
            flaw.representative_frame,
            window
        );
    }
    for &frame in report
        .fluidity
        .acceleration_spike_frames
        .iter()
        .chain(&report.fluidity.rhythm_break_frames)
    {
        assert!(window.contains(&frame), "evidence frame {} outside window", frame);
    }
}

#[test]
fn test_severities_stay_in_bounds() {
    let flare = ClipStyle {
        elbow_shift: 0.2,
        ..ClipStyle::default()
    };
    let report = analyzer().analyze(smooth_clip(&flare), FPS).unwrap();

    assert!(!report.flaws.is_empty());
    for flaw in &report.flaws {
        assert!(flaw.severity >= 0.0 && flaw.severity <= 100.0);
        assert!(flaw.evidence_frame_count >= flaw.required_frame_count);
        assert!(flaw.required_frame_count >= 1);
    }
    // Severity-descending order
    for pair in report.flaws.windows(2) {
        assert!(pair[0].severity >= pair[1].severity);
    }
}

#[test]
fn test_analysis_is_idempotent() {
    let style = ClipStyle {
        elbow_shift: 0.12,
        ..ClipStyle::default()
    };
    let frames = smooth_clip(&style);

    let first = analyzer().analyze(frames.clone(), FPS).unwrap();
    let second = analyzer().analyze(frames, FPS).unwrap();

    assert_eq!(first, second);
    let a = serde_json::to_string(&first).unwrap();
    let b = serde_json::to_string(&second).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_report_round_trips_through_json() {
    let report = analyzer()
        .analyze(smooth_clip(&ClipStyle::default()), FPS)
        .unwrap();

    let json = serde_json::to_string(&report).unwrap();
    let parsed: AnalysisReport = serde_json::from_str(&json).unwrap();
    assert_eq!(report, parsed);
}

#[test]
fn test_reported_flaws_capped_by_config() {
    let mut cfg = AnalysisConfig::default();
    cfg.max_reported_flaws = 1;
    let analyzer = ShotAnalyzer::new(cfg).unwrap();

    let style = ClipStyle {
        elbow_shift: 0.12,
        ..ClipStyle::default()
    };
    let report = analyzer.analyze(smooth_clip(&style), FPS).unwrap();
    assert!(report.flaws.len() <= 1);
}
