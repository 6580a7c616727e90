//! Flaw detector registry
//!
//! Detectors are declared, not hard-coded: each `DetectorSpec` names its
//! visibility requirements, compatible camera angles, phase window, threshold
//! test, and consistency gate, and the engine iterates them generically. A
//! detector whose visibility or camera-angle requirements are unmet is
//! skipped entirely, never merely suppressed, so the report can never claim
//! something about a body part the camera could not have observed.
//!
//! All frame numbers flowing through here are absolute indices read off the
//! frame records; the engine performs no offset arithmetic.

mod catalog;

pub use catalog::coaching_tip;
pub use catalog::description;

use shotform_common::{
    CameraAngle, CameraContext, FeatureTag, FlawCandidate, FlawType, FluiditySummary,
    FrameMetrics, FrameRecord, PhaseName, ShotPhase,
};
use tracing::debug;

use crate::config::DetectorConfig;

/// Outcome of one per-frame threshold test
#[derive(Debug, Clone, Copy, PartialEq)]
enum CheckOutcome {
    /// The metrics this check needs were not trustworthy in this frame
    Unmeasured,
    /// Measured and within acceptable range
    Clean,
    /// Measured and beyond threshold, with a severity
    Hit(f64),
}

/// Per-frame threshold test, one variant per flaw type
#[derive(Debug, Clone)]
pub enum FlawCheck {
    /// Dual-method: side-view extension angle OR front-view lateral
    /// deviation, reporting the stronger signal
    ElbowFlare {
        side_angle_min: f64,
        lateral_ratio_threshold: f64,
    },
    InsufficientKneeBend { knee_angle_max: f64 },
    ExcessiveKneeBend { knee_angle_min: f64 },
    PoorWristSnap { wrist_angle_max: f64 },
    ShoulderMisalignment { tilt_max_degrees: f64 },
    GuideHandInterference { offset_threshold: f64 },
    /// Whole-shot check over the fluidity summary instead of per-frame
    /// metrics
    Fluidity { score_threshold: f64, min_events: usize },
}

impl FlawCheck {
    fn evaluate(&self, metrics: &FrameMetrics, max_severity: f64) -> CheckOutcome {
        match self {
            FlawCheck::ElbowFlare {
                side_angle_min,
                lateral_ratio_threshold,
            } => {
                let side = metrics
                    .elbow_angle
                    .map(|angle| scaled_severity(side_angle_min - angle, 45.0, max_severity));
                let front = metrics.elbow_lateral_ratio.map(|ratio| {
                    scaled_severity(ratio - lateral_ratio_threshold, 0.65, max_severity)
                });
                match (side, front) {
                    (None, None) => CheckOutcome::Unmeasured,
                    (a, b) => hit_or_clean(a.unwrap_or(0.0).max(b.unwrap_or(0.0))),
                }
            }
            FlawCheck::InsufficientKneeBend { knee_angle_max } => match metrics.knee_angle {
                None => CheckOutcome::Unmeasured,
                Some(angle) => {
                    hit_or_clean(scaled_severity(angle - knee_angle_max, 50.0, max_severity))
                }
            },
            FlawCheck::ExcessiveKneeBend { knee_angle_min } => match metrics.knee_angle {
                None => CheckOutcome::Unmeasured,
                Some(angle) => {
                    hit_or_clean(scaled_severity(knee_angle_min - angle, 45.0, max_severity))
                }
            },
            FlawCheck::PoorWristSnap { wrist_angle_max } => match metrics.wrist_angle {
                None => CheckOutcome::Unmeasured,
                Some(angle) => {
                    hit_or_clean(scaled_severity(angle - wrist_angle_max, 60.0, max_severity))
                }
            },
            FlawCheck::ShoulderMisalignment { tilt_max_degrees } => {
                match metrics.shoulder_line_angle {
                    None => CheckOutcome::Unmeasured,
                    Some(tilt) => hit_or_clean(scaled_severity(
                        tilt.abs() - tilt_max_degrees,
                        40.0,
                        max_severity,
                    )),
                }
            }
            FlawCheck::GuideHandInterference { offset_threshold } => {
                match metrics.guide_hand_offset {
                    None => CheckOutcome::Unmeasured,
                    Some(offset) => hit_or_clean(scaled_severity(
                        offset - offset_threshold,
                        0.45,
                        max_severity,
                    )),
                }
            }
            // Evaluated against the fluidity summary, not per-frame metrics
            FlawCheck::Fluidity { .. } => CheckOutcome::Unmeasured,
        }
    }
}

/// One declared detector
#[derive(Debug, Clone)]
pub struct DetectorSpec {
    pub flaw: FlawType,
    /// Features that must be present in the camera context
    pub requires_visibility: Vec<FeatureTag>,
    /// Camera angles this detector is valid for
    pub camera_angles: Vec<CameraAngle>,
    /// Phase this detector evaluates
    pub phase: PhaseName,
    /// When set, evaluate only +/- this many frames around the phase's key
    /// moment instead of the whole phase
    pub key_moment_window: Option<usize>,
    /// Severity ceiling for this detector
    pub max_severity: f64,
    /// Fraction of evaluated frames that must show the flaw
    pub min_evidence_fraction: f64,
    /// Minimum mean severity over flagged frames
    pub min_avg_severity: f64,
    pub check: FlawCheck,
}

/// The declared set of detectors for one run
pub struct DetectorRegistry {
    specs: Vec<DetectorSpec>,
}

impl DetectorRegistry {
    /// Build the registry from a detector config; disabled detectors are not
    /// registered at all
    pub fn from_config(cfg: &DetectorConfig) -> Self {
        Self {
            specs: catalog::build_specs(cfg),
        }
    }

    /// Number of registered detectors
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Run every registered detector over the trimmed window
    pub fn run(
        &self,
        frames: &[FrameRecord],
        phases: &[ShotPhase],
        camera: &CameraContext,
        fluidity: &FluiditySummary,
    ) -> Vec<FlawCandidate> {
        let mut candidates = Vec::new();

        for spec in &self.specs {
            if !camera.exposes_all(&spec.requires_visibility) {
                debug!(
                    flaw = spec.flaw.as_str(),
                    "Detector skipped: required feature not observable"
                );
                continue;
            }
            if !spec.camera_angles.contains(&camera.angle) {
                debug!(
                    flaw = spec.flaw.as_str(),
                    angle = camera.angle.as_str(),
                    "Detector skipped: incompatible camera angle"
                );
                continue;
            }

            let candidate = match &spec.check {
                FlawCheck::Fluidity {
                    score_threshold,
                    min_events,
                } => self.check_fluidity(spec, *score_threshold, *min_events, fluidity, phases, camera),
                _ => self.check_frames(spec, frames, phases, camera),
            };

            if let Some(candidate) = candidate {
                candidates.push(candidate);
            }
        }

        candidates
    }

    /// Per-frame detector path: evaluate the phase window, apply the
    /// consistency gate, resolve the representative frame
    fn check_frames(
        &self,
        spec: &DetectorSpec,
        frames: &[FrameRecord],
        phases: &[ShotPhase],
        camera: &CameraContext,
    ) -> Option<FlawCandidate> {
        let phase = phases.iter().find(|p| p.name == spec.phase)?;

        // Exact-timing detectors anchor to the key moment, not the phase
        // boundaries, so irrelevant frames cannot dilute the evidence
        let in_window = |frame: &FrameRecord| -> bool {
            let idx = frame.absolute_frame_index;
            match spec.key_moment_window {
                Some(w) => {
                    idx >= phase.key_moment_frame.saturating_sub(w)
                        && idx <= phase.key_moment_frame + w
                }
                None => phase.contains(idx),
            }
        };

        let mut evaluated = 0usize;
        let mut hits: Vec<(usize, f64)> = Vec::new();

        for frame in frames.iter().filter(|f| in_window(f)) {
            match spec.check.evaluate(&frame.metrics, spec.max_severity) {
                CheckOutcome::Unmeasured => {}
                CheckOutcome::Clean => evaluated += 1,
                CheckOutcome::Hit(severity) => {
                    evaluated += 1;
                    hits.push((frame.absolute_frame_index, severity));
                }
            }
        }

        if evaluated == 0 {
            return None;
        }

        let required = ((spec.min_evidence_fraction * evaluated as f64).ceil() as usize).max(1);
        if hits.len() < required {
            return None;
        }

        let avg_severity = hits.iter().map(|(_, s)| s).sum::<f64>() / hits.len() as f64;
        if avg_severity < spec.min_avg_severity {
            return None;
        }

        // Best single frame: highest individual severity, earliest on ties
        let representative_frame = hits
            .iter()
            .fold(None::<(usize, f64)>, |best, &(frame, sev)| match best {
                Some((_, best_sev)) if best_sev >= sev => best,
                _ => Some((frame, sev)),
            })
            .map(|(frame, _)| frame)?;

        debug!(
            flaw = spec.flaw.as_str(),
            severity = avg_severity,
            evidence = hits.len(),
            required,
            representative_frame,
            "Flaw confirmed"
        );

        Some(FlawCandidate {
            flaw: spec.flaw,
            severity: avg_severity.min(spec.max_severity),
            evidence_frame_count: hits.len(),
            required_frame_count: required,
            representative_frame,
            camera_context: camera.clone(),
            description: description(spec.flaw).to_string(),
            coaching_tip: coaching_tip(spec.flaw).to_string(),
        })
    }

    /// Whole-shot fluidity path: same registry contract, evidence counted in
    /// spike/break events instead of frames
    fn check_fluidity(
        &self,
        spec: &DetectorSpec,
        score_threshold: f64,
        min_events: usize,
        fluidity: &FluiditySummary,
        phases: &[ShotPhase],
        camera: &CameraContext,
    ) -> Option<FlawCandidate> {
        if fluidity.score >= score_threshold {
            return None;
        }
        let events =
            fluidity.acceleration_spike_frames.len() + fluidity.rhythm_break_frames.len();
        if events < min_events {
            return None;
        }

        let severity = if score_threshold > f64::EPSILON {
            ((score_threshold - fluidity.score) / score_threshold * spec.max_severity)
                .clamp(0.0, spec.max_severity)
        } else {
            0.0
        };
        if severity < spec.min_avg_severity {
            return None;
        }

        // Worst observable moment: prefer an acceleration spike, fall back to
        // a rhythm break, then to the release key moment
        let representative_frame = fluidity
            .acceleration_spike_frames
            .first()
            .or(fluidity.rhythm_break_frames.first())
            .copied()
            .or_else(|| {
                phases
                    .iter()
                    .find(|p| p.name == PhaseName::Release)
                    .map(|p| p.key_moment_frame)
            })?;

        debug!(
            flaw = spec.flaw.as_str(),
            severity,
            events,
            representative_frame,
            "Fluidity flaw confirmed"
        );

        Some(FlawCandidate {
            flaw: spec.flaw,
            severity,
            evidence_frame_count: events,
            required_frame_count: min_events,
            representative_frame,
            camera_context: camera.clone(),
            description: description(spec.flaw).to_string(),
            coaching_tip: coaching_tip(spec.flaw).to_string(),
        })
    }
}

/// Severity monotonic in how far the metric exceeds its threshold, scaled
/// over `span` and clamped to the detector's ceiling
fn scaled_severity(excess: f64, span: f64, max_severity: f64) -> f64 {
    if excess <= 0.0 || span <= f64::EPSILON {
        return 0.0;
    }
    (excess / span).min(1.0) * max_severity
}

fn hit_or_clean(severity: f64) -> CheckOutcome {
    if severity > 0.0 {
        CheckOutcome::Hit(severity)
    } else {
        CheckOutcome::Clean
    }
}
