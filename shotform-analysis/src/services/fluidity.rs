//! Motion fluidity analysis
//!
//! Derives velocity, acceleration, and jerk series per tracked joint from the
//! frame stream and folds them into a composite 0-100 smoothness score:
//! velocity 30%, acceleration 30%, rhythm 25%, jerk 15%. The score appears in
//! the report directly and feeds the lacks_fluidity detector. Spike and
//! rhythm-break evidence frames are reported as absolute indices.

use shotform_common::{FluiditySummary, FrameRecord, Joint, Side};
use tracing::debug;

use crate::config::FluidityConfig;

/// Joints whose motion smoothness is tracked
const TRACKED_JOINTS: [Joint; 6] = [
    Joint::LeftWrist,
    Joint::RightWrist,
    Joint::LeftElbow,
    Joint::RightElbow,
    Joint::LeftKnee,
    Joint::RightKnee,
];

/// Rolling window for the abrupt-speed-change baseline
const SPEED_BASELINE_WINDOW: usize = 5;

/// Minimum samples for any statistical series
const MIN_SAMPLES: usize = 4;

/// Analyzes motion smoothness over the trimmed frame stream
pub struct FluidityAnalyzer {
    cfg: FluidityConfig,
    min_visibility: f64,
    shooting_hand: Side,
    fps: f64,
}

impl FluidityAnalyzer {
    pub fn new(cfg: FluidityConfig, min_visibility: f64, shooting_hand: Side, fps: f64) -> Self {
        Self {
            cfg,
            min_visibility,
            shooting_hand,
            fps,
        }
    }

    /// Compute the fluidity summary for the trimmed window
    pub fn analyze(&self, frames: &[FrameRecord]) -> FluiditySummary {
        if frames.len() < MIN_SAMPLES {
            return FluiditySummary::neutral();
        }

        let mut velocity_scores = Vec::new();
        let mut jerk_values = Vec::new();
        let mut spike_positions: Vec<usize> = Vec::new();

        for joint in TRACKED_JOINTS {
            let speeds = self.speed_series(frames, joint);
            let samples: Vec<f64> = speeds.iter().filter_map(|s| *s).collect();
            if samples.len() < MIN_SAMPLES {
                continue;
            }

            velocity_scores.push(self.velocity_smoothness(&speeds, &samples));
            self.collect_acceleration_spikes(&speeds, &mut spike_positions);
            self.collect_jerk(&speeds, &mut jerk_values);
        }

        let velocity_score = mean_or(&velocity_scores, 100.0);

        spike_positions.sort_unstable();
        spike_positions.dedup();
        let acceleration_score = (100.0 - 25.0 * spike_positions.len() as f64).clamp(0.0, 100.0);

        let (rhythm_score, break_positions) = self.rhythm_consistency(frames);

        let jerk_score = if jerk_values.len() < MIN_SAMPLES {
            100.0
        } else {
            let std = std_dev(&jerk_values);
            100.0 / (1.0 + std / self.cfg.jerk_reference)
        };

        let weight_sum = self.cfg.velocity_weight
            + self.cfg.acceleration_weight
            + self.cfg.rhythm_weight
            + self.cfg.jerk_weight;
        let score = if weight_sum > f64::EPSILON {
            (velocity_score * self.cfg.velocity_weight
                + acceleration_score * self.cfg.acceleration_weight
                + rhythm_score * self.cfg.rhythm_weight
                + jerk_score * self.cfg.jerk_weight)
                / weight_sum
        } else {
            100.0
        };

        debug!(
            score,
            velocity_score,
            acceleration_score,
            rhythm_score,
            jerk_score,
            spike_count = spike_positions.len(),
            break_count = break_positions.len(),
            "Fluidity analyzed"
        );

        FluiditySummary {
            score: score.clamp(0.0, 100.0),
            velocity_score,
            acceleration_score,
            rhythm_score,
            jerk_score,
            rhythm_break_frames: break_positions
                .into_iter()
                .map(|p| frames[p].absolute_frame_index)
                .collect(),
            acceleration_spike_frames: spike_positions
                .into_iter()
                .map(|p| frames[p].absolute_frame_index)
                .collect(),
        }
    }

    /// Per-frame speed of one joint (normalized units/s); `None` where the
    /// joint was not visible in both frames of the pair
    fn speed_series(&self, frames: &[FrameRecord], joint: Joint) -> Vec<Option<f64>> {
        frames
            .windows(2)
            .map(|pair| {
                match (
                    pair[0].visible_landmark(joint, self.min_visibility),
                    pair[1].visible_landmark(joint, self.min_visibility),
                ) {
                    (Some(a), Some(b)) => Some(a.distance_to(b) * self.fps),
                    _ => None,
                }
            })
            .collect()
    }

    /// Variance-based smoothness with a penalty for abrupt speed changes
    /// above a multiple of the rolling average
    fn velocity_smoothness(&self, speeds: &[Option<f64>], samples: &[f64]) -> f64 {
        let mean = mean_or(samples, 0.0);
        let cv = if mean > f64::EPSILON {
            std_dev(samples) / mean
        } else {
            0.0
        };
        let base = 100.0 * (1.0 - cv.min(1.0));

        let mut spikes = 0usize;
        for t in SPEED_BASELINE_WINDOW..speeds.len() {
            let Some(speed) = speeds[t] else { continue };
            let window: Vec<f64> = speeds[t - SPEED_BASELINE_WINDOW..t]
                .iter()
                .filter_map(|s| *s)
                .collect();
            if window.is_empty() {
                continue;
            }
            let rolling = mean_or(&window, 0.0);
            if rolling > f64::EPSILON && speed > self.cfg.speed_spike_multiplier * rolling {
                spikes += 1;
            }
        }

        (base - 10.0 * spikes as f64).clamp(0.0, 100.0)
    }

    /// Record positions where acceleration exceeds mean + 2 sigma
    fn collect_acceleration_spikes(&self, speeds: &[Option<f64>], out: &mut Vec<usize>) {
        let accels = derivative(speeds, self.fps);
        let samples: Vec<f64> = accels.iter().filter_map(|a| a.map(f64::abs)).collect();
        if samples.len() < MIN_SAMPLES {
            return;
        }
        let mean = mean_or(&samples, 0.0);
        let threshold = (mean + 2.0 * std_dev(&samples)).max(self.cfg.min_spike_magnitude);
        for (t, accel) in accels.iter().enumerate() {
            if let Some(a) = accel {
                if a.abs() > threshold {
                    // accel index t spans frame positions t..t+2; attribute to
                    // the middle frame
                    out.push(t + 1);
                }
            }
        }
    }

    fn collect_jerk(&self, speeds: &[Option<f64>], out: &mut Vec<f64>) {
        let accels = derivative(speeds, self.fps);
        let jerks = derivative(&accels, self.fps);
        out.extend(jerks.into_iter().flatten());
    }

    /// Detect sudden stop/start patterns in vertical wrist motion
    ///
    /// A rhythm break is a run of near-stopped vertical wrist motion
    /// bracketed by active motion on both sides.
    fn rhythm_consistency(&self, frames: &[FrameRecord]) -> (f64, Vec<usize>) {
        let wrist = Joint::wrist(self.shooting_hand);
        let vy: Vec<Option<f64>> = frames
            .windows(2)
            .map(|pair| {
                match (
                    pair[0].visible_landmark(wrist, self.min_visibility),
                    pair[1].visible_landmark(wrist, self.min_visibility),
                ) {
                    (Some(a), Some(b)) => Some((b.y - a.y) * self.fps),
                    _ => None,
                }
            })
            .collect();

        let magnitudes: Vec<f64> = vy.iter().filter_map(|v| v.map(f64::abs)).collect();
        if magnitudes.len() < MIN_SAMPLES {
            return (100.0, Vec::new());
        }
        let peak = magnitudes.iter().cloned().fold(0.0_f64, f64::max);
        if peak < f64::EPSILON {
            return (100.0, Vec::new());
        }

        let stop_level = self.cfg.rhythm_stop_fraction * peak;
        let active_level = self.cfg.rhythm_active_fraction * peak;

        let mut breaks = Vec::new();
        let mut seen_active = false;
        let mut stop_run_start: Option<usize> = None;

        for (t, value) in vy.iter().enumerate() {
            let Some(v) = value else { continue };
            let mag = v.abs();
            if mag >= active_level {
                if let Some(start) = stop_run_start.take() {
                    if seen_active {
                        // Stopped between two active stretches: a break
                        breaks.push(start + 1);
                    }
                }
                seen_active = true;
            } else if mag <= stop_level {
                if stop_run_start.is_none() {
                    stop_run_start = Some(t);
                }
            }
        }

        let score = (100.0 - 35.0 * breaks.len() as f64).clamp(0.0, 100.0);
        (score, breaks)
    }
}

/// Discrete derivative of an optional-valued series, scaled by fps
fn derivative(series: &[Option<f64>], fps: f64) -> Vec<Option<f64>> {
    series
        .windows(2)
        .map(|pair| match (pair[0], pair[1]) {
            (Some(a), Some(b)) => Some((b - a) * fps),
            _ => None,
        })
        .collect()
}

fn mean_or(values: &[f64], default: f64) -> f64 {
    if values.is_empty() {
        default
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean_or(values, 0.0);
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}
