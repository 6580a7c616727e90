//! Shot start detection
//!
//! Scans a bounded prefix of the untrimmed clip with three independent
//! estimators and picks the most confident one. When nothing clears its
//! confidence floor the clip is assumed to be pre-trimmed and the start
//! defaults to frame 0; that is a valid outcome, not an error.
//!
//! All returned frame numbers are absolute indices read straight off the
//! scanned records.

use shotform_common::{FrameRecord, Joint, StartMethod};
use tracing::debug;

use crate::config::ShotStartConfig;

/// Baseline activity below this is treated as a still camera on a still
/// subject; triggers compare against at least this much background motion
const MIN_BASELINE: f64 = 1e-3;

/// Pixel-difference baseline floor (mean luma levels, 0-255 scale)
const MIN_PIXEL_BASELINE: f64 = 0.25;

/// Result of shot start detection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StartEstimate {
    /// Absolute frame where shooting motion begins
    pub start_frame: usize,
    /// Confidence of the winning estimator (0.0 when defaulted)
    pub confidence: f64,
    /// Which estimator produced the start frame
    pub method: StartMethod,
}

impl StartEstimate {
    /// The clip is assumed already trimmed to the shot
    fn default_start(first_frame: usize) -> Self {
        Self {
            start_frame: first_frame,
            confidence: 0.0,
            method: StartMethod::Default,
        }
    }
}

/// Multi-method shot start detector
pub struct ShotStartDetector {
    cfg: ShotStartConfig,
    min_visibility: f64,
    fps: f64,
}

impl ShotStartDetector {
    pub fn new(cfg: ShotStartConfig, min_visibility: f64, fps: f64) -> Self {
        Self {
            cfg,
            min_visibility,
            fps,
        }
    }

    /// Detect the frame where shooting motion begins
    pub fn detect(&self, frames: &[FrameRecord]) -> StartEstimate {
        if frames.len() < 2 {
            return StartEstimate::default_start(
                frames.first().map(|f| f.absolute_frame_index).unwrap_or(0),
            );
        }
        let scan = &frames[..frames.len().min(self.cfg.scan_frame_cap)];

        let candidates = [
            self.landmark_estimate(scan),
            self.optical_estimate(scan),
            self.pixel_estimate(scan),
        ];

        let best = candidates
            .into_iter()
            .flatten()
            .max_by(|a, b| a.confidence.total_cmp(&b.confidence));

        match best {
            Some(estimate) => {
                debug!(
                    start_frame = estimate.start_frame,
                    confidence = estimate.confidence,
                    method = estimate.method.as_str(),
                    "Shot start detected"
                );
                estimate
            }
            None => {
                debug!("No estimator cleared its confidence floor, defaulting to clip start");
                StartEstimate::default_start(scan[0].absolute_frame_index)
            }
        }
    }

    /// Estimator 1: wrist/knee vertical velocity onset from pose landmarks
    fn landmark_estimate(&self, scan: &[FrameRecord]) -> Option<StartEstimate> {
        // Landmarks must actually be trustworthy over the scan window
        let mean_visibility: f64 =
            scan.iter().map(|f| f.mean_visibility()).sum::<f64>() / scan.len() as f64;
        if mean_visibility < self.min_visibility {
            return None;
        }

        let joints = [
            Joint::LeftWrist,
            Joint::RightWrist,
            Joint::LeftKnee,
            Joint::RightKnee,
        ];

        let activity: Vec<f64> = scan
            .windows(2)
            .map(|pair| {
                let mut total = 0.0;
                let mut counted = 0usize;
                for joint in joints {
                    if let (Some(prev), Some(curr)) = (
                        pair[0].visible_landmark(joint, self.min_visibility),
                        pair[1].visible_landmark(joint, self.min_visibility),
                    ) {
                        total += (curr.y - prev.y).abs() * self.fps;
                        counted += 1;
                    }
                }
                if counted > 0 {
                    total / counted as f64
                } else {
                    0.0
                }
            })
            .collect();

        self.trigger(
            scan,
            &activity,
            self.cfg.lookback_sec,
            MIN_BASELINE,
            |ratio| (0.5 * ratio).min(1.0),
            self.cfg.landmark_confidence_floor,
            StartMethod::Landmark,
        )
    }

    /// Estimator 2: sparse motion magnitude across all visible landmarks
    fn optical_estimate(&self, scan: &[FrameRecord]) -> Option<StartEstimate> {
        let motion: Vec<f64> = scan
            .windows(2)
            .map(|pair| {
                let mut total = 0.0;
                let mut counted = 0usize;
                for (joint, prev) in &pair[0].landmarks {
                    if prev.visibility < self.min_visibility {
                        continue;
                    }
                    if let Some(curr) = pair[1].visible_landmark(*joint, self.min_visibility) {
                        total += prev.distance_to(curr) * self.fps;
                        counted += 1;
                    }
                }
                if counted > 0 {
                    total / counted as f64
                } else {
                    0.0
                }
            })
            .collect();

        self.trigger(
            scan,
            &motion,
            self.cfg.lookback_sec,
            MIN_BASELINE,
            |ratio| (0.35 * ratio).min(0.7),
            self.cfg.optical_confidence_floor,
            StartMethod::OpticalMotion,
        )
    }

    /// Estimator 3: pixel-level luma difference, the universal fallback when
    /// no reliable landmarks exist
    fn pixel_estimate(&self, scan: &[FrameRecord]) -> Option<StartEstimate> {
        if scan.iter().all(|f| f.luma.is_none()) {
            return None;
        }

        let diffs: Vec<f64> = scan
            .windows(2)
            .map(|pair| match (&pair[0].luma, &pair[1].luma) {
                (Some(a), Some(b)) => a.mean_abs_diff(b).unwrap_or(0.0),
                _ => 0.0,
            })
            .collect();

        self.trigger(
            scan,
            &diffs,
            self.cfg.pixel_lookback_sec,
            MIN_PIXEL_BASELINE,
            |ratio| (0.4 + 0.2 * (ratio - 1.0)).clamp(0.4, 0.8),
            self.cfg.pixel_confidence_floor,
            StartMethod::FrameDifference,
        )
    }

    /// Shared trigger scan: flag the first signal value exceeding a multiple
    /// of its rolling baseline, then look back a fixed time window to capture
    /// motion onset.
    #[allow(clippy::too_many_arguments)]
    fn trigger(
        &self,
        scan: &[FrameRecord],
        signal: &[f64],
        lookback_sec: f64,
        baseline_floor: f64,
        confidence_fn: impl Fn(f64) -> f64,
        confidence_floor: f64,
        method: StartMethod,
    ) -> Option<StartEstimate> {
        let window = self.cfg.baseline_window;
        if signal.len() <= window {
            return None;
        }

        for t in window..signal.len() {
            let baseline = (signal[t - window..t].iter().sum::<f64>() / window as f64)
                .max(baseline_floor);
            let ratio = signal[t] / (self.cfg.activity_multiplier * baseline);
            if ratio >= 1.0 {
                let confidence = confidence_fn(ratio);
                if confidence < confidence_floor {
                    // Too weak to accept, keep scanning for a stronger onset
                    continue;
                }
                let lookback_frames = (lookback_sec * self.fps).round() as usize;
                // signal[t] spans scan frames t..t+1
                let flagged = t + 1;
                let start_pos = flagged.saturating_sub(lookback_frames);
                return Some(StartEstimate {
                    start_frame: scan[start_pos].absolute_frame_index,
                    confidence,
                    method,
                });
            }
        }
        None
    }
}
