//! Shot phase segmentation
//!
//! Splits the trimmed shot window into the three named phases
//! (`load_dip` -> `release` -> `follow_through`), strictly ordered,
//! non-overlapping, and covering every frame of the window. Each phase also
//! records its key moment frame: the single most representative instant,
//! which downstream detectors anchor their evaluation windows to.
//!
//! The segmenter always produces three phases. When landmark coverage is too
//! degraded for the kinematic heuristics it falls back to proportional
//! boundaries rather than failing; approximate boundaries are a local
//! degradation, not a pipeline error.

use shotform_common::{Error, FrameRecord, PhaseName, Result, ShotPhase};
use tracing::debug;

use crate::config::SegmenterConfig;

/// Segments the metric stream into the three shot phases
pub struct PhaseSegmenter {
    cfg: SegmenterConfig,
    fps: f64,
}

impl PhaseSegmenter {
    pub fn new(cfg: SegmenterConfig, fps: f64) -> Self {
        Self { cfg, fps }
    }

    /// Segment the trimmed window into load_dip, release, follow_through
    ///
    /// Requires at least three frames so each phase can own one.
    pub fn segment(&self, frames: &[FrameRecord]) -> Result<[ShotPhase; 3]> {
        let n = frames.len();
        if n < 3 {
            return Err(Error::InvalidInput(format!(
                "Cannot segment a {}-frame window into three phases",
                n
            )));
        }

        let dip_pos = self.deepest_knee_bend(frames);
        let wrist_heights: Vec<Option<f64>> =
            frames.iter().map(|f| f.metrics.wrist_height).collect();

        let (release_start, ft_start) = match (dip_pos, self.has_wrist_track(&wrist_heights)) {
            (Some(dip), true) => {
                // A dip on the second-to-last frame would invert the bounds
                let hi = n - 2;
                let lo = (dip + 1).min(hi);
                let release_start = self
                    .max_upward_wrist_acceleration(&wrist_heights, dip)
                    .unwrap_or(lo)
                    .clamp(lo, hi);
                let peak = self
                    .peak_wrist_height(&wrist_heights, release_start)
                    .unwrap_or(release_start);
                let delay = ((self.cfg.follow_through_delay_sec * self.fps).round() as usize).max(2);
                let ft_start = (peak + delay).clamp(release_start + 1, n - 1);
                (release_start, ft_start)
            }
            _ => {
                debug!("Degraded landmark coverage, using proportional phase boundaries");
                ((n / 3).max(1), (2 * n / 3).max(n / 3 + 1).min(n - 1))
            }
        };

        let load_key = dip_pos
            .filter(|&p| p < release_start)
            .unwrap_or(release_start / 2);
        let release_key = self
            .peak_elbow_extension(frames, release_start, ft_start)
            .unwrap_or((release_start + ft_start) / 2);
        let ft_key = self
            .peak_wrist_flexion(frames, ft_start)
            .unwrap_or((ft_start + n - 1) / 2);

        let abs = |pos: usize| frames[pos].absolute_frame_index;
        let phases = [
            ShotPhase {
                name: PhaseName::LoadDip,
                start_frame: abs(0),
                end_frame: abs(release_start - 1),
                key_moment_frame: abs(load_key),
            },
            ShotPhase {
                name: PhaseName::Release,
                start_frame: abs(release_start),
                end_frame: abs(ft_start - 1),
                key_moment_frame: abs(release_key),
            },
            ShotPhase {
                name: PhaseName::FollowThrough,
                start_frame: abs(ft_start),
                end_frame: abs(n - 1),
                key_moment_frame: abs(ft_key),
            },
        ];

        debug!(
            load_dip_end = phases[0].end_frame,
            release_end = phases[1].end_frame,
            follow_through_end = phases[2].end_frame,
            "Shot phases segmented"
        );

        Ok(phases)
    }

    /// Position of the minimum knee angle in the first two thirds of the
    /// window (the dip precedes the release by definition)
    fn deepest_knee_bend(&self, frames: &[FrameRecord]) -> Option<usize> {
        let search_end = (2 * frames.len() / 3).max(1);
        frames[..search_end]
            .iter()
            .enumerate()
            .filter_map(|(i, f)| f.metrics.knee_angle.map(|a| (i, a)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
    }

    fn has_wrist_track(&self, heights: &[Option<f64>]) -> bool {
        let present = heights.iter().filter(|h| h.is_some()).count();
        present * 2 >= heights.len()
    }

    /// Frame of maximal upward wrist acceleration after the deepest bend
    fn max_upward_wrist_acceleration(
        &self,
        heights: &[Option<f64>],
        after: usize,
    ) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        // accel at t needs heights at t-1, t, t+1
        for t in (after + 1)..heights.len().saturating_sub(1) {
            if let (Some(prev), Some(curr), Some(next)) =
                (heights[t - 1], heights[t], heights[t + 1])
            {
                let accel = ((next - curr) - (curr - prev)) * self.fps * self.fps;
                if best.map_or(true, |(_, b)| accel > b) {
                    best = Some((t, accel));
                }
            }
        }
        best.map(|(t, _)| t)
    }

    fn peak_wrist_height(&self, heights: &[Option<f64>], from: usize) -> Option<usize> {
        heights
            .iter()
            .enumerate()
            .skip(from)
            .filter_map(|(i, h)| h.map(|v| (i, v)))
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
    }

    fn peak_elbow_extension(
        &self,
        frames: &[FrameRecord],
        from: usize,
        to: usize,
    ) -> Option<usize> {
        frames[from..to]
            .iter()
            .enumerate()
            .filter_map(|(i, f)| f.metrics.elbow_angle.map(|a| (from + i, a)))
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
    }

    fn peak_wrist_flexion(&self, frames: &[FrameRecord], from: usize) -> Option<usize> {
        frames[from..]
            .iter()
            .enumerate()
            .filter_map(|(i, f)| f.metrics.wrist_angle.map(|a| (from + i, a)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
    }
}
