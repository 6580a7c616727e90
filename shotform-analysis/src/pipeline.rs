//! Analysis pipeline
//!
//! Orchestrates one analysis run over a pose-extracted clip:
//!
//! 1. Validate input and build frame records (absolute indices assigned
//!    here, exactly once)
//! 2. Detect the shot start over the untrimmed prefix
//! 3. Trim to the shot window and cap its length
//! 4. Classify the camera angle
//! 5. Compute per-frame joint metrics
//! 6. Segment the window into the three shot phases
//! 7. Analyze motion fluidity
//! 8. Run the flaw detector registry
//! 9. Rank, cap, and assemble the report
//!
//! Trimming slices the record vector; records keep the absolute index they
//! were created with, so no downstream stage ever adds or subtracts an
//! offset.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use shotform_common::{
    AnalysisReport, Error, FrameRecord, Joint, Landmark, LumaPlane, Result,
};
use tracing::info;

use crate::config::AnalysisConfig;
use crate::detectors::DetectorRegistry;
use crate::services::{
    CameraClassifier, FluidityAnalyzer, MetricsCalculator, PhaseSegmenter, ReportBuilder,
    ShotStartDetector,
};

/// One frame of pose-extractor output, as supplied by the caller
///
/// Frame order defines the absolute index; the caller submits frames in
/// decode order and never numbers them itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputFrame {
    #[serde(default)]
    pub landmarks: BTreeMap<Joint, Landmark>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub luma: Option<LumaPlane>,
}

impl InputFrame {
    pub fn new(landmarks: BTreeMap<Joint, Landmark>) -> Self {
        Self {
            landmarks,
            luma: None,
        }
    }
}

/// Runs the full analysis pipeline for one clip
pub struct ShotAnalyzer {
    cfg: AnalysisConfig,
}

impl ShotAnalyzer {
    pub fn new(cfg: AnalysisConfig) -> Result<Self> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    /// Analyze one clip and produce the report
    pub fn analyze(&self, input: Vec<InputFrame>, fps: f64) -> Result<AnalysisReport> {
        if !fps.is_finite() || fps <= 0.0 {
            return Err(Error::InvalidInput(format!("fps must be positive: {}", fps)));
        }
        if input.is_empty() {
            return Err(Error::NoFrames);
        }

        // Stage 1: records with their one-time absolute index
        let records: Vec<FrameRecord> = input
            .into_iter()
            .enumerate()
            .map(|(index, frame)| {
                let mut record = FrameRecord::new(index, frame.landmarks);
                record.luma = frame.luma;
                record
            })
            .collect();

        if !records
            .iter()
            .any(|r| r.has_usable_landmarks(self.cfg.min_visibility))
        {
            return Err(Error::NoUsableLandmarks);
        }
        info!(frames = records.len(), fps, "Analysis started");

        // Stage 2: shot start over the untrimmed prefix
        let start =
            ShotStartDetector::new(self.cfg.shot_start.clone(), self.cfg.min_visibility, fps)
                .detect(&records);
        info!(
            start_frame = start.start_frame,
            method = start.method.as_str(),
            confidence = start.confidence,
            "Shot start resolved"
        );

        // Stage 3: trim by slicing; indices are never rewritten
        let start_pos = records
            .iter()
            .position(|r| r.absolute_frame_index == start.start_frame)
            .unwrap_or(0);
        let end_pos = (start_pos + self.cfg.max_frames).min(records.len());
        let mut window: Vec<FrameRecord> = records[start_pos..end_pos].to_vec();
        if window.len() < 3 {
            return Err(Error::InvalidInput(format!(
                "Shot window of {} frames is too short to analyze",
                window.len()
            )));
        }
        info!(
            window_start = window[0].absolute_frame_index,
            window_len = window.len(),
            "Shot window trimmed"
        );

        // Stage 4: camera context, computed once, read-only afterward
        let camera = CameraClassifier::new(self.cfg.min_visibility, self.cfg.shooting_hand)
            .classify(&window);
        info!(
            angle = camera.angle.as_str(),
            confidence = camera.confidence,
            features = camera.visible_features.len(),
            "Camera angle classified"
        );

        // Stage 5: per-frame metrics
        let calculator = MetricsCalculator::new(self.cfg.min_visibility, self.cfg.shooting_hand);
        for record in &mut window {
            record.metrics = calculator.compute(&record.landmarks);
        }

        // Stage 6: phase segmentation
        let phases = PhaseSegmenter::new(self.cfg.segmenter.clone(), fps).segment(&window)?;

        // Stage 7: fluidity
        let fluidity = FluidityAnalyzer::new(
            self.cfg.fluidity.clone(),
            self.cfg.min_visibility,
            self.cfg.shooting_hand,
            fps,
        )
        .analyze(&window);
        info!(score = fluidity.score, "Fluidity analyzed");

        // Stage 8: flaw detection
        let registry = DetectorRegistry::from_config(&self.cfg.detectors);
        let candidates = registry.run(&window, &phases, &camera, &fluidity);
        info!(
            detectors = registry.len(),
            confirmed = candidates.len(),
            "Flaw detectors finished"
        );

        // Stage 9: final report
        let report = ReportBuilder::new(self.cfg.max_reported_flaws).build(
            start,
            camera,
            phases.to_vec(),
            candidates,
            fluidity,
        );
        info!(flaws = report.flaws.len(), "Analysis complete");

        Ok(report)
    }
}
