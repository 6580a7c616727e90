//! Report assembly
//!
//! Ranks confirmed flaw candidates and assembles the final
//! `AnalysisReport`. All frame indices arriving here are already absolute;
//! assembly is pure bookkeeping and performs no index arithmetic.

use shotform_common::{
    AnalysisReport, CameraContext, FlawCandidate, FluiditySummary, ShotPhase,
};
use tracing::debug;

use crate::services::shot_start::StartEstimate;

/// Assembles the final report from the pipeline's intermediate products
pub struct ReportBuilder {
    max_reported_flaws: usize,
}

impl ReportBuilder {
    pub fn new(max_reported_flaws: usize) -> Self {
        Self { max_reported_flaws }
    }

    /// Rank candidates severity-descending, cap, and assemble the report
    ///
    /// Ties break on the flaw tag so identical inputs always order
    /// identically.
    pub fn build(
        &self,
        start: StartEstimate,
        camera: CameraContext,
        phases: Vec<ShotPhase>,
        mut flaws: Vec<FlawCandidate>,
        fluidity: FluiditySummary,
    ) -> AnalysisReport {
        flaws.sort_by(|a, b| {
            b.severity
                .total_cmp(&a.severity)
                .then_with(|| a.flaw.cmp(&b.flaw))
        });
        if flaws.len() > self.max_reported_flaws {
            debug!(
                confirmed = flaws.len(),
                reported = self.max_reported_flaws,
                "Capping reported flaws to the most severe"
            );
            flaws.truncate(self.max_reported_flaws);
        }

        AnalysisReport {
            shot_start_frame: start.start_frame,
            start_method: start.method,
            start_confidence: start.confidence,
            camera,
            phases,
            flaws,
            fluidity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shotform_common::{FlawType, StartMethod};

    fn candidate(flaw: FlawType, severity: f64) -> FlawCandidate {
        FlawCandidate {
            flaw,
            severity,
            evidence_frame_count: 5,
            required_frame_count: 3,
            representative_frame: 42,
            camera_context: CameraContext::unknown(),
            description: String::new(),
            coaching_tip: String::new(),
        }
    }

    fn start() -> StartEstimate {
        StartEstimate {
            start_frame: 30,
            confidence: 0.8,
            method: StartMethod::Landmark,
        }
    }

    #[test]
    fn test_flaws_sorted_by_severity_and_capped() {
        let flaws = vec![
            candidate(FlawType::PoorWristSnap, 20.0),
            candidate(FlawType::ElbowFlare, 45.0),
            candidate(FlawType::ShoulderMisalignment, 30.0),
            candidate(FlawType::GuideHandInterference, 25.0),
            candidate(FlawType::InsufficientKneeBend, 10.0),
        ];

        let report = ReportBuilder::new(4).build(
            start(),
            CameraContext::unknown(),
            Vec::new(),
            flaws,
            FluiditySummary::neutral(),
        );

        assert_eq!(report.flaws.len(), 4);
        assert_eq!(report.flaws[0].flaw, FlawType::ElbowFlare);
        assert_eq!(report.flaws[1].flaw, FlawType::ShoulderMisalignment);
        assert!(report
            .flaws
            .iter()
            .all(|f| f.flaw != FlawType::InsufficientKneeBend));
        assert_eq!(report.shot_start_frame, 30);
        assert_eq!(report.start_method, StartMethod::Landmark);
    }

    #[test]
    fn test_equal_severities_order_deterministically() {
        let forward = vec![
            candidate(FlawType::PoorWristSnap, 30.0),
            candidate(FlawType::ElbowFlare, 30.0),
        ];
        let reversed = vec![
            candidate(FlawType::ElbowFlare, 30.0),
            candidate(FlawType::PoorWristSnap, 30.0),
        ];

        let build = |flaws| {
            ReportBuilder::new(4).build(
                start(),
                CameraContext::unknown(),
                Vec::new(),
                flaws,
                FluiditySummary::neutral(),
            )
        };

        let a = build(forward);
        let b = build(reversed);
        assert_eq!(a.flaws, b.flaws);
        assert_eq!(a.flaws[0].flaw, FlawType::ElbowFlare);
    }

    #[test]
    fn test_no_flaws_is_a_valid_report() {
        let report = ReportBuilder::new(4).build(
            start(),
            CameraContext::unknown(),
            Vec::new(),
            Vec::new(),
            FluiditySummary::neutral(),
        );
        assert!(report.flaws.is_empty());
    }
}
