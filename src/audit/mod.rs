pub mod ballot_polling;
pub mod batch_comparison;

use crate::config::AuditType;
use crate::error::{DataConsistencyError, VerifyError};
use crate::models::{BatchId, Counts, RecountSample};
use crate::voting::Assertion;
use batch_comparison::ErrorBounds;
use std::collections::BTreeMap;

/// Converts an accumulated test statistic into a risk in `[0, 1]`.
pub fn risk_from_statistic(t: f64) -> f64 {
    if t.is_nan() || t <= 0.0 {
        return 1.0;
    }
    (1.0 / t).min(1.0)
}

/// The statistical test selected for a run.
#[derive(Debug, Clone, Copy)]
pub enum StatisticalTest<'a> {
    BallotPolling,
    BatchComparison {
        reported: &'a BTreeMap<BatchId, Counts>,
        /// Computed while evaluating the contest; `None` computes them here.
        bounds: Option<&'a ErrorBounds>,
        escalation: f64,
    },
}

impl StatisticalTest<'_> {
    pub fn audit_type(&self) -> AuditType {
        match self {
            StatisticalTest::BallotPolling => AuditType::BallotPolling,
            StatisticalTest::BatchComparison { .. } => AuditType::BatchComparison,
        }
    }

    /// Risk that the reported outcome is wrong given the sample, for the
    /// assertions of one contest.
    pub fn achieved_risk(
        &self,
        assertions: &[Assertion],
        sample: &RecountSample,
        risk_limit: f64,
    ) -> Result<f64, VerifyError> {
        match (self, sample) {
            (StatisticalTest::BallotPolling, RecountSample::BallotPolling { ballots }) => {
                Ok(ballot_polling::achieved_risk(assertions, ballots, risk_limit))
            }
            (
                StatisticalTest::BatchComparison { reported, bounds, escalation },
                RecountSample::BatchComparison { batches },
            ) => match bounds {
                Some(bounds) => batch_comparison::risk_within_bounds(assertions, bounds, reported, batches, *escalation),
                None => batch_comparison::achieved_risk(assertions, reported, batches, *escalation),
            },
            _ => Err(DataConsistencyError::SampleKind {
                expected: self.audit_type().to_string(),
                found: sample.kind().to_string(),
            }
            .into()),
        }
    }
}
