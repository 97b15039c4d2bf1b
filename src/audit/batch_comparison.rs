use crate::audit::risk_from_statistic;
use crate::error::{DataConsistencyError, DegenerateMarginError, VerifyError};
use crate::models::{BatchId, BatchObservation, Counts};
use crate::voting::Assertion;
use log::debug;
use std::collections::BTreeMap;

/// Error bounds derived from the reported results before any batch is examined.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorBounds {
    /// Largest relative overstatement a single ballot can cause.
    pub per_ballot: f64,
    /// Bound for one batch: `per_ballot` times the largest batch size.
    pub per_batch: f64,
    /// Bound for the whole contest: `per_batch` times the number of batches.
    pub total: f64,
}

impl ErrorBounds {
    pub fn new(assertions: &[Assertion], reported: &BTreeMap<BatchId, Counts>) -> Result<Self, DegenerateMarginError> {
        let per_ballot = assertions
            .iter()
            .map(|a| (a.winner_weight + a.opponent_weight) / a.weighted_margin())
            .fold(0.0_f64, f64::max);
        let largest_batch = reported
            .values()
            .map(|counts| counts.values().sum::<u64>())
            .max()
            .unwrap_or(0);
        let per_batch = per_ballot * largest_batch as f64;
        let total = per_batch * reported.len() as f64;
        if !(total > 1.0) {
            return Err(DegenerateMarginError::ErrorBound { bound: total });
        }
        Ok(Self { per_ballot, per_batch, total })
    }
}

/// Maximum across-contest relative overstatement of one batch: how much of the
/// weighted margin of the tightest assertion the reporting errors ate, floored at 0.
pub fn micro(assertions: &[Assertion], reported: &Counts, recounted: &Counts) -> f64 {
    assertions
        .iter()
        .map(|a| {
            let winner_error = a.winner_count(reported) as f64 - a.winner_count(recounted) as f64;
            let opponent_error = a.opponent_count(reported) as f64 - a.opponent_count(recounted) as f64;
            (a.winner_weight * winner_error - a.opponent_weight * opponent_error) / a.weighted_margin()
        })
        .fold(0.0_f64, f64::max)
}

/// Multiplicative update for one draw of a batch with the given taint.
pub fn update_factor(taint: f64, total_bound: f64, escalation: f64) -> f64 {
    let factor = escalation * (1.0 - taint) / (1.0 - 1.0 / total_bound) + 1.0 - escalation;
    factor.max(0.0)
}

/// Achieved risk after all sampled batches, `1 / β` capped at 1.
pub fn achieved_risk(
    assertions: &[Assertion],
    reported: &BTreeMap<BatchId, Counts>,
    sampled: &[BatchObservation],
    escalation: f64,
) -> Result<f64, VerifyError> {
    if assertions.is_empty() {
        return Ok(1.0);
    }
    let bounds = ErrorBounds::new(assertions, reported)?;
    risk_within_bounds(assertions, &bounds, reported, sampled, escalation)
}

/// Same as [`achieved_risk`] with bounds computed ahead of time.
pub fn risk_within_bounds(
    assertions: &[Assertion],
    bounds: &ErrorBounds,
    reported: &BTreeMap<BatchId, Counts>,
    sampled: &[BatchObservation],
    escalation: f64,
) -> Result<f64, VerifyError> {
    if assertions.is_empty() {
        return Ok(1.0);
    }
    debug!(
        "error bounds: per ballot {:.6}, per batch {:.6}, total {:.6}",
        bounds.per_ballot, bounds.per_batch, bounds.total
    );

    let mut beta = 1.0_f64;
    for observation in sampled {
        let batch_report = reported
            .get(&observation.batch)
            .ok_or(DataConsistencyError::UnknownBatch { batch: observation.batch })?;
        let taint = micro(assertions, batch_report, &observation.recounted) / bounds.per_batch;
        let factor = update_factor(taint, bounds.total, escalation);
        // drawn with replacement, each draw counts
        beta *= factor.powf(f64::from(observation.times_drawn));
        debug!(
            "batch {} drawn {}x: taint {:.6}, factor {:.6}, beta {:.6}",
            observation.batch, observation.times_drawn, taint, factor, beta
        );
    }
    Ok(risk_from_statistic(beta))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Candidate, Tally};
    use crate::voting::plurality;

    fn counts(pairs: &[(&str, u64)]) -> Counts {
        pairs.iter().map(|(c, v)| (Candidate::from(*c), *v)).collect()
    }

    fn reported_batches() -> BTreeMap<BatchId, Counts> {
        (1..=10).map(|id| (id, counts(&[("A", 60), ("B", 40)]))).collect()
    }

    fn assertions() -> Vec<Assertion> {
        plurality::evaluate(&Tally::new([("A", 600), ("B", 400)]), 1).unwrap().assertions
    }

    #[test]
    fn test_bounds() {
        let bounds = ErrorBounds::new(&assertions(), &reported_batches()).unwrap();
        assert!((bounds.per_ballot - 0.01).abs() < 1e-12);
        assert!((bounds.per_batch - 1.0).abs() < 1e-12);
        assert!((bounds.total - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_clean_batches_accumulate_evidence() {
        let sample: Vec<BatchObservation> = (1..=4)
            .map(|id| BatchObservation::new(id, counts(&[("A", 60), ("B", 40)])))
            .collect();
        let risk = achieved_risk(&assertions(), &reported_batches(), &sample, 0.95).unwrap();
        let factor: f64 = 0.95 / 0.9 + 0.05;
        assert!((risk - 1.0 / factor.powi(4)).abs() < 1e-12);
    }

    #[test]
    fn test_times_drawn_raises_the_factor() {
        let once = vec![BatchObservation::new(3, counts(&[("A", 60), ("B", 40)])).drawn(3)];
        let thrice: Vec<BatchObservation> =
            vec![BatchObservation::new(3, counts(&[("A", 60), ("B", 40)])); 3];
        let a = achieved_risk(&assertions(), &reported_batches(), &once, 0.95).unwrap();
        let b = achieved_risk(&assertions(), &reported_batches(), &thrice, 0.95).unwrap();
        assert!((a - b).abs() < 1e-12);
    }

    #[test]
    fn test_overstatement_taints_the_batch() {
        // Ten votes moved from B to A in the report: micro = (10 + 10) / 200 = 0.1
        let reported = counts(&[("A", 60), ("B", 40)]);
        let recounted = counts(&[("A", 50), ("B", 50)]);
        assert!((micro(&assertions(), &reported, &recounted) - 0.1).abs() < 1e-12);
        // Understatements never count against the winner.
        assert_eq!(micro(&assertions(), &recounted, &reported), 0.0);
    }

    #[test]
    fn test_wholesale_flip_drives_risk_to_one() {
        let sample = vec![BatchObservation::new(1, counts(&[("A", 0), ("B", 100)]))];
        let risk = achieved_risk(&assertions(), &reported_batches(), &sample, 0.95).unwrap();
        assert_eq!(risk, 1.0);
    }

    #[test]
    fn test_bounds_need_reported_batches() {
        let err = ErrorBounds::new(&assertions(), &BTreeMap::new()).unwrap_err();
        assert_eq!(err, DegenerateMarginError::ErrorBound { bound: 0.0 });
    }

    #[test]
    fn test_huge_draw_counts_do_not_wrap() {
        // a wrapped exponent would turn the clean factor into a tiny number
        let sample = vec![BatchObservation::new(2, counts(&[("A", 60), ("B", 40)])).drawn(u32::MAX)];
        let risk = achieved_risk(&assertions(), &reported_batches(), &sample, 0.95).unwrap();
        assert_eq!(risk, 0.0);
    }

    #[test]
    fn test_precomputed_bounds_match() {
        let sample = vec![BatchObservation::new(5, counts(&[("A", 55), ("B", 45)]))];
        let bounds = ErrorBounds::new(&assertions(), &reported_batches()).unwrap();
        let direct = achieved_risk(&assertions(), &reported_batches(), &sample, 0.95).unwrap();
        let within = risk_within_bounds(&assertions(), &bounds, &reported_batches(), &sample, 0.95).unwrap();
        assert_eq!(direct.to_bits(), within.to_bits());
    }

    #[test]
    fn test_unknown_batch() {
        let sample = vec![BatchObservation::new(99, counts(&[("A", 60), ("B", 40)]))];
        let err = achieved_risk(&assertions(), &reported_batches(), &sample, 0.95).unwrap_err();
        assert_eq!(
            err,
            VerifyError::DataConsistency(DataConsistencyError::UnknownBatch { batch: 99 })
        );
    }
}
