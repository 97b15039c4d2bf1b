use crate::audit::risk_from_statistic;
use crate::models::BallotObservation;
use crate::voting::{Assertion, Side};
use log::debug;

/// Likelihood ratios applied to `T` for a ballot supporting each side.
///
/// Under the null the winner holds exactly `b / (a + b)` of the two-way vote;
/// under the alternative it holds its reported share `s`.
pub fn update_factors(assertion: &Assertion) -> (f64, f64) {
    let a = assertion.winner_weight;
    let b = assertion.opponent_weight;
    let share = assertion.reported_share();
    (share * (a + b) / b, (1.0 - share) * (a + b) / a)
}

/// Sequential probability ratio statistic for one assertion, processed in draw
/// order. Returns `T` and the 1-based draw at which `T` first reached
/// `1 / risk_limit`, if it did.
pub fn statistic(assertion: &Assertion, ballots: &[BallotObservation], risk_limit: f64) -> (f64, Option<usize>) {
    let (for_winner, for_opponent) = update_factors(assertion);
    let target = 1.0 / risk_limit;
    let mut t = 1.0_f64;
    let mut reached = None;

    for (draw, ballot) in ballots.iter().enumerate() {
        let candidate = match ballot {
            BallotObservation::Vote(candidate) => candidate,
            // Blank ballots say nothing about either side
            BallotObservation::Invalid => continue,
        };
        match assertion.side_of(candidate) {
            Some(Side::Winner) => t *= for_winner,
            Some(Side::Opponent) => t *= for_opponent,
            None => continue,
        }
        // Keep going past the limit; later ballots still count
        if reached.is_none() && t >= target {
            reached = Some(draw + 1);
        }
    }
    (t, reached)
}

/// Achieved risk over all assertions: the largest `1 / T`, capped at 1.
/// Without assertions there is nothing to reject and the risk stays 1.
pub fn achieved_risk(assertions: &[Assertion], ballots: &[BallotObservation], risk_limit: f64) -> f64 {
    if assertions.is_empty() {
        return 1.0;
    }
    let mut worst = 0.0_f64;
    for assertion in assertions {
        let (t, reached) = statistic(assertion, ballots, risk_limit);
        let risk = risk_from_statistic(t);
        match reached {
            Some(draw) => debug!(
                "{} vs {}: T = {:.6}, risk {:.6} (limit reached at draw {})",
                assertion.winner, assertion.opponent, t, risk, draw
            ),
            None => debug!(
                "{} vs {}: T = {:.6}, risk {:.6} (limit not reached)",
                assertion.winner, assertion.opponent, t, risk
            ),
        }
        worst = worst.max(risk);
    }
    worst
}
