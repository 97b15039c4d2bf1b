use crate::error::VerifyError;
use crate::models::Tally;
use crate::voting::{check_contest, Assertion, Opponent, Outcome, Shortfall};
use log::debug;
use std::collections::BTreeMap;

/// The leading candidate wins only if its share of the valid votes reaches
/// `threshold`. Falling short yields an outcome without winners.
pub fn evaluate(tally: &Tally, threshold: f64) -> Result<Outcome, VerifyError> {
    check_contest(tally, 1, tally.len())?;

    let ranked = tally.ranked();
    let (leader, votes) = ranked[0];
    let valid = tally.total_votes();
    let share = votes as f64 / valid as f64;

    if share < threshold {
        debug!(
            "supermajority not reached: {} holds {:.6} of the valid votes, needs {:.6}",
            leader, share, threshold
        );
        return Ok(Outcome::undecided(Shortfall {
            leader: leader.clone(),
            share,
            threshold,
        }));
    }

    // (1 - t)·V(w) > t·V(rest) is the same as V(w) > t·valid
    let assertion = Assertion {
        winner: leader.clone(),
        opponent: Opponent::Field,
        winner_weight: 1.0 - threshold,
        opponent_weight: threshold,
        winner_votes: votes,
        opponent_votes: valid - votes,
        diluted_margin: (votes as f64 - threshold * valid as f64) / tally.ballots_cast() as f64,
    };

    let outcome = Outcome::decided(
        vec![leader.clone()],
        BTreeMap::from([(leader.clone(), 1)]),
        vec![assertion],
    )?;
    debug!(
        "supermajority winner {}, diluted margin {:.6}",
        leader, outcome.diluted_margin
    );
    Ok(outcome)
}
