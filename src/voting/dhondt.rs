use crate::error::VerifyError;
use crate::models::{Party, Tally};
use crate::voting::{check_contest, Assertion, Opponent, Outcome};
use log::debug;
use std::cmp::Ordering;
use std::collections::BTreeMap;

// One entry of the quotient table: votes / (seat + 1)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quotient {
    pub party: Party,
    /// Zero-based seat index within the party.
    pub seat: usize,
    pub votes: u64,
}

impl Quotient {
    pub fn divisor(&self) -> u64 {
        self.seat as u64 + 1
    }

    pub fn value(&self) -> f64 {
        self.votes as f64 / self.divisor() as f64
    }

    /// Highest quotient first, compared exactly. Ties go to the lower party
    /// identifier, then to the earlier seat.
    fn allocation_order(&self, other: &Self) -> Ordering {
        let lhs = self.votes as u128 * other.divisor() as u128;
        let rhs = other.votes as u128 * self.divisor() as u128;
        rhs.cmp(&lhs)
            .then_with(|| self.party.cmp(&other.party))
            .then_with(|| self.seat.cmp(&other.seat))
    }
}

/// Quotient table in allocation order. `caps` limits how many seats a party
/// can take (list length); parties without a cap may take every seat.
pub fn quotients(tally: &Tally, seats: usize, caps: Option<&BTreeMap<Party, usize>>) -> Vec<Quotient> {
    let mut table = Vec::new();
    for (party, votes) in tally.counts() {
        let cap = caps.and_then(|c| c.get(party).copied()).unwrap_or(seats).min(seats);
        for seat in 0..cap {
            table.push(Quotient { party: party.clone(), seat, votes: *votes });
        }
    }
    table.sort_by(Quotient::allocation_order);
    table
}

/// Allocates `seats` by highest quotient. Parties with at least one seat win.
pub fn evaluate(tally: &Tally, seats: usize, caps: Option<&BTreeMap<Party, usize>>) -> Result<Outcome, VerifyError> {
    let capacity = match caps {
        Some(caps) => tally
            .candidates()
            .map(|p| caps.get(p).copied().unwrap_or(0).min(seats))
            .sum(),
        None => seats.saturating_mul(tally.len()),
    };
    check_contest(tally, seats, capacity)?;

    // Seats go to the highest quotients; everything below the cut is lost
    let table = quotients(tally, seats, caps);
    let (won, lost) = table.split_at(seats);

    // Count seats per party and remember the weakest seat each one took
    let mut allocation: BTreeMap<Party, u32> = BTreeMap::new();
    let mut last_won: BTreeMap<&Party, &Quotient> = BTreeMap::new();
    for q in won {
        *allocation.entry(q.party.clone()).or_insert(0) += 1;
        last_won.insert(&q.party, q);
    }

    // Strongest quotient each party missed
    let mut first_lost: BTreeMap<&Party, &Quotient> = BTreeMap::new();
    for q in lost {
        first_lost.entry(&q.party).or_insert(q);
    }

    // The last seat each winning party took must beat the first seat each
    // other party missed.
    let ballots_cast = tally.ballots_cast() as f64;
    let mut assertions = Vec::new();
    for (&winner, w) in &last_won {
        for (&loser, l) in &first_lost {
            // A party never competes with itself
            if winner == loser {
                continue;
            }
            assertions.push(Assertion {
                winner: winner.clone(),
                opponent: Opponent::Candidate(loser.clone()),
                winner_weight: l.divisor() as f64,
                opponent_weight: w.divisor() as f64,
                winner_votes: w.votes,
                opponent_votes: l.votes,
                diluted_margin: (w.value() - l.value()) / ballots_cast,
            });
        }
    }

    let outcome = Outcome::decided(allocation.keys().cloned().collect(), allocation, assertions)?;
    debug!(
        "d'hondt allocation {:?}, diluted margin {:.6}",
        outcome.seats, outcome.diluted_margin
    );
    Ok(outcome)
}
