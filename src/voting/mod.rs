pub mod dhondt;
pub mod plurality;
pub mod supermajority;

use crate::error::{ConfigurationError, DegenerateMarginError};
use crate::models::{Candidate, Counts, Tally};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The side of a pairwise comparison that a reported winner must beat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Opponent {
    Candidate(Candidate),
    /// Every valid vote not cast for the winner.
    Field,
}

impl fmt::Display for Opponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Opponent::Candidate(c) => write!(f, "'{}'", c),
            Opponent::Field => f.write_str("the rest of the field"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Winner,
    Opponent,
}

/// A weighted pairwise claim `a·V(winner) > b·V(opponent)` implied by the
/// reported outcome. The audit's null hypothesis is that it fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assertion {
    pub winner: Candidate,
    pub opponent: Opponent,
    pub winner_weight: f64,
    pub opponent_weight: f64,
    pub winner_votes: u64,
    pub opponent_votes: u64,
    pub diluted_margin: f64,
}

impl Assertion {
    /// Unweighted head-to-head comparison of two candidates.
    pub fn pairwise(winner: (&Candidate, u64), loser: (&Candidate, u64), ballots_cast: u64) -> Self {
        Self {
            winner: winner.0.clone(),
            opponent: Opponent::Candidate(loser.0.clone()),
            winner_weight: 1.0,
            opponent_weight: 1.0,
            winner_votes: winner.1,
            opponent_votes: loser.1,
            diluted_margin: (winner.1 as f64 - loser.1 as f64) / ballots_cast as f64,
        }
    }

    pub fn side_of(&self, ballot: &Candidate) -> Option<Side> {
        if *ballot == self.winner {
            return Some(Side::Winner);
        }
        match &self.opponent {
            Opponent::Candidate(loser) if loser == ballot => Some(Side::Opponent),
            Opponent::Candidate(_) => None,
            Opponent::Field => Some(Side::Opponent),
        }
    }

    pub fn winner_count(&self, counts: &Counts) -> u64 {
        counts.get(&self.winner).copied().unwrap_or(0)
    }

    pub fn opponent_count(&self, counts: &Counts) -> u64 {
        match &self.opponent {
            Opponent::Candidate(loser) => counts.get(loser).copied().unwrap_or(0),
            Opponent::Field => counts
                .iter()
                .filter(|(c, _)| **c != self.winner)
                .map(|(_, v)| *v)
                .sum(),
        }
    }

    /// Reported share of the winner among ballots for either side.
    pub fn reported_share(&self) -> f64 {
        let both = self.winner_votes + self.opponent_votes;
        if both == 0 {
            return 0.0;
        }
        self.winner_votes as f64 / both as f64
    }

    /// `a·V(winner) − b·V(opponent)` on the reported totals.
    pub fn weighted_margin(&self) -> f64 {
        self.winner_weight * self.winner_votes as f64
            - self.opponent_weight * self.opponent_votes as f64
    }
}

// Why a scheme declared nobody the winner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shortfall {
    pub leader: Candidate,
    pub share: f64,
    pub threshold: f64,
}

/// Reported outcome of a contest together with the claims an audit must check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub winners: Vec<Candidate>,
    /// Seats per winner; 1 each outside proportional schemes.
    pub seats: BTreeMap<Candidate, u32>,
    pub assertions: Vec<Assertion>,
    /// Smallest diluted margin across the assertions.
    pub diluted_margin: f64,
    pub shortfall: Option<Shortfall>,
}

impl Outcome {
    pub fn decided(
        winners: Vec<Candidate>,
        seats: BTreeMap<Candidate, u32>,
        assertions: Vec<Assertion>,
    ) -> Result<Self, DegenerateMarginError> {
        let tightest = assertions
            .iter()
            .min_by(|a, b| a.diluted_margin.total_cmp(&b.diluted_margin))
            .ok_or(DegenerateMarginError::Uncontested)?;
        if tightest.diluted_margin <= 0.0 || tightest.weighted_margin() <= 0.0 {
            return Err(DegenerateMarginError::Tie {
                winner: tightest.winner.clone(),
                opponent: tightest.opponent.clone(),
            });
        }
        let diluted_margin = tightest.diluted_margin;
        Ok(Self {
            winners,
            seats,
            assertions,
            diluted_margin,
            shortfall: None,
        })
    }

    /// No candidate qualifies; this is a result, not an error.
    pub fn undecided(shortfall: Shortfall) -> Self {
        Self {
            winners: Vec::new(),
            seats: BTreeMap::new(),
            assertions: Vec::new(),
            diluted_margin: 0.0,
            shortfall: Some(shortfall),
        }
    }

    pub fn has_winner(&self) -> bool {
        !self.winners.is_empty()
    }
}

/// Checks shared by every scheme: something to count and room for the winners.
pub(crate) fn check_contest(tally: &Tally, winners: usize, available: usize) -> Result<(), ConfigurationError> {
    if tally.is_empty() {
        return Err(ConfigurationError::EmptyTally);
    }
    if tally.total_votes() == 0 {
        return Err(ConfigurationError::ZeroVotes);
    }
    if winners == 0 {
        return Err(ConfigurationError::NoWinners);
    }
    if winners > available {
        return Err(ConfigurationError::TooManyWinners { winners, available });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assertion(opponent: Opponent) -> Assertion {
        Assertion {
            winner: "A".into(),
            opponent,
            winner_weight: 1.0,
            opponent_weight: 1.0,
            winner_votes: 60,
            opponent_votes: 40,
            diluted_margin: 0.2,
        }
    }

    #[test]
    fn test_side_of_pairwise_ignores_third_parties() {
        let a = assertion(Opponent::Candidate("B".into()));
        assert_eq!(a.side_of(&"A".into()), Some(Side::Winner));
        assert_eq!(a.side_of(&"B".into()), Some(Side::Opponent));
        assert_eq!(a.side_of(&"C".into()), None);
    }

    #[test]
    fn test_field_counts_everyone_else() {
        let a = assertion(Opponent::Field);
        let counts: Counts = [(Candidate::from("A"), 5), (Candidate::from("B"), 3), (Candidate::from("C"), 2)]
            .into_iter()
            .collect();
        assert_eq!(a.side_of(&"C".into()), Some(Side::Opponent));
        assert_eq!(a.winner_count(&counts), 5);
        assert_eq!(a.opponent_count(&counts), 5);
    }

    #[test]
    fn test_decided_rejects_zero_margin() {
        let mut tied = assertion(Opponent::Candidate("B".into()));
        tied.opponent_votes = 60;
        tied.diluted_margin = 0.0;
        let err = Outcome::decided(vec!["A".into()], BTreeMap::new(), vec![tied]).unwrap_err();
        assert!(matches!(err, DegenerateMarginError::Tie { .. }));
    }

    #[test]
    fn test_decided_without_assertions_is_uncontested() {
        let err = Outcome::decided(vec!["A".into()], BTreeMap::new(), Vec::new()).unwrap_err();
        assert_eq!(err, DegenerateMarginError::Uncontested);
    }
}
