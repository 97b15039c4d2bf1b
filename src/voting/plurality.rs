use crate::error::VerifyError;
use crate::models::Tally;
use crate::voting::{check_contest, Assertion, Outcome};
use log::debug;

/// The `num_winners` candidates with the most votes win. Equal counts go to the
/// candidate whose identifier sorts first.
pub fn evaluate(tally: &Tally, num_winners: usize) -> Result<Outcome, VerifyError> {
    check_contest(tally, num_winners, tally.len())?;

    // Most votes first, ties by name
    let ranked = tally.ranked();
    let (winners, losers) = ranked.split_at(num_winners);

    // Every reported winner has to beat every reported loser
    let mut assertions = Vec::with_capacity(winners.len() * losers.len());
    for &winner in winners {
        for &loser in losers {
            assertions.push(Assertion::pairwise(winner, loser, tally.ballots_cast()));
        }
    }

    let outcome = Outcome::decided(
        winners.iter().map(|(c, _)| (*c).clone()).collect(),
        winners.iter().map(|(c, _)| ((*c).clone(), 1)).collect(),
        assertions,
    )?;
    debug!(
        "plurality winners {:?}, diluted margin {:.6}",
        outcome.winners, outcome.diluted_margin
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigurationError, DegenerateMarginError};
    use crate::models::Candidate;
    use crate::voting::Opponent;

    #[test]
    fn test_single_winner_margin() {
        let tally = Tally::new([("A", 60), ("B", 40)]);
        let outcome = evaluate(&tally, 1).unwrap();
        assert_eq!(outcome.winners, vec![Candidate::from("A")]);
        assert_eq!(outcome.assertions.len(), 1);
        assert!((outcome.diluted_margin - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_margin_is_diluted_by_ballots_cast() {
        let tally = Tally::new([("A", 60), ("B", 40)]).with_ballots_cast(200);
        let outcome = evaluate(&tally, 1).unwrap();
        assert!((outcome.diluted_margin - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_multi_winner_pairs_every_winner_with_every_loser() {
        let tally = Tally::new([("A", 50), ("B", 30), ("C", 15), ("D", 5)]);
        let outcome = evaluate(&tally, 2).unwrap();
        assert_eq!(outcome.winners, vec![Candidate::from("A"), Candidate::from("B")]);
        assert_eq!(outcome.assertions.len(), 4);
        // weakest winner B against strongest loser C
        assert!((outcome.diluted_margin - 0.15).abs() < 1e-12);
    }

    #[test]
    fn test_tie_break_is_deterministic() {
        let tally = Tally::new([("B", 40), ("A", 40), ("C", 20)]);
        for _ in 0..5 {
            let outcome = evaluate(&tally, 2).unwrap();
            assert_eq!(outcome.winners, vec![Candidate::from("A"), Candidate::from("B")]);
        }
    }

    #[test]
    fn test_tie_at_the_cut_is_degenerate() {
        let tally = Tally::new([("B", 40), ("A", 40), ("C", 20)]);
        let err = evaluate(&tally, 1).unwrap_err();
        assert_eq!(
            err,
            VerifyError::DegenerateMargin(DegenerateMarginError::Tie {
                winner: "A".into(),
                opponent: Opponent::Candidate("B".into()),
            })
        );
    }

    #[test]
    fn test_configuration_errors() {
        assert_eq!(
            evaluate(&Tally::new(Vec::<(&str, u64)>::new()), 1).unwrap_err(),
            VerifyError::Configuration(ConfigurationError::EmptyTally)
        );
        assert_eq!(
            evaluate(&Tally::new([("A", 0), ("B", 0)]), 1).unwrap_err(),
            VerifyError::Configuration(ConfigurationError::ZeroVotes)
        );
        assert_eq!(
            evaluate(&Tally::new([("A", 3), ("B", 1)]), 3).unwrap_err(),
            VerifyError::Configuration(ConfigurationError::TooManyWinners { winners: 3, available: 2 })
        );
    }

    #[test]
    fn test_everyone_winning_is_uncontested() {
        let err = evaluate(&Tally::new([("A", 3), ("B", 1)]), 2).unwrap_err();
        assert_eq!(err, VerifyError::DegenerateMargin(DegenerateMarginError::Uncontested));
    }
}
