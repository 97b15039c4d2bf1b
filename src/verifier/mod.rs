use crate::audit::batch_comparison::ErrorBounds;
use crate::audit::StatisticalTest;
use crate::config::{AuditConfig, AuditType, SocialChoice};
use crate::error::{DataConsistencyError, DegenerateMarginError, VerifyError};
use crate::models::{
    BallotObservation, BatchId, BatchObservation, Candidate, Counts, ElectionData, Party, RecountSample, Tally,
};
use crate::voting::{dhondt, plurality, supermajority, Outcome};
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Step of a run that refused the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Validation,
    Evaluation,
    Test,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Step::Validation => "validation",
            Step::Evaluation => "evaluation",
            Step::Test => "statistical test",
        })
    }
}

/// A specific reason the claimed audit result does not hold.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Mismatch {
    /// The recomputed risk differs from the reported p-value.
    PValue { reported: f64, achieved: f64, tolerance: f64 },
    /// The recomputed risk is above the risk limit.
    RiskLimit { achieved: f64, risk_limit: f64 },
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mismatch::PValue { reported, achieved, tolerance } => write!(
                f,
                "reached p-value of {} != {} (tolerance {})",
                achieved, reported, tolerance
            ),
            Mismatch::RiskLimit { achieved, risk_limit } => {
                write!(f, "achieved risk {} exceeds the risk limit {}", achieved, risk_limit)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Confirmed,
    Rejected,
    InvalidInput,
}

/// Terminal result of one verification run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Confirmed {
        achieved_risk: f64,
        diluted_margin: f64,
        winners: Vec<Candidate>,
    },
    Rejected {
        achieved_risk: f64,
        diluted_margin: f64,
        winners: Vec<Candidate>,
        reasons: Vec<Mismatch>,
    },
    /// Not a verdict: the run refused to verify.
    InvalidInput { step: Step, error: VerifyError },
}

impl Verdict {
    pub fn status(&self) -> Status {
        match self {
            Verdict::Confirmed { .. } => Status::Confirmed,
            Verdict::Rejected { .. } => Status::Rejected,
            Verdict::InvalidInput { .. } => Status::InvalidInput,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        self.status() == Status::Confirmed
    }

    pub fn achieved_risk(&self) -> Option<f64> {
        match self {
            Verdict::Confirmed { achieved_risk, .. } | Verdict::Rejected { achieved_risk, .. } => {
                Some(*achieved_risk)
            }
            Verdict::InvalidInput { .. } => None,
        }
    }

    pub fn reasons(&self) -> &[Mismatch] {
        match self {
            Verdict::Rejected { reasons, .. } => reasons,
            _ => &[],
        }
    }

    pub fn error(&self) -> Option<&VerifyError> {
        match self {
            Verdict::InvalidInput { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// Runs the whole pipeline and always produces a verdict.
pub fn verify(election: &ElectionData, sample: &RecountSample, config: &AuditConfig) -> Verdict {
    match try_verify(election, sample, config) {
        Ok(verdict) => verdict,
        Err((step, error)) => {
            warn!("refusing to verify, {} failed: {}", step, error);
            Verdict::InvalidInput { step, error }
        }
    }
}

/// Same as [`verify`] but hands refusals back as errors.
pub fn try_verify(
    election: &ElectionData,
    sample: &RecountSample,
    config: &AuditConfig,
) -> Result<Verdict, (Step, VerifyError)> {
    let loaded = Loaded::new(election, sample, config).map_err(|e| (Step::Validation, e))?;
    let evaluated = loaded.evaluate().map_err(|e| (Step::Evaluation, e))?;
    let tested = evaluated.test().map_err(|e| (Step::Test, e))?;
    Ok(tested.conclude())
}

/// One contest whose assertions are tested against a view of the sample.
#[derive(Debug, Clone)]
pub struct Contest {
    pub label: String,
    pub outcome: Outcome,
    sample: RecountSample,
    reported_batches: BTreeMap<BatchId, Counts>,
    bounds: Option<ErrorBounds>,
}

/// Input that passed every consistency check.
#[derive(Debug)]
pub struct Loaded<'a> {
    election: &'a ElectionData,
    sample: &'a RecountSample,
    config: &'a AuditConfig,
}

impl<'a> Loaded<'a> {
    pub fn new(
        election: &'a ElectionData,
        sample: &'a RecountSample,
        config: &'a AuditConfig,
    ) -> Result<Self, VerifyError> {
        config.validate()?;
        let loaded = Self { election, sample, config };
        loaded.check_reported()?;
        loaded.check_sample()?;
        debug!(
            "LOADED: {} candidates, {} reported batches, {} {} records",
            election.reported.len(),
            election.batches.len(),
            sample.len(),
            sample.kind()
        );
        Ok(loaded)
    }

    fn uses_affiliations(&self) -> bool {
        self.config.social_choice() == SocialChoice::DHondt && !self.election.affiliations.is_empty()
    }

    fn check_known(&self, candidate: &Candidate, context: impl FnOnce() -> String) -> Result<(), DataConsistencyError> {
        if self.election.reported.contains(candidate) {
            Ok(())
        } else {
            Err(DataConsistencyError::UnknownCandidate {
                candidate: candidate.clone(),
                context: context(),
            })
        }
    }

    fn check_reported(&self) -> Result<(), DataConsistencyError> {
        let reported = &self.election.reported;
        // Blank and spoiled ballots can only add to the valid votes
        if reported.ballots_cast() < reported.total_votes() {
            return Err(DataConsistencyError::BallotsBelowVotes {
                ballots_cast: reported.ballots_cast(),
                votes: reported.total_votes(),
            });
        }

        // Batch breakdowns, when present, must add up to the tally
        if !self.election.batches.is_empty() {
            let mut sums = Counts::new();
            for (batch, counts) in &self.election.batches {
                for (candidate, votes) in counts {
                    self.check_known(candidate, || format!("reported batch {}", batch))?;
                    *sums.entry(candidate.clone()).or_insert(0) += votes;
                }
            }
            for (candidate, votes) in reported.counts() {
                let in_batches = sums.get(candidate).copied().unwrap_or(0);
                if in_batches != *votes {
                    return Err(DataConsistencyError::BatchTotals {
                        candidate: candidate.clone(),
                        reported: *votes,
                        in_batches,
                    });
                }
            }
        }

        // Candidates without a party (blank or null rows, independents) do
        // not contest seats
        if self.uses_affiliations() {
            for candidate in self.election.affiliations.keys() {
                self.check_known(candidate, || "party affiliation".to_string())?;
            }
        }
        Ok(())
    }

    fn check_sample(&self) -> Result<(), DataConsistencyError> {
        match (self.config.audit_type(), self.sample) {
            (AuditType::BallotPolling, RecountSample::BallotPolling { ballots }) => {
                for (index, ballot) in ballots.iter().enumerate() {
                    if let BallotObservation::Vote(candidate) = ballot {
                        self.check_known(candidate, || format!("recounted ballot {}", index + 1))?;
                    }
                }
                Ok(())
            }
            (AuditType::BatchComparison, RecountSample::BatchComparison { batches }) => {
                if self.election.batches.is_empty() {
                    return Err(DataConsistencyError::MissingBatchBreakdown);
                }
                // One record per batch, in increasing id order
                let mut previous: Option<BatchId> = None;
                for observation in batches {
                    if let Some(previous) = previous {
                        if observation.batch <= previous {
                            return Err(DataConsistencyError::NonMonotonicBatch {
                                previous,
                                current: observation.batch,
                            });
                        }
                    }
                    previous = Some(observation.batch);
                    if observation.times_drawn == 0 {
                        return Err(DataConsistencyError::ZeroDraws { batch: observation.batch });
                    }
                    if !self.election.batches.contains_key(&observation.batch) {
                        return Err(DataConsistencyError::UnknownBatch { batch: observation.batch });
                    }
                    for candidate in observation.recounted.keys() {
                        self.check_known(candidate, || format!("recount of batch {}", observation.batch))?;
                    }
                }
                Ok(())
            }
            (expected, sample) => Err(DataConsistencyError::SampleKind {
                expected: expected.to_string(),
                found: sample.kind().to_string(),
            }),
        }
    }

    /// Applies the configured social choice function to the reported tally.
    pub fn evaluate(self) -> Result<Evaluated<'a>, VerifyError> {
        let reported = &self.election.reported;
        let n = self.config.num_winners();
        let mut contests = match self.config.social_choice() {
            SocialChoice::Plurality => vec![self.whole_contest("plurality", plurality::evaluate(reported, n)?)],
            SocialChoice::Supermajority => {
                let outcome = supermajority::evaluate(reported, self.config.supermajority_threshold())?;
                if let Some(shortfall) = &outcome.shortfall {
                    return Err(DegenerateMarginError::ThresholdUnreachable {
                        leader: shortfall.leader.clone(),
                        share: shortfall.share,
                        threshold: shortfall.threshold,
                    }
                    .into());
                }
                vec![self.whole_contest("supermajority", outcome)]
            }
            SocialChoice::DHondt if self.uses_affiliations() => self.open_list_contests()?,
            SocialChoice::DHondt => vec![self.whole_contest("d'hondt", dhondt::evaluate(reported, n, None)?)],
        };
        // A batch-comparison bound of 1 or less leaves nothing to test
        if self.config.audit_type() == AuditType::BatchComparison {
            for contest in contests.iter_mut().filter(|c| !c.outcome.assertions.is_empty()) {
                contest.bounds = Some(ErrorBounds::new(&contest.outcome.assertions, &contest.reported_batches)?);
            }
        }
        debug!(
            "EVALUATED: {} contest(s), winners {:?}",
            contests.len(),
            contests[0].outcome.winners
        );
        Ok(Evaluated { loaded: self, contests })
    }

    fn whole_contest(&self, label: &str, outcome: Outcome) -> Contest {
        Contest {
            label: label.to_string(),
            outcome,
            sample: self.sample.clone(),
            reported_batches: self.election.batches.clone(),
            bounds: None,
        }
    }

    /// Party-level D'Hondt allocation plus, for each party that won seats, a
    /// plurality contest among its own candidates for those seats.
    fn open_list_contests(&self) -> Result<Vec<Contest>, VerifyError> {
        let affiliations = &self.election.affiliations;
        let reported = &self.election.reported;
        let members = self.election.party_members();
        // A party cannot win more seats than it has candidates
        let caps: BTreeMap<Party, usize> = members.iter().map(|(p, m)| (p.clone(), m.len())).collect();

        // Unaffiliated candidates drop out here but stay in ballots cast
        let party_tally = Tally::new(
            reported
                .counts()
                .iter()
                .filter_map(|(c, v)| affiliations.get(c).map(|p| (p.clone(), *v))),
        )
        .with_ballots_cast(reported.ballots_cast());
        let outcome = dhondt::evaluate(&party_tally, self.config.num_winners(), Some(&caps))?;

        let mut contests = vec![Contest {
            label: "d'hondt".to_string(),
            sample: fold_sample(self.sample, affiliations),
            reported_batches: self
                .election
                .batches
                .iter()
                .map(|(id, counts)| (*id, fold_counts(counts, affiliations)))
                .collect(),
            outcome,
            bounds: None,
        }];

        // Then who gets the seats inside each list
        for (party, seats) in contests[0].outcome.seats.clone() {
            let list = members.get(&party).map(Vec::as_slice).unwrap_or(&[]);
            if seats as usize >= list.len() {
                debug!("party {} fills all {} of its list seats", party, seats);
                continue;
            }
            let list_set: BTreeSet<&Candidate> = list.iter().collect();
            let outcome = plurality::evaluate(&reported.restricted_to(list), seats as usize)?;
            contests.push(Contest {
                label: format!("list of {}", party),
                outcome,
                sample: restrict_sample(self.sample, &list_set),
                reported_batches: self
                    .election
                    .batches
                    .iter()
                    .map(|(id, counts)| (*id, restrict_counts(counts, &list_set)))
                    .collect(),
                bounds: None,
            });
        }
        Ok(contests)
    }
}

// Reported outcome is known; the sample has not been looked at yet
#[derive(Debug)]
pub struct Evaluated<'a> {
    loaded: Loaded<'a>,
    contests: Vec<Contest>,
}

impl<'a> Evaluated<'a> {
    pub fn outcome(&self) -> &Outcome {
        &self.contests[0].outcome
    }

    pub fn contests(&self) -> &[Contest] {
        &self.contests
    }

    /// Runs the configured statistical test over every contest. The achieved
    /// risk is the largest of them.
    pub fn test(self) -> Result<Tested<'a>, VerifyError> {
        let config = self.loaded.config;
        let mut achieved_risk = 0.0_f64;
        for contest in &self.contests {
            let test = match config.audit_type() {
                AuditType::BallotPolling => StatisticalTest::BallotPolling,
                AuditType::BatchComparison => StatisticalTest::BatchComparison {
                    reported: &contest.reported_batches,
                    bounds: contest.bounds.as_ref(),
                    escalation: config.escalation(),
                },
            };
            let risk = test.achieved_risk(&contest.outcome.assertions, &contest.sample, config.risk_limit())?;
            debug!("{} contest: achieved risk {}", contest.label, risk);
            achieved_risk = achieved_risk.max(risk);
        }
        debug!("TESTED: achieved risk {}", achieved_risk);
        Ok(Tested { evaluated: self, achieved_risk })
    }
}

// Achieved risk is known; only the comparison with the claim remains
#[derive(Debug)]
pub struct Tested<'a> {
    evaluated: Evaluated<'a>,
    achieved_risk: f64,
}

impl Tested<'_> {
    pub fn achieved_risk(&self) -> f64 {
        self.achieved_risk
    }

    /// Compares the achieved risk with the reported p-value and the risk limit.
    pub fn conclude(self) -> Verdict {
        let config = self.evaluated.loaded.config;
        let achieved = self.achieved_risk;
        let mut reasons = Vec::new();

        // Both checks are reported, not just the first that fails
        if (achieved - config.reported_p_value()).abs() > config.tolerance() {
            reasons.push(Mismatch::PValue {
                reported: config.reported_p_value(),
                achieved,
                tolerance: config.tolerance(),
            });
        }
        if achieved > config.risk_limit() {
            reasons.push(Mismatch::RiskLimit {
                achieved,
                risk_limit: config.risk_limit(),
            });
        }

        let outcome = self.evaluated.outcome();
        let winners = outcome.winners.clone();
        let diluted_margin = outcome.diluted_margin;
        let verdict = if reasons.is_empty() {
            Verdict::Confirmed { achieved_risk: achieved, diluted_margin, winners }
        } else {
            Verdict::Rejected { achieved_risk: achieved, diluted_margin, winners, reasons }
        };
        info!("VERIFIED: {:?} with achieved risk {}", verdict.status(), achieved);
        verdict
    }
}

fn fold_counts(counts: &Counts, affiliations: &BTreeMap<Candidate, Party>) -> Counts {
    let mut folded = Counts::new();
    for (candidate, votes) in counts {
        if let Some(party) = affiliations.get(candidate) {
            *folded.entry(party.clone()).or_insert(0) += votes;
        }
    }
    folded
}

fn restrict_counts(counts: &Counts, members: &BTreeSet<&Candidate>) -> Counts {
    counts
        .iter()
        .filter(|(c, _)| members.contains(c))
        .map(|(c, v)| (c.clone(), *v))
        .collect()
}

fn fold_sample(sample: &RecountSample, affiliations: &BTreeMap<Candidate, Party>) -> RecountSample {
    match sample {
        RecountSample::BallotPolling { ballots } => RecountSample::ballots(
            ballots
                .iter()
                .map(|ballot| match ballot {
                    BallotObservation::Vote(c) => match affiliations.get(c) {
                        Some(party) => BallotObservation::Vote(party.clone()),
                        None => BallotObservation::Invalid,
                    },
                    BallotObservation::Invalid => BallotObservation::Invalid,
                })
                .collect(),
        ),
        RecountSample::BatchComparison { batches } => RecountSample::batches(
            batches
                .iter()
                .map(|b| BatchObservation {
                    batch: b.batch,
                    recounted: fold_counts(&b.recounted, affiliations),
                    times_drawn: b.times_drawn,
                })
                .collect(),
        ),
    }
}

/// Ballots for other lists stay in place; they simply support neither side.
fn restrict_sample(sample: &RecountSample, members: &BTreeSet<&Candidate>) -> RecountSample {
    match sample {
        RecountSample::BallotPolling { .. } => sample.clone(),
        RecountSample::BatchComparison { batches } => RecountSample::batches(
            batches
                .iter()
                .map(|b| BatchObservation {
                    batch: b.batch,
                    recounted: restrict_counts(&b.recounted, members),
                    times_drawn: b.times_drawn,
                })
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigurationError;

    fn config(choice: SocialChoice, audit: AuditType, p: f64) -> AuditConfig {
        AuditConfig::new(0.1, p, choice, audit).unwrap()
    }

    fn votes(pairs: &[(&str, usize)]) -> RecountSample {
        RecountSample::ballots(
            pairs
                .iter()
                .flat_map(|(c, n)| std::iter::repeat(BallotObservation::Vote(Candidate::from(*c))).take(*n))
                .collect(),
        )
    }

    #[test]
    fn test_confirms_matching_claim() {
        let election = ElectionData::new(Tally::new([("A", 60), ("B", 40)]));
        let sample = votes(&[("A", 40), ("B", 10)]);
        let risk = 1.0 / (1.2_f64.powi(40) * 0.8_f64.powi(10));
        let verdict = verify(&election, &sample, &config(SocialChoice::Plurality, AuditType::BallotPolling, risk));
        assert!(verdict.is_confirmed(), "{:?}", verdict);
    }

    #[test]
    fn test_reports_each_mismatch_separately() {
        let election = ElectionData::new(Tally::new([("A", 60), ("B", 40)]));
        let sample = votes(&[("A", 12), ("B", 8)]);
        let verdict = verify(&election, &sample, &config(SocialChoice::Plurality, AuditType::BallotPolling, 0.05));
        assert_eq!(verdict.status(), Status::Rejected);
        assert_eq!(verdict.reasons().len(), 2);
        assert!(matches!(verdict.reasons()[0], Mismatch::PValue { .. }));
        assert!(matches!(verdict.reasons()[1], Mismatch::RiskLimit { .. }));
    }

    #[test]
    fn test_honest_claim_above_limit_is_only_a_limit_violation() {
        let election = ElectionData::new(Tally::new([("A", 60), ("B", 40)]));
        let sample = votes(&[("A", 12), ("B", 8)]);
        let risk = 1.0 / (1.2_f64.powi(12) * 0.8_f64.powi(8));
        let verdict = verify(&election, &sample, &config(SocialChoice::Plurality, AuditType::BallotPolling, risk));
        assert_eq!(verdict.reasons(), &[Mismatch::RiskLimit { achieved: verdict.achieved_risk().unwrap(), risk_limit: 0.1 }]);
    }

    #[test]
    fn test_unknown_candidate_in_sample() {
        let election = ElectionData::new(Tally::new([("A", 60), ("B", 40)]));
        let sample = votes(&[("A", 2), ("Z", 1)]);
        let verdict = verify(&election, &sample, &config(SocialChoice::Plurality, AuditType::BallotPolling, 0.05));
        match verdict {
            Verdict::InvalidInput { step, error } => {
                assert_eq!(step, Step::Validation);
                assert_eq!(
                    error,
                    VerifyError::DataConsistency(DataConsistencyError::UnknownCandidate {
                        candidate: "Z".into(),
                        context: "recounted ballot 3".to_string(),
                    })
                );
            }
            other => panic!("expected refusal, got {:?}", other),
        }
    }

    #[test]
    fn test_supermajority_shortfall_is_degenerate() {
        let election = ElectionData::new(Tally::new([("A", 66), ("B", 34)]));
        let verdict = verify(
            &election,
            &votes(&[("A", 5)]),
            &config(SocialChoice::Supermajority, AuditType::BallotPolling, 0.05),
        );
        assert!(matches!(
            verdict,
            Verdict::InvalidInput {
                step: Step::Evaluation,
                error: VerifyError::DegenerateMargin(DegenerateMarginError::ThresholdUnreachable { .. })
            }
        ));
    }

    #[test]
    fn test_sample_kind_must_match_audit_type() {
        let election = ElectionData::new(Tally::new([("A", 60), ("B", 40)]));
        let verdict = verify(
            &election,
            &votes(&[("A", 5)]),
            &config(SocialChoice::Plurality, AuditType::BatchComparison, 0.05),
        );
        assert!(matches!(
            verdict.error(),
            Some(VerifyError::DataConsistency(DataConsistencyError::SampleKind { .. }))
        ));
    }

    #[test]
    fn test_too_many_winners_is_configuration() {
        let election = ElectionData::new(Tally::new([("A", 60), ("B", 40)]));
        let cfg = config(SocialChoice::Plurality, AuditType::BallotPolling, 0.05).with_winners(3).unwrap();
        let verdict = verify(&election, &votes(&[("A", 5)]), &cfg);
        assert_eq!(
            verdict.error(),
            Some(&VerifyError::Configuration(ConfigurationError::TooManyWinners { winners: 3, available: 2 }))
        );
    }

    #[test]
    fn test_batch_ids_must_increase() {
        let batch = |id| BatchObservation::new(id, Counts::from([(Candidate::from("A"), 6), (Candidate::from("B"), 4)]));
        let election = ElectionData::new(Tally::new([("A", 12), ("B", 8)])).with_batches(BTreeMap::from([
            (1, Counts::from([(Candidate::from("A"), 6), (Candidate::from("B"), 4)])),
            (2, Counts::from([(Candidate::from("A"), 6), (Candidate::from("B"), 4)])),
        ]));
        let sample = RecountSample::batches(vec![batch(2), batch(1)]);
        let verdict = verify(&election, &sample, &config(SocialChoice::Plurality, AuditType::BatchComparison, 0.5));
        assert_eq!(
            verdict.error(),
            Some(&VerifyError::DataConsistency(DataConsistencyError::NonMonotonicBatch { previous: 2, current: 1 }))
        );
    }

    #[test]
    fn test_batch_bounds_are_fixed_before_testing() {
        let batch = || Counts::from([(Candidate::from("A"), 60), (Candidate::from("B"), 40)]);
        let election = ElectionData::new(Tally::new([("A", 120), ("B", 80)]))
            .with_batches(BTreeMap::from([(1, batch()), (2, batch())]));
        let sample = RecountSample::batches(vec![BatchObservation::new(2, batch())]);
        let cfg = config(SocialChoice::Plurality, AuditType::BatchComparison, 0.5);
        let evaluated = Loaded::new(&election, &sample, &cfg).unwrap().evaluate().unwrap();
        // 2 / 40 per ballot, batches of 100, two batches
        let bounds = evaluated.contests()[0].bounds.unwrap();
        assert!((bounds.total - 10.0).abs() < 1e-12);

        let ballots = votes(&[("A", 3)]);
        let cfg = config(SocialChoice::Plurality, AuditType::BallotPolling, 0.5);
        let evaluated = Loaded::new(&election, &ballots, &cfg).unwrap().evaluate().unwrap();
        assert!(evaluated.contests()[0].bounds.is_none());
    }

    #[test]
    fn test_open_list_adds_intra_party_contests() {
        let tally = Tally::new([("a1", 50), ("a2", 30), ("b1", 20), ("b2", 10)]);
        let affiliations = BTreeMap::from([
            (Candidate::from("a1"), Candidate::from("A")),
            (Candidate::from("a2"), Candidate::from("A")),
            (Candidate::from("b1"), Candidate::from("B")),
            (Candidate::from("b2"), Candidate::from("B")),
        ]);
        let election = ElectionData::new(tally).with_affiliations(affiliations);
        let cfg = config(SocialChoice::DHondt, AuditType::BallotPolling, 0.05).with_winners(2).unwrap();
        let sample = votes(&[("a1", 3)]);
        let loaded = Loaded::new(&election, &sample, &cfg).unwrap();
        let evaluated = loaded.evaluate().unwrap();
        // A: 80, 40; B: 30 -> A takes both seats, both of its candidates are elected
        assert_eq!(evaluated.outcome().seats.get(&Candidate::from("A")), Some(&2));
        assert_eq!(evaluated.contests().len(), 1);
    }
}
