use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Identifier of a candidate, option or party. Ordering is byte-wise and is
/// the tie-break order used by every evaluator.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Candidate(String);

pub type Party = Candidate;

// Tables or precincts
pub type BatchId = u64;

pub type Counts = BTreeMap<Candidate, u64>;

impl Candidate {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Candidate {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for Candidate {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Reported vote counts for one contest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    counts: Counts,
    ballots_cast: u64,
}

impl Tally {
    /// Builds a tally; repeated candidates are summed and `ballots_cast`
    /// defaults to the number of valid votes.
    pub fn new<C: Into<Candidate>>(counts: impl IntoIterator<Item = (C, u64)>) -> Self {
        let mut merged = Counts::new();
        for (candidate, votes) in counts {
            *merged.entry(candidate.into()).or_insert(0) += votes;
        }
        let ballots_cast = merged.values().sum();
        Self { counts: merged, ballots_cast }
    }

    /// Records blank or invalid ballots on top of the valid votes.
    pub fn with_ballots_cast(mut self, ballots_cast: u64) -> Self {
        self.ballots_cast = ballots_cast;
        self
    }

    pub fn votes(&self, candidate: &Candidate) -> u64 {
        self.counts.get(candidate).copied().unwrap_or(0)
    }

    pub fn contains(&self, candidate: &Candidate) -> bool {
        self.counts.contains_key(candidate)
    }

    pub fn candidates(&self) -> impl Iterator<Item = &Candidate> {
        self.counts.keys()
    }

    pub fn counts(&self) -> &Counts {
        &self.counts
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn total_votes(&self) -> u64 {
        self.counts.values().sum()
    }

    /// All ballots, valid or not. Diluted margins divide by this.
    pub fn ballots_cast(&self) -> u64 {
        self.ballots_cast
    }

    /// Candidates by votes descending, ties broken by identifier ascending.
    pub fn ranked(&self) -> Vec<(&Candidate, u64)> {
        let mut ranked: Vec<(&Candidate, u64)> =
            self.counts.iter().map(|(c, v)| (c, *v)).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked
    }

    /// Keeps only the listed candidates. Ballots cast are carried over.
    pub fn restricted_to<'a>(&self, members: impl IntoIterator<Item = &'a Candidate>) -> Tally {
        let counts = members
            .into_iter()
            .filter_map(|c| self.counts.get(c).map(|v| (c.clone(), *v)))
            .collect();
        Tally { counts, ballots_cast: self.ballots_cast }
    }
}

/// Everything the preliminary (reported) results say about the contest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionData {
    pub reported: Tally,
    /// Reported results per batch; required for batch-comparison audits.
    #[serde(default)]
    pub batches: BTreeMap<BatchId, Counts>,
    /// Candidate to party membership for open-list D'Hondt contests.
    #[serde(default)]
    pub affiliations: BTreeMap<Candidate, Party>,
}

impl ElectionData {
    pub fn new(reported: Tally) -> Self {
        Self {
            reported,
            batches: BTreeMap::new(),
            affiliations: BTreeMap::new(),
        }
    }

    pub fn with_batches(mut self, batches: BTreeMap<BatchId, Counts>) -> Self {
        self.batches = batches;
        self
    }

    pub fn with_affiliations(mut self, affiliations: BTreeMap<Candidate, Party>) -> Self {
        self.affiliations = affiliations;
        self
    }

    /// Candidates grouped by party, in identifier order.
    pub fn party_members(&self) -> BTreeMap<Party, Vec<Candidate>> {
        let mut members: BTreeMap<Party, Vec<Candidate>> = BTreeMap::new();
        for (candidate, party) in &self.affiliations {
            members.entry(party.clone()).or_default().push(candidate.clone());
        }
        members
    }
}

/// One ballot drawn in a ballot-polling audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BallotObservation {
    Vote(Candidate),
    /// Blank, spoiled or otherwise not a valid vote.
    Invalid,
}

/// Hand recount of one sampled batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchObservation {
    pub batch: BatchId,
    pub recounted: Counts,
    /// Sampling is with replacement; a batch drawn k times counts k times.
    #[serde(default = "one_draw")]
    pub times_drawn: u32,
}

fn one_draw() -> u32 {
    1
}

impl BatchObservation {
    pub fn new(batch: BatchId, recounted: Counts) -> Self {
        Self { batch, recounted, times_drawn: 1 }
    }

    pub fn drawn(mut self, times: u32) -> Self {
        self.times_drawn = times;
        self
    }
}

/// Recount evidence in draw order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum RecountSample {
    BallotPolling { ballots: Vec<BallotObservation> },
    BatchComparison { batches: Vec<BatchObservation> },
}

impl RecountSample {
    pub fn ballots(ballots: Vec<BallotObservation>) -> Self {
        RecountSample::BallotPolling { ballots }
    }

    pub fn batches(batches: Vec<BatchObservation>) -> Self {
        RecountSample::BatchComparison { batches }
    }

    pub fn len(&self) -> usize {
        match self {
            RecountSample::BallotPolling { ballots } => ballots.len(),
            RecountSample::BatchComparison { batches } => batches.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> &'static str {
        match self {
            RecountSample::BallotPolling { .. } => "ballot-polling",
            RecountSample::BatchComparison { .. } => "batch-comparison",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tally_merges_and_defaults_ballots_cast() {
        let tally = Tally::new([("A", 10), ("B", 5), ("A", 2)]);
        assert_eq!(tally.votes(&"A".into()), 12);
        assert_eq!(tally.total_votes(), 17);
        assert_eq!(tally.ballots_cast(), 17);
        assert_eq!(tally.with_ballots_cast(20).ballots_cast(), 20);
    }

    #[test]
    fn test_ranked_breaks_ties_by_identifier() {
        let tally = Tally::new([("Zed", 30), ("Amy", 30), ("Bob", 40)]);
        let names: Vec<&str> = tally.ranked().iter().map(|(c, _)| c.as_str()).collect();
        assert_eq!(names, vec!["Bob", "Amy", "Zed"]);
    }

    #[test]
    fn test_restricted_tally_keeps_ballots_cast() {
        let tally = Tally::new([("A", 10), ("B", 5), ("C", 1)]);
        let members = [Candidate::from("A"), Candidate::from("C")];
        let sub = tally.restricted_to(&members);
        assert_eq!(sub.len(), 2);
        assert_eq!(sub.total_votes(), 11);
        assert_eq!(sub.ballots_cast(), 16);
    }

    #[test]
    fn test_sample_deserializes_from_tagged_json() {
        let json = r#"{"kind":"ballot-polling","ballots":[{"vote":"A"},"invalid"]}"#;
        let sample: RecountSample = serde_json::from_str(json).unwrap();
        assert_eq!(
            sample,
            RecountSample::ballots(vec![
                BallotObservation::Vote("A".into()),
                BallotObservation::Invalid
            ])
        );
    }
}
