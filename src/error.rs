use crate::models::{BatchId, Candidate};
use crate::voting::Opponent;
use serde::Serialize;
use thiserror::Error;

/// Invalid audit parameters or a contest the chosen scheme cannot be applied to.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConfigurationError {
    #[error("risk limit must lie strictly between 0 and 1, got {value}")]
    RiskLimit { value: f64 },
    #[error("reported p-value must lie in [0, 1], got {value}")]
    PValue { value: f64 },
    #[error("tolerance must be a finite non-negative number, got {value}")]
    Tolerance { value: f64 },
    #[error("supermajority threshold must lie strictly between 0 and 1, got {value}")]
    Threshold { value: f64 },
    #[error("escalation factor must lie in (0, 1], got {value}")]
    Escalation { value: f64 },
    #[error("unknown social choice function '{name}'")]
    UnknownSocialChoice { name: String },
    #[error("unknown audit type '{name}'")]
    UnknownAuditType { name: String },
    #[error("environment variable {var} has invalid value '{value}'")]
    Environment { var: String, value: String },
    #[error("at least one winner is required")]
    NoWinners,
    #[error("{winners} winners requested but the contest only offers {available}")]
    TooManyWinners { winners: usize, available: usize },
    #[error("supermajority elects exactly one winner, {winners} requested")]
    SupermajorityWinners { winners: usize },
    #[error("reported tally is empty")]
    EmptyTally,
    #[error("reported tally contains no votes")]
    ZeroVotes,
}

/// Reported and recounted data disagree with each other or with themselves.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataConsistencyError {
    #[error("{context} references candidate '{candidate}' absent from the reported tally")]
    UnknownCandidate { candidate: Candidate, context: String },
    #[error("negative count {count} for candidate '{candidate}'")]
    NegativeCount { candidate: Candidate, count: i64 },
    #[error("{ballots_cast} ballots cast but {votes} valid votes reported")]
    BallotsBelowVotes { ballots_cast: u64, votes: u64 },
    #[error("batch results give {in_batches} votes for '{candidate}' but the tally reports {reported}")]
    BatchTotals { candidate: Candidate, reported: u64, in_batches: u64 },
    #[error("batch-comparison audit needs the reported per-batch results")]
    MissingBatchBreakdown,
    #[error("batch {batch} was not part of the reported results")]
    UnknownBatch { batch: BatchId },
    #[error("batch {current} follows batch {previous}; batch identifiers must strictly increase")]
    NonMonotonicBatch { previous: BatchId, current: BatchId },
    #[error("batch {batch} is listed with zero draws")]
    ZeroDraws { batch: BatchId },
    #[error("audit type is {expected} but the recount sample holds {found} records")]
    SampleKind { expected: String, found: String },
}

/// The reported outcome leaves the statistical test undefined.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DegenerateMarginError {
    #[error("'{winner}' and {opponent} are tied; the margin is zero")]
    Tie { winner: Candidate, opponent: Opponent },
    #[error("'{leader}' has a share of {share:.6}, short of the threshold {threshold:.6}")]
    ThresholdUnreachable { leader: Candidate, share: f64, threshold: f64 },
    #[error("every candidate wins; there is no loser to audit against")]
    Uncontested,
    #[error("total error bound {bound} does not exceed 1")]
    ErrorBound { bound: f64 },
}

/// Any reason a verification run refuses to produce a verdict.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "category", content = "detail", rename_all = "snake_case")]
pub enum VerifyError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
    #[error("data consistency error: {0}")]
    DataConsistency(#[from] DataConsistencyError),
    #[error("degenerate margin: {0}")]
    DegenerateMargin(#[from] DegenerateMarginError),
}

/// Failures of the file-loading layer around the core.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("missing required column '{column}'")]
    MissingColumn { column: String },
    #[error("line {line}: {message}")]
    Row { line: usize, message: String },
    #[error("no recount files (*.csv) found in {dir}")]
    NoRecountFiles { dir: String },
    #[error("invalid JSON input: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Data(#[from] DataConsistencyError),
}
