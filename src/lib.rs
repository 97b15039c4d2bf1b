//! Verification of risk-limiting audit claims.
//!
//! Given the reported results of an election and the recount evidence an audit
//! collected, recompute the risk the evidence actually achieves and check it
//! against the p-value the auditors reported and the configured risk limit.

pub mod audit;
pub mod cli;
pub mod config;
pub mod error;
pub mod loader;
pub mod models;
pub mod report;
pub mod verifier;
pub mod voting;

pub use config::{AuditConfig, AuditType, SocialChoice};
pub use error::{ConfigurationError, DataConsistencyError, DegenerateMarginError, LoadError, VerifyError};
pub use models::{BallotObservation, BatchObservation, Candidate, ElectionData, RecountSample, Tally};
pub use verifier::{verify, Mismatch, Status, Verdict};
