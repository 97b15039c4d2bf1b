use crate::config::AuditConfig;
use crate::verifier::Verdict;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Machine-readable record of one verification run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport<'a> {
    pub run_id: Uuid,
    pub verified_at: DateTime<Utc>,
    pub config: &'a AuditConfig,
    pub verdict: &'a Verdict,
}

impl<'a> RunReport<'a> {
    pub fn new(config: &'a AuditConfig, verdict: &'a Verdict) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            verified_at: Utc::now(),
            config,
            verdict,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// One human-readable paragraph describing the verdict.
pub fn summary(verdict: &Verdict) -> String {
    match verdict {
        Verdict::Confirmed { achieved_risk, winners, .. } => format!(
            "Audit validated correctly: achieved risk {} for winners {}",
            achieved_risk,
            join(winners)
        ),
        Verdict::Rejected { achieved_risk, winners, reasons, .. } => {
            let mut text = format!(
                "Audit result is incorrect: achieved risk {} for winners {}",
                achieved_risk,
                join(winners)
            );
            for reason in reasons {
                text.push_str("\n- ");
                text.push_str(&reason.to_string());
            }
            text
        }
        Verdict::InvalidInput { step, error } => {
            format!("Audit could not be verified ({} failed): {}", step, error)
        }
    }
}

fn join<T: ToString>(items: &[T]) -> String {
    items.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AuditType, SocialChoice};
    use crate::error::{ConfigurationError, VerifyError};
    use crate::verifier::{Mismatch, Step};

    #[test]
    fn test_summary_lists_every_reason() {
        let verdict = Verdict::Rejected {
            achieved_risk: 0.3,
            diluted_margin: 0.2,
            winners: vec!["A".into()],
            reasons: vec![
                Mismatch::PValue { reported: 0.05, achieved: 0.3, tolerance: 1e-6 },
                Mismatch::RiskLimit { achieved: 0.3, risk_limit: 0.1 },
            ],
        };
        let text = summary(&verdict);
        assert!(text.starts_with("Audit result is incorrect"));
        assert_eq!(text.lines().count(), 3);
        assert!(text.contains("0.3 != 0.05"));
    }

    #[test]
    fn test_summary_for_refusal() {
        let verdict = Verdict::InvalidInput {
            step: Step::Evaluation,
            error: VerifyError::Configuration(ConfigurationError::ZeroVotes),
        };
        assert!(summary(&verdict).contains("evaluation failed"));
    }

    #[test]
    fn test_report_json_carries_status() {
        let config = AuditConfig::new(0.1, 0.05, SocialChoice::Plurality, AuditType::BallotPolling).unwrap();
        let verdict = Verdict::Confirmed {
            achieved_risk: 0.05,
            diluted_margin: 0.2,
            winners: vec!["A".into()],
        };
        let json: serde_json::Value =
            serde_json::from_str(&RunReport::new(&config, &verdict).to_json().unwrap()).unwrap();
        assert_eq!(json["verdict"]["status"], "CONFIRMED");
        assert_eq!(json["config"]["social_choice"], "plurality");
        assert!(json["run_id"].is_string());
    }
}
