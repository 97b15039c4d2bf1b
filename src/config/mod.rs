use crate::error::ConfigurationError;
use log::debug;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;

/// Social choice function used to decide the reported winners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocialChoice {
    Plurality,
    #[serde(alias = "super")]
    Supermajority,
    #[serde(rename = "dhondt")]
    DHondt,
}

impl FromStr for SocialChoice {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plurality" => Ok(SocialChoice::Plurality),
            "supermajority" | "super" => Ok(SocialChoice::Supermajority),
            "dhondt" | "d'hondt" => Ok(SocialChoice::DHondt),
            _ => Err(ConfigurationError::UnknownSocialChoice { name: s.to_string() }),
        }
    }
}

impl fmt::Display for SocialChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SocialChoice::Plurality => "plurality",
            SocialChoice::Supermajority => "supermajority",
            SocialChoice::DHondt => "dhondt",
        })
    }
}

/// Auditing scheme the recount evidence was collected under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuditType {
    BallotPolling,
    BatchComparison,
}

impl FromStr for AuditType {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ballot-polling" => Ok(AuditType::BallotPolling),
            "batch-comparison" => Ok(AuditType::BatchComparison),
            _ => Err(ConfigurationError::UnknownAuditType { name: s.to_string() }),
        }
    }
}

impl fmt::Display for AuditType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AuditType::BallotPolling => "ballot-polling",
            AuditType::BatchComparison => "batch-comparison",
        })
    }
}

/// Immutable parameters of one verification run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawAuditConfig")]
pub struct AuditConfig {
    risk_limit: f64,
    reported_p_value: f64,
    num_winners: usize,
    social_choice: SocialChoice,
    audit_type: AuditType,
    tolerance: f64,
    supermajority_threshold: f64,
    escalation: f64,
}

impl AuditConfig {
    pub const DEFAULT_TOLERANCE: f64 = 1e-6;
    pub const DEFAULT_SUPERMAJORITY_THRESHOLD: f64 = 2.0 / 3.0;
    pub const DEFAULT_ESCALATION: f64 = 0.95;

    pub fn new(
        risk_limit: f64,
        reported_p_value: f64,
        social_choice: SocialChoice,
        audit_type: AuditType,
    ) -> Result<Self, ConfigurationError> {
        let config = Self {
            risk_limit,
            reported_p_value,
            num_winners: 1,
            social_choice,
            audit_type,
            tolerance: Self::DEFAULT_TOLERANCE,
            supermajority_threshold: Self::DEFAULT_SUPERMAJORITY_THRESHOLD,
            escalation: Self::DEFAULT_ESCALATION,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_winners(mut self, num_winners: usize) -> Result<Self, ConfigurationError> {
        self.num_winners = num_winners;
        self.validate()?;
        Ok(self)
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Result<Self, ConfigurationError> {
        self.tolerance = tolerance;
        self.validate()?;
        Ok(self)
    }

    pub fn with_supermajority_threshold(mut self, threshold: f64) -> Result<Self, ConfigurationError> {
        self.supermajority_threshold = threshold;
        self.validate()?;
        Ok(self)
    }

    pub fn with_escalation(mut self, escalation: f64) -> Result<Self, ConfigurationError> {
        self.escalation = escalation;
        self.validate()?;
        Ok(self)
    }

    /// Applies environment defaults for the knobs the caller did not set.
    pub fn with_defaults(self, defaults: &EnvDefaults) -> Result<Self, ConfigurationError> {
        self.with_tolerance(defaults.tolerance)?
            .with_supermajority_threshold(defaults.supermajority_threshold)?
            .with_escalation(defaults.escalation)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        // Negated comparisons also reject NaN.
        if !(self.risk_limit > 0.0 && self.risk_limit < 1.0) {
            return Err(ConfigurationError::RiskLimit { value: self.risk_limit });
        }
        if !(0.0..=1.0).contains(&self.reported_p_value) {
            return Err(ConfigurationError::PValue { value: self.reported_p_value });
        }
        if self.num_winners == 0 {
            return Err(ConfigurationError::NoWinners);
        }
        if self.social_choice == SocialChoice::Supermajority && self.num_winners != 1 {
            return Err(ConfigurationError::SupermajorityWinners { winners: self.num_winners });
        }
        if !(self.tolerance.is_finite() && self.tolerance >= 0.0) {
            return Err(ConfigurationError::Tolerance { value: self.tolerance });
        }
        if !(self.supermajority_threshold > 0.0 && self.supermajority_threshold < 1.0) {
            return Err(ConfigurationError::Threshold { value: self.supermajority_threshold });
        }
        if !(self.escalation > 0.0 && self.escalation <= 1.0) {
            return Err(ConfigurationError::Escalation { value: self.escalation });
        }
        Ok(())
    }

    pub fn risk_limit(&self) -> f64 {
        self.risk_limit
    }

    pub fn reported_p_value(&self) -> f64 {
        self.reported_p_value
    }

    pub fn num_winners(&self) -> usize {
        self.num_winners
    }

    pub fn social_choice(&self) -> SocialChoice {
        self.social_choice
    }

    pub fn audit_type(&self) -> AuditType {
        self.audit_type
    }

    /// Largest accepted gap between the reported and recomputed p-value.
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn supermajority_threshold(&self) -> f64 {
        self.supermajority_threshold
    }

    /// Weight given to observed discrepancies by the batch-comparison test.
    pub fn escalation(&self) -> f64 {
        self.escalation
    }
}

#[derive(Deserialize)]
struct RawAuditConfig {
    risk_limit: f64,
    reported_p_value: f64,
    #[serde(default = "default_winners")]
    num_winners: usize,
    social_choice: SocialChoice,
    audit_type: AuditType,
    #[serde(default = "default_tolerance")]
    tolerance: f64,
    #[serde(default = "default_threshold")]
    supermajority_threshold: f64,
    #[serde(default = "default_escalation")]
    escalation: f64,
}

fn default_winners() -> usize {
    1
}

fn default_tolerance() -> f64 {
    AuditConfig::DEFAULT_TOLERANCE
}

fn default_threshold() -> f64 {
    AuditConfig::DEFAULT_SUPERMAJORITY_THRESHOLD
}

fn default_escalation() -> f64 {
    AuditConfig::DEFAULT_ESCALATION
}

impl TryFrom<RawAuditConfig> for AuditConfig {
    type Error = ConfigurationError;

    fn try_from(raw: RawAuditConfig) -> Result<Self, Self::Error> {
        let config = AuditConfig {
            risk_limit: raw.risk_limit,
            reported_p_value: raw.reported_p_value,
            num_winners: raw.num_winners,
            social_choice: raw.social_choice,
            audit_type: raw.audit_type,
            tolerance: raw.tolerance,
            supermajority_threshold: raw.supermajority_threshold,
            escalation: raw.escalation,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Numeric knobs that can be preset through the environment (or a `.env` file).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvDefaults {
    pub tolerance: f64,
    pub supermajority_threshold: f64,
    pub escalation: f64,
}

impl Default for EnvDefaults {
    fn default() -> Self {
        Self {
            tolerance: AuditConfig::DEFAULT_TOLERANCE,
            supermajority_threshold: AuditConfig::DEFAULT_SUPERMAJORITY_THRESHOLD,
            escalation: AuditConfig::DEFAULT_ESCALATION,
        }
    }
}

impl EnvDefaults {
    pub const TOLERANCE_VAR: &'static str = "RLA_TOLERANCE";
    pub const THRESHOLD_VAR: &'static str = "RLA_SUPERMAJORITY_THRESHOLD";
    pub const ESCALATION_VAR: &'static str = "RLA_ESCALATION";

    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Same as [`EnvDefaults::from_env`] over an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigurationError> {
        let fallback = Self::default();
        Ok(Self {
            tolerance: read_f64(&lookup, Self::TOLERANCE_VAR, fallback.tolerance)?,
            supermajority_threshold: read_f64(&lookup, Self::THRESHOLD_VAR, fallback.supermajority_threshold)?,
            escalation: read_f64(&lookup, Self::ESCALATION_VAR, fallback.escalation)?,
        })
    }
}

fn read_f64(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &str,
    fallback: f64,
) -> Result<f64, ConfigurationError> {
    match lookup(var) {
        Some(value) => {
            debug!("{} set to {}", var, value);
            value.trim().parse().map_err(|_| ConfigurationError::Environment {
                var: var.to_string(),
                value,
            })
        }
        None => Ok(fallback),
    }
}
