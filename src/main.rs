use clap::Parser;
use log::{error, info};
use rla_verify::cli::Cli;
use rla_verify::config::{AuditConfig, AuditType, EnvDefaults, SocialChoice};
use rla_verify::verifier::{verify, Status};
use rla_verify::{loader, report};
use std::process::ExitCode;

const EXIT_REJECTED: u8 = 1;
const EXIT_INVALID: u8 = 2;

fn build_config(cli: &Cli) -> Result<AuditConfig, Box<dyn std::error::Error>> {
    let social_choice: SocialChoice = cli.social_choice.parse()?;
    let audit_type: AuditType = cli.audit_type.parse()?;
    let defaults = EnvDefaults::from_env()?;

    let mut config = AuditConfig::new(cli.risk_limit, cli.p_value, social_choice, audit_type)?
        .with_winners(cli.winners)?
        .with_defaults(&defaults)?;
    if let Some(tolerance) = cli.tolerance {
        config = config.with_tolerance(tolerance)?;
    }
    if let Some(threshold) = cli.threshold {
        config = config.with_supermajority_threshold(threshold)?;
    }
    Ok(config)
}

fn main() -> ExitCode {
    // Initialize logging
    dotenvy::dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            eprintln!("Invalid configuration: {}", e);
            return ExitCode::from(EXIT_INVALID);
        }
    };

    let election = match loader::load_preliminary(&cli.preliminary) {
        Ok(election) => election,
        Err(e) => {
            error!("Failed to load preliminary results: {}", e);
            eprintln!("Failed to load preliminary results: {}", e);
            return ExitCode::from(EXIT_INVALID);
        }
    };

    let sample = match loader::load_recount_dir(&cli.recount, config.audit_type()) {
        Ok(sample) => sample,
        Err(e) => {
            error!("Failed to load recount files: {}", e);
            eprintln!("Failed to load recount files: {}", e);
            return ExitCode::from(EXIT_INVALID);
        }
    };
    info!(
        "Verifying {} {} audit over {} recount records",
        config.social_choice(),
        config.audit_type(),
        sample.len()
    );

    let verdict = verify(&election, &sample, &config);

    if cli.json {
        match report::RunReport::new(&config, &verdict).to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                error!("Failed to serialize report: {}", e);
                return ExitCode::from(EXIT_INVALID);
            }
        }
    } else {
        println!("{}", report::summary(&verdict));
    }

    match verdict.status() {
        Status::Confirmed => ExitCode::SUCCESS,
        Status::Rejected => ExitCode::from(EXIT_REJECTED),
        Status::InvalidInput => ExitCode::from(EXIT_INVALID),
    }
}
