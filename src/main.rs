use anyhow::Context;
use clap::Parser;
use colored::*;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod checks;
mod cli;
mod config;
mod error;
mod executor;
mod orchestrator;
mod privilege;
mod steps;
mod summary;
mod ui;

use cli::Cli;
use config::Config;
use error::ProvisionError;
use executor::CommandRunner;
use orchestrator::Orchestrator;
use ui::Reporter;

fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

async fn run(cli: &Cli, reporter: &Reporter) -> anyhow::Result<()> {
    // 설정 파일이 root 전용일 수 있으므로 권한부터 확인
    let euid = privilege::effective_uid();
    privilege::require_root(euid)?;

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    let runner = CommandRunner::new();
    let mut orchestrator = Orchestrator::new(&config, &runner, reporter, euid);
    let result = orchestrator.run().await;
    tracing::debug!(state = ?orchestrator.state(), "orchestrator stopped");

    let report = result?;
    tracing::debug!(
        skipped = ?report.skipped(),
        steps = report.outcomes.len(),
        address = %report.address,
        "provisioning finished"
    );

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    if cli.debug {
        println!("{} {:?}", "DEBUG:".yellow(), cli);
    }

    let reporter = Reporter::new();
    match run(&cli, &reporter).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<ProvisionError>() {
                Some(provision_err) if err.chain().count() == 1 => reporter.fatal(provision_err),
                _ => reporter.error(format!("{:#}", err)),
            }
            ExitCode::FAILURE
        }
    }
}
