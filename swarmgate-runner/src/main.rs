//! Swarmgate
//!
//! Runs a browser test job on a TestSwarm server as one step of a CI build.
//!
//! Architecture:
//! - Configuration: JSON job configuration plus command line overrides
//! - Variables: build variable and environment substitution
//! - Repositories: HTTP communication with the TestSwarm server
//! - Scheduler: job status polling and verdict classification
//! - Services: submission, TAP reporting and orchestration
//!
//! The process exits with 0 when the job passes, 1 when it fails and 2 when
//! the build is cancelled while waiting for results.

mod config;
mod context;
mod repository;
mod scheduler;
mod service;
mod variables;

#[cfg(test)]
mod testing;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::RawJobConfig;
use crate::context::{BuildContext, BuildResult, TerminalConsole};
use crate::repository::{HttpSwarmRepository, SwarmRepository};
use crate::scheduler::DEFAULT_GRACE_PERIOD;
use crate::service::Orchestrator;
use crate::variables::{BuildVarProvider, VariableResolver, parse_build_var};

#[derive(Parser)]
#[command(name = "swarmgate")]
#[command(about = "Run a TestSwarm job as a CI build step", long_about = None)]
struct Cli {
    /// Job configuration file (JSON)
    #[arg(long, env = "SWARMGATE_CONFIG")]
    config: PathBuf,

    /// Build workspace where the TAP report is written
    #[arg(long, env = "SWARMGATE_WORKSPACE", default_value = ".")]
    workspace: PathBuf,

    /// Build variable available to the configuration (KEY=VALUE, repeatable)
    #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_build_var)]
    vars: Vec<(String, String)>,

    /// Auth token, overriding the one in the configuration file
    #[arg(long, env = "SWARMGATE_AUTH_TOKEN", hide_env_values = true)]
    auth_token: Option<String>,

    /// Seconds to wait before the first status poll
    #[arg(long, default_value_t = DEFAULT_GRACE_PERIOD.as_secs())]
    grace_period_secs: u64,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "swarmgate_runner=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    info!("Loading job configuration from {}", cli.config.display());

    let raw = RawJobConfig::from_file(&cli.config)?.with_auth_token(cli.auth_token);
    let resolver = VariableResolver::for_build(BuildVarProvider::new(cli.vars));

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_interrupt(cancel.clone()));

    let context = BuildContext::new(cli.workspace, Arc::new(TerminalConsole));
    let orchestrator = Orchestrator::new(
        Arc::clone(&context),
        Duration::from_secs(cli.grace_period_secs),
        cancel,
    );

    let summary = orchestrator
        .run(raw, &resolver, |server_url| -> Arc<dyn SwarmRepository> {
            Arc::new(HttpSwarmRepository::new(server_url))
        })
        .await;

    match (&summary.verdict, &summary.report) {
        (Some(verdict), Some(report)) => info!(
            "Build finished: {:?} ({}), report at {}",
            summary.result,
            verdict,
            report.display()
        ),
        (Some(verdict), None) => info!("Build finished: {:?} ({})", summary.result, verdict),
        (None, _) => info!("Build finished: {:?}", summary.result),
    }

    let result = context.result().unwrap_or(BuildResult::Failure);
    Ok(ExitCode::from(result.exit_code()))
}

/// Cancels the build on Ctrl-C
async fn cancel_on_interrupt(cancel: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            info!("Received interrupt, aborting build");
            cancel.cancel();
        }
        Err(e) => warn!("Failed to listen for interrupt: {}", e),
    }
}
