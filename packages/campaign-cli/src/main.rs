//! Newsletter campaign runner.
//!
//! `campaign run` executes one campaign immediately; `campaign schedule`
//! repeats it once per day at a fixed UTC time. Configuration comes from the
//! environment (see `CampaignConfig::from_env`).

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{NaiveTime, Utc};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agent_client::AgentClient;
use campaign::{
    run_campaign, CampaignConfig, CampaignReport, FileLogSink, FileProgressStore, OutcomeCounts,
    RunnerAgent,
};

#[derive(Parser)]
#[command(name = "campaign", about = "Drive the newsletter signup campaign")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute one campaign now
    Run {
        /// Attempts for whole-run fatal failures (environment unavailability)
        #[arg(long, default_value_t = 3)]
        retries: u32,

        /// Delay between attempts, in seconds
        #[arg(long, default_value_t = 10)]
        retry_delay_secs: u64,
    },
    /// Execute the campaign once per day at a fixed UTC time
    Schedule {
        /// Time of day as HH:MM, UTC
        #[arg(long, default_value = "06:00")]
        at: String,

        #[arg(long, default_value_t = 3)]
        retries: u32,

        #[arg(long, default_value_t = 10)]
        retry_delay_secs: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,campaign=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = CampaignConfig::from_env()?;

    // Finish the in-flight visit, then stop between visits.
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupt received, stopping after the in-flight visit");
                cancel.cancel();
            }
        });
    }

    match cli.command {
        Commands::Run {
            retries,
            retry_delay_secs,
        } => {
            let report = run_with_retries(&config, &cancel, retries, retry_delay_secs).await?;
            print_report(&config, &report);
        }
        Commands::Schedule {
            at,
            retries,
            retry_delay_secs,
        } => {
            let at = NaiveTime::parse_from_str(&at, "%H:%M").context("--at must be HH:MM (UTC)")?;
            while !cancel.is_cancelled() {
                let wait = until_next(at);
                tracing::info!(seconds = wait.as_secs(), "Sleeping until next scheduled run");
                tokio::select! {
                    _ = tokio::time::sleep(wait) => {}
                    _ = cancel.cancelled() => break,
                }
                let report = run_with_retries(&config, &cancel, retries, retry_delay_secs).await?;
                print_report(&config, &report);
            }
        }
    }

    Ok(())
}

/// Run one campaign, retrying whole-run fatal failures a bounded number of
/// times. Per-result and per-engine failures never reach this level; whatever
/// arrives here means the environment itself was unavailable.
async fn run_with_retries(
    config: &CampaignConfig,
    cancel: &CancellationToken,
    retries: u32,
    retry_delay_secs: u64,
) -> Result<CampaignReport> {
    let attempts = retries.max(1);
    let mut last_error = None;

    for attempt in 1..=attempts {
        match run_once(config, cancel.clone()).await {
            Ok(report) => return Ok(report),
            Err(e) => {
                tracing::error!(attempt, max = attempts, error = %e, "Campaign run failed");
                last_error = Some(e);
                if attempt < attempts && !cancel.is_cancelled() {
                    tokio::time::sleep(Duration::from_secs(retry_delay_secs)).await;
                }
            }
        }
    }

    Err(anyhow::Error::new(last_error.expect("at least one attempt ran"))
        .context("max retries exceeded"))
}

async fn run_once(
    config: &CampaignConfig,
    cancel: CancellationToken,
) -> campaign::Result<CampaignReport> {
    let client = AgentClient::new(config.agent_base_url.clone(), config.agent_token.clone());
    let agent = RunnerAgent::new(client, config.run_options.clone());
    let logs = FileLogSink::new(&config.log_dir);
    let progress = FileProgressStore::new(&config.state_dir);

    run_campaign(
        &config.definitions(),
        &config.identity,
        &agent,
        &logs,
        &progress,
        cancel,
    )
    .await
}

fn print_report(config: &CampaignConfig, report: &CampaignReport) {
    println!(
        "Campaign {} finished: {} results visited, {} submissions confirmed",
        report.campaign_id,
        report.visited_count(),
        report.submitted_count(),
    );
    for run in &report.runs {
        let counts = OutcomeCounts::tally(&run.outcomes);
        println!(
            "  {}: {:?} - submitted {}, no-form {}, failed {}, unconfirmed {}",
            run.engine,
            run.state,
            counts.submitted,
            counts.no_form_found,
            counts.submission_failed,
            counts.confirmation_not_detected,
        );
    }
    println!("Transcripts in {}", config.log_dir.display());
}

/// Time until the next occurrence of `at` (UTC).
fn until_next(at: NaiveTime) -> Duration {
    let now = Utc::now();
    let today = now.date_naive().and_time(at).and_utc();
    let next = if today > now {
        today
    } else {
        today + chrono::Duration::days(1)
    };
    (next - now).to_std().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_run_is_always_within_a_day() {
        for hour in 0..24 {
            let at = NaiveTime::from_hms_opt(hour, 30, 0).unwrap();
            let wait = until_next(at);
            assert!(wait <= Duration::from_secs(24 * 60 * 60));
        }
    }
}
