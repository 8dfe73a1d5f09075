//! Sequential campaign orchestration.
//!
//! One engine at a time, one result at a time: result visits perform real
//! form submissions on third-party sites, so nothing here runs concurrently.
//! Failures are contained at the smallest granularity: a failed visit
//! becomes one recorded outcome, a failed search aborts one engine run, and
//! only environment failures (sink or progress store I/O) escape the
//! campaign.

use chrono::Utc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use url::Url;
use uuid::Uuid;

use crate::error::{CampaignError, Result};
use crate::identity::IdentityConfig;
use crate::summary::render_summary;
use crate::traits::{LogSink, ProgressStore, RegistrationAgent, SearchProvider};
use crate::types::{
    CampaignDefinition, CampaignReport, EngineRun, EngineRunState, RegistrationAttempt,
    ResultOutcome, SubmissionStatus,
};

/// Run a full campaign: one EngineRun per definition, in order.
///
/// The returned report always carries exactly as many EngineRuns as there are
/// definitions, whatever happened to the individual engines.
pub async fn run_campaign(
    definitions: &[CampaignDefinition],
    identity: &IdentityConfig,
    agent: &(impl SearchProvider + RegistrationAgent),
    logs: &impl LogSink,
    progress: &impl ProgressStore,
    cancel: CancellationToken,
) -> Result<CampaignReport> {
    let campaign_id = Uuid::new_v4();
    let started_at = Utc::now();
    tracing::info!(
        campaign_id = %campaign_id,
        engines = definitions.len(),
        "Starting campaign"
    );

    let mut runs = Vec::with_capacity(definitions.len());

    for definition in definitions {
        let run = run_engine(definition, identity, agent, logs, progress, &cancel).await?;
        tracing::info!(
            engine = %run.engine,
            state = ?run.state,
            outcomes = run.outcomes.len(),
            "Engine run finished"
        );
        runs.push(run);
    }

    let report = CampaignReport {
        campaign_id,
        started_at,
        finished_at: Utc::now(),
        runs,
    };
    tracing::info!(
        campaign_id = %campaign_id,
        visited = report.visited_count(),
        submitted = report.submitted_count(),
        "Campaign finished"
    );
    Ok(report)
}

/// Execute one engine's slice of the campaign. Never returns an engine-level
/// error: search failure and cancellation finalize the run as `Aborted` and
/// the campaign moves on.
async fn run_engine(
    definition: &CampaignDefinition,
    identity: &IdentityConfig,
    agent: &(impl SearchProvider + RegistrationAgent),
    logs: &impl LogSink,
    progress: &impl ProgressStore,
    cancel: &CancellationToken,
) -> Result<EngineRun> {
    let engine = definition.engine;
    let mut run = EngineRun::new(engine, definition.query.clone());

    if cancel.is_cancelled() {
        logs.append(engine, &stamp("campaign cancelled before this engine ran"))
            .await?;
        return finish(run, EngineRunState::Aborted, logs).await;
    }

    run.state = EngineRunState::Searching;
    logs.append(
        engine,
        &stamp(&format!("engine run started (query: {:?})", run.query)),
    )
    .await?;

    let urls = match agent.search(engine, &definition.query).await {
        Ok(urls) => urls,
        Err(e) => {
            tracing::warn!(engine = %engine, error = %e, "Search failed, aborting engine run");
            logs.append(engine, &stamp(&format!("search failed: {e}")))
                .await?;
            return finish(run, EngineRunState::Aborted, logs).await;
        }
    };
    logs.append(
        engine,
        &stamp(&format!("search returned {} first-page results", urls.len())),
    )
    .await?;

    run.state = EngineRunState::Visiting;
    let mut cancelled_mid_run = false;

    for url in urls {
        if cancel.is_cancelled() {
            cancelled_mid_run = true;
            logs.append(engine, &stamp("campaign cancelled between result visits"))
                .await?;
            break;
        }

        if progress.is_processed(&url).await? {
            logs.append(engine, &stamp(&format!("skipping already processed {url}")))
                .await?;
            continue;
        }

        let outcome = visit_result(&url, identity, agent).await;
        logs.append(engine, &outcome_line(&outcome)).await?;
        if let Some(message) = &outcome.confirmation {
            logs.append(engine, &stamp(&format!("confirmation: {message}")))
                .await?;
        }

        progress.mark_processed(&url).await?;
        if outcome.status == SubmissionStatus::Submitted {
            progress.mark_completed(&url).await?;
        }
        run.record(outcome);
    }

    let terminal = if cancelled_mid_run {
        EngineRunState::Aborted
    } else {
        run.state = EngineRunState::Summarizing;
        EngineRunState::Done
    };
    finish(run, terminal, logs).await
}

/// Visit one result URL and produce exactly one outcome, whatever happens.
async fn visit_result(
    url: &Url,
    identity: &IdentityConfig,
    agent: &impl RegistrationAgent,
) -> ResultOutcome {
    let payload = identity.payload_for(url);
    let started = Instant::now();

    match agent.attempt_registration(url, &payload).await {
        Ok(attempt) => {
            ResultOutcome::from_attempt(url.clone(), attempt, started.elapsed().as_secs_f64())
        }
        Err(e) => {
            tracing::warn!(url = %url, error = %e, "Registration attempt errored");
            // A timed-out confirmation wait is not a failed submission: the
            // form was filled and sent, the signal just never showed up.
            let status = match &e {
                CampaignError::ConfirmationTimeout { .. } => {
                    SubmissionStatus::ConfirmationNotDetected
                }
                _ => SubmissionStatus::SubmissionFailed,
            };
            ResultOutcome::from_attempt(
                url.clone(),
                RegistrationAttempt {
                    form_found: status == SubmissionStatus::ConfirmationNotDetected,
                    status,
                    confirmation: None,
                    error: Some(e.to_string()),
                    captcha: false,
                },
                started.elapsed().as_secs_f64(),
            )
        }
    }
}

/// Render the summary, append it to the engine's transcript, and finalize
/// the run in `state`.
async fn finish(
    mut run: EngineRun,
    state: EngineRunState,
    logs: &impl LogSink,
) -> Result<EngineRun> {
    run.state = state;
    let summary = render_summary(&run);
    for line in summary.lines() {
        logs.append(run.engine, line).await?;
    }
    run.finish(state, summary);
    Ok(run)
}

fn stamp(message: &str) -> String {
    format!("{} - {}", Utc::now().format("%Y-%m-%d %H:%M:%S"), message)
}

fn outcome_line(outcome: &ResultOutcome) -> String {
    let mut line = stamp(&format!(
        "[{status}] {url} - Form: {form}, Time: {secs:.1}s",
        status = outcome.status,
        url = outcome.url,
        form = outcome.form_found,
        secs = outcome.processing_secs,
    ));
    if let Some(error) = &outcome.error {
        line.push_str(&format!(" ({error})"));
    }
    line
}
