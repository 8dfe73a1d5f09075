//! Integration tests for the campaign orchestration loop.
//!
//! These exercise the full flow with a scripted agent: search each engine,
//! visit first-page results in order, record one outcome per visit, summarize
//! per engine, and keep engine failures isolated from each other.

use tokio_util::sync::CancellationToken;
use url::Url;

use campaign::testing::{confirmation_not_detected, no_form, submitted, MockAgent, MockAgentCall};
use campaign::{
    run_campaign, CampaignDefinition, EngineRunState, IdentityConfig, MemoryLogSink,
    MemoryProgressStore, ProgressStore, SearchEngine, SubmissionStatus,
};

fn identity() -> IdentityConfig {
    IdentityConfig::new("Max", "Mustermann", "news-{domain}@example.news")
}

fn definitions() -> Vec<CampaignDefinition> {
    SearchEngine::ALL
        .iter()
        .map(|engine| CampaignDefinition::new(*engine, "x"))
        .collect()
}

#[tokio::test]
async fn google_scenario_counts_one_of_each() {
    // 3 results: 1 confirms, 1 times out waiting for confirmation, 1 has no form.
    let agent = MockAgent::new()
        .with_search(
            SearchEngine::Google,
            &[
                "https://a.example.com/",
                "https://b.example.com/",
                "https://c.example.com/",
            ],
        )
        .with_attempt("https://a.example.com/", submitted("Thank you for subscribing"))
        .with_attempt("https://b.example.com/", confirmation_not_detected())
        .with_attempt("https://c.example.com/", no_form());
    let logs = MemoryLogSink::new();
    let progress = MemoryProgressStore::new();

    let defs = vec![CampaignDefinition::new(SearchEngine::Google, "x")];
    let report = run_campaign(
        &defs,
        &identity(),
        &agent,
        &logs,
        &progress,
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(report.runs.len(), 1);
    let run = &report.runs[0];
    assert_eq!(run.state, EngineRunState::Done);
    assert_eq!(run.outcomes.len(), 3);

    let statuses: Vec<_> = run.outcomes.iter().map(|o| o.status).collect();
    assert_eq!(
        statuses,
        vec![
            SubmissionStatus::Submitted,
            SubmissionStatus::ConfirmationNotDetected,
            SubmissionStatus::NoFormFound,
        ]
    );

    let summary = run.summary.as_deref().unwrap();
    assert!(summary.contains("submitted: 1"));
    assert!(summary.contains("confirmation-not-detected: 1"));
    assert!(summary.contains("no-form-found: 1"));
    assert!(summary.contains("Thank you for subscribing"));
}

#[tokio::test]
async fn one_engine_failing_does_not_suppress_the_others() {
    let agent = MockAgent::new()
        .with_search(SearchEngine::Google, &["https://a.example.com/"])
        .with_attempt("https://a.example.com/", submitted("Thanks!"))
        .with_search_failure(SearchEngine::Bing, "engine unreachable")
        .with_search(SearchEngine::Yahoo, &["https://b.example.com/"])
        .with_attempt("https://b.example.com/", no_form());
    let logs = MemoryLogSink::new();
    let progress = MemoryProgressStore::new();

    let report = run_campaign(
        &definitions(),
        &identity(),
        &agent,
        &logs,
        &progress,
        CancellationToken::new(),
    )
    .await
    .unwrap();

    // One EngineRun per configured engine, regardless of Bing's failure.
    assert_eq!(report.runs.len(), 3);

    let bing = &report.runs[1];
    assert_eq!(bing.engine, SearchEngine::Bing);
    assert_eq!(bing.state, EngineRunState::Aborted);
    assert!(bing.outcomes.is_empty());
    assert!(bing
        .summary
        .as_deref()
        .unwrap()
        .contains("0 results processed"));

    // Bing's own transcript carries the aborted-run notice.
    let bing_log = logs.lines(SearchEngine::Bing).join("\n");
    assert!(bing_log.contains("search failed"));
    assert!(bing_log.contains("0 results processed"));

    // The other two engines completed normally with their own transcripts.
    assert_eq!(report.runs[0].state, EngineRunState::Done);
    assert_eq!(report.runs[2].state, EngineRunState::Done);
    assert!(logs.lines(SearchEngine::Google).join("\n").contains("[submitted]"));
    assert!(logs.lines(SearchEngine::Yahoo).join("\n").contains("[no-form-found]"));
}

#[tokio::test]
async fn outcome_order_mirrors_page_order_including_duplicates() {
    let urls = [
        "https://one.example.com/",
        "https://two.example.com/",
        "https://one.example.com/",
    ];
    // Two scripted attempts for the URL listed twice.
    let agent = MockAgent::new()
        .with_search(SearchEngine::Google, &urls)
        .with_attempt("https://one.example.com/", no_form())
        .with_attempt("https://one.example.com/", no_form())
        .with_attempt("https://two.example.com/", no_form());
    let logs = MemoryLogSink::new();
    let progress = MemoryProgressStore::new();

    let defs = vec![CampaignDefinition::new(SearchEngine::Google, "x")];
    let report = run_campaign(
        &defs,
        &identity(),
        &agent,
        &logs,
        &progress,
        CancellationToken::new(),
    )
    .await
    .unwrap();

    // The duplicate was marked processed by its first visit and skipped on
    // the second listing; the recorded order still mirrors page order.
    let visited: Vec<_> = report.runs[0]
        .outcomes
        .iter()
        .map(|o| o.url.as_str().to_string())
        .collect();
    assert_eq!(
        visited,
        vec!["https://one.example.com/", "https://two.example.com/"]
    );
}

#[tokio::test]
async fn attempt_error_yields_exactly_one_failed_outcome() {
    let agent = MockAgent::new()
        .with_search(SearchEngine::Google, &["https://broken.example.com/"])
        .with_attempt_failure("https://broken.example.com/", "submit button threw");
    let logs = MemoryLogSink::new();
    let progress = MemoryProgressStore::new();

    let defs = vec![CampaignDefinition::new(SearchEngine::Google, "x")];
    let report = run_campaign(
        &defs,
        &identity(),
        &agent,
        &logs,
        &progress,
        CancellationToken::new(),
    )
    .await
    .unwrap();

    let run = &report.runs[0];
    assert_eq!(run.state, EngineRunState::Done);
    assert_eq!(run.outcomes.len(), 1);
    assert_eq!(run.outcomes[0].status, SubmissionStatus::SubmissionFailed);
    assert!(run.outcomes[0].error.as_deref().unwrap().contains("submit button threw"));
}

#[tokio::test]
async fn confirmation_timeout_is_recorded_not_left_pending() {
    let agent = MockAgent::new()
        .with_search(SearchEngine::Google, &["https://slow.example.com/"])
        .with_attempt_error(
            "https://slow.example.com/",
            campaign::CampaignError::ConfirmationTimeout {
                url: "https://slow.example.com/".to_string(),
                seconds: 900,
            },
        );
    let logs = MemoryLogSink::new();
    let progress = MemoryProgressStore::new();

    let defs = vec![CampaignDefinition::new(SearchEngine::Google, "x")];
    let report = run_campaign(
        &defs,
        &identity(),
        &agent,
        &logs,
        &progress,
        CancellationToken::new(),
    )
    .await
    .unwrap();

    let run = &report.runs[0];
    assert_eq!(run.outcomes.len(), 1);
    assert_eq!(
        run.outcomes[0].status,
        SubmissionStatus::ConfirmationNotDetected
    );
    assert_eq!(run.state, EngineRunState::Done);
}

#[tokio::test]
async fn no_form_found_carries_no_confirmation() {
    let agent = MockAgent::new()
        .with_search(SearchEngine::Yahoo, &["https://plain.example.com/"])
        .with_attempt("https://plain.example.com/", no_form());
    let logs = MemoryLogSink::new();
    let progress = MemoryProgressStore::new();

    let defs = vec![CampaignDefinition::new(SearchEngine::Yahoo, "x")];
    let report = run_campaign(
        &defs,
        &identity(),
        &agent,
        &logs,
        &progress,
        CancellationToken::new(),
    )
    .await
    .unwrap();

    let outcome = &report.runs[0].outcomes[0];
    assert_eq!(outcome.status, SubmissionStatus::NoFormFound);
    assert!(!outcome.form_found);
    assert!(outcome.confirmation.is_none());
}

#[tokio::test]
async fn payloads_derive_one_email_per_target_domain() {
    let agent = MockAgent::new().with_search(
        SearchEngine::Google,
        &["https://www.alpha.example.com/", "https://beta.example.org/"],
    );
    let logs = MemoryLogSink::new();
    let progress = MemoryProgressStore::new();

    let defs = vec![CampaignDefinition::new(SearchEngine::Google, "x")];
    run_campaign(
        &defs,
        &identity(),
        &agent,
        &logs,
        &progress,
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(
        agent.attempted_emails(),
        vec![
            "news-alpha.example.com@example.news",
            "news-beta.example.org@example.news",
        ]
    );
}

#[tokio::test]
async fn already_processed_urls_are_skipped() {
    let agent = MockAgent::new()
        .with_search(
            SearchEngine::Google,
            &["https://seen.example.com/", "https://new.example.com/"],
        )
        .with_attempt("https://new.example.com/", submitted("Danke!"));
    let logs = MemoryLogSink::new();
    let progress = MemoryProgressStore::new();
    progress
        .mark_processed(&Url::parse("https://seen.example.com/").unwrap())
        .await
        .unwrap();

    let defs = vec![CampaignDefinition::new(SearchEngine::Google, "x")];
    let report = run_campaign(
        &defs,
        &identity(),
        &agent,
        &logs,
        &progress,
        CancellationToken::new(),
    )
    .await
    .unwrap();

    // Only the fresh URL was visited; the skip is noted in the transcript.
    assert_eq!(report.runs[0].outcomes.len(), 1);
    assert_eq!(report.runs[0].outcomes[0].url.as_str(), "https://new.example.com/");
    assert!(logs
        .lines(SearchEngine::Google)
        .join("\n")
        .contains("skipping already processed"));
    assert_eq!(progress.completed_urls(), vec!["https://new.example.com/"]);

    let attempts = agent
        .calls()
        .iter()
        .filter(|call| matches!(call, MockAgentCall::Attempt { .. }))
        .count();
    assert_eq!(attempts, 1);
}

#[tokio::test]
async fn cancellation_aborts_remaining_engines_but_keeps_the_run_count() {
    let cancel = CancellationToken::new();
    cancel.cancel();

    let agent = MockAgent::new();
    let logs = MemoryLogSink::new();
    let progress = MemoryProgressStore::new();

    let report = run_campaign(
        &definitions(),
        &identity(),
        &agent,
        &logs,
        &progress,
        cancel,
    )
    .await
    .unwrap();

    assert_eq!(report.runs.len(), 3);
    for run in &report.runs {
        assert_eq!(run.state, EngineRunState::Aborted);
        assert!(run.outcomes.is_empty());
    }
    // No search was ever issued.
    assert!(agent.calls().is_empty());
}
