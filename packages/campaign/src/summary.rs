//! Per-engine outcome aggregation and the free-text run summary.

use serde::{Deserialize, Serialize};

use crate::types::{EngineRun, EngineRunState, ResultOutcome, SubmissionStatus};

/// Outcome tallies for one engine run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeCounts {
    pub submitted: usize,
    pub no_form_found: usize,
    pub submission_failed: usize,
    pub confirmation_not_detected: usize,
}

impl OutcomeCounts {
    pub fn tally(outcomes: &[ResultOutcome]) -> Self {
        let mut counts = Self::default();
        for outcome in outcomes {
            match outcome.status {
                SubmissionStatus::Submitted => counts.submitted += 1,
                SubmissionStatus::NoFormFound => counts.no_form_found += 1,
                SubmissionStatus::SubmissionFailed => counts.submission_failed += 1,
                SubmissionStatus::ConfirmationNotDetected => counts.confirmation_not_detected += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.submitted + self.no_form_found + self.submission_failed + self.confirmation_not_detected
    }

    /// Visits that actually attempted a submission (a page with no form is
    /// not an attempt).
    pub fn attempts(&self) -> usize {
        self.total() - self.no_form_found
    }
}

/// Render the free-text summary appended to an engine's transcript.
pub fn render_summary(run: &EngineRun) -> String {
    let counts = OutcomeCounts::tally(&run.outcomes);
    let mut out = String::new();

    out.push_str(&format!(
        "Summary for {engine} (query: {query:?})\n",
        engine = run.engine,
        query = run.query,
    ));

    if run.state == EngineRunState::Aborted && run.outcomes.is_empty() {
        out.push_str("Run aborted before any result was processed: 0 results processed.\n");
        return out;
    }

    out.push_str(&format!(
        "Results visited: {total} | submitted: {submitted} | no-form-found: {no_form} | \
         submission-failed: {failed} | confirmation-not-detected: {undetected}\n",
        total = counts.total(),
        submitted = counts.submitted,
        no_form = counts.no_form_found,
        failed = counts.submission_failed,
        undetected = counts.confirmation_not_detected,
    ));

    let confirmations: Vec<&ResultOutcome> = run
        .outcomes
        .iter()
        .filter(|o| o.confirmation.is_some())
        .collect();
    if !confirmations.is_empty() {
        out.push_str("Notable confirmations:\n");
        for outcome in confirmations {
            out.push_str(&format!(
                "  {url}: {message}\n",
                url = outcome.url,
                message = outcome.confirmation.as_deref().unwrap_or_default(),
            ));
        }
    }

    if run.state == EngineRunState::Aborted {
        out.push_str("Run aborted before all results were processed.\n");
    }

    out
}
