//! Keyword classification of agent transcripts.
//!
//! The browser agent reports free text. These heuristics map that text onto
//! the outcome taxonomy: did the agent find a form, did the submission draw a
//! confirmation signal, did it hit a captcha. Matching is case-insensitive
//! substring search over the whole transcript.

use url::Url;

use crate::types::{RegistrationAttempt, SubmissionStatus};

/// Phrases indicating the agent located a signup form.
const FORM_KEYWORDS: &[&str] = &["form found", "newsletter", "subscribe", "contact", "email"];

/// Phrases indicating the submission drew a confirmation signal.
const SUCCESS_KEYWORDS: &[&str] = &[
    "success",
    "submitted",
    "thank you",
    "confirmation",
    "registered",
    "subscribed",
    "sent",
];

/// The agent is instructed to state this verbatim when no form exists.
const NO_FORM_MARKER: &str = "no form found";

/// Classify a registration-attempt transcript.
///
/// `complete` is false when the runner cut the task off before the agent
/// reported a final status.
pub fn classify_transcript(text: &str, complete: bool) -> RegistrationAttempt {
    let lower = text.to_lowercase();
    let captcha = lower.contains("captcha");

    if !complete {
        return RegistrationAttempt {
            form_found: FORM_KEYWORDS.iter().any(|k| lower.contains(k)),
            status: SubmissionStatus::SubmissionFailed,
            confirmation: None,
            error: Some("task did not complete within the step budget".to_string()),
            captcha,
        };
    }

    if lower.contains(NO_FORM_MARKER) {
        return RegistrationAttempt {
            form_found: false,
            status: SubmissionStatus::NoFormFound,
            confirmation: None,
            error: None,
            captcha,
        };
    }

    if SUCCESS_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return RegistrationAttempt {
            form_found: true,
            status: SubmissionStatus::Submitted,
            confirmation: confirmation_line(text),
            error: None,
            captcha: false,
        };
    }

    if FORM_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return RegistrationAttempt {
            form_found: true,
            status: SubmissionStatus::ConfirmationNotDetected,
            confirmation: None,
            error: None,
            captcha,
        };
    }

    RegistrationAttempt {
        form_found: false,
        status: SubmissionStatus::SubmissionFailed,
        confirmation: None,
        error: Some("transcript did not report a recognizable outcome".to_string()),
        captcha,
    }
}

/// Pull the line carrying the confirmation signal out of a transcript, for
/// the per-engine summary.
fn confirmation_line(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .find(|line| {
            let lower = line.to_lowercase();
            SUCCESS_KEYWORDS.iter().any(|k| lower.contains(k))
        })
        .map(|line| line.to_string())
}

/// Extract result URLs from a search transcript, in the order the agent
/// listed them. Duplicates are kept: outcome order must mirror page order.
pub fn extract_result_urls(text: &str) -> Vec<Url> {
    let mut urls = Vec::new();
    for token in text.split_whitespace() {
        let trimmed = token.trim_end_matches(|c: char| ",.;:)]}\"'".contains(c));
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            if let Ok(url) = Url::parse(trimmed) {
                urls.push(url);
            }
        }
    }
    urls
}
