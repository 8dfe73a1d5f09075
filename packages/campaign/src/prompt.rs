//! Natural-language task instructions for the browser agent.
//!
//! The agent accepts a single instruction string describing the full
//! multi-step task. Everything this system controls (identity values, consent
//! handling, the no-form marker wording the classifier keys on) is pinned
//! here; field values the system does not control are explicitly delegated.

use url::Url;

use crate::types::{RegistrationPayload, SearchEngine};

/// Instruction for a first-page search on one engine.
pub fn search_instruction(engine: SearchEngine, query: &str) -> String {
    format!(
        "Go to {homepage} and search for: {query}\n\
         \n\
         List every organic result on the FIRST page only, top to bottom, one \
         full URL per line. Do not open the results, do not reorder them, and \
         do not skip duplicates. Ignore ads and sponsored entries.",
        homepage = engine.homepage(),
        query = query,
    )
}

/// Instruction for one registration attempt.
///
/// `captcha_failures` is how many captcha-blocked attempts this session has
/// already seen; past the limit the agent is told to stop fighting captchas.
pub fn registration_instruction(
    url: &Url,
    payload: &RegistrationPayload,
    captcha_failures: u32,
    captcha_failure_limit: u32,
) -> String {
    let captcha_note = if captcha_failures >= captcha_failure_limit {
        "\nIf you encounter a captcha, do NOT attempt to solve it; state that a captcha blocked the form and stop."
    } else {
        "\nIf you encounter a captcha, attempt it once before giving up on the form."
    };

    format!(
        "Visit the URL: {url}\n\
         \n\
         Your task is to find and successfully submit a newsletter signup, contact, or subscription form.\n\
         \n\
         STEP 1 - FORM DETECTION:\n\
         Search thoroughly for forms containing any of these keywords (in any language):\n\
         - Newsletter, subscribe, subscription, abonnieren, anmelden\n\
         - Contact, kontakt, kontaktformular\n\
         - Email signup, email list, mailing list\n\
         - Register, registration, registrierung\n\
         - Stay updated, get updates, news updates\n\
         \n\
         STEP 2 - FORM ANALYSIS:\n\
         Identify the required fields, the email field, any name fields, consent \
         checkboxes, and the submit button before filling anything.\n\
         \n\
         STEP 3 - FORM FILLING:\n\
         Fill the form with exactly this information:\n\
         - First Name: {first_name}\n\
         - Last Name: {last_name}\n\
         - Full Name: {full_name}\n\
         - Email: {email}\n\
         - Any other required field: choose an appropriate valid value yourself\n\
         \n\
         STEP 4 - CONSENT AND SUBMISSION:\n\
         Check ALL required consent checkboxes (privacy policy, terms, GDPR), then \
         click the submit/send/register button and wait for the page to respond.\n\
         \n\
         STEP 5 - VERIFICATION:\n\
         Look for a success message, confirmation page, thank-you text, or email \
         verification notice, and quote it in your report.\n\
         \n\
         Handle pop-ups, cookie banners, or overlays that block the form. Wait for \
         page loads between actions.{captcha_note}\n\
         If no form exists after a thorough search, state exactly: NO FORM FOUND\n\
         \n\
         Report your final status clearly at the end.",
        url = url,
        first_name = payload.first_name,
        last_name = payload.last_name,
        full_name = payload.full_name(),
        email = payload.email,
        captcha_note = captcha_note,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> RegistrationPayload {
        RegistrationPayload {
            first_name: "Max".to_string(),
            last_name: "Mustermann".to_string(),
            email: "news-site.example@example.news".to_string(),
        }
    }

    #[test]
    fn search_instruction_pins_first_page_and_order() {
        let text = search_instruction(SearchEngine::Bing, "artisan bakery newsletter");
        assert!(text.contains("https://www.bing.com"));
        assert!(text.contains("artisan bakery newsletter"));
        assert!(text.contains("FIRST page only"));
        assert!(text.contains("do not reorder"));
    }

    #[test]
    fn registration_instruction_carries_identity_and_marker() {
        let url: Url = "https://site.example/blog".parse().unwrap();
        let text = registration_instruction(&url, &payload(), 0, 5);
        assert!(text.contains("https://site.example/blog"));
        assert!(text.contains("First Name: Max"));
        assert!(text.contains("Full Name: Max Mustermann"));
        assert!(text.contains("news-site.example@example.news"));
        assert!(text.contains("NO FORM FOUND"));
        assert!(text.contains("attempt it once"));
    }

    #[test]
    fn captcha_limit_switches_to_skip_wording() {
        let url: Url = "https://site.example".parse().unwrap();
        let text = registration_instruction(&url, &payload(), 5, 5);
        assert!(text.contains("do NOT attempt to solve it"));
    }
}
