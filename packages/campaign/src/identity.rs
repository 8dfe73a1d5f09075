//! Identity configuration and per-site email derivation.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::types::RegistrationPayload;

/// Placeholder replaced with the target site's domain in email templates.
const DOMAIN_PLACEHOLDER: &str = "{domain}";

/// The identity submitted into every form, loaded from configuration rather
/// than hardcoded so it can vary per run or per environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityConfig {
    pub first_name: String,
    pub last_name: String,
    /// Email address, or a template containing `{domain}` to derive one
    /// address per target site (e.g. `news-{domain}@example.news`).
    pub email_template: String,
}

impl IdentityConfig {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email_template: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email_template: email_template.into(),
        }
    }

    /// Build the payload for one target site, deriving the email address
    /// when the template carries a domain placeholder.
    pub fn payload_for(&self, url: &Url) -> RegistrationPayload {
        RegistrationPayload {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email_for(url),
        }
    }

    fn email_for(&self, url: &Url) -> String {
        if self.email_template.contains(DOMAIN_PLACEHOLDER) {
            self.email_template
                .replace(DOMAIN_PLACEHOLDER, &registrable_domain(url))
        } else {
            self.email_template.clone()
        }
    }
}

/// Host of `url` with any leading `www.` stripped.
pub fn registrable_domain(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    host.strip_prefix("www.").unwrap_or(host).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(template: &str) -> IdentityConfig {
        IdentityConfig::new("Max", "Mustermann", template)
    }

    #[test]
    fn templated_email_uses_target_domain() {
        let url: Url = "https://www.some-shop.de/news".parse().unwrap();
        let payload = identity("news-{domain}@example.news").payload_for(&url);
        assert_eq!(payload.email, "news-some-shop.de@example.news");
        assert_eq!(payload.full_name(), "Max Mustermann");
    }

    #[test]
    fn www_prefix_is_stripped_once() {
        let url: Url = "https://www.wwwidgets.com".parse().unwrap();
        assert_eq!(registrable_domain(&url), "wwwidgets.com");
    }

    #[test]
    fn fixed_address_passes_through() {
        let url: Url = "https://example.org".parse().unwrap();
        let payload = identity("signups@example.news").payload_for(&url);
        assert_eq!(payload.email, "signups@example.news");
    }
}
