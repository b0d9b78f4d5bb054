//! Error text for tool responses and for logs.
//!
//! Neither formatter ever serialises a request, its headers, or a whole
//! transport error; both only read a fixed set of fields.

use harvest_sdk::HarvestError;
use once_cell::sync::Lazy;
use regex::Regex;

const SOURCE: &str = "Harvest API";
const REDACTED: &str = "[REDACTED]";

/// Appended to permission-denied failures.
pub const PERMISSION_HINT: &str = "Your Harvest user may not have permission for this request. \
Non-admin users can only use endpoints scoped to themselves, such as \
/users/me/project_assignments. Also verify that HARVEST_ACCOUNT_ID is the account \
the access token belongs to.";

static BEARER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(Bearer)\s+([A-Za-z0-9_.~+/=-]{6,})").expect("bearer redaction regex")
});

/// User-facing description of an upstream failure.
///
/// `Harvest API error (<status>): <message>`, or without the status when the
/// request never got a response. A 403 also carries [`PERMISSION_HINT`].
/// Only the message part is scrubbed of `secrets`.
pub fn user_message(err: &HarvestError, secrets: &[&str]) -> String {
    let message = match err.upstream_message() {
        Some(message) => message.to_string(),
        None => err.to_string(),
    };
    let message = clean(&message, secrets);

    match err.status() {
        Some(403) => format!("{} error (403): {}. {}", SOURCE, message, PERMISSION_HINT),
        Some(status) => format!("{} error ({}): {}", SOURCE, status, message),
        None => format!("{} error: {}", SOURCE, message),
    }
}

/// Credential-free one-line description for logs.
pub fn log_safe_message(err: &HarvestError, secrets: &[&str]) -> String {
    let top_level = match err {
        HarvestError::Http(_) => "HTTP request failed".to_string(),
        HarvestError::Api { status, .. } => format!("API error (status {})", status),
        other => clean(&other.to_string(), secrets),
    };

    let mut parts = vec![top_level];
    if let Some(status) = err.status() {
        parts.push(format!("status={}", status));
    }
    if let Some(message) = err.upstream_message() {
        parts.push(format!("upstream={}", clean(message, secrets)));
    }
    if let Some(code) = err.transport_code() {
        parts.push(format!("code={}", code));
    }

    parts.join(" | ")
}

/// The error's own text, with the upstream message scrubbed.
pub fn raw_message(err: &HarvestError, secrets: &[&str]) -> String {
    match err {
        HarvestError::Api { status, message } => {
            format!("API error (status {}): {}", status, clean(message, secrets))
        }
        other => clean(&other.to_string(), secrets),
    }
}

/// Log-safe description of any process-level failure.
pub fn log_safe_anyhow(err: &anyhow::Error, secrets: &[&str]) -> String {
    for cause in err.chain() {
        if let Some(harvest) = cause.downcast_ref::<HarvestError>() {
            return log_safe_message(harvest, secrets);
        }
    }
    clean(&err.to_string(), secrets)
}

/// Mask bearer tokens that appear inline in free text.
pub fn redact_inline(text: &str) -> String {
    BEARER_PATTERN
        .replace_all(text, format!("$1 {}", REDACTED).as_str())
        .into_owned()
}

/// Mask whole occurrences of the given secret values.
///
/// A secret embedded in a longer word or number is left alone, so an
/// account id of `4` does not eat the digits of `4040`.
pub fn scrub_secrets(text: &str, secrets: &[&str]) -> String {
    secrets
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .fold(text.to_string(), |acc, secret| match secret_pattern(secret) {
            Ok(re) => re.replace_all(&acc, REDACTED).into_owned(),
            Err(_) => acc,
        })
}

fn secret_pattern(secret: &str) -> Result<Regex, regex::Error> {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let starts = secret.chars().next().is_some_and(is_word);
    let ends = secret.chars().last().is_some_and(is_word);

    Regex::new(&format!(
        "{}{}{}",
        if starts { r"\b" } else { "" },
        regex::escape(secret),
        if ends { r"\b" } else { "" }
    ))
}

fn clean(text: &str, secrets: &[&str]) -> String {
    scrub_secrets(&redact_inline(text), secrets)
}
