//! URL validation with SSRF protection.
//!
//! Classifies a URL string as accepted or rejected before any network I/O.
//! Checks run in a fixed order and stop at the first failure, so the reason
//! reported for a hostile URL is deterministic:
//!
//! 1. empty input
//! 2. scheme other than `http://` / `https://`
//! 3. unparseable URL
//! 4. missing hostname
//! 5. hostname on the literal denylist (see [`DENYLIST`])
//! 6. embedded username or password
//!
//! Path-traversal markers never reject; they are reported as a warning on the
//! accepted result.

mod address;
mod denylist;

pub use address::is_internal_addr;
pub use denylist::{blocked_by, DenyRule, HostPattern, DENYLIST};

use url::Url;

/// Longest slice of a rejected input echoed back in the error message.
const PREVIEW_CHARS: usize = 30;

/// Whether internal hosts may be contacted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HostPolicy {
    /// Apply the denylist and resolved-address checks.
    #[default]
    Public,
    /// Skip host checks. Scheme, parse, and credential checks still apply.
    /// Meant for trusted local mirrors and loopback test servers.
    AllowInternal,
}

/// Why a URL was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("No URL provided")]
    EmptyInput,
    #[error("Only HTTP/HTTPS URLs supported. Got: {0}")]
    UnsupportedScheme(String),
    #[error("Invalid URL format: {0}")]
    MalformedUrl(String),
    #[error("URL has no hostname")]
    MissingHost,
    #[error("Internal/localhost URLs not allowed: {host}")]
    InternalHostBlocked { host: String },
    #[error("URLs with embedded credentials not allowed")]
    EmbeddedCredentials,
}

/// Non-fatal findings on an accepted URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationWarning {
    PathTraversal,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationWarning::PathTraversal => {
                write!(f, "URL contains path traversal patterns")
            }
        }
    }
}

/// An accepted URL plus any warnings raised while checking it.
#[derive(Debug, Clone)]
pub struct ValidatedUrl {
    url: Url,
    warnings: Vec<ValidationWarning>,
}

impl ValidatedUrl {
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn into_url(self) -> Url {
        self.url
    }

    pub fn warnings(&self) -> &[ValidationWarning] {
        &self.warnings
    }
}

/// Validates `input` under [`HostPolicy::Public`].
pub fn validate(input: &str) -> Result<ValidatedUrl, Rejection> {
    validate_with(input, HostPolicy::Public)
}

/// Validates `input` under the given host policy.
pub fn validate_with(input: &str, policy: HostPolicy) -> Result<ValidatedUrl, Rejection> {
    if input.trim().is_empty() {
        return Err(Rejection::EmptyInput);
    }

    if !has_http_scheme(input) {
        return Err(Rejection::UnsupportedScheme(preview(input)));
    }

    // WHATWG parsing skips extra slashes ("http:///host"); the raw
    // authority must be non-empty.
    if raw_authority(input).is_empty() {
        return Err(Rejection::MissingHost);
    }

    let url = Url::parse(input).map_err(|e| match e {
        url::ParseError::EmptyHost => Rejection::MissingHost,
        other => Rejection::MalformedUrl(other.to_string()),
    })?;

    let host = url.host_str().unwrap_or_default();
    if host.is_empty() {
        return Err(Rejection::MissingHost);
    }

    if policy == HostPolicy::Public {
        if let Some(rule) = blocked_by(host) {
            tracing::debug!(host, covers = rule.covers, "host matched denylist");
            return Err(Rejection::InternalHostBlocked {
                host: host.to_string(),
            });
        }
    }

    if !url.username().is_empty() || url.password().is_some() {
        return Err(Rejection::EmbeddedCredentials);
    }

    let mut warnings = Vec::new();
    if contains_traversal(input) {
        tracing::debug!(url = input, "URL contains path traversal patterns");
        warnings.push(ValidationWarning::PathTraversal);
    }

    Ok(ValidatedUrl { url, warnings })
}

/// Case-insensitive `http://` or `https://` prefix check on the raw input.
fn has_http_scheme(input: &str) -> bool {
    let head: String = input.chars().take(8).collect::<String>().to_ascii_lowercase();
    head.starts_with("http://") || head.starts_with("https://")
}

/// Text between `://` and the first `/`, `\\`, `?`, or `#`.
fn raw_authority(input: &str) -> &str {
    let rest = input.split_once("://").map(|(_, r)| r).unwrap_or_default();
    let end = rest.find(['/', '\\', '?', '#']).unwrap_or(rest.len());
    &rest[..end]
}

/// Checked on the raw string: the parser resolves `..` segments away.
fn contains_traversal(input: &str) -> bool {
    let lower = input.to_ascii_lowercase();
    lower.contains("../") || lower.contains("..\\") || lower.contains("%2e%2e")
}

fn preview(input: &str) -> String {
    let head: String = input.chars().take(PREVIEW_CHARS).collect();
    format!("{head}...")
}
