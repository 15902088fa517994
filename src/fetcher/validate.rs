//! Repository URL validation

use crate::fetcher::error::ValidationError;

/// True for the scp-style SSH form on the expected host, e.g. `git@github.com:owner/repo.git`
pub fn is_ssh_shorthand(url: &str, expected_host: &str) -> bool {
    url.strip_prefix("git@")
        .and_then(|rest| rest.strip_prefix(expected_host))
        .is_some_and(|rest| rest.starts_with(':'))
}

/// Accept a URL only if it points at `expected_host`.
///
/// The SSH shorthand for the expected host is accepted without parsing.
pub fn validate_url(url: &str, expected_host: &str) -> Result<(), ValidationError> {
    if is_ssh_shorthand(url, expected_host) {
        return Ok(());
    }

    let parsed = gix_url::parse(url.as_bytes().into()).map_err(|e| ValidationError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    // Hostnames compare case-insensitively; the port plays no part
    match parsed.host() {
        Some(host) if host.eq_ignore_ascii_case(expected_host) => Ok(()),
        Some(host) => Err(ValidationError::UnsupportedHost {
            host: host.to_string(),
            expected: expected_host.to_string(),
        }),
        None => Err(ValidationError::InvalidUrl {
            url: url.to_string(),
            reason: "URL has no host".to_string(),
        }),
    }
}
