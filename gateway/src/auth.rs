use subtle::ConstantTimeEq;

/// Outcome of validating a bearer credential against the configured secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    Authorized,
    /// No secret is configured. A deployment fault, reported as 500 rather
    /// than blamed on the client.
    MissingServerSecret,
    Unauthorized,
}

const BEARER_PREFIX: &str = "Bearer ";

/// Strips a case-insensitive `Bearer ` scheme prefix. A header without the
/// prefix is used as the credential verbatim.
fn strip_bearer(header_value: &str) -> &str {
    let bytes = header_value.as_bytes();
    if bytes.len() >= BEARER_PREFIX.len()
        && bytes[..BEARER_PREFIX.len()].eq_ignore_ascii_case(BEARER_PREFIX.as_bytes())
    {
        // The prefix is pure ASCII, so this slice lands on a char boundary.
        &header_value[BEARER_PREFIX.len()..]
    } else {
        header_value
    }
}

/// Validates an `Authorization` header value against the configured secret.
///
/// The comparison runs in constant time so response latency does not reveal
/// where a guessed credential first diverges from the secret. `ct_eq`
/// requires equal-length inputs; the length gate runs first and is itself
/// not secret (credential length is already known to the caller).
pub fn authenticate(header_value: Option<&str>, configured_secret: Option<&str>) -> AuthOutcome {
    let secret = match configured_secret {
        Some(secret) if !secret.is_empty() => secret,
        _ => return AuthOutcome::MissingServerSecret,
    };

    let credential = strip_bearer(header_value.unwrap_or(""));
    if credential.is_empty() || credential.len() != secret.len() {
        return AuthOutcome::Unauthorized;
    }

    if bool::from(credential.as_bytes().ct_eq(secret.as_bytes())) {
        AuthOutcome::Authorized
    } else {
        AuthOutcome::Unauthorized
    }
}
