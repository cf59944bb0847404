//! Token extraction from transport carriers.

/// Pull the token out of an `Authorization: Bearer <token>` header value.
///
/// Anything without the exact `Bearer ` prefix, or with an empty remainder,
/// yields `None`.
#[must_use]
pub fn bearer_token(header_value: &str) -> Option<&str> {
    let token = header_value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Pull the token out of a WebSocket upgrade request's query string.
///
/// Looks for the first `token=` parameter; percent-decoding follows normal
/// form-urlencoded rules.
#[must_use]
pub fn upgrade_token(query: Option<&str>) -> Option<String> {
    let query = query?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(name, _)| name == "token")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}
