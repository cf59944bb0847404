//! Prometheus metrics for the authentication core.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, HistogramVec,
};

/// Token verifications by outcome.
pub static VERIFICATIONS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "auth_core_verifications_total",
        "Total number of token verifications",
        &["outcome"]
    )
    .expect("Failed to register verifications metric")
});

/// Verification latency histogram.
pub static VERIFICATION_LATENCY: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "auth_core_verification_seconds",
        "Token verification latency in seconds",
        &["outcome"],
        vec![0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25]
    )
    .expect("Failed to register verification latency metric")
});

/// Tokens issued by use class.
pub static TOKENS_ISSUED: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "auth_core_tokens_issued_total",
        "Total number of tokens issued",
        &["token_use"]
    )
    .expect("Failed to register tokens_issued metric")
});

/// Tokens written to the revocation list.
pub static TOKENS_REVOKED: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "auth_core_tokens_revoked_total",
        "Total number of tokens revoked",
        &["store"]
    )
    .expect("Failed to register tokens_revoked metric")
});

/// Refresh attempts by result.
pub static REFRESHES: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "auth_core_refreshes_total",
        "Total number of refresh attempts",
        &["status"]
    )
    .expect("Failed to register refreshes metric")
});

/// Authorization cache traffic.
pub static AUTHZ_CACHE: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "auth_core_authz_cache_total",
        "Authorization decision cache events",
        &["event"]
    )
    .expect("Failed to register authz_cache metric")
});

/// Security-relevant events worth alerting on.
pub static SECURITY_EVENTS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "auth_core_security_events_total",
        "Total number of security events",
        &["event_type"]
    )
    .expect("Failed to register security_events metric")
});

/// Record a verification outcome with its latency.
pub fn record_verification(outcome: &str, duration_secs: f64) {
    VERIFICATIONS.with_label_values(&[outcome]).inc();
    VERIFICATION_LATENCY
        .with_label_values(&[outcome])
        .observe(duration_secs);
}

/// Record a token issuance.
pub fn record_token_issued(token_use: &str) {
    TOKENS_ISSUED.with_label_values(&[token_use]).inc();
}

/// Record revocations written to a store.
pub fn record_revocations(store: &str, count: usize) {
    TOKENS_REVOKED
        .with_label_values(&[store])
        .inc_by(count as f64);
}

/// Record a refresh attempt.
pub fn record_refresh(status: &str) {
    REFRESHES.with_label_values(&[status]).inc();
}

/// Record an authorization cache event.
pub fn record_authz_cache(event: &str) {
    AUTHZ_CACHE.with_label_values(&[event]).inc();
}

/// Record a security event.
pub fn record_security_event(event_type: &str) {
    SECURITY_EVENTS.with_label_values(&[event_type]).inc();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_verification() {
        record_verification("ok", 0.002);
        let value = VERIFICATIONS.with_label_values(&["ok"]).get();
        assert!(value > 0.0);
    }

    #[test]
    fn test_record_token_issued() {
        record_token_issued("access");
        let value = TOKENS_ISSUED.with_label_values(&["access"]).get();
        assert!(value > 0.0);
    }

    #[test]
    fn test_record_security_event() {
        record_security_event("revoked_token_use");
        let value = SECURITY_EVENTS
            .with_label_values(&["revoked_token_use"])
            .get();
        assert!(value > 0.0);
    }
}
