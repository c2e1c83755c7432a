//! Configuration validation.
//!
//! Duration-valued options must be strictly positive; a zero TTL or a zero
//! store timeout is always a misconfiguration. All violations are collected
//! before reporting, so one pass over the error message shows everything
//! wrong with a config.

use crate::AppConfig;
use stratus_core::{FieldViolation, StratusError, StratusResult};

/// Validates a loaded configuration, aggregating every violation.
pub fn validate_config(config: &AppConfig) -> StratusResult<()> {
    let mut violations = Vec::new();

    check_positive(
        &mut violations,
        "cache.default_ttl_secs",
        config.cache.default_ttl_secs,
    );
    check_positive(
        &mut violations,
        "cache.store_timeout_ms",
        config.cache.store_timeout_ms,
    );
    check_positive(
        &mut violations,
        "refresh.interval_secs",
        config.refresh.interval_secs,
    );
    check_positive(
        &mut violations,
        "refresh.lock_ttl_secs",
        config.refresh.lock_ttl_secs,
    );

    if let Some(0) = config.cache.max_concurrent_in_flight {
        violations.push(FieldViolation::new(
            "cache.max_concurrent_in_flight",
            "must be at least 1 when set",
            "positive",
        ));
    }

    if config.refresh.top_n == 0 {
        violations.push(FieldViolation::new(
            "refresh.top_n",
            "must be at least 1",
            "positive",
        ));
    }

    if config.redis.enabled {
        if config.redis.url.trim().is_empty() {
            violations.push(FieldViolation::new(
                "redis.url",
                "must not be blank when redis is enabled",
                "not_blank",
            ));
        }
        if config.redis.pool_size == 0 {
            violations.push(FieldViolation::new(
                "redis.pool_size",
                "must be at least 1",
                "positive",
            ));
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(StratusError::Validation(violations))
    }
}

fn check_positive(violations: &mut Vec<FieldViolation>, field: &str, value: u64) {
    if value == 0 {
        violations.push(FieldViolation::new(
            field,
            "duration must be positive",
            "positive_duration",
        ));
    }
}
