//! Exponential backoff with jitter.

use std::time::Duration;

use rand::Rng;

use crate::config::RetryConfig;

/// Delay before retry number `attempt` (1-based) under `config`.
///
/// The delay doubles per attempt from `base_delay_ms`, is capped at
/// `max_delay_ms`, and gets up to 10% of random jitter on top.
pub fn retry_delay(attempt: u32, config: &RetryConfig) -> Duration {
    if attempt == 0 {
        return Duration::ZERO;
    }

    let factor = 2u64.saturating_pow(attempt - 1);
    let capped = config
        .base_delay_ms
        .saturating_mul(factor)
        .min(config.max_delay_ms);

    let jitter_range = capped / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(capped + jitter)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_delay_ms: u64, max_delay_ms: u64) -> RetryConfig {
        RetryConfig {
            base_delay_ms,
            max_delay_ms,
            ..Default::default()
        }
    }

    #[test]
    fn test_delay_doubles() {
        let cfg = config(100, 2000);
        let first = retry_delay(1, &cfg).as_millis();
        let second = retry_delay(2, &cfg).as_millis();
        assert!((100..110).contains(&first));
        assert!((200..220).contains(&second));
    }

    #[test]
    fn test_delay_is_capped() {
        let cfg = config(100, 1000);
        let delay = retry_delay(30, &cfg).as_millis();
        assert!((1000..1100).contains(&delay));
    }

    #[test]
    fn test_zero_attempt_and_tiny_delays() {
        assert_eq!(retry_delay(0, &config(100, 1000)), Duration::ZERO);
        assert_eq!(retry_delay(1, &config(5, 5)), Duration::from_millis(5));
    }
}
