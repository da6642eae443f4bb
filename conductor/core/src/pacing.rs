//! Reply Pacing
//!
//! Bot replies are held back so they land at a conversational pace instead
//! of the instant the course service answers. The target perceived latency
//! grows with the length of the reply and is bounded on both sides; time
//! already spent waiting on the network counts toward it.

use std::time::Duration;

/// Lower bound of the perceived reply latency
pub const DEFAULT_MIN_MS: u64 = 1000;
/// Upper bound of the perceived reply latency
pub const DEFAULT_MAX_MS: u64 = 4000;
/// Extra latency per reply character
pub const DEFAULT_PER_CHAR_MS: u64 = 20;
/// Fixed wait before a transport failure is reported
pub const DEFAULT_TRANSPORT_GRACE_MS: u64 = 1000;

/// Remaining wait before a reply of `len` characters may be shown
///
/// Uses the default bounds: `clamp(1000 + len * 20, 1000, 4000) - elapsed`,
/// floored at zero.
#[must_use]
pub fn typing_delay_ms(len: u64, elapsed_ms: u64) -> u64 {
    PacingConfig::default()
        .wait_for(len, Duration::from_millis(elapsed_ms))
        .as_millis() as u64
}

/// Pacing policy
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PacingConfig {
    /// Floor of the target latency
    pub min: Duration,
    /// Ceiling of the target latency
    pub max: Duration,
    /// Latency added per reply character
    pub per_char: Duration,
    /// Fixed wait before a transport failure message
    pub transport_grace: Duration,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            min: Duration::from_millis(DEFAULT_MIN_MS),
            max: Duration::from_millis(DEFAULT_MAX_MS),
            per_char: Duration::from_millis(DEFAULT_PER_CHAR_MS),
            transport_grace: Duration::from_millis(DEFAULT_TRANSPORT_GRACE_MS),
        }
    }
}

impl PacingConfig {
    /// Target total latency for a reply of `len` characters
    #[must_use]
    pub fn target_for(&self, len: u64) -> Duration {
        let per_char_ms = self.per_char.as_millis() as u64;
        let raw = Duration::from_millis(
            (self.min.as_millis() as u64).saturating_add(len.saturating_mul(per_char_ms)),
        );
        // A misconfigured max below min collapses to min
        raw.clamp(self.min, self.max.max(self.min))
    }

    /// Wait still owed after `elapsed` has already passed
    #[must_use]
    pub fn wait_for(&self, len: u64, elapsed: Duration) -> Duration {
        self.target_for(len).saturating_sub(elapsed)
    }
}

/// Timings of the two-step welcome sequence
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WelcomeTimings {
    /// Composing time before the greeting
    pub compose: Duration,
    /// Idle pause between the two welcome messages
    pub pause: Duration,
    /// Composing time before the capabilities message
    pub follow_up: Duration,
}

impl Default for WelcomeTimings {
    fn default() -> Self {
        Self {
            compose: Duration::from_millis(1000),
            pause: Duration::from_millis(600),
            follow_up: Duration::from_millis(1200),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_reply_waits_the_floor() {
        assert_eq!(typing_delay_ms(0, 0), 1000);
    }

    #[test]
    fn test_long_reply_is_capped() {
        // 1000 + 200 * 20 = 5000, capped at 4000
        assert_eq!(typing_delay_ms(200, 500), 3500);
    }

    #[test]
    fn test_slow_network_owes_nothing() {
        assert_eq!(typing_delay_ms(10, 1200), 0);
        assert_eq!(typing_delay_ms(10, 60_000), 0);
        assert_eq!(typing_delay_ms(500, 4000), 0);
    }

    #[test]
    fn test_scales_with_length() {
        assert_eq!(typing_delay_ms(50, 0), 2000);
        assert_eq!(typing_delay_ms(50, 250), 1750);
    }

    #[test]
    fn test_huge_length_does_not_overflow() {
        assert_eq!(typing_delay_ms(u64::MAX, 0), 4000);
    }

    #[test]
    fn test_custom_bounds() {
        let pacing = PacingConfig {
            min: Duration::from_millis(200),
            max: Duration::from_millis(500),
            per_char: Duration::from_millis(10),
            transport_grace: Duration::ZERO,
        };
        assert_eq!(pacing.target_for(0), Duration::from_millis(200));
        assert_eq!(pacing.target_for(20), Duration::from_millis(400));
        assert_eq!(pacing.target_for(100), Duration::from_millis(500));
    }

    #[test]
    fn test_max_below_min_collapses_to_min() {
        let pacing = PacingConfig {
            min: Duration::from_millis(800),
            max: Duration::from_millis(100),
            ..PacingConfig::default()
        };
        assert_eq!(pacing.target_for(1000), Duration::from_millis(800));
    }
}
