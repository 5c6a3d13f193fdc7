//! Rate-limiting configuration module
//!
//! Thresholds for the layered throttle policy: global per-IP and per-identity
//! action limits, the per-address cooldown and daily cap, the country-level
//! SMS-pumping defenses, and the static blocklists.

use serde::{Deserialize, Serialize};

/// Rate-limiting configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ThrottleConfig {
    /// Max qualifying actions per IP within the action window
    /// (username availability checks are excluded from the count)
    #[serde(default = "default_ip_action_limit")]
    pub ip_action_limit: u64,

    /// Max qualifying actions per address identity within the action window
    /// (code requests and checks are excluded; the per-address rules
    /// already throttle those)
    #[serde(default = "default_identity_action_limit")]
    pub identity_action_limit: u64,

    /// Rolling window for the global action limits, in hours
    #[serde(default = "default_action_window_hours")]
    pub action_window_hours: i64,

    /// Minimum seconds between issue-or-verify actions on one address
    #[serde(default = "default_cooldown_seconds")]
    pub cooldown_seconds: i64,

    /// Max codes issued per address within the send window
    #[serde(default = "default_daily_send_cap")]
    pub daily_send_cap: u32,

    /// Rolling window for the send cap, in hours
    #[serde(default = "default_send_window_hours")]
    pub send_window_hours: i64,

    /// High-frequency country policy (SMS pumping defense)
    #[serde(default)]
    pub high_frequency: HighFrequencyCountryConfig,

    /// Delayed-send policy for high-fraud country calling codes
    #[serde(default)]
    pub delayed_countries: DelayedCountryConfig,

    /// Email domains that are silently dropped
    #[serde(default)]
    pub email_domain_blocklist: Vec<String>,

    /// Country calling codes that are silently dropped
    #[serde(default)]
    pub phone_prefix_blocklist: Vec<String>,
}

/// Thresholds for the high-frequency-country policy
///
/// Blunts SMS-pumping attacks concentrated on one country calling code even
/// when every individual number stays under the per-number cooldown.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HighFrequencyCountryConfig {
    /// Rolling window for counting same-prefix requests, in hours
    #[serde(default = "default_high_frequency_window_hours")]
    pub window_hours: i64,

    /// Same-prefix request count at which the policy fires
    #[serde(default = "default_high_frequency_threshold")]
    pub threshold: usize,

    /// The matching record's last attempt must fall within this many hours
    /// for the threshold rejection to apply
    #[serde(default = "default_recent_attempt_hours")]
    pub recent_attempt_hours: i64,
}

impl Default for HighFrequencyCountryConfig {
    fn default() -> Self {
        Self {
            window_hours: default_high_frequency_window_hours(),
            threshold: default_high_frequency_threshold(),
            recent_attempt_hours: default_recent_attempt_hours(),
        }
    }
}

/// Delayed-send policy for country calling codes on the delay list
///
/// Deliberately coarse-grained: one send per listed country per timeout,
/// regardless of which number in that country asked.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DelayedCountryConfig {
    /// Country calling codes subject to delayed sending (e.g. "+63")
    #[serde(default)]
    pub prefixes: Vec<String>,

    /// Minimum hours between sends to the same listed country
    #[serde(default = "default_delay_send_timeout_hours")]
    pub send_timeout_hours: i64,

    /// A non-completed verification in the same listed country within this
    /// many hours also blocks the send
    #[serde(default = "default_delay_pending_timeout_hours")]
    pub pending_timeout_hours: i64,
}

impl Default for DelayedCountryConfig {
    fn default() -> Self {
        Self {
            prefixes: Vec::new(),
            send_timeout_hours: default_delay_send_timeout_hours(),
            pending_timeout_hours: default_delay_pending_timeout_hours(),
        }
    }
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            ip_action_limit: default_ip_action_limit(),
            identity_action_limit: default_identity_action_limit(),
            action_window_hours: default_action_window_hours(),
            cooldown_seconds: default_cooldown_seconds(),
            daily_send_cap: default_daily_send_cap(),
            send_window_hours: default_send_window_hours(),
            high_frequency: HighFrequencyCountryConfig::default(),
            delayed_countries: DelayedCountryConfig::default(),
            email_domain_blocklist: Vec::new(),
            phone_prefix_blocklist: Vec::new(),
        }
    }
}

fn default_ip_action_limit() -> u64 {
    32
}

fn default_identity_action_limit() -> u64 {
    4
}

fn default_action_window_hours() -> i64 {
    20
}

fn default_cooldown_seconds() -> i64 {
    60
}

fn default_daily_send_cap() -> u32 {
    5
}

fn default_send_window_hours() -> i64 {
    24
}

fn default_high_frequency_window_hours() -> i64 {
    2
}

fn default_high_frequency_threshold() -> usize {
    10
}

fn default_recent_attempt_hours() -> i64 {
    1
}

fn default_delay_send_timeout_hours() -> i64 {
    1
}

fn default_delay_pending_timeout_hours() -> i64 {
    2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds() {
        let config = ThrottleConfig::default();
        assert_eq!(config.ip_action_limit, 32);
        assert_eq!(config.identity_action_limit, 4);
        assert_eq!(config.action_window_hours, 20);
        assert_eq!(config.cooldown_seconds, 60);
        assert_eq!(config.daily_send_cap, 5);
        assert_eq!(config.send_window_hours, 24);
        assert_eq!(config.high_frequency.window_hours, 2);
        assert_eq!(config.high_frequency.threshold, 10);
        assert_eq!(config.delayed_countries.send_timeout_hours, 1);
        assert_eq!(config.delayed_countries.pending_timeout_hours, 2);
        assert!(config.email_domain_blocklist.is_empty());
        assert!(config.phone_prefix_blocklist.is_empty());
    }
}
