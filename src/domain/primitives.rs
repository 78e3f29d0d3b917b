//! Domain primitives: TimeMs, UserId, Currency.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Time in milliseconds since Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeMs(pub i64);

impl TimeMs {
    /// Create a TimeMs from milliseconds.
    pub fn new(ms: i64) -> Self {
        TimeMs(ms)
    }

    /// Current wall-clock time.
    pub fn now() -> Self {
        TimeMs(Utc::now().timestamp_millis())
    }

    /// Get the underlying milliseconds value.
    pub fn as_ms(&self) -> i64 {
        self.0
    }

    /// Convert to a chrono UTC datetime. Out-of-range values clamp to the
    /// epoch rather than fault.
    pub fn to_datetime(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.0)
            .single()
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }
}

/// Opaque user identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    /// Create a UserId from a string.
    pub fn new(id: String) -> Self {
        UserId(id)
    }

    /// Get the id as a string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the id is empty or whitespace-only.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// ISO currency code (e.g., "AUD", "USD").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Currency(pub String);

impl Currency {
    /// Create a Currency from a string.
    pub fn new(code: String) -> Self {
        Currency(code)
    }

    /// The platform default currency.
    pub fn aud() -> Self {
        Currency("AUD".to_string())
    }

    /// Get the code as a string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lower-cased code for the transfer provider wire format.
    ///
    /// Empty codes fall back to the platform default ("aud").
    pub fn for_transfer(&self) -> String {
        if self.0.trim().is_empty() {
            "aud".to_string()
        } else {
            self.0.to_lowercase()
        }
    }
}

impl Default for Currency {
    fn default() -> Self {
        Currency::aud()
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timems_ordering() {
        let t1 = TimeMs::new(1000);
        let t2 = TimeMs::new(2000);
        assert!(t1 < t2);
    }

    #[test]
    fn test_timems_to_datetime() {
        let t = TimeMs::new(0);
        assert_eq!(t.to_datetime().timestamp_millis(), 0);
    }

    #[test]
    fn test_user_id_blank() {
        assert!(UserId::new("".to_string()).is_blank());
        assert!(UserId::new("   ".to_string()).is_blank());
        assert!(!UserId::new("u1".to_string()).is_blank());
    }

    #[test]
    fn test_currency_for_transfer_lowercases() {
        let c = Currency::new("AUD".to_string());
        assert_eq!(c.for_transfer(), "aud");
    }

    #[test]
    fn test_currency_for_transfer_defaults_when_empty() {
        let c = Currency::new("".to_string());
        assert_eq!(c.for_transfer(), "aud");
    }

    #[test]
    fn test_currency_default() {
        assert_eq!(Currency::default().as_str(), "AUD");
    }
}
