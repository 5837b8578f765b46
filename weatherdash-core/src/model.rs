use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A city name the user is currently searching for.
///
/// Always trimmed and non-empty; there is no public way to build an empty
/// target, so "empty input is a no-op" is enforced at construction time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryTarget(String);

impl QueryTarget {
    /// Returns `None` for empty or whitespace-only input.
    pub fn new(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() { None } else { Some(Self(trimmed.to_owned())) }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for QueryTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The normalized set of current-conditions fields shown to the user.
///
/// Numeric fields are stored as reported by the provider; rounding for
/// display happens in the rendering layer only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub city_name: String,
    pub country_code: String,
    pub temp_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: u8,
    pub wind_speed_mps: f64,
    pub pressure_mb: f64,
    /// Provider icon code, e.g. "c02d".
    pub icon: String,
    pub description: String,
    pub observed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_target_trims_input() {
        let target = QueryTarget::new("  London  ").expect("non-empty input must parse");
        assert_eq!(target.as_str(), "London");
        assert_eq!(target.to_string(), "London");
    }

    #[test]
    fn query_target_rejects_empty_and_whitespace() {
        assert!(QueryTarget::new("").is_none());
        assert!(QueryTarget::new("   ").is_none());
        assert!(QueryTarget::new("\t\n").is_none());
    }

    #[test]
    fn query_target_equality_after_trim() {
        let a = QueryTarget::new("Berlin").unwrap();
        let b = QueryTarget::new(" Berlin ").unwrap();
        assert_eq!(a, b);
    }
}
