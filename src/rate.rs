//! The Rate value type - a single published exchange quote

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The conversion rate between two currencies on a given day.
///
/// `rate` is the number of units of `to` obtained for one unit of `from`.
/// Currency symbols are three-letter uppercase ISO 4217 codes, e.g. "USD".
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Rate {
    /// The currency the rate converts from.
    pub from: String,
    /// The currency the rate converts to.
    pub to: String,
    /// The effective rate.
    pub rate: f64,
    /// The day the rate is valid on, truncated to UTC midnight.
    pub day: DateTime<Utc>,
    /// How the rate was sourced, usually the name of the publishing central
    /// bank. Synthesized reciprocal edges append " (inverse)".
    pub info: String,
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "1 {} = {} {} on {}",
            self.from,
            self.rate,
            self.to,
            self.day.format("%Y-%m-%d")
        )
    }
}

/// Truncates a timestamp to midnight UTC. Exchange rates are published daily,
/// so all indexing and querying happens at day granularity.
pub fn truncate_day(t: DateTime<Utc>) -> DateTime<Utc> {
    t.date_naive().and_time(NaiveTime::MIN).and_utc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_truncate_day() {
        let t = Utc.with_ymd_and_hms(2022, 1, 2, 15, 30, 59).unwrap();
        let want = Utc.with_ymd_and_hms(2022, 1, 2, 0, 0, 0).unwrap();
        assert_eq!(truncate_day(t), want);
    }

    #[test]
    fn test_truncate_day_is_idempotent() {
        let t = Utc.with_ymd_and_hms(2022, 1, 2, 0, 0, 0).unwrap();
        assert_eq!(truncate_day(t), t);
    }

    #[test]
    fn test_display() {
        let rate = Rate {
            from: "USD".to_string(),
            to: "EUR".to_string(),
            rate: 0.9,
            day: Utc.with_ymd_and_hms(2022, 1, 2, 0, 0, 0).unwrap(),
            info: "ECB".to_string(),
        };
        assert_eq!(rate.to_string(), "1 USD = 0.9 EUR on 2022-01-02");
    }
}
