//! Query options for the conversion search

use chrono::Duration;
use std::fmt;

/// Which fields of [`Conversion`](crate::graph::Conversion) to populate.
///
/// Full traces need roughly four times the bookkeeping of a plain rate
/// lookup, so they are opt-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultDetail {
    /// Only compute the rate.
    #[default]
    RateOnly,
    /// Also record the chain of edges the rate was derived from.
    FullTrace,
}

impl fmt::Display for ResultDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultDetail::RateOnly => write!(f, "RateOnly"),
            ResultDetail::FullTrace => write!(f, "FullTrace"),
        }
    }
}

/// Options for [`convert`](crate::graph::convert).
///
/// Built with combinators; a later call overrides an earlier one of the same
/// kind:
///
/// ```rust
/// use histfx::graph::ConvertOptions;
///
/// let opts = ConvertOptions::new().accept_older_rate(5).full_trace();
/// assert_eq!(opts.to_string(), "Tolerance(5 days), FullTrace");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertOptions {
    tolerance: Duration,
    detail: ResultDetail,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            tolerance: Duration::zero(),
            detail: ResultDetail::RateOnly,
        }
    }
}

impl ConvertOptions {
    /// Exact-day match, rate only.
    pub fn new() -> Self {
        Self::default()
    }

    /// When no rate is available on the requested day, also accept rates up
    /// to `max_age_days` older. The default is 0 (exact match only).
    pub fn accept_older_rate(mut self, max_age_days: i64) -> Self {
        self.tolerance = Duration::days(max_age_days);
        self
    }

    /// Populate the conversion trace.
    pub fn full_trace(mut self) -> Self {
        self.detail = ResultDetail::FullTrace;
        self
    }

    /// Only compute the rate (the default).
    pub fn rate_only(mut self) -> Self {
        self.detail = ResultDetail::RateOnly;
        self
    }

    pub(crate) fn tolerance(&self) -> Duration {
        self.tolerance
    }

    pub(crate) fn detail(&self) -> ResultDetail {
        self.detail
    }
}

impl fmt::Display for ConvertOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Tolerance({} days), {}",
            self.tolerance.num_days(),
            self.detail
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = ConvertOptions::new();
        assert_eq!(opts.tolerance(), Duration::zero());
        assert_eq!(opts.detail(), ResultDetail::RateOnly);
    }

    #[test]
    fn test_later_option_overrides_earlier() {
        let opts = ConvertOptions::new()
            .accept_older_rate(2)
            .full_trace()
            .accept_older_rate(7)
            .rate_only();
        assert_eq!(opts.tolerance(), Duration::days(7));
        assert_eq!(opts.detail(), ResultDetail::RateOnly);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            ConvertOptions::new().to_string(),
            "Tolerance(0 days), RateOnly"
        );
        assert_eq!(
            ConvertOptions::new().accept_older_rate(3).full_trace().to_string(),
            "Tolerance(3 days), FullTrace"
        );
    }
}
