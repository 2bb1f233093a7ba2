//! Structural validation of rate batches
//!
//! Used by source tests to check a parser's output against the list of
//! currencies the source is expected to publish.

use chrono::{DateTime, Utc};
use hashbrown::HashSet;

use crate::rate::Rate;

/// Validates every rate in the batch, reporting warnings through the
/// callback. Returns the subset of `allowed` that never appeared on either
/// side of any rate.
pub fn validate_all<F>(
    rates: &[Rate],
    allowed: &HashSet<String>,
    mut on_warning: F,
) -> HashSet<String>
where
    F: FnMut(usize, &[String]),
{
    let mut observed: HashSet<&str> = HashSet::new();

    for (i, rate) in rates.iter().enumerate() {
        let (ok, warnings) = validate(rate, allowed);
        if !ok {
            on_warning(i, &warnings);
        }
        observed.insert(rate.from.as_str());
        observed.insert(rate.to.as_str());
    }

    allowed
        .iter()
        .filter(|currency| !observed.contains(currency.as_str()))
        .cloned()
        .collect()
}

/// Checks one rate for structural defects. Returns whether the rate is clean
/// along with a human-readable warning per defect found.
pub fn validate(rate: &Rate, allowed: &HashSet<String>) -> (bool, Vec<String>) {
    let mut warnings = Vec::new();

    if rate.day == DateTime::<Utc>::default() {
        warnings.push("zero day value".to_string());
    }
    if rate.rate == 0.0 {
        warnings.push("zero rate value".to_string());
    }
    if rate.from == rate.to {
        warnings.push("source and target currency are the same".to_string());
    }
    if rate.from.is_empty() {
        warnings.push("missing source currency".to_string());
    }
    if rate.to.is_empty() {
        warnings.push("missing target currency".to_string());
    }
    if !allowed.contains(&rate.from) {
        warnings.push(format!("source currency {:?} not allowed here", rate.from));
    }
    if !allowed.contains(&rate.to) {
        warnings.push(format!("target currency {:?} not allowed here", rate.to));
    }

    (warnings.is_empty(), warnings)
}
