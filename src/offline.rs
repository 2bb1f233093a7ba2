//! Embedded offline rate data
//!
//! Abridged snapshots of the ECB and Bank of Canada sheets, in the same CSV
//! shapes the live sources publish. They cover a handful of trading days,
//! which is enough for environments with no network access and for tests.
//! The BOC snapshot contributes a few currencies the ECB sheet lacks.

/// EUR-base rates, one row per day, most recent first.
pub(crate) const HISTORICAL_ECB_RATES: &str = include_str!("offline/ecb_hist_abridged.csv");

/// CAD-quote rates in the Valet sheet shape, most recent first.
pub(crate) const HISTORICAL_BOC_RATES: &str = include_str!("offline/boc_hist_abridged.csv");

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{boc, ecb};
    use base64::Engine as _;

    fn data_url(sheet: &str) -> String {
        format!(
            "data:text/csv;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(sheet)
        )
    }

    #[test]
    fn test_ecb_snapshot_parses() {
        let rates = ecb::get(&data_url(HISTORICAL_ECB_RATES)).unwrap();
        // 8 days x 10 currencies.
        assert_eq!(rates.len(), 80);
        assert!(rates.iter().all(|r| r.from == "EUR" && r.rate > 0.0));
    }

    #[test]
    fn test_boc_snapshot_parses() {
        let rates = boc::get(&data_url(HISTORICAL_BOC_RATES)).unwrap();
        // 6 days x 8 currencies.
        assert_eq!(rates.len(), 48);
        assert!(rates.iter().all(|r| r.to == "CAD" && r.rate > 0.0));
    }

    #[test]
    fn test_snapshots_share_trading_days() {
        // The offline exchange merges both snapshots; chains that cross them
        // need at least one common day.
        let ecb_rates = ecb::get(&data_url(HISTORICAL_ECB_RATES)).unwrap();
        let boc_rates = boc::get(&data_url(HISTORICAL_BOC_RATES)).unwrap();
        assert!(boc_rates
            .iter()
            .any(|b| ecb_rates.iter().any(|e| e.day == b.day)));
    }
}
