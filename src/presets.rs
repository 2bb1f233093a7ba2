//! Preconfigured exchanges
//!
//! [`live_exchange`] pulls from online central bank sources, refreshing about
//! twice per day. [`offline_exchange`] serves smaller historical snapshots
//! embedded in the crate and never touches the network, which makes it
//! suitable for machines without an internet connection.

use std::path::PathBuf;
use std::sync::OnceLock;

use base64::Engine as _;
use chrono::Duration;

use crate::exchange::Exchange;
use crate::offline;
use crate::sources::{boc, ecb, rba};

/// How long cached data stays fresh before a remote refresh.
pub fn default_cache_life() -> Duration {
    Duration::hours(12)
}

/// The directory where forex data downloaded from the internet is cached.
pub fn default_cache_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(".forex")
}

/// An Exchange sourcing rates from multiple online publishers.
///
/// Currently built from the historical rates of the European Central Bank,
/// the Reserve Bank of Australia and the Bank of Canada, together covering
/// about fifty currencies.
pub fn live_exchange() -> &'static Exchange {
    static LIVE: OnceLock<Exchange> = OnceLock::new();
    LIVE.get_or_init(|| {
        let exchange = Exchange::new(default_cache_dir(), default_cache_life());
        exchange.add_source("ECB", ecb::DEFAULT_ECB_URL, ecb::get, Vec::new());
        exchange.add_source("RBA", rba::DEFAULT_RBA_URL, rba::get, Vec::new());
        exchange.add_source("BOC", boc::DEFAULT_BOC_URL, boc::get, Vec::new());
        exchange
    })
}

/// An Exchange serving only the historical snapshots embedded in this crate.
pub fn offline_exchange() -> &'static Exchange {
    static OFFLINE: OnceLock<Exchange> = OnceLock::new();
    OFFLINE.get_or_init(|| {
        let exchange = Exchange::new(default_cache_dir(), default_cache_life());
        exchange.add_source(
            "ECB (offline)",
            &embedded_url(offline::HISTORICAL_ECB_RATES),
            ecb::get,
            Vec::new(),
        );
        exchange.add_source(
            "BOC (offline)",
            &embedded_url(offline::HISTORICAL_BOC_RATES),
            boc::get,
            Vec::new(),
        );
        exchange
    })
}

/// Serves an embedded sheet through the same fetch path live sources use.
fn embedded_url(sheet: &str) -> String {
    format!(
        "data:text/csv;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(sheet)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_cache_dir_ends_in_forex() {
        assert!(default_cache_dir().ends_with(".forex"));
    }

    #[test]
    fn test_live_exchange_is_shared() {
        assert!(std::ptr::eq(live_exchange(), live_exchange()));
    }
}
