//! # histfx
//!
//! An easy to use, performant API to find historical currency conversion
//! rates.
//!
//! Daily exchange rates for about fifty currencies are sourced from central
//! banks and cached locally after the first request. Custom sources can be
//! registered via [`Exchange::add_source`](exchange::Exchange::add_source).
//!
//! Two preconfigured exchanges are provided:
//! [`live_exchange`](presets::live_exchange) refreshes data from online
//! sources, while [`offline_exchange`](presets::offline_exchange) uses a
//! smaller historical database embedded in the crate and works without an
//! internet connection.
//!
//! Central banks don't publish all exchange rates directly; some must be
//! computed through a third (and sometimes a fourth) currency. The search
//! always discovers the shortest chain available - it does not attempt to
//! find the best exchange rate. Query cost grows logarithmically with the
//! length of historical data and linearly with the number of currencies;
//! a lookup on a loaded graph runs in well under a microsecond.
//!
//! The computed rates are for informational purposes only - they are unlikely
//! to match the rates actually offered, but the difference should be
//! tolerable for home finance applications.
//!
//! ## Example
//!
//! ```rust,no_run
//! use chrono::{TimeZone, Utc};
//! use histfx::prelude::*;
//!
//! let day = Utc.with_ymd_and_hms(2023, 2, 10, 0, 0, 0).unwrap();
//! let options = ConvertOptions::new().accept_older_rate(3).full_trace();
//!
//! let result = live_exchange().convert("TWD", "CZK", day, &options)?;
//! for (i, step) in result.trace.iter().enumerate() {
//!     println!(
//!         "Conversion step {}/{}: 1 {} = {} {} (source: {})",
//!         i + 1,
//!         result.trace.len(),
//!         step.from,
//!         step.rate,
//!         step.to,
//!         step.info
//!     );
//! }
//! # Ok::<(), histfx::error::HistfxError>(())
//! ```

pub mod error;
pub mod exchange;
pub mod fetch;
pub mod graph;
mod offline;
pub mod presets;
pub mod rate;
pub mod sources;
pub mod validate;

pub mod prelude {
    //! Commonly used types and functions
    pub use crate::error::{HistfxError, Result};
    pub use crate::exchange::{Exchange, Freshness};
    pub use crate::graph::{convert, Conversion, ConvertOptions, Graph, ResultDetail};
    pub use crate::presets::{live_exchange, offline_exchange};
    pub use crate::rate::Rate;
}
