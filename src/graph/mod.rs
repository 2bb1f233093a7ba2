//! Compiled rate graph and conversion search
//!
//! Available rates are baked into an immutable [`Graph`] by
//! [`Graph::compile`]. [`convert`] then computes an exchange rate between any
//! two currencies from the available data.
//!
//! The search is a breadth-first walk that discovers the shortest conversion
//! chain (e.g. the shortest path from CZK to AED might be CZK -> EUR -> AUD
//! -> AED). It does not attempt to find the numerically best rate. Query cost
//! grows linearly with the number of currencies and logarithmically with the
//! length of historical data.
//!
//! # Example
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use histfx::graph::{convert, ConvertOptions, Graph};
//! use histfx::rate::Rate;
//!
//! let day = Utc.with_ymd_and_hms(2022, 1, 2, 0, 0, 0).unwrap();
//! let graph = Graph::compile(&[Rate {
//!     from: "USD".to_string(),
//!     to: "EUR".to_string(),
//!     rate: 0.9,
//!     day,
//!     info: "example".to_string(),
//! }])
//! .unwrap();
//!
//! let result = convert(&graph, "USD", "EUR", day, &ConvertOptions::new()).unwrap();
//! assert_eq!(result.rate, 0.9);
//! ```

pub mod compile;
pub mod convert;
pub mod options;

pub use compile::Graph;
pub use convert::{convert, Conversion};
pub use options::{ConvertOptions, ResultDetail};
