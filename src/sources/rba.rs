//! Foreign exchange rates from the Reserve Bank of Australia
//!
//! The F11.1 statistical table goes back to January 2018 and quotes AUD
//! against about twenty currencies. The CSV has a multi-line title preamble:
//! the currency units appear a few rows in, and the rate rows start further
//! down still.

use chrono::NaiveTime;

use crate::error::{HistfxError, Result};
use crate::fetch;
use crate::rate::Rate;

pub const DEFAULT_RBA_URL: &str = "https://www.rba.gov.au/statistics/tables/csv/f11.1-data.csv";

// Zero-based record offsets into the sheet.
/// The record where currency units are named.
const CURRENCIES_RECORD: usize = 5;
/// The first record where exchange rate data are.
const FIRST_DATA_RECORD: usize = 12;

/// Fetches and parses the RBA F11.1 exchange rate table.
pub fn get(uri: &str) -> Result<Vec<Rate>> {
    let raw = fetch::fetch(uri, &[])?;
    parse(&String::from_utf8_lossy(&raw))
}

fn parse(text: &str) -> Result<Vec<Rate>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut currencies: Vec<String> = Vec::new();
    let mut rates = Vec::new();

    for (row, record) in reader.records().enumerate() {
        let record =
            record.map_err(|e| HistfxError::Parse(format!("RBA record {}: {e}", row + 1)))?;

        if row == CURRENCIES_RECORD {
            // Currency symbols are three letters; the other units in this
            // row are indices of differing lengths and are ignored.
            currencies = record
                .iter()
                .map(|value| {
                    let value = value.trim();
                    if value.len() == 3 {
                        value.to_string()
                    } else {
                        String::new()
                    }
                })
                .collect();
            continue;
        }
        if row < FIRST_DATA_RECORD {
            continue;
        }
        if currencies.is_empty() {
            return Err(HistfxError::Parse("truncated RBA sheet".to_string()));
        }

        let date = record
            .get(0)
            .ok_or_else(|| HistfxError::Parse(format!("RBA record {}: empty record", row + 1)))?;
        let day = chrono::NaiveDate::parse_from_str(date.trim(), "%d-%b-%Y")
            .map_err(|e| HistfxError::Parse(format!("RBA record {}: bad date: {e}", row + 1)))?
            .and_time(NaiveTime::MIN)
            .and_utc();

        for (field, value) in record.iter().enumerate().skip(1) {
            let currency = currencies.get(field).map(String::as_str).unwrap_or("");
            if currency.is_empty() {
                // This field is not in a currency column.
                continue;
            }

            let value = value.trim();
            if value.is_empty() {
                // No data on this day.
                continue;
            }

            let rate: f64 = value.parse().map_err(|e| {
                HistfxError::Parse(format!("RBA record {}, column {}: {e}", row + 1, field + 1))
            })?;

            rates.push(Rate {
                from: "AUD".to_string(),
                to: currency.to_string(),
                day,
                rate,
                info: "RBA".to_string(),
            });
        }
    }

    Ok(rates)
}
