//! Foreign exchange rates from the European Central Bank
//!
//! The data go back to January 1999, when the Euro was introduced. Rates are
//! published from EUR to roughly forty other currencies as a zip-compressed
//! CSV sheet: a header row naming the quote currency of each column, then one
//! row per day.

use std::io::Read;

use chrono::NaiveTime;

use crate::error::{HistfxError, Result};
use crate::fetch;
use crate::rate::Rate;

pub const DEFAULT_ECB_URL: &str = "https://www.ecb.europa.eu/stats/eurofxref/eurofxref-hist.zip";

/// Fetches and parses the ECB historical rate sheet.
pub fn get(uri: &str) -> Result<Vec<Rate>> {
    let raw = fetch::fetch(uri, &[])?;
    let text = decompress(&raw)?;
    parse(&text)
}

/// Extracts the CSV sheet from the zip bundle. Uncompressed input (the
/// embedded offline snapshot, test fixtures) is passed through as-is.
fn decompress(raw: &[u8]) -> Result<String> {
    if !raw.starts_with(b"PK") {
        return Ok(String::from_utf8_lossy(raw).into_owned());
    }

    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(raw))
        .map_err(|e| HistfxError::Parse(format!("invalid ECB archive: {e}")))?;
    for i in 0..archive.len() {
        let mut file = archive
            .by_index(i)
            .map_err(|e| HistfxError::Parse(format!("invalid ECB archive entry: {e}")))?;
        if file.name().ends_with(".csv") {
            let mut text = String::new();
            file.read_to_string(&mut text)?;
            return Ok(text);
        }
    }

    Err(HistfxError::Parse(
        "no csv file in ECB archive".to_string(),
    ))
}

fn parse(text: &str) -> Result<Vec<Rate>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());
    let mut records = reader.records();

    // The header names the quote currency of each column; the source
    // currency is always EUR.
    let header = records
        .next()
        .ok_or_else(|| HistfxError::Parse("empty ECB sheet".to_string()))?
        .map_err(|e| HistfxError::Parse(format!("ECB header: {e}")))?;
    let header: Vec<String> = header.iter().map(|s| s.trim().to_string()).collect();

    let mut rates = Vec::new();
    for (row, record) in records.enumerate() {
        let line = row + 2;
        let record = record.map_err(|e| HistfxError::Parse(format!("ECB line {line}: {e}")))?;
        let date = record
            .get(0)
            .ok_or_else(|| HistfxError::Parse(format!("ECB line {line}: empty record")))?;
        let day = chrono::NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
            .map_err(|e| HistfxError::Parse(format!("ECB line {line}: bad date: {e}")))?
            .and_time(NaiveTime::MIN)
            .and_utc();

        for (field, value) in record.iter().enumerate().skip(1) {
            let value = value.trim();
            if value.is_empty() || value == "N/A" {
                continue;
            }

            let currency = header.get(field).map(String::as_str).unwrap_or("");
            if currency.is_empty() {
                return Err(HistfxError::Parse(format!(
                    "ECB line {line}, column {}: don't know the currency",
                    field + 1
                )));
            }

            let rate: f64 = value.parse().map_err(|e| {
                HistfxError::Parse(format!("ECB line {line}, column {}: {e}", field + 1))
            })?;

            rates.push(Rate {
                from: "EUR".to_string(),
                to: currency.to_string(),
                day,
                rate,
                info: "ECB".to_string(),
            });
        }
    }

    Ok(rates)
}
