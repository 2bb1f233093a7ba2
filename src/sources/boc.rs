//! Foreign exchange rates from the Bank of Canada
//!
//! The Valet API serves daily noon rates back to January 2017 as a CSV sheet
//! with a metadata preamble. Rates quote a handful of currencies against CAD,
//! including a few that appear on no other source's list.

use chrono::NaiveTime;

use crate::error::{HistfxError, Result};
use crate::fetch;
use crate::rate::Rate;

pub const DEFAULT_BOC_URL: &str =
    "https://www.bankofcanada.ca/valet/observations/group/FX_RATES_DAILY/csv?start_date=2017-01-03";

/// Fetches and parses the Bank of Canada daily rate sheet.
pub fn get(uri: &str) -> Result<Vec<Rate>> {
    let raw = fetch::fetch(uri, &[])?;
    let text = String::from_utf8_lossy(&raw);
    let text: &str = &text;

    // The sheet opens with metadata blocks; the rate table follows the
    // OBSERVATIONS marker.
    const MARKER: &str = "\"OBSERVATIONS\"";
    let start = text
        .find(MARKER)
        .ok_or_else(|| HistfxError::Parse("invalid BOC sheet".to_string()))?;
    parse(text[start + MARKER.len()..].trim_start())
}

fn parse(text: &str) -> Result<Vec<Rate>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());
    let mut records = reader.records();

    let header = records
        .next()
        .ok_or_else(|| HistfxError::Parse("truncated BOC sheet".to_string()))?
        .map_err(|e| HistfxError::Parse(format!("BOC header: {e}")))?;
    // Column 0 is the date; the rest are series names like "FXUSDCAD".
    let mut currencies = Vec::with_capacity(header.len());
    currencies.push(String::new());
    for series in header.iter().skip(1) {
        currencies.push(parse_series_name(series.trim())?);
    }

    let mut rates = Vec::new();
    for (row, record) in records.enumerate() {
        let line = row + 2;
        let record = record.map_err(|e| HistfxError::Parse(format!("BOC line {line}: {e}")))?;
        let date = record
            .get(0)
            .ok_or_else(|| HistfxError::Parse(format!("BOC line {line}: empty record")))?;
        let day = chrono::NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
            .map_err(|e| HistfxError::Parse(format!("BOC line {line}: bad date: {e}")))?
            .and_time(NaiveTime::MIN)
            .and_utc();

        for (field, value) in record.iter().enumerate().skip(1) {
            let value = value.trim();
            if value.is_empty() {
                // No rate for this day.
                continue;
            }

            let currency = currencies.get(field).cloned().unwrap_or_default();
            if currency.is_empty() {
                return Err(HistfxError::Parse(format!(
                    "BOC line {line}, column {}: don't know the currency",
                    field + 1
                )));
            }

            let rate: f64 = value.parse().map_err(|e| {
                HistfxError::Parse(format!("BOC line {line}, column {}: {e}", field + 1))
            })?;

            rates.push(Rate {
                from: currency,
                to: "CAD".to_string(),
                day,
                rate,
                info: "BOC".to_string(),
            });
        }
    }

    Ok(rates)
}

/// Valet series names look like `FXUSDCAD`: a fixed prefix, the base
/// currency, and the CAD quote.
fn parse_series_name(series: &str) -> Result<String> {
    if series.len() != 8 {
        return Err(HistfxError::Parse(format!(
            "currency series {series:?} is not 8 bytes"
        )));
    }
    if !series.starts_with("FX") {
        return Err(HistfxError::Parse(format!(
            "currency series {series:?} does not start with FX"
        )));
    }
    if !series.ends_with("CAD") {
        return Err(HistfxError::Parse(format!(
            "currency series {series:?} does not end in CAD"
        )));
    }
    Ok(series[2..5].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    const SAMPLE: &str = "\
\"Terms and Conditions\",\"https://www.bankofcanada.ca/terms/\"

\"SERIES\"
\"id\",\"label\",\"description\"
\"FXUSDCAD\",\"USD/CAD\",\"US dollar to Canadian dollar daily exchange rate\"

\"OBSERVATIONS\"
\"date\",\"FXUSDCAD\",\"FXEURCAD\"
\"2023-02-10\",\"1.3401\",\"1.4340\"
\"2023-02-13\",\"1.3340\",\"\"
";

    #[test]
    fn test_get_from_data_url() {
        let encoded = urlencoding::encode(SAMPLE);
        let rates = get(&format!("data:text/csv,{encoded}")).unwrap();
        assert_eq!(rates.len(), 3);

        let first = &rates[0];
        assert_eq!(first.from, "USD");
        assert_eq!(first.to, "CAD");
        assert_eq!(first.rate, 1.3401);
        assert_eq!(first.day, Utc.with_ymd_and_hms(2023, 2, 10, 0, 0, 0).unwrap());
        assert_eq!(first.info, "BOC");

        // Empty cell on the second day yields no rate.
        assert_eq!(rates[2].from, "USD");
        assert_eq!(rates[2].day, Utc.with_ymd_and_hms(2023, 2, 13, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_missing_marker() {
        let err = get("data:text/csv,no%20observations%20here").unwrap_err();
        assert!(err.to_string().contains("invalid BOC sheet"));
    }

    #[test]
    fn test_series_name_validation() {
        assert_eq!(parse_series_name("FXUSDCAD").unwrap(), "USD");
        assert!(parse_series_name("USDCAD").is_err());
        assert!(parse_series_name("XXUSDCAD").is_err());
        assert!(parse_series_name("FXUSDEUR").is_err());
    }

    #[test]
    fn test_parsed_rates_validate_against_allow_list() {
        use hashbrown::HashSet;

        let encoded = urlencoding::encode(SAMPLE);
        let rates = get(&format!("data:text/csv,{encoded}")).unwrap();
        let allowed: HashSet<String> = ["USD", "EUR", "CAD"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let mut defects = Vec::new();
        let not_found = crate::validate::validate_all(&rates, &allowed, |i, warnings| {
            defects.push(format!("rate {}/{}: {}", i + 1, rates.len(), warnings.join(", ")));
        });

        assert!(defects.is_empty(), "invalid rates: {defects:?}");
        assert!(not_found.is_empty(), "declared but never observed: {not_found:?}");
    }
}
