//! Foreign exchange rates from the Czech National Bank
//!
//! The CNB publishes one pipe-delimited sheet per trading day, quoting CZK
//! per a stated amount of each currency, with Czech decimal commas. The
//! sheet's first line carries its effective date.

use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc, Weekday};

use crate::error::{HistfxError, Result};
use crate::fetch;
use crate::rate::Rate;
use crate::sources::skip_lines;

/// Daily sheet URL for the given date. Weekend dates are rolled back to the
/// preceding Friday, because the CNB only publishes on trading days.
pub fn source_url_for_date(date: DateTime<Utc>) -> String {
    let date = match date.weekday() {
        Weekday::Sat => date - Duration::days(1),
        Weekday::Sun => date - Duration::days(2),
        _ => date,
    };
    format!(
        "https://www.cnb.cz/cs/financni-trhy/devizovy-trh/kurzy-devizoveho-trhu/kurzy-devizoveho-trhu/denni_kurz.txt?date={}",
        date.format("%d.%m.%Y")
    )
}

/// Fetches and parses a CNB daily rate sheet.
pub fn get(uri: &str) -> Result<Vec<Rate>> {
    let raw = fetch::fetch(uri, &[])?;
    parse(&String::from_utf8_lossy(&raw))
}

fn parse(text: &str) -> Result<Vec<Rate>> {
    let day = parse_date(text)?;

    // Two preamble lines: the date line and the column headers.
    let body = skip_lines(text, 2)?;
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'|')
        .has_headers(false)
        .flexible(true)
        .from_reader(body.as_bytes());

    let mut rates = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record =
            record.map_err(|e| HistfxError::Parse(format!("CNB line {}: {e}", row + 3)))?;
        if record.len() < 5 {
            continue;
        }

        // Columns: country | currency name | amount | code | rate.
        let amount = parse_czech_decimal(&record[2])
            .map_err(|e| HistfxError::Parse(format!("CNB line {}: parse amount: {e}", row + 3)))?;
        let rate = parse_czech_decimal(&record[4])
            .map_err(|e| HistfxError::Parse(format!("CNB line {}: parse rate: {e}", row + 3)))?;

        rates.push(Rate {
            from: record[3].trim().to_string(),
            to: "CZK".to_string(),
            day,
            // The sheet quotes CZK per `amount` units, e.g. 100 JPY.
            rate: rate / amount,
            info: "CNB".to_string(),
        });
    }

    Ok(rates)
}

fn parse_czech_decimal(s: &str) -> std::result::Result<f64, std::num::ParseFloatError> {
    s.trim().replace(',', ".").parse()
}

/// The sheet opens with its effective date, e.g. `10.02.2023 #30`.
fn parse_date(text: &str) -> Result<DateTime<Utc>> {
    const FORMAT_LEN: usize = "dd.mm.yyyy".len();
    let prefix = text
        .get(..FORMAT_LEN)
        .ok_or_else(|| HistfxError::Parse("truncated CNB sheet".to_string()))?;
    let day = chrono::NaiveDate::parse_from_str(prefix, "%d.%m.%Y")
        .map_err(|e| HistfxError::Parse(format!("CNB date: {e}")))?;
    Ok(day.and_time(NaiveTime::MIN).and_utc())
}
