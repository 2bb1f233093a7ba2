//! histfx-convert - look up a historical exchange rate from the shell
//!
//! ## Example Usage
//!
//! ```bash
//! # Today's rate (up to three days of tolerance for weekends)
//! histfx-convert --from USD --to CZK
//!
//! # A specific day, with the conversion trace
//! histfx-convert --from TWD --to CZK --date 2023-02-10 --tolerance 5 -v
//!
//! # No network access
//! histfx-convert --from USD --to EUR --date 2022-01-04 --offline
//! ```

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use clap::Parser;
use colored::Colorize;
use std::process;

use histfx::exchange::Exchange;
use histfx::graph::ConvertOptions;
use histfx::presets::{live_exchange, offline_exchange};
use histfx::rate::truncate_day;

/// histfx-convert: historical currency conversion from central bank data
#[derive(Parser)]
#[command(name = "histfx-convert")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Historical currency conversion from central bank data", long_about = None)]
struct Cli {
    /// The currency to convert from (3-letter symbol)
    #[arg(long)]
    from: String,

    /// The currency to convert to (3-letter symbol)
    #[arg(long)]
    to: String,

    /// Effective date as YYYY-MM-DD, or the aliases 'today' and 'yesterday'
    #[arg(long, default_value = "today")]
    date: String,

    /// How many days before the specified date to search for the forex rate
    /// (defaults to 3 when --date is 'today' or 'yesterday')
    #[arg(long)]
    tolerance: Option<i64>,

    /// Don't connect to the internet, use only offline data
    #[arg(long)]
    offline: bool,

    /// Print more info, mainly the conversion trace
    #[arg(short, long)]
    verbose: bool,

    /// Print additional debugging information to stderr
    #[arg(long)]
    debug: bool,
}

impl Cli {
    fn day(&self) -> Result<DateTime<Utc>, String> {
        let date = match self.date.as_str() {
            "today" => Utc::now(),
            "yesterday" => Utc::now() - Duration::days(1),
            other => NaiveDate::parse_from_str(other, "%Y-%m-%d")
                .map_err(|e| format!("Invalid date: {e}"))?
                .and_time(NaiveTime::MIN)
                .and_utc(),
        };
        Ok(truncate_day(date))
    }

    fn tolerance(&self) -> i64 {
        match self.tolerance {
            Some(days) => days,
            None if self.date == "today" || self.date == "yesterday" => 3,
            None => 0,
        }
    }

    fn exchange(&self) -> &'static Exchange {
        if self.offline {
            offline_exchange()
        } else {
            live_exchange()
        }
    }
}

fn currency(flag: &str, value: &str) -> String {
    if value.len() != 3 || !value.chars().all(|c| c.is_ascii_alphabetic()) {
        die(&format!(
            "Invalid {flag} value: {value:?} is not a valid 3-letter currency symbol"
        ));
    }
    value.to_uppercase()
}

fn die(message: &str) -> ! {
    eprintln!("{}", message.red());
    process::exit(1);
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let day = cli.day().unwrap_or_else(|e| die(&e));
    let from = currency("--from", &cli.from);
    let to = currency("--to", &cli.to);
    let exchange = cli.exchange();
    let options = ConvertOptions::new()
        .accept_older_rate(cli.tolerance())
        .full_trace();

    if cli.debug {
        eprintln!(
            "Cache dir={} lifetime={}h",
            exchange.cache_dir().display(),
            exchange.cache_life().num_hours()
        );
        eprintln!("Using exchange {exchange}");
    }

    let result = exchange
        .convert(&from, &to, day, &options)
        .unwrap_or_else(|e| die(&format!("Convert: {e}")));

    for step in &result.trace {
        if step.day != day {
            eprintln!(
                "{}",
                format!(
                    "Warning: rate {} to {} is stale, dated {} (wanted {}, --tolerance={})",
                    step.from,
                    step.to,
                    step.day.format("%Y-%m-%d"),
                    day.format("%Y-%m-%d"),
                    cli.tolerance()
                )
                .yellow()
            );
        }
    }

    if cli.verbose {
        for (i, step) in result.trace.iter().enumerate() {
            println!(
                "Conversion step {}/{}: 1 {} = {:.6} {} (source: {} on {})",
                i + 1,
                result.trace.len(),
                step.from,
                step.rate,
                step.to,
                step.info,
                step.day.format("%Y-%m-%d")
            );
        }
        print!("Computed rate: ");
    }
    println!("{:.6}", result.rate);
}
