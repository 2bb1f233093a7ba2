//! The Exchange - a cached, self-refreshing collection of rate sources
//!
//! An [`Exchange`] owns a set of registered sources, keeps their raw data
//! cached on disk, and publishes a compiled [`Graph`] that queries run
//! against. The graph is never mutated after publication, only replaced, so
//! readers that grabbed a handle can keep using it without holding any lock.

use std::fmt;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::thread;
use std::time::SystemTime;

use chrono::{DateTime, Duration, Utc};
use fs2::FileExt;
use hashbrown::HashSet;

use crate::error::{HistfxError, Result};
use crate::fetch::{self, FetchOption};
use crate::graph::{self, Conversion, ConvertOptions, Graph};
use crate::rate::Rate;

/// Loads and parses exchange rates from a URI (a URL, a `data:` URL, or a
/// cache file path). Any such function can be registered as a source parser
/// with [`Exchange::add_source`].
pub type GetFn = dyn Fn(&str) -> Result<Vec<Rate>> + Send + Sync;

/// How much work a refresh must perform. The variants form a total order:
/// each level includes everything the previous one does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Freshness {
    /// Use the graph already in memory, if available.
    FromMemory,
    /// Re-parse the on-disk cache files.
    FromLocalCache,
    /// Rebuild the cache from origin (most likely remote).
    FromRemoteSource,
}

/// A registered rate source: a named URL, its parser, and the on-disk cache
/// file the raw bytes are staged through.
struct RateSource {
    name: String,
    source_url: String,
    cache_path: PathBuf,
    parser: Arc<GetFn>,
    fetch_opts: Vec<FetchOption>,
    reload_time: Option<SystemTime>,
}

impl RateSource {
    /// The mtime of the cache file; the epoch if the file does not exist.
    /// Memoized after the first successful stat.
    fn last_reload(&mut self) -> Result<SystemTime> {
        if let Some(t) = self.reload_time {
            return Ok(t);
        }
        let t = match fs::metadata(&self.cache_path) {
            Ok(meta) => meta.modified()?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(SystemTime::UNIX_EPOCH)
            }
            Err(e) => return Err(e.into()),
        };
        self.reload_time = Some(t);
        Ok(t)
    }

    /// Re-parses the source, optionally re-downloading the cache file first.
    ///
    /// The download always goes through the cache file even though the bytes
    /// are already in memory: the on-disk state is what parsers see on the
    /// next cold start, and the file is the synchronization point between
    /// concurrent program instances.
    fn reload(&self, download: bool) -> Result<Vec<Rate>> {
        if download {
            if let Some(dir) = self.cache_path.parent() {
                fs::create_dir_all(dir)?;
            }
            let mut file = File::create(&self.cache_path)?;

            // Best effort - the lock is cooperative and only guards against
            // concurrent instances of this program. Platforms that don't
            // support it proceed unlocked.
            let locked = file.lock_exclusive().is_ok();
            let written = fetch::fetch(&self.source_url, &self.fetch_opts).and_then(|data| {
                file.write_all(&data)?;
                file.sync_all()?;
                Ok(())
            });
            if locked {
                let _ = file.unlock();
            }
            written?;
        }

        (self.parser)(&self.cache_path.to_string_lossy())
    }
}

/// A collection of historical exchange rates for various currencies,
/// maintaining a local cache of data from various remote sources.
///
/// The best way to obtain a preconfigured Exchange is
/// [`live_exchange`](crate::presets::live_exchange) or
/// [`offline_exchange`](crate::presets::offline_exchange).
///
/// An Exchange is safe to share across threads. Queries on loaded data take
/// the lock only long enough to copy the graph handle; refreshes serialize
/// behind the write side and re-check staleness there, so contention cannot
/// trigger redundant reloads.
pub struct Exchange {
    cache_life: Duration,
    cache_dir: PathBuf,
    state: RwLock<State>,
}

#[derive(Default)]
struct State {
    graph: Option<Arc<Graph>>,
    sources: Vec<RateSource>,
    last_download: Option<DateTime<Utc>>,
}

impl Exchange {
    /// Creates an empty Exchange caching under `cache_dir`. Cached data older
    /// than `cache_life` triggers a refresh from the remote sources.
    pub fn new(cache_dir: impl Into<PathBuf>, cache_life: Duration) -> Self {
        Self {
            cache_life,
            cache_dir: cache_dir.into(),
            state: RwLock::new(State::default()),
        }
    }

    /// The directory holding the per-source cache files.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// The maximum age of cached data before a remote refresh.
    pub fn cache_life(&self) -> Duration {
        self.cache_life
    }

    /// Registers a new source of exchange rates.
    ///
    /// If the Exchange has already been used, the caller must follow up with
    /// [`force_refresh`](Self::force_refresh) to fold the new source in.
    pub fn add_source<F>(&self, name: &str, url: &str, parser: F, fetch_opts: Vec<FetchOption>)
    where
        F: Fn(&str) -> Result<Vec<Rate>> + Send + Sync + 'static,
    {
        let cache_path = self
            .cache_dir
            .join(format!("forex_{}_cache", sanitize_name(name)));

        let mut state = self.state.write().unwrap();
        state.sources.push(RateSource {
            name: name.to_string(),
            source_url: url.to_string(),
            cache_path,
            parser: Arc::new(parser),
            fetch_opts,
            reload_time: None,
        });
    }

    /// Computes the exchange rate between `from` and `to` on the given date,
    /// refreshing the underlying data first if it is missing or stale.
    ///
    /// Returns [`HistfxError::NotFound`] when no data satisfies the query;
    /// see [`graph::convert`] for the search semantics and options.
    pub fn convert(
        &self,
        from: &str,
        to: &str,
        day: DateTime<Utc>,
        options: &ConvertOptions,
    ) -> Result<Conversion> {
        let graph = self.locked_read()?;
        graph::convert(&graph, from, to, day, options)
    }

    /// The set of currencies available for conversion.
    ///
    /// Nothing technically guarantees all of them are mutually convertible,
    /// but in practice they are, because every source relates its rates to
    /// one of the major currencies.
    pub fn currencies(&self) -> Result<HashSet<String>> {
        let graph = self.locked_read()?;
        Ok(graph.currencies().map(str::to_owned).collect())
    }

    /// Unconditionally rebuilds the exchange data from the upstream sources.
    pub fn force_refresh(&self) -> Result<()> {
        let mut state = self.state.write().unwrap();
        Self::refresh_locked(
            &mut state,
            Freshness::FromRemoteSource,
            Utc::now(),
        )
    }

    fn locked_read(&self) -> Result<Arc<Graph>> {
        let (graph, last_download) = {
            let state = self.state.read().unwrap();
            (state.graph.clone(), state.last_download)
        };

        // The graph is never modified, only replaced, so the cloned handle
        // stays valid after the lock is gone. All that's left to check on the
        // copied state is whether a refresh is due.
        let now = Utc::now();
        match graph {
            Some(g) if !self.is_stale(last_download, now) => Ok(g),
            _ => self.maybe_refresh(now),
        }
    }

    fn is_stale(&self, last_download: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        match last_download {
            Some(t) => t + self.cache_life < now,
            None => true,
        }
    }

    fn maybe_refresh(&self, now: DateTime<Utc>) -> Result<Arc<Graph>> {
        let mut state = self.state.write().unwrap();

        // Repeat the check that brought us here, this time holding the write
        // lock. Contention then can't cause several reloads in quick
        // sequence, and the re-examined state determines the refresh level.
        let mut level = Freshness::FromMemory;

        if state.graph.is_none() {
            // First operation on this Exchange: the age of the on-disk cache
            // decides how much work is needed.
            let oldest = oldest_cache(&mut state.sources)?;
            state.last_download = Some(oldest.into());
            level = Freshness::FromLocalCache;
        }

        // Absent cache files left last_download at the epoch, which counts
        // as stale.
        if self.is_stale(state.last_download, now) {
            level = Freshness::FromRemoteSource;
        }

        Self::refresh_locked(&mut state, level, now)?;

        // Hand the graph back while still holding the lock; this saves the
        // call site from reacquiring the read side.
        state.graph.clone().ok_or(HistfxError::NotFound)
    }

    fn refresh_locked(state: &mut State, level: Freshness, now: DateTime<Utc>) -> Result<()> {
        if level == Freshness::FromMemory {
            return Ok(());
        }

        let download = level == Freshness::FromRemoteSource;
        log::debug!(
            "refreshing {} sources at level {:?}",
            state.sources.len(),
            level
        );

        // Sources can hit the network, so fan out one worker per source.
        // Scoped threads are all joined before results are inspected, which
        // guarantees no cache file is left mid-write by an abandoned worker
        // when another source fails.
        let results: Vec<Result<Vec<Rate>>> = thread::scope(|scope| {
            let handles: Vec<_> = state
                .sources
                .iter()
                .map(|source| scope.spawn(move || source.reload(download)))
                .collect();
            handles
                .into_iter()
                .map(|handle| {
                    handle.join().unwrap_or_else(|_| {
                        Err(HistfxError::Fetch("rate source worker panicked".to_string()))
                    })
                })
                .collect()
        });

        let mut rates = Vec::new();
        let mut first_error = None;
        for (source, result) in state.sources.iter().zip(results) {
            match result {
                Ok(batch) => rates.extend(batch),
                Err(e) => {
                    log::warn!("source {} failed to reload: {}", source.name, e);
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }
        // Abort on the first error; the previously published graph, if any,
        // stays in service.
        if let Some(e) = first_error {
            return Err(e);
        }

        let graph = Graph::compile(&rates)?;
        log::debug!("compiled {} rates into {} currencies", rates.len(), graph.len());
        state.graph = Some(Arc::new(graph));
        if download {
            state.last_download = Some(now);
        }

        Ok(())
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read().unwrap();
        let names: Vec<&str> = state.sources.iter().map(|s| s.name.as_str()).collect();
        match &state.graph {
            Some(graph) => write!(f, "Exchange({}, {} currencies)", names.join(", "), graph.len()),
            None => write!(f, "Exchange({}, currencies not loaded)", names.join(", ")),
        }
    }
}

/// The mtime of the oldest on-disk cache file across all sources; the epoch
/// if any file is missing (or there are no sources at all).
fn oldest_cache(sources: &mut [RateSource]) -> Result<SystemTime> {
    let mut oldest: Option<SystemTime> = None;
    for source in sources {
        let t = source.last_reload()?;
        if oldest.map_or(true, |o| t < o) {
            oldest = Some(t);
        }
    }
    Ok(oldest.unwrap_or(SystemTime::UNIX_EPOCH))
}

/// Cache file names are derived from source names with every non-alphanumeric
/// byte flattened to `_`, so arbitrary names stay path-friendly.
fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("ECB"), "ECB");
        assert_eq!(sanitize_name("ECB (offline)"), "ECB__offline_");
        assert_eq!(sanitize_name("ba/nk.v2"), "ba_nk_v2");
    }

    #[test]
    fn test_freshness_ordering() {
        assert!(Freshness::FromMemory < Freshness::FromLocalCache);
        assert!(Freshness::FromLocalCache < Freshness::FromRemoteSource);
    }

    #[test]
    fn test_cache_path_derivation() {
        let exchange = Exchange::new("/tmp/forex-test", Duration::hours(12));
        exchange.add_source("My Bank", "data:text/csv,", |_| Ok(Vec::new()), Vec::new());

        let state = exchange.state.read().unwrap();
        assert_eq!(
            state.sources[0].cache_path,
            PathBuf::from("/tmp/forex-test/forex_My_Bank_cache")
        );
    }

    #[test]
    fn test_display_before_load() {
        let exchange = Exchange::new("/tmp/forex-test", Duration::hours(12));
        exchange.add_source("A", "data:text/csv,", |_| Ok(Vec::new()), Vec::new());
        exchange.add_source("B", "data:text/csv,", |_| Ok(Vec::new()), Vec::new());
        assert_eq!(exchange.to_string(), "Exchange(A, B, currencies not loaded)");
    }

    #[test]
    fn test_is_stale() {
        let exchange = Exchange::new("/tmp/forex-test", Duration::hours(12));
        let now = Utc::now();
        assert!(exchange.is_stale(None, now));
        assert!(exchange.is_stale(Some(now - Duration::hours(13)), now));
        assert!(!exchange.is_stale(Some(now - Duration::hours(1)), now));
    }
}
