//! Shared in-memory cache of fetched price series.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tickerlens_core::{CompanyProfile, DateRange, PriceSeries, Symbol};
use tokio::sync::Mutex;

type CacheKey = (Symbol, DateRange);

/// What a provider returned for one (symbol, range).
#[derive(Debug, Clone, PartialEq)]
pub struct CachedSeries {
    pub series: PriceSeries,
    pub company: Option<CompanyProfile>,
}

impl From<PriceSeries> for CachedSeries {
    fn from(series: PriceSeries) -> Self {
        Self {
            series,
            company: None,
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: CachedSeries,
    /// `None` when the TTL is too long to represent; such entries only
    /// leave through eviction.
    expires_at: Option<Instant>,
    last_used: u64,
}

impl CacheEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }
}

/// Counters describing cache effectiveness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub entries: usize,
}

#[derive(Debug)]
struct CacheInner {
    map: HashMap<CacheKey, CacheEntry>,
    ttl: Duration,
    capacity: usize,
    tick: u64,
    stats: CacheStats,
}

impl CacheInner {
    fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            map: HashMap::new(),
            ttl,
            capacity,
            tick: 0,
            stats: CacheStats::default(),
        }
    }

    fn is_disabled(&self) -> bool {
        self.ttl.is_zero() || self.capacity == 0
    }

    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    fn get(&mut self, key: &CacheKey, now: Instant) -> Option<CachedSeries> {
        let expired = match self.map.get(key) {
            Some(entry) => !entry.is_live(now),
            None => {
                self.stats.misses += 1;
                return None;
            }
        };

        if expired {
            self.map.remove(key);
            self.stats.misses += 1;
            return None;
        }

        let tick = self.next_tick();
        let entry = self.map.get_mut(key)?;
        entry.last_used = tick;
        self.stats.hits += 1;
        Some(entry.value.clone())
    }

    fn put(&mut self, key: CacheKey, value: CachedSeries, now: Instant) {
        self.map.retain(|_, entry| entry.is_live(now));

        if !self.map.contains_key(&key) {
            while self.map.len() >= self.capacity {
                let lru = self
                    .map
                    .iter()
                    .min_by_key(|(_, entry)| entry.last_used)
                    .map(|(key, _)| key.clone());
                match lru {
                    Some(lru) => {
                        self.map.remove(&lru);
                        self.stats.evictions += 1;
                    }
                    None => break,
                }
            }
        }

        let tick = self.next_tick();
        self.map.insert(
            key,
            CacheEntry {
                value,
                expires_at: now.checked_add(self.ttl),
                last_used: tick,
            },
        );
    }
}

/// Bounded TTL + LRU cache keyed by (symbol, range).
///
/// Clones share the same store. A zero TTL or zero capacity disables
/// caching: reads always miss and writes are dropped.
#[derive(Debug, Clone)]
pub struct SeriesCache {
    inner: Arc<Mutex<CacheInner>>,
}

impl SeriesCache {
    /// Create a cache with the given entry lifetime and size bound.
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(CacheInner::new(ttl, capacity))),
        }
    }

    /// Create a disabled cache.
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO, 0)
    }

    /// Get a live entry, refreshing its recency.
    pub async fn get(&self, symbol: &Symbol, range: &DateRange) -> Option<CachedSeries> {
        let mut inner = self.inner.lock().await;
        if inner.is_disabled() {
            return None;
        }
        inner.get(&(symbol.clone(), *range), Instant::now())
    }

    /// Store a whole series fetched from one provider.
    pub async fn put(&self, symbol: &Symbol, range: &DateRange, value: impl Into<CachedSeries>) {
        let mut inner = self.inner.lock().await;
        if inner.is_disabled() {
            return;
        }
        inner.put((symbol.clone(), *range), value.into(), Instant::now());
    }

    /// Remove every entry.
    pub async fn clear(&self) {
        self.inner.lock().await.map.clear();
    }

    /// Number of stored entries, including ones not yet purged.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.map.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn stats(&self) -> CacheStats {
        let inner = self.inner.lock().await;
        CacheStats {
            entries: inner.map.len(),
            ..inner.stats
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tickerlens_core::Quote;

    fn key(ticker: &str) -> CacheKey {
        let end = NaiveDate::from_ymd_opt(2024, 6, 28).unwrap();
        (Symbol::parse(ticker).unwrap(), DateRange::trailing(end, 30).unwrap())
    }

    fn series(ticker: &str, source: &str) -> CachedSeries {
        let date = NaiveDate::from_ymd_opt(2024, 6, 28).unwrap();
        PriceSeries::new(
            Symbol::parse(ticker).unwrap(),
            source,
            vec![Quote::new(date, 10.0, 11.0, 9.0, 10.5, 100)],
        )
        .into()
    }

    #[test]
    fn test_entries_expire() {
        let mut inner = CacheInner::new(Duration::from_secs(60), 8);
        let now = Instant::now();

        inner.put(key("AAPL"), series("AAPL", "yahoo"), now);
        assert!(inner.get(&key("AAPL"), now + Duration::from_secs(59)).is_some());
        assert!(inner.get(&key("AAPL"), now + Duration::from_secs(60)).is_none());
        // Purged on access
        assert!(inner.map.is_empty());
    }

    #[test]
    fn test_lru_eviction() {
        let mut inner = CacheInner::new(Duration::from_secs(60), 2);
        let now = Instant::now();

        inner.put(key("AAPL"), series("AAPL", "yahoo"), now);
        inner.put(key("MSFT"), series("MSFT", "yahoo"), now);
        // Touch AAPL so MSFT becomes least recently used
        assert!(inner.get(&key("AAPL"), now).is_some());
        inner.put(key("IBM"), series("IBM", "yahoo"), now);

        assert_eq!(inner.map.len(), 2);
        assert!(inner.map.contains_key(&key("AAPL")));
        assert!(!inner.map.contains_key(&key("MSFT")));
        assert_eq!(inner.stats.evictions, 1);
    }

    #[test]
    fn test_insert_purges_expired_before_evicting() {
        let mut inner = CacheInner::new(Duration::from_secs(10), 2);
        let now = Instant::now();

        inner.put(key("AAPL"), series("AAPL", "yahoo"), now);
        inner.put(key("MSFT"), series("MSFT", "yahoo"), now + Duration::from_secs(5));
        inner.put(key("IBM"), series("IBM", "yahoo"), now + Duration::from_secs(11));

        assert!(inner.map.contains_key(&key("MSFT")));
        assert!(inner.map.contains_key(&key("IBM")));
        assert_eq!(inner.stats.evictions, 0);
    }

    #[test]
    fn test_replace_keeps_single_provider() {
        let mut inner = CacheInner::new(Duration::from_secs(60), 4);
        let now = Instant::now();

        inner.put(key("AAPL"), series("AAPL", "alphavantage"), now);
        inner.put(key("AAPL"), series("AAPL", "yahoo"), now);

        let cached = inner.get(&key("AAPL"), now).unwrap();
        assert_eq!(cached.series.source(), "yahoo");
        assert_eq!(inner.map.len(), 1);
    }

    #[tokio::test]
    async fn test_shared_cache() {
        let cache = SeriesCache::new(Duration::from_secs(60), 4);
        let (symbol, range) = key("AAPL");

        assert!(cache.get(&symbol, &range).await.is_none());
        cache.clone().put(&symbol, &range, series("AAPL", "csv")).await;

        let cached = cache.get(&symbol, &range).await.unwrap();
        assert_eq!(cached.series.source(), "csv");

        let stats = cache.stats().await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
    }

    #[tokio::test]
    async fn test_disabled_cache() {
        let cache = SeriesCache::disabled();
        let (symbol, range) = key("AAPL");

        cache.put(&symbol, &range, series("AAPL", "csv")).await;
        assert!(cache.get(&symbol, &range).await.is_none());
        assert!(cache.is_empty().await);
    }

    #[test]
    fn test_unbounded_ttl_never_expires() {
        let mut inner = CacheInner::new(Duration::from_secs(u64::MAX), 1);
        let now = Instant::now();

        inner.put(key("AAPL"), series("AAPL", "yahoo"), now);
        assert!(inner.get(&key("AAPL"), now + Duration::from_secs(86_400 * 365)).is_some());

        // Capacity still applies
        inner.put(key("MSFT"), series("MSFT", "yahoo"), now);
        assert_eq!(inner.map.len(), 1);
        assert!(inner.map.contains_key(&key("MSFT")));
    }

    #[tokio::test]
    async fn test_company_stored_with_series() {
        let cache = SeriesCache::new(Duration::from_secs(u64::MAX), 4);
        let (symbol, range) = key("AAPL");
        let mut value = series("AAPL", "alphavantage");
        value.company = Some(CompanyProfile::new("Apple Inc"));

        cache.put(&symbol, &range, value.clone()).await;
        assert_eq!(cache.get(&symbol, &range).await, Some(value));
    }
}
