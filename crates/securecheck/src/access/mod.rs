//! Data access layer.
//!
//! Every view reads the database through a [`QueryExecutor`]. The
//! [`CachedExecutor`] wraps one and memoizes results for the lifetime of a
//! session, keyed by the normalized text of the statement.

mod result;

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::error::Result;

pub use result::{QueryResult, Value};

/// Something that can run a complete SQL statement.
///
/// Statements are always complete: nothing is interpolated into them at
/// execution time.
pub trait QueryExecutor {
    /// Execute a statement and collect its rows.
    ///
    /// An empty result is a success, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection fails or the SQL is malformed.
    fn execute(&self, sql: &str) -> Result<QueryResult>;
}

impl<T: QueryExecutor + ?Sized> QueryExecutor for &T {
    fn execute(&self, sql: &str) -> Result<QueryResult> {
        (**self).execute(sql)
    }
}

/// Collapse whitespace runs and trim, so formatting differences share a cache entry.
#[must_use]
pub fn normalize_query(sql: &str) -> String {
    sql.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cache key for a statement: BLAKE3 digest of its normalized text.
#[must_use]
pub fn cache_key(sql: &str) -> String {
    blake3::hash(normalize_query(sql).as_bytes())
        .to_hex()
        .to_string()
}

/// Counters describing cache usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    /// Fetches answered from the cache.
    pub hits: u64,
    /// Fetches that reached the database.
    pub misses: u64,
    /// Results currently held.
    pub entries: usize,
}

/// Memoizing wrapper around a [`QueryExecutor`].
///
/// Results are shared as `Rc<QueryResult>` so every consumer within a render
/// cycle sees the very same rows. Failed executions are never cached.
#[derive(Debug)]
pub struct CachedExecutor<E> {
    inner: E,
    enabled: bool,
    entries: RefCell<HashMap<String, Rc<QueryResult>>>,
    hits: Cell<u64>,
    misses: Cell<u64>,
}

impl<E: QueryExecutor> CachedExecutor<E> {
    /// Wrap an executor with caching enabled.
    #[must_use]
    pub fn new(inner: E) -> Self {
        Self::with_enabled(inner, true)
    }

    /// Wrap an executor, optionally bypassing the cache entirely.
    #[must_use]
    pub fn with_enabled(inner: E, enabled: bool) -> Self {
        Self {
            inner,
            enabled,
            entries: RefCell::new(HashMap::new()),
            hits: Cell::new(0),
            misses: Cell::new(0),
        }
    }

    /// The wrapped executor.
    #[must_use]
    pub fn inner(&self) -> &E {
        &self.inner
    }

    /// Whether results are memoized.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Fetch the result of a statement, executing it at most once per key.
    ///
    /// # Errors
    ///
    /// Returns the executor's error if the statement is not cached and fails.
    pub fn fetch(&self, sql: &str) -> Result<Rc<QueryResult>> {
        if !self.enabled {
            self.misses.set(self.misses.get() + 1);
            return Ok(Rc::new(self.inner.execute(sql)?));
        }

        let key = cache_key(sql);
        if let Some(result) = self.entries.borrow().get(&key) {
            self.hits.set(self.hits.get() + 1);
            trace!("Cache hit for {}", &key[..16]);
            return Ok(Rc::clone(result));
        }

        self.misses.set(self.misses.get() + 1);
        debug!("Cache miss for {}, executing", &key[..16]);
        let result = Rc::new(self.inner.execute(sql)?);
        self.entries.borrow_mut().insert(key, Rc::clone(&result));
        Ok(result)
    }

    /// Drop the cached result of one statement.
    ///
    /// Returns `true` if an entry was removed.
    pub fn invalidate(&self, sql: &str) -> bool {
        self.entries.borrow_mut().remove(&cache_key(sql)).is_some()
    }

    /// Drop every cached result, returning how many were removed.
    pub fn clear(&self) -> usize {
        let mut entries = self.entries.borrow_mut();
        let removed = entries.len();
        entries.clear();
        if removed > 0 {
            debug!("Cleared {} cached results", removed);
        }
        removed
    }

    /// Current cache counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.get(),
            misses: self.misses.get(),
            entries: self.entries.borrow().len(),
        }
    }
}
