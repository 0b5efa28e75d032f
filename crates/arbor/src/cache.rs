//! Parse cache: trees and outlines memoized by path and content fingerprint.
//!
//! ## Concurrency
//!
//! - The LRU index sits behind one mutex that is only held for lookups and
//!   bookkeeping, never while parsing.
//! - Work on one path is serialized by a per-path lock. A second request for
//!   the same content waits on that lock and then finds the first request's
//!   entry, so each (path, content) is parsed once.
//! - Entries are handed out as `Arc`s. An entry with an outstanding handle is
//!   pinned: eviction skips it, even if that leaves the cache over budget.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use dashmap::DashMap;
use lru::LruCache;
use serde::Serialize;
use tracing::debug;

use crate::config::{Budget, CacheConfig};
use crate::error::Result;
use crate::extract::extract;
use crate::parser::parse;
use crate::syntax::SyntaxNode;
use crate::types::{Language, Outline, SyntaxError, Truncation};

/// Content fingerprint: xxh3-64 of the raw bytes.
#[must_use]
pub fn fingerprint(text: &str) -> u64 {
    xxhash_rust::xxh3::xxh3_64(text.as_bytes())
}

/// A parsed and extracted document.
///
/// Immutable once built; the tree and outline always describe the same text.
#[derive(Debug)]
pub struct CacheEntry {
    path: PathBuf,
    fingerprint: u64,
    language: Language,
    source: String,
    root: SyntaxNode,
    errors: Vec<SyntaxError>,
    outline: Outline,
    truncated: Vec<Truncation>,
    last_access: AtomicU64,
}

impl CacheEntry {
    /// Parse and extract `text`, producing a complete entry.
    ///
    /// # Errors
    ///
    /// Returns `Error::Grammar` if the grammar cannot be loaded.
    pub fn build(path: &Path, text: &str, language: Language, budget: &Budget) -> Result<Self> {
        let parsed = parse(text, language, budget)?;
        let outline = extract(&parsed.root, text, language, budget);
        let mut truncated = parsed.truncated;
        truncated.extend(outline.truncated.iter().copied());
        Ok(Self {
            path: path.to_path_buf(),
            fingerprint: fingerprint(text),
            language,
            source: text.to_string(),
            root: parsed.root,
            errors: parsed.errors,
            outline,
            truncated,
            last_access: AtomicU64::new(0),
        })
    }

    /// Path the entry is keyed by.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Fingerprint of the source text.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    /// Grammar used to parse the source.
    #[must_use]
    pub fn language(&self) -> Language {
        self.language
    }

    /// The full source text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Root of the syntax tree.
    #[must_use]
    pub fn root(&self) -> &SyntaxNode {
        &self.root
    }

    /// Syntax errors found while parsing.
    #[must_use]
    pub fn errors(&self) -> &[SyntaxError] {
        &self.errors
    }

    /// The structural outline.
    #[must_use]
    pub fn outline(&self) -> &Outline {
        &self.outline
    }

    /// Every budget exceeded while parsing or extracting.
    #[must_use]
    pub fn truncated(&self) -> &[Truncation] {
        &self.truncated
    }

    /// Logical time of the last lookup that returned this entry.
    #[must_use]
    pub fn last_access(&self) -> u64 {
        self.last_access.load(Ordering::Relaxed)
    }
}

/// Result of [`ParseCache::get_or_create`].
#[derive(Debug, Clone)]
pub struct CacheLookup {
    /// The entry for the requested content; holding it pins the entry
    pub entry: Arc<CacheEntry>,
    /// `true` if no parse was needed
    pub hit: bool,
}

/// How [`ParseCache::evict`] chooses what to drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvictionPolicy {
    /// Drop least-recently-used entries until the configured bounds hold
    ToBudget,
    /// Drop least-recently-used entries until at most this many remain
    ToCount(usize),
}

/// Counters and sizes reported by [`ParseCache::stats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Documents currently cached
    pub entries: usize,
    /// Source bytes currently cached
    pub source_bytes: usize,
    /// Lookups served without parsing
    pub hits: u64,
    /// Lookups that required a parse
    pub misses: u64,
    /// Parses performed
    pub parses: u64,
    /// Entries dropped to stay within bounds
    pub evictions: u64,
    /// Entries dropped because their content changed or was invalidated
    pub invalidations: u64,
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    parses: AtomicU64,
    evictions: AtomicU64,
    invalidations: AtomicU64,
}

struct Index {
    lru: LruCache<PathBuf, Arc<CacheEntry>>,
    source_bytes: usize,
}

impl Index {
    fn remove(&mut self, path: &Path) -> Option<Arc<CacheEntry>> {
        let removed = self.lru.pop(path)?;
        self.source_bytes -= removed.source.len();
        Some(removed)
    }
}

/// Bounded LRU cache of parsed documents.
pub struct ParseCache {
    index: Mutex<Index>,
    path_locks: DashMap<PathBuf, Arc<Mutex<()>>>,
    config: CacheConfig,
    budget: Budget,
    clock: AtomicU64,
    counters: Counters,
}

impl std::fmt::Debug for ParseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParseCache")
            .field("config", &self.config)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

impl ParseCache {
    /// Create an empty cache.
    ///
    /// A `max_entries` of zero is treated as one.
    #[must_use]
    pub fn new(config: CacheConfig, budget: Budget) -> Self {
        Self {
            index: Mutex::new(Index {
                lru: LruCache::unbounded(),
                source_bytes: 0,
            }),
            path_locks: DashMap::new(),
            config: CacheConfig {
                max_entries: NonZeroUsize::new(config.max_entries)
                    .map_or(1, NonZeroUsize::get),
                ..config
            },
            budget,
            clock: AtomicU64::new(1),
            counters: Counters::default(),
        }
    }

    /// Budget applied to every parse.
    #[must_use]
    pub fn budget(&self) -> &Budget {
        &self.budget
    }

    /// Return the entry for `(path, text, language)`, parsing on a miss.
    ///
    /// A cached entry for `path` with different content or language is removed
    /// before the new one is stored.
    ///
    /// # Errors
    ///
    /// Returns `Error::Grammar` if the grammar cannot be loaded. The cache is
    /// left without an entry for `path` in that case.
    pub fn get_or_create(&self, path: &Path, text: &str, language: Language) -> Result<CacheLookup> {
        let fingerprint = fingerprint(text);
        if let Some(entry) = self.lookup(path, fingerprint, language) {
            return Ok(self.hit(entry));
        }

        let path_lock = self.path_lock(path);
        let _guard = path_lock.lock().unwrap_or_else(PoisonError::into_inner);

        // Another request may have stored this content while we waited.
        if let Some(entry) = self.lookup(path, fingerprint, language) {
            return Ok(self.hit(entry));
        }
        self.counters.misses.fetch_add(1, Ordering::Relaxed);
        debug!(path = %path.display(), fingerprint, %language, "Cache miss");

        if self.lock_index().remove(path).is_some() {
            self.counters.invalidations.fetch_add(1, Ordering::Relaxed);
            debug!(path = %path.display(), "Replaced stale cache entry");
        }

        let entry = Arc::new(CacheEntry::build(path, text, language, &self.budget)?);
        self.counters.parses.fetch_add(1, Ordering::Relaxed);
        entry.last_access.store(self.tick(), Ordering::Relaxed);

        let mut index = self.lock_index();
        index.source_bytes += entry.source.len();
        index.lru.put(path.to_path_buf(), Arc::clone(&entry));
        self.shrink(&mut index, self.config.max_entries, self.config.max_source_bytes);
        drop(index);

        Ok(CacheLookup { entry, hit: false })
    }

    /// The cached entry for `path`, without touching recency or counters.
    #[must_use]
    pub fn peek(&self, path: &Path) -> Option<Arc<CacheEntry>> {
        self.lock_index().lru.peek(path).cloned()
    }

    /// Drop the entry for `path`. Returns `true` if one was cached.
    pub fn invalidate(&self, path: &Path) -> bool {
        let path_lock = self.path_lock(path);
        let removed = {
            let _guard = path_lock.lock().unwrap_or_else(PoisonError::into_inner);
            self.lock_index().remove(path).is_some()
        };
        drop(path_lock);
        if removed {
            self.counters.invalidations.fetch_add(1, Ordering::Relaxed);
            debug!(path = %path.display(), "Invalidated cache entry");
        }
        self.release_path_lock(path);
        removed
    }

    /// Drop unpinned entries, least recently used first. Returns how many went.
    pub fn evict(&self, policy: EvictionPolicy) -> usize {
        let (max_entries, max_bytes) = match policy {
            EvictionPolicy::ToBudget => (self.config.max_entries, self.config.max_source_bytes),
            EvictionPolicy::ToCount(n) => (n, usize::MAX),
        };
        let mut index = self.lock_index();
        self.shrink(&mut index, max_entries, max_bytes)
    }

    /// Drop every entry. Handles already given out stay valid.
    pub fn clear(&self) {
        let mut index = self.lock_index();
        index.lru.clear();
        index.source_bytes = 0;
        drop(index);
        self.path_locks.retain(|_, lock| Arc::strong_count(lock) > 1);
    }

    /// Number of cached documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock_index().lru.len()
    }

    /// Whether the cache holds no documents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current sizes and lifetime counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let (entries, source_bytes) = {
            let index = self.lock_index();
            (index.lru.len(), index.source_bytes)
        };
        CacheStats {
            entries,
            source_bytes,
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            parses: self.counters.parses.load(Ordering::Relaxed),
            evictions: self.counters.evictions.load(Ordering::Relaxed),
            invalidations: self.counters.invalidations.load(Ordering::Relaxed),
        }
    }

    fn lookup(&self, path: &Path, fingerprint: u64, language: Language) -> Option<Arc<CacheEntry>> {
        let mut index = self.lock_index();
        let entry = index.lru.get(path)?;
        (entry.fingerprint == fingerprint && entry.language == language).then(|| Arc::clone(entry))
    }

    fn hit(&self, entry: Arc<CacheEntry>) -> CacheLookup {
        self.counters.hits.fetch_add(1, Ordering::Relaxed);
        entry.last_access.store(self.tick(), Ordering::Relaxed);
        debug!(path = %entry.path.display(), fingerprint = entry.fingerprint, "Cache hit");
        CacheLookup { entry, hit: true }
    }

    /// Evict unpinned LRU entries until both bounds hold or nothing is evictable.
    fn shrink(&self, index: &mut Index, max_entries: usize, max_bytes: usize) -> usize {
        let mut evicted = 0;
        while index.lru.len() > max_entries || index.source_bytes > max_bytes {
            // The index's own Arc is the only handle on an unpinned entry.
            let victim = index
                .lru
                .iter()
                .rev()
                .find(|(_, entry)| Arc::strong_count(entry) == 1)
                .map(|(path, _)| path.clone());
            let Some(victim) = victim else {
                debug!(
                    entries = index.lru.len(),
                    source_bytes = index.source_bytes,
                    "Every entry is pinned, cache temporarily over budget"
                );
                break;
            };
            index.remove(&victim);
            self.path_locks
                .remove_if(&victim, |_, lock| Arc::strong_count(lock) == 1);
            self.counters.evictions.fetch_add(1, Ordering::Relaxed);
            debug!(path = %victim.display(), "Evicted cache entry");
            evicted += 1;
        }
        evicted
    }

    fn path_lock(&self, path: &Path) -> Arc<Mutex<()>> {
        Arc::clone(
            self.path_locks
                .entry(path.to_path_buf())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .value(),
        )
    }

    fn release_path_lock(&self, path: &Path) {
        self.path_locks
            .remove_if(path, |_, lock| Arc::strong_count(lock) == 1);
    }

    fn lock_index(&self) -> MutexGuard<'_, Index> {
        self.index.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed)
    }
}
