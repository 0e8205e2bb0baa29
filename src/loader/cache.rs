//! Cache of resolved templates

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::engine::CompiledTemplate;

/// Value stored per normalized template identifier.
///
/// An entry starts as raw source text and may be upgraded in place to its
/// compiled form the first time [`compile`](crate::TemplateResolver::compile)
/// runs for the identifier. The upgrade is one-way; an entry never reverts to
/// raw text.
#[derive(Clone)]
pub enum CacheEntry {
    /// Uncompiled template source text
    Raw(String),
    /// Engine-compiled template
    Compiled(Arc<dyn CompiledTemplate>),
}

impl CacheEntry {
    /// Whether this entry still holds raw source text
    pub fn is_raw(&self) -> bool {
        matches!(self, CacheEntry::Raw(_))
    }

    /// Whether this entry holds a compiled template
    pub fn is_compiled(&self) -> bool {
        matches!(self, CacheEntry::Compiled(_))
    }

    /// The raw source text, if not yet compiled
    pub fn as_raw(&self) -> Option<&str> {
        match self {
            CacheEntry::Raw(text) => Some(text),
            CacheEntry::Compiled(_) => None,
        }
    }

    /// The compiled template, if this entry was upgraded
    pub fn as_compiled(&self) -> Option<&Arc<dyn CompiledTemplate>> {
        match self {
            CacheEntry::Raw(_) => None,
            CacheEntry::Compiled(template) => Some(template),
        }
    }
}

impl fmt::Debug for CacheEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheEntry::Raw(text) => f.debug_tuple("Raw").field(text).finish(),
            CacheEntry::Compiled(_) => f.write_str("Compiled(..)"),
        }
    }
}

/// Lookup table of resolved templates, keyed by normalized identifier.
///
/// Entries are never evicted or invalidated; the cache lives as long as its
/// owner. The owner constructs it (or lets the resolver default one) and can
/// hand a pre-populated cache to
/// [`TemplateResolver::with_cache`](crate::TemplateResolver::with_cache).
#[derive(Debug, Default)]
pub struct TemplateCache {
    entries: HashMap<String, CacheEntry>,
}

impl TemplateCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the entry for a normalized identifier
    pub fn get(&self, key: &str) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    /// Whether an entry exists for a normalized identifier
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Store or replace the entry for a normalized identifier
    pub fn insert(&mut self, key: impl Into<String>, entry: CacheEntry) {
        self.entries.insert(key.into(), entry);
    }

    /// All cached identifiers
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|key| key.as_str())
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
