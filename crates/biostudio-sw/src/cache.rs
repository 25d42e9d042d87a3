//! Versioned request/response cache stores.
//!
//! Entries are keyed by method + URL; concurrent writes for the same key
//! are last-write-wins, which is fine because entries are idempotent
//! representations of the same resource.

use bytes::Bytes;
use hashbrown::HashMap;
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use serde::{Deserialize, Serialize};

use crate::fetch::{Request, Response};

/// A cached request/response pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Request URL.
    pub url: String,

    /// Request method.
    pub method: String,

    /// Response status.
    pub status: u16,

    /// Response headers.
    pub headers: HashMap<String, String>,

    /// Response body.
    pub body: Vec<u8>,

    /// Cached at timestamp (ms since epoch).
    pub cached_at: u64,
}

impl CacheEntry {
    /// Capture a response for storage under the given request.
    pub fn from_response(request: &Request, response: &Response) -> Self {
        let headers = response
            .headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        Self {
            url: request.url.to_string(),
            method: request.method.to_string(),
            status: response.status.as_u16(),
            headers,
            body: response.body.to_vec(),
            cached_at: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_millis() as u64,
        }
    }

    /// Rebuild a response for a cache hit.
    pub fn to_response(&self, request: &Request) -> Response {
        let mut headers = HeaderMap::new();
        for (name, value) in &self.headers {
            if let (Ok(n), Ok(v)) = (
                HeaderName::try_from(name.as_str()),
                HeaderValue::try_from(value.as_str()),
            ) {
                headers.insert(n, v);
            }
        }

        Response {
            url: request.url.clone(),
            status: StatusCode::from_u16(self.status).unwrap_or(StatusCode::OK),
            headers,
            body: Bytes::from(self.body.clone()),
            from_cache: true,
        }
    }
}

fn request_key(request: &Request) -> String {
    format!("{} {}", request.method, request.url)
}

/// A named cache store.
#[derive(Debug, Default)]
pub struct Cache {
    /// Store name (version tag).
    pub name: String,

    /// Cached entries keyed by method + URL.
    entries: HashMap<String, CacheEntry>,
}

impl Cache {
    /// Create a new cache.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            entries: HashMap::new(),
        }
    }

    /// Match a request.
    pub fn match_request(&self, request: &Request) -> Option<&CacheEntry> {
        self.entries.get(&request_key(request))
    }

    /// Add or overwrite an entry.
    pub fn put(&mut self, request: &Request, entry: CacheEntry) {
        self.entries.insert(request_key(request), entry);
    }

    /// Delete an entry.
    pub fn delete(&mut self, request: &Request) -> bool {
        self.entries.remove(&request_key(request)).is_some()
    }

    /// Get all keys.
    pub fn keys(&self) -> Vec<&str> {
        self.entries.keys().map(|s| s.as_str()).collect()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// All named cache stores.
#[derive(Debug, Default)]
pub struct CacheStorage {
    caches: HashMap<String, Cache>,
}

impl CacheStorage {
    /// Create new cache storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a cache (creates if it doesn't exist).
    pub fn open(&mut self, name: &str) -> &mut Cache {
        self.caches
            .entry(name.to_string())
            .or_insert_with(|| Cache::new(name))
    }

    /// Insert a fully seeded cache, replacing any store of the same name.
    pub fn insert(&mut self, cache: Cache) {
        self.caches.insert(cache.name.clone(), cache);
    }

    /// Get a cache by name.
    pub fn get(&self, name: &str) -> Option<&Cache> {
        self.caches.get(name)
    }

    /// Check if a cache exists.
    pub fn has(&self, name: &str) -> bool {
        self.caches.contains_key(name)
    }

    /// Delete a cache.
    pub fn delete(&mut self, name: &str) -> bool {
        self.caches.remove(name).is_some()
    }

    /// Delete every cache except the named one, returning the deleted names.
    pub fn retain_only(&mut self, keep: &str) -> Vec<String> {
        let stale: Vec<String> = self
            .caches
            .keys()
            .filter(|name| name.as_str() != keep)
            .cloned()
            .collect();
        for name in &stale {
            self.caches.remove(name);
        }
        stale
    }

    /// Get all cache names.
    pub fn keys(&self) -> Vec<&str> {
        self.caches.keys().map(|s| s.as_str()).collect()
    }
}
