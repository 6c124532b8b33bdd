use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;
use url::Url;

/// One short → long association, keyed by `short_url` in the store.
///
/// Both URLs are fixed at creation. The redirect counter is atomic so it can
/// be bumped by many readers holding only a shared guard on the index.
#[derive(Debug)]
pub struct ShortUrlEntry {
    short_url: Url,
    long_url: Url,
    redirects: AtomicU64,
    created_at: DateTime<Utc>,
}

impl ShortUrlEntry {
    pub fn new(short_url: Url, long_url: Url) -> Self {
        Self {
            short_url,
            long_url,
            redirects: AtomicU64::new(0),
            created_at: Utc::now(),
        }
    }

    pub fn short_url(&self) -> &Url {
        &self.short_url
    }

    pub fn long_url(&self) -> &Url {
        &self.long_url
    }

    pub fn redirects(&self) -> u64 {
        self.redirects.load(Ordering::Acquire)
    }

    /// Count one redirect and hand back the target.
    pub fn redirect(&self) -> &Url {
        self.redirects.fetch_add(1, Ordering::AcqRel);
        &self.long_url
    }

    pub fn snapshot(&self) -> Mapping {
        Mapping {
            short_url: self.short_url.clone(),
            long_url: self.long_url.clone(),
            redirects: self.redirects(),
            created_at: self.created_at,
        }
    }
}

/// The short URLs currently pointing at one long URL, in insertion order.
///
/// Uniqueness of members follows from the short index: a short URL can only
/// be inserted once while it exists.
#[derive(Debug, Clone)]
pub struct LongUrlEntry {
    short_urls: Vec<Url>,
}

impl LongUrlEntry {
    pub fn new(short_url: Url) -> Self {
        Self {
            short_urls: vec![short_url],
        }
    }

    pub fn add_short_url(&mut self, short_url: Url) {
        debug_assert!(!self.short_urls.contains(&short_url));
        self.short_urls.push(short_url);
    }

    /// Drop `short_url` and return how many short URLs remain.
    pub fn remove_short_url(&mut self, short_url: &Url) -> usize {
        self.short_urls.retain(|s| s != short_url);
        self.short_urls.len()
    }

    pub fn first(&self) -> Option<&Url> {
        self.short_urls.first()
    }

    pub fn short_urls(&self) -> &[Url] {
        &self.short_urls
    }
}

/// Owned copy of a [`ShortUrlEntry`] taken under the store lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mapping {
    pub short_url: Url,
    pub long_url: Url,
    pub redirects: u64,
    pub created_at: DateTime<Utc>,
}
