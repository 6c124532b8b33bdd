use std::{collections::HashMap, sync::Arc, time::Duration};

use parking_lot::{RwLock, RwLockReadGuard, RwLockUpgradableReadGuard, RwLockWriteGuard};
use url::Url;

use crate::{
    error::{Result, ShortyError},
    models::{LongUrlEntry, Mapping, ShortUrlEntry},
};

/// Both indices live behind a single lock so every mutation updates them
/// together.
#[derive(Debug, Default)]
struct Indices {
    by_short: HashMap<Url, ShortUrlEntry>,
    by_long: HashMap<Url, LongUrlEntry>,
}

impl Indices {
    fn insert(&mut self, short_url: Url, long_url: Url) -> bool {
        if self.by_short.contains_key(&short_url) {
            tracing::debug!(short_url = %short_url, "Short URL already present, insert rejected");
            return false;
        }

        self.by_long
            .entry(long_url.clone())
            .and_modify(|entry| entry.add_short_url(short_url.clone()))
            .or_insert_with(|| LongUrlEntry::new(short_url.clone()));

        tracing::debug!(short_url = %short_url, long_url = %long_url, "Mapping inserted");
        self.by_short
            .insert(short_url.clone(), ShortUrlEntry::new(short_url, long_url));

        true
    }
}

/// Thread-safe in-memory registry of short ↔ long URL mappings.
///
/// Keeps a short → entry index and a long → short-set reverse index that are
/// always consistent images of the same relation. One writer or many readers
/// at a time; redirect counting happens under a read guard through an atomic
/// counter on the entry.
///
/// Cloning is cheap and every clone shares the same indices. Nothing internal
/// is handed out by reference: every accessor returns owned copies.
#[derive(Clone, Debug, Default)]
pub struct UrlStore {
    inner: Arc<RwLock<Indices>>,
    lock_timeout: Option<Duration>,
}

impl UrlStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound every lock acquisition by `timeout`. Operations that cannot get
    /// the lock in time fail with [`ShortyError::LockTimeout`].
    pub fn with_lock_timeout(timeout: Duration) -> Self {
        Self {
            inner: Arc::default(),
            lock_timeout: Some(timeout),
        }
    }

    // ── Locking ────────────────────────────────────────────────────────────

    fn read(&self) -> Result<RwLockReadGuard<'_, Indices>> {
        match self.lock_timeout {
            None => Ok(self.inner.read()),
            Some(timeout) => self
                .inner
                .try_read_for(timeout)
                .ok_or(ShortyError::LockTimeout(timeout)),
        }
    }

    /// Shared with plain readers, exclusive against other upgradable
    /// holders, so a check made under it still holds after [`Self::upgrade`].
    fn upgradable_read(&self) -> Result<RwLockUpgradableReadGuard<'_, Indices>> {
        match self.lock_timeout {
            None => Ok(self.inner.upgradable_read()),
            Some(timeout) => self
                .inner
                .try_upgradable_read_for(timeout)
                .ok_or(ShortyError::LockTimeout(timeout)),
        }
    }

    fn upgrade<'a>(
        &self,
        guard: RwLockUpgradableReadGuard<'a, Indices>,
    ) -> Result<RwLockWriteGuard<'a, Indices>> {
        match self.lock_timeout {
            None => Ok(RwLockUpgradableReadGuard::upgrade(guard)),
            Some(timeout) => RwLockUpgradableReadGuard::try_upgrade_for(guard, timeout)
                .map_err(|_| ShortyError::LockTimeout(timeout)),
        }
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Indices>> {
        match self.lock_timeout {
            None => Ok(self.inner.write()),
            Some(timeout) => self
                .inner
                .try_write_for(timeout)
                .ok_or(ShortyError::LockTimeout(timeout)),
        }
    }

    // ── Mutations ──────────────────────────────────────────────────────────

    /// Insert `short_url → long_url` unless `short_url` is already present.
    ///
    /// Returns `false` and changes nothing when the short URL exists, whatever
    /// long URL it maps to.
    pub fn add_pair(&self, short_url: Url, long_url: Url) -> Result<bool> {
        Ok(self.write()?.insert(short_url, long_url))
    }

    /// Insert `short_url → long_url` if `short_url` is free. Otherwise leave
    /// everything as is and return the long URL it is already bound to.
    pub fn insert_or_get(&self, short_url: &Url, long_url: &Url) -> Result<Option<Url>> {
        let mut indices = self.write()?;

        if let Some(entry) = indices.by_short.get(short_url) {
            return Ok(Some(entry.long_url().clone()));
        }

        indices.insert(short_url.clone(), long_url.clone());
        Ok(None)
    }

    /// Earliest short URL mapped to `long_url`, or else the one `generate`
    /// yields, inserted without releasing the lock in between. Concurrent
    /// callers for the same long URL therefore agree on one short URL.
    ///
    /// The flag is `true` when a new mapping was inserted. A generated short
    /// URL that is already bound fails with [`ShortyError::ShortUrlTaken`].
    pub fn first_short_url_or_insert_with(
        &self,
        long_url: &Url,
        generate: impl FnOnce() -> Url,
    ) -> Result<(Url, bool)> {
        let indices = self.upgradable_read()?;

        if let Some(existing) = indices
            .by_long
            .get(long_url)
            .and_then(|entry| entry.first().cloned())
        {
            return Ok((existing, false));
        }

        let short_url = generate();
        let mut indices = self.upgrade(indices)?;
        if !indices.insert(short_url.clone(), long_url.clone()) {
            return Err(ShortyError::ShortUrlTaken(short_url));
        }

        Ok((short_url, true))
    }

    /// Delete the mapping for `short_url` and its reverse-index membership.
    /// The reverse entry goes away with its last short URL.
    pub fn remove(&self, short_url: &Url) -> Result<bool> {
        let mut indices = self.write()?;

        let Some(entry) = indices.by_short.remove(short_url) else {
            return Ok(false);
        };

        let long_url = entry.long_url();
        let remaining = indices
            .by_long
            .get_mut(long_url)
            .map(|long_entry| long_entry.remove_short_url(short_url))
            .unwrap_or(0);

        if remaining == 0 {
            indices.by_long.remove(long_url);
        }

        tracing::debug!(short_url = %short_url, long_url = %long_url, remaining, "Mapping removed");
        Ok(true)
    }

    // ── Lookups ────────────────────────────────────────────────────────────

    /// Resolve a short URL for a redirect, counting the redirect on a hit.
    pub fn resolve(&self, short_url: &Url) -> Result<Option<Url>> {
        let indices = self.read()?;
        Ok(indices
            .by_short
            .get(short_url)
            .map(|entry| entry.redirect().clone()))
    }

    /// Long URL for `short_url` without counting a redirect.
    pub fn long_url_of(&self, short_url: &Url) -> Result<Option<Url>> {
        let indices = self.read()?;
        Ok(indices
            .by_short
            .get(short_url)
            .map(|entry| entry.long_url().clone()))
    }

    /// Snapshot of every short URL mapped to `long_url`, earliest first.
    pub fn short_urls_for(&self, long_url: &Url) -> Result<Vec<Url>> {
        let indices = self.read()?;
        Ok(indices
            .by_long
            .get(long_url)
            .map(|entry| entry.short_urls().to_vec())
            .unwrap_or_default())
    }

    /// Redirect count for `short_url`; unknown short URLs count as zero.
    pub fn usage(&self, short_url: &Url) -> Result<u64> {
        let indices = self.read()?;
        Ok(indices
            .by_short
            .get(short_url)
            .map(ShortUrlEntry::redirects)
            .unwrap_or(0))
    }

    pub fn mapping(&self, short_url: &Url) -> Result<Option<Mapping>> {
        let indices = self.read()?;
        Ok(indices.by_short.get(short_url).map(ShortUrlEntry::snapshot))
    }

    /// Number of mappings currently stored.
    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.by_short.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.read()?.by_short.is_empty())
    }
}
