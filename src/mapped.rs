//! Query side: redirects, reverse lookups and usage.

use url::Url;

use crate::{error::Result, models::Mapping, store::UrlStore};

#[derive(Clone, Debug)]
pub struct MappedUrls {
    store: UrlStore,
}

impl MappedUrls {
    pub fn new(store: UrlStore) -> Self {
        Self { store }
    }

    /// Long URL to redirect to. Every hit counts towards the usage of
    /// `short_url`.
    pub fn get_long_url(&self, short_url: &Url) -> Result<Option<Url>> {
        let long_url = self.store.resolve(short_url)?;
        if long_url.is_none() {
            tracing::debug!(short_url = %short_url, "No mapping for short URL");
        }
        Ok(long_url)
    }

    /// All short URLs forwarding to `long_url`, earliest first.
    pub fn get_short_urls(&self, long_url: &Url) -> Result<Vec<Url>> {
        self.store.short_urls_for(long_url)
    }

    /// Number of redirects through `short_url`, `0` if it is unknown.
    pub fn get_usage(&self, short_url: &Url) -> Result<u64> {
        self.store.usage(short_url)
    }

    pub fn get_stats(&self, short_url: &Url) -> Result<Option<Mapping>> {
        self.store.mapping(short_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn seeded() -> MappedUrls {
        let store = UrlStore::new();
        store
            .add_pair(url("https://shor.ty/a"), url("https://example.com/page"))
            .unwrap();
        store
            .add_pair(url("https://shor.ty/b"), url("https://example.com/page"))
            .unwrap();
        MappedUrls::new(store)
    }

    #[test]
    fn get_long_url_counts_usage() {
        let mapped = seeded();
        for _ in 0..3 {
            assert_eq!(
                mapped.get_long_url(&url("https://shor.ty/a")).unwrap(),
                Some(url("https://example.com/page"))
            );
        }
        assert_eq!(mapped.get_usage(&url("https://shor.ty/a")).unwrap(), 3);
        assert_eq!(mapped.get_usage(&url("https://shor.ty/b")).unwrap(), 0);
    }

    #[test]
    fn unknown_short_url_is_absent_not_an_error() {
        let mapped = seeded();
        assert_eq!(mapped.get_long_url(&url("https://shor.ty/zz")).unwrap(), None);
        assert_eq!(mapped.get_usage(&url("https://shor.ty/zz")).unwrap(), 0);
        assert!(mapped.get_stats(&url("https://shor.ty/zz")).unwrap().is_none());
    }

    #[test]
    fn get_short_urls_lists_all_or_nothing() {
        let mapped = seeded();
        assert_eq!(
            mapped
                .get_short_urls(&url("https://example.com/page"))
                .unwrap(),
            vec![url("https://shor.ty/a"), url("https://shor.ty/b")]
        );
        assert!(mapped
            .get_short_urls(&url("https://example.com/other"))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn reverse_lookup_does_not_count() {
        let mapped = seeded();
        mapped
            .get_short_urls(&url("https://example.com/page"))
            .unwrap();
        mapped.get_stats(&url("https://shor.ty/a")).unwrap();
        assert_eq!(mapped.get_usage(&url("https://shor.ty/a")).unwrap(), 0);
    }
}
