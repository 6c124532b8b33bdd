//! Command side: creating and deleting short URLs.

use url::Url;

use crate::{
    error::{Result, ShortyError},
    shortcode::{CounterShortUrl, GenerateShortUrl},
    store::UrlStore,
};

/// Decides between reusing an existing short URL and minting a new one, then
/// records the result in the [`UrlStore`].
#[derive(Clone, Debug)]
pub struct UrlMapper<Gen = CounterShortUrl> {
    store: UrlStore,
    generator: Gen,
}

impl<Gen> UrlMapper<Gen>
where
    Gen: GenerateShortUrl,
{
    pub fn new(store: UrlStore, generator: Gen) -> Self {
        Self { store, generator }
    }

    pub fn generator(&self) -> &Gen {
        &self.generator
    }

    /// Map `long_url` to a short URL.
    ///
    /// A `preferred_short_url` wins over `force_new`: it is returned as-is if
    /// already mapped to `long_url`, inserted if free, and rejected with
    /// [`ShortyError::Conflict`] if bound to another long URL. Without one, an
    /// existing short URL for `long_url` is reused unless `force_new` is set.
    /// The check and the insert happen under one lock acquisition, so
    /// concurrent reuse requests for the same long URL share one short URL.
    ///
    /// A freshly generated short URL that is already bound comes back as
    /// [`ShortyError::ShortUrlTaken`]; the caller decides whether to retry.
    pub fn create_short_url(
        &self,
        long_url: &Url,
        force_new: bool,
        preferred_short_url: Option<&Url>,
    ) -> Result<Url> {
        if let Some(preferred) = preferred_short_url {
            return self.create_preferred(long_url, preferred);
        }

        if force_new {
            let short_url = self.generator.generate_short_url(long_url);
            if !self.store.add_pair(short_url.clone(), long_url.clone())? {
                return Err(ShortyError::ShortUrlTaken(short_url));
            }
            tracing::info!(short_url = %short_url, long_url = %long_url, force_new, "Short URL created");
            return Ok(short_url);
        }

        let (short_url, created) = self.store.first_short_url_or_insert_with(long_url, || {
            self.generator.generate_short_url(long_url)
        })?;

        if created {
            tracing::info!(short_url = %short_url, long_url = %long_url, force_new, "Short URL created");
        } else {
            tracing::info!(short_url = %short_url, long_url = %long_url, "Reusing existing short URL");
        }
        Ok(short_url)
    }

    fn create_preferred(&self, long_url: &Url, preferred: &Url) -> Result<Url> {
        match self.store.insert_or_get(preferred, long_url)? {
            None => {
                tracing::info!(short_url = %preferred, long_url = %long_url, "Preferred short URL created");
                Ok(preferred.clone())
            }
            Some(existing) if &existing == long_url => Ok(preferred.clone()),
            Some(existing) => {
                tracing::warn!(
                    short_url = %preferred,
                    long_url = %long_url,
                    existing_long_url = %existing,
                    "Preferred short URL already bound to a different long URL"
                );
                Err(ShortyError::Conflict {
                    short_url: preferred.clone(),
                    existing_long_url: existing,
                })
            }
        }
    }

    /// Remove `short_url`; `false` if it was not mapped.
    pub fn delete_short_url(&self, short_url: &Url) -> Result<bool> {
        let deleted = self.store.remove(short_url)?;
        if deleted {
            tracing::info!(short_url = %short_url, "Short URL deleted");
        }
        Ok(deleted)
    }
}
