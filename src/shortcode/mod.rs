pub mod counter;

use url::Url;

pub use counter::{CodeCounter, CounterShortUrl};

/// Mints short URLs for new mappings.
pub trait GenerateShortUrl {
    /// A short URL that has never been handed out by this generator.
    fn generate_short_url(&self, long_url: &Url) -> Url;
}
