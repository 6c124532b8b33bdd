use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use url::Url;

use crate::shortcode::GenerateShortUrl;

/// URL-unreserved characters (RFC 3986), one symbol per digit value.
pub const ALPHABET_LEN: usize = 66;
pub const ALPHABET: &[u8; ALPHABET_LEN] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789.-_~";

/// Default starting offset; keeps the first codes from being one or two
/// characters long.
pub const DEFAULT_SEED: u64 = 1_000_000;

/// Smallest seed whose codes are at least three symbols long. Shorter codes
/// could come out as `.` or `..`, which are not usable path segments.
pub const MIN_SEED: u64 = (ALPHABET_LEN * ALPHABET_LEN) as u64;

/// Encode `n` in base 66, most significant digit first.
pub fn encode(mut n: u64) -> String {
    let base = ALPHABET_LEN as u64;
    let mut digits = Vec::with_capacity(11);
    loop {
        digits.push(ALPHABET[(n % base) as usize]);
        n /= base;
        if n == 0 {
            break;
        }
    }
    digits.iter().rev().map(|&b| b as char).collect()
}

/// Monotonic source of code numbers. Every call to [`CodeCounter::next`]
/// observes a distinct value.
#[derive(Debug)]
pub struct CodeCounter(AtomicU64);

impl CodeCounter {
    pub fn new(seed: u64) -> Self {
        Self(AtomicU64::new(seed))
    }

    /// Increment and return the new value.
    pub fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn current(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

impl Default for CodeCounter {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

/// Short URLs of the form `<base>/<code>`, where `code` is the next counter
/// value in base 66. Clones share the counter.
#[derive(Debug, Clone)]
pub struct CounterShortUrl {
    base: Url,
    counter: Arc<CodeCounter>,
}

impl CounterShortUrl {
    pub fn new(base: Url, counter: Arc<CodeCounter>) -> Self {
        Self { base, counter }
    }

    pub fn with_seed(base: Url, seed: u64) -> Self {
        Self::new(base, Arc::new(CodeCounter::new(seed)))
    }

    /// Short URL for an already-known code, e.g. one taken from a request path.
    pub fn short_url_for_code(&self, code: &str) -> Url {
        let mut url = self.base.clone();
        url.set_path(code);
        url
    }
}

impl GenerateShortUrl for CounterShortUrl {
    fn generate_short_url(&self, _long_url: &Url) -> Url {
        self.short_url_for_code(&encode(self.counter.next()))
    }
}
