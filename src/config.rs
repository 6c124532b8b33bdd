use std::time::Duration;

use anyhow::{Context, Result};
use url::Url;

use crate::shortcode::counter::{DEFAULT_SEED, MIN_SEED};

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind the HTTP server to, e.g. "0.0.0.0"
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Scheme and host every generated short URL starts with, e.g. "https://shor.ty".
    /// Must NOT carry a path.
    pub short_url_base: Url,

    /// Counter value the short-code generator starts from
    pub code_seed: u64,

    /// Upper bound on waiting for the URL store lock; `None` waits forever
    pub lock_timeout: Option<Duration>,
}

impl AppConfig {
    /// Load configuration from environment variables (populated by dotenvy before this is called).
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Same as [`AppConfig::from_env`], reading each variable through `var`.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let port = var("PORT")
            .unwrap_or_else(|| "3000".into())
            .parse::<u16>()
            .context("PORT must be a valid port number (1–65535)")?;

        let raw_base = var("SHORT_URL_BASE").unwrap_or_else(|| "https://shor.ty".into());
        let short_url_base = Url::parse(raw_base.trim_end_matches('/'))
            .with_context(|| format!("SHORT_URL_BASE is not a valid URL: {raw_base}"))?;

        if short_url_base.scheme() != "http" && short_url_base.scheme() != "https" {
            anyhow::bail!("SHORT_URL_BASE must start with `http://` or `https://`");
        }
        if short_url_base.path() != "/" {
            anyhow::bail!("SHORT_URL_BASE must not contain a path");
        }

        let code_seed = match var("CODE_SEED") {
            Some(raw) => raw
                .parse::<u64>()
                .context("CODE_SEED must be a non-negative integer")?,
            None => DEFAULT_SEED,
        };

        if code_seed < MIN_SEED {
            anyhow::bail!("CODE_SEED must be at least {MIN_SEED}");
        }

        let lock_timeout = match var("LOCK_TIMEOUT_MS") {
            Some(raw) => {
                let ms = raw
                    .parse::<u64>()
                    .context("LOCK_TIMEOUT_MS must be a number of milliseconds")?;
                (ms > 0).then(|| Duration::from_millis(ms))
            }
            None => None,
        };

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            short_url_base,
            code_seed,
            lock_timeout,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
