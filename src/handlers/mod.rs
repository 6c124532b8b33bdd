pub mod links;
pub mod redirect;

use url::Url;

use crate::error::ApiError;

/// Parse a raw request field into an absolute URL.
fn parse_url(field: &str, raw: &str) -> Result<Url, ApiError> {
    Url::parse(raw.trim()).map_err(|e| ApiError::invalid_url(field, e))
}
