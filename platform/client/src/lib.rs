#![forbid(unsafe_code)]

pub mod api;
pub mod config;
pub mod debounce;
pub mod discovery;
pub mod error;
pub mod places;

pub use api::{GatherApi, GatherClient};
pub use discovery::{DiscoveryController, DiscoveryState, Phase, Session};
pub use error::ClientError;

/// Parses a base url so that relative joins append to its path instead of
/// replacing the last segment.
pub(crate) fn base_url(raw: &str) -> Result<url::Url, url::ParseError> {
	if raw.ends_with('/') {
		url::Url::parse(raw)
	} else {
		url::Url::parse(&format!("{raw}/"))
	}
}

#[cfg(test)]
mod tests;
