use common::types::{Place, Suggestion};

mod google;

pub use google::GooglePlaces;

#[derive(Debug, thiserror::Error)]
pub enum PlacesError {
	#[error("invalid places url: {0}")]
	InvalidUrl(#[from] url::ParseError),
	#[error("http error: {0}")]
	Http(#[from] reqwest::Error),
	#[error("places service returned {status}: {}", .message.as_deref().unwrap_or("no message"))]
	Status { status: String, message: Option<String> },
	#[error("failed to decode places response: {0}")]
	Decode(#[from] serde_json::Error),
	#[error("place {0} not found")]
	NotFound(String),
}

/// Turns partial text into ranked suggestions and suggestions into places.
#[async_trait::async_trait]
pub trait PlacesService: Send + Sync {
	/// Suggestions in the order the service ranked them. The caller decides
	/// how many to keep.
	async fn autocomplete(&self, input: &str) -> Result<Vec<Suggestion>, PlacesError>;

	async fn details(&self, place_id: &str) -> Result<Place, PlacesError>;
}
