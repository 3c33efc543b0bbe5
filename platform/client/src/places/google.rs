use common::types::{LatLng, Place, Suggestion};
use serde::de::DeserializeOwned;
use url::Url;

use super::{PlacesError, PlacesService};
use crate::config::PlacesConfig;

const DETAIL_FIELDS: &str = "place_id,name,formatted_address,geometry";

/// Google Places web service. Only the `status` field decides success, the
/// HTTP status is 200 for most failures.
#[derive(Debug, Clone)]
pub struct GooglePlaces {
	http: reqwest::Client,
	base_url: Url,
	api_key: String,
}

#[derive(Debug, serde::Deserialize)]
struct Envelope<T> {
	status: String,
	#[serde(default)]
	error_message: Option<String>,
	#[serde(flatten)]
	body: T,
}

#[derive(Debug, serde::Deserialize)]
struct Predictions {
	#[serde(default)]
	predictions: Vec<Prediction>,
}

#[derive(Debug, serde::Deserialize)]
struct Prediction {
	place_id: String,
	description: String,
}

#[derive(Debug, serde::Deserialize)]
struct Details {
	#[serde(default)]
	result: Option<DetailsResult>,
}

#[derive(Debug, serde::Deserialize)]
struct DetailsResult {
	place_id: String,
	#[serde(default)]
	name: String,
	#[serde(default)]
	formatted_address: String,
	geometry: Geometry,
}

#[derive(Debug, serde::Deserialize)]
struct Geometry {
	location: LatLng,
}

enum Outcome<T> {
	Ok(T),
	ZeroResults,
}

impl GooglePlaces {
	pub fn new(config: &PlacesConfig) -> Result<Self, PlacesError> {
		Ok(Self {
			http: reqwest::Client::new(),
			base_url: crate::base_url(&config.url)?,
			api_key: config.api_key.clone(),
		})
	}

	async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<Outcome<T>, PlacesError> {
		let url = self.base_url.join(path)?;

		let resp = self
			.http
			.get(url)
			.query(query)
			.query(&[("key", self.api_key.as_str())])
			.send()
			.await?
			.error_for_status()?;

		let body = resp.bytes().await?;
		let envelope: Envelope<T> = serde_json::from_slice(&body)?;

		match envelope.status.as_str() {
			"OK" => Ok(Outcome::Ok(envelope.body)),
			"ZERO_RESULTS" => Ok(Outcome::ZeroResults),
			_ => Err(PlacesError::Status {
				status: envelope.status,
				message: envelope.error_message,
			}),
		}
	}
}

#[async_trait::async_trait]
impl PlacesService for GooglePlaces {
	async fn autocomplete(&self, input: &str) -> Result<Vec<Suggestion>, PlacesError> {
		let predictions = match self.get::<Predictions>("autocomplete/json", &[("input", input)]).await? {
			Outcome::Ok(body) => body.predictions,
			Outcome::ZeroResults => Vec::new(),
		};

		tracing::debug!(input, count = predictions.len(), "autocomplete");

		Ok(predictions
			.into_iter()
			.map(|p| Suggestion {
				id: p.place_id,
				label: p.description,
			})
			.collect())
	}

	async fn details(&self, place_id: &str) -> Result<Place, PlacesError> {
		let query = [("place_id", place_id), ("fields", DETAIL_FIELDS)];

		let result = match self.get::<Details>("details/json", &query).await {
			Ok(Outcome::Ok(Details { result: Some(result) })) => result,
			Ok(Outcome::Ok(Details { result: None }) | Outcome::ZeroResults) => {
				return Err(PlacesError::NotFound(place_id.to_owned()));
			}
			Err(PlacesError::Status { status, .. }) if status == "NOT_FOUND" => {
				return Err(PlacesError::NotFound(place_id.to_owned()));
			}
			Err(err) => return Err(err),
		};

		let LatLng { lat, lng } = result.geometry.location;

		Ok(Place {
			google_id: result.place_id,
			name: result.name,
			formatted_address: result.formatted_address,
			lat: Some(lat),
			lng: Some(lng),
			location: Some(format!("({lat}, {lng})")),
		})
	}
}
