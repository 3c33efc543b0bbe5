use hyper::{Body, Request};
use serde_json::json;

use super::mock::{json_response, mock_server, query};
use crate::config::PlacesConfig;
use crate::places::{GooglePlaces, PlacesError, PlacesService};

async fn handler(req: Request<Body>) -> hyper::Response<Body> {
	if query(&req, "key").as_deref() != Some("test-key") {
		return json_response(200, json!({ "status": "REQUEST_DENIED", "error_message": "The provided API key is invalid." }));
	}

	match req.uri().path() {
		"/place/autocomplete/json" => match query(&req, "input").as_deref() {
			Some("nowhere") => json_response(200, json!({ "status": "ZERO_RESULTS", "predictions": [] })),
			Some(input) => {
				let predictions = (0..8)
					.map(|i| json!({ "place_id": format!("place-{i}"), "description": format!("{input} {i}") }))
					.collect::<Vec<_>>();
				json_response(200, json!({ "status": "OK", "predictions": predictions }))
			}
			None => json_response(200, json!({ "status": "INVALID_REQUEST" })),
		},
		"/place/details/json" => {
			assert_eq!(
				query(&req, "fields").as_deref(),
				Some("place_id,name,formatted_address,geometry")
			);

			match query(&req, "place_id").as_deref() {
				Some("missing") => json_response(200, json!({ "status": "NOT_FOUND" })),
				Some(id) => json_response(
					200,
					json!({
						"status": "OK",
						"result": {
							"place_id": id,
							"name": "Central Park",
							"formatted_address": "New York, NY, USA",
							"geometry": { "location": { "lat": 40.785091, "lng": -73.968285 } }
						}
					}),
				),
				None => json_response(200, json!({ "status": "INVALID_REQUEST" })),
			}
		}
		_ => json_response(404, json!({})),
	}
}

fn places(url: &str, api_key: &str) -> GooglePlaces {
	GooglePlaces::new(&PlacesConfig {
		url: format!("{url}/place"),
		api_key: api_key.to_owned(),
	})
	.expect("failed to create places client")
}

#[tokio::test]
async fn test_autocomplete() {
	let (url, handle) = mock_server(handler).await;
	let places = places(&url, "test-key");

	let suggestions = places.autocomplete("Central Pa").await.unwrap();
	assert_eq!(suggestions.len(), 8);
	assert_eq!(suggestions[0].id, "place-0");
	assert_eq!(suggestions[0].label, "Central Pa 0");
	assert_eq!(suggestions[7].label, "Central Pa 7");

	assert!(places.autocomplete("nowhere").await.unwrap().is_empty());

	handle.abort();
}

#[tokio::test]
async fn test_details() {
	let (url, handle) = mock_server(handler).await;
	let places = places(&url, "test-key");

	let place = places.details("abc").await.unwrap();
	assert_eq!(place.google_id, "abc");
	assert_eq!(place.name, "Central Park");
	assert_eq!(place.formatted_address, "New York, NY, USA");
	assert_eq!(place.lat, Some(40.785091));
	assert_eq!(place.lng, Some(-73.968285));
	assert_eq!(place.location.as_deref(), Some("(40.785091, -73.968285)"));

	assert!(matches!(places.details("missing").await, Err(PlacesError::NotFound(id)) if id == "missing"));

	handle.abort();
}

#[tokio::test]
async fn test_service_status_is_an_error() {
	let (url, handle) = mock_server(handler).await;
	let places = places(&url, "wrong-key");

	match places.autocomplete("Central Pa").await {
		Err(PlacesError::Status { status, message }) => {
			assert_eq!(status, "REQUEST_DENIED");
			assert_eq!(message.as_deref(), Some("The provided API key is invalid."));
		}
		other => panic!("expected a status error, got {other:?}"),
	}

	handle.abort();
}
