use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use common::context::Handler;
use common::types::{Bounds, Gather, LatLng, NewGather, Participant, Place};
use gathers_client::{ClientError, GatherApi, GatherClient};
use hyper::StatusCode;
use serde_json::{json, Value};
use tokio::task::JoinHandle;
use ulid::Ulid;

use super::global::{mock_global_state, GlobalState};
use crate::api;
use crate::config::ApiConfig;

struct TestServer {
	global: Option<Arc<GlobalState>>,
	handler: Handler,
	handle: JoinHandle<anyhow::Result<()>>,
	url: String,
}

impl TestServer {
	async fn start() -> Self {
		let port = portpicker::pick_unused_port().expect("no free port");
		let (global, handler) = mock_global_state(ApiConfig {
			bind_address: SocketAddr::from(([127, 0, 0, 1], port)),
			tls: None,
		});

		let handle = tokio::spawn(api::run(global.clone()));
		let url = format!("http://127.0.0.1:{port}");

		let client = GatherClient::new(&url).unwrap();
		for _ in 0..50 {
			if client.health().await.is_ok() {
				break;
			}

			tokio::time::sleep(Duration::from_millis(20)).await;
		}

		Self {
			global: Some(global),
			handler,
			handle,
			url,
		}
	}

	fn client(&self) -> GatherClient {
		GatherClient::new(&self.url).unwrap()
	}

	async fn shutdown(mut self) {
		drop(self.global.take());

		tokio::time::timeout(Duration::from_secs(2), self.handler.cancel())
			.await
			.expect("failed to cancel context");

		self.handle.await.unwrap().unwrap();
	}
}

fn place(google_id: &str, lat: f64, lng: f64) -> Place {
	Place {
		google_id: google_id.to_owned(),
		name: "Central Park".to_owned(),
		formatted_address: "New York, NY, USA".to_owned(),
		lat: Some(lat),
		lng: Some(lng),
		location: Some(format!("({lat}, {lng})")),
	}
}

fn new_gather(name: &str, place: Place, participant: &Participant) -> NewGather {
	NewGather {
		name: name.to_owned(),
		description: "Bring food".to_owned(),
		pictures: vec!["https://example.com/picnic.png".to_owned()],
		google_place: place,
		participants: vec![participant.clone()],
	}
}

#[tokio::test]
async fn test_health_cors_and_not_found() {
	let server = TestServer::start().await;
	let http = reqwest::Client::new();

	let resp = http.get(format!("{}/health", server.url)).send().await.unwrap();
	assert_eq!(resp.status(), StatusCode::OK);
	assert_eq!(resp.headers()["access-control-allow-origin"], "*");
	assert_eq!(resp.json::<Value>().await.unwrap(), json!({ "status": "ok" }));

	let resp = http.get(format!("{}/nope", server.url)).send().await.unwrap();
	assert_eq!(resp.status(), StatusCode::NOT_FOUND);
	assert_eq!(
		resp.json::<Value>().await.unwrap(),
		json!({ "message": "not found", "success": false })
	);

	let resp = http
		.request(reqwest::Method::OPTIONS, format!("{}/gathers", server.url))
		.send()
		.await
		.unwrap();
	assert_eq!(resp.status(), StatusCode::NO_CONTENT);
	assert!(resp.headers().contains_key("access-control-allow-methods"));

	server.shutdown().await;
}

#[tokio::test]
async fn test_create_then_find_by_place() {
	let server = TestServer::start().await;
	let client = server.client();

	let user = client.create_user("Jesper").await.unwrap();

	let created = client
		.create(new_gather("Picnic", place("abc", 40.78, -73.96), &user))
		.await
		.unwrap();

	assert!(!created.id.to_string().is_empty());
	assert_eq!(created.name, "Picnic");
	assert_eq!(created.participants, vec![user.clone()]);
	assert_eq!(created.google_place.google_id, "abc");

	let found = client.find_by_place(&place("abc", 40.78, -73.96)).await.unwrap();
	assert_eq!(found, vec![created]);

	assert!(client.find_by_place(&place("other", 1.0, 1.0)).await.unwrap().is_empty());

	server.shutdown().await;
}

#[tokio::test]
async fn test_create_registers_unknown_participants() {
	let server = TestServer::start().await;
	let client = server.client();

	let newcomer = Participant::new("newcomer");
	let mut gather = new_gather("Picnic", place("abc", 40.78, -73.96), &newcomer);
	gather.participants.push(newcomer.clone());

	let created = client.create(gather).await.unwrap();
	assert_eq!(created.participants, vec![newcomer.clone()]);
	assert_eq!(client.user(newcomer.id).await.unwrap(), newcomer);

	server.shutdown().await;
}

#[tokio::test]
async fn test_find_by_bounds() {
	let server = TestServer::start().await;
	let client = server.client();

	let user = Participant::new("Jesper");
	let inside = client.create(new_gather("Inside", place("a", 5.0, 5.0), &user)).await.unwrap();
	let edge = client.create(new_gather("Edge", place("b", 10.0, 0.0), &user)).await.unwrap();
	client.create(new_gather("North", place("c", 15.0, 5.0), &user)).await.unwrap();
	client.create(new_gather("West", place("d", 5.0, -5.0), &user)).await.unwrap();

	let bounds = Bounds::new(LatLng { lat: 10.0, lng: 10.0 }, LatLng { lat: 0.0, lng: 0.0 }).unwrap();
	let found = client.find_by_bounds(&bounds).await.unwrap();
	assert_eq!(found.iter().map(|g| g.id).collect::<Vec<_>>(), vec![inside.id, edge.id]);

	// The literal form the maps SDK produces.
	let resp = reqwest::Client::new()
		.get(format!("{}/gathers", server.url))
		.query(&[("bounds", json!({ "north": 10, "east": 10, "south": 0, "west": 0 }).to_string())])
		.send()
		.await
		.unwrap();
	assert_eq!(resp.status(), StatusCode::OK);
	assert_eq!(resp.json::<Vec<Value>>().await.unwrap().len(), 2);

	server.shutdown().await;
}

#[tokio::test]
async fn test_create_at_place_without_coordinates() {
	let server = TestServer::start().await;
	let client = server.client();

	let user = client.create_user("Jesper").await.unwrap();

	let resp = reqwest::Client::new()
		.post(format!("{}/gathers", server.url))
		.json(&json!({
			"gather": {
				"name": "Picnic",
				"description": "",
				"pictures": [],
				"googlePlace": { "googleId": "abc" },
				"participants": [user],
			}
		}))
		.send()
		.await
		.unwrap();
	assert_eq!(resp.status(), StatusCode::CREATED);

	let created: Gather = resp.json().await.unwrap();
	assert_eq!(created.name, "Picnic");
	assert_eq!(created.google_place.position(), None);
	assert_eq!(created.participants, vec![user]);

	let found = client.find_by_place(&created.google_place).await.unwrap();
	assert_eq!(found, vec![created]);

	let everywhere = Bounds::new(LatLng { lat: 90.0, lng: 180.0 }, LatLng { lat: -90.0, lng: -180.0 }).unwrap();
	assert!(client.find_by_bounds(&everywhere).await.unwrap().is_empty());

	server.shutdown().await;
}

#[tokio::test]
async fn test_join_is_idempotent() {
	let server = TestServer::start().await;
	let client = server.client();

	let host = client.create_user("host").await.unwrap();
	let guest = client.create_user("guest").await.unwrap();
	let gather = client.create(new_gather("Picnic", place("abc", 1.0, 1.0), &host)).await.unwrap();

	let joined = client.join(gather.id, guest.id).await.unwrap();
	assert_eq!(joined.participants, vec![host.clone(), guest.clone()]);

	let again = client.join(gather.id, guest.id).await.unwrap();
	assert_eq!(again.participants, vec![host, guest]);

	server.shutdown().await;
}

#[tokio::test]
async fn test_join_unknown() {
	let server = TestServer::start().await;
	let client = server.client();

	let host = client.create_user("host").await.unwrap();
	let gather = client.create(new_gather("Picnic", place("abc", 1.0, 1.0), &host)).await.unwrap();

	let missing = Ulid::new();
	match client.join(missing, host.id).await {
		Err(ClientError::Status { status, message }) => {
			assert_eq!(status, StatusCode::NOT_FOUND);
			assert_eq!(message, format!("gather {missing} not found"));
		}
		other => panic!("expected not found, got {other:?}"),
	}

	let err = client.join(gather.id, missing).await.unwrap_err();
	assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));

	server.shutdown().await;
}

#[tokio::test]
async fn test_bad_requests() {
	let server = TestServer::start().await;
	let http = reqwest::Client::new();
	let gathers_url = format!("{}/gathers", server.url);

	let resp = http.get(&gathers_url).send().await.unwrap();
	assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
	assert_eq!(resp.json::<Value>().await.unwrap()["success"], json!(false));

	let resp = http.get(&gathers_url).query(&[("bounds", "not json")]).send().await.unwrap();
	assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

	let inverted = json!({ "ne": { "lat": 0, "lng": 10 }, "sw": { "lat": 10, "lng": 0 } }).to_string();
	let resp = http.get(&gathers_url).query(&[("bounds", inverted)]).send().await.unwrap();
	assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

	let resp = http
		.post(&gathers_url)
		.header("content-type", "application/json")
		.body("{")
		.send()
		.await
		.unwrap();
	assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

	let user = Participant::new("Jesper");
	let mut gather = new_gather("   ", place("abc", 1.0, 1.0), &user);
	let resp = http
		.post(&gathers_url)
		.json(&json!({ "gather": gather }))
		.send()
		.await
		.unwrap();
	assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
	assert_eq!(
		resp.json::<Value>().await.unwrap(),
		json!({ "message": "name must not be empty", "success": false })
	);

	gather.name = "Picnic".to_owned();
	gather.google_place.lat = Some(91.0);
	let resp = http
		.post(&gathers_url)
		.json(&json!({ "gather": gather }))
		.send()
		.await
		.unwrap();
	assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

	server.shutdown().await;
}

#[tokio::test]
async fn test_users() {
	let server = TestServer::start().await;
	let client = server.client();
	let http = reqwest::Client::new();

	let user = client.create_user("  Jesper  ").await.unwrap();
	assert_eq!(user.name, "Jesper");
	assert_eq!(client.user(user.id).await.unwrap(), user);

	let err = client.user(Ulid::new()).await.unwrap_err();
	assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));

	let resp = http.get(format!("{}/users/not-a-ulid", server.url)).send().await.unwrap();
	assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

	let resp = http
		.post(format!("{}/users", server.url))
		.json(&json!({ "name": "" }))
		.send()
		.await
		.unwrap();
	assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

	server.shutdown().await;
}
