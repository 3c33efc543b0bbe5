use common::types::{Bounds, CreateGatherRequest, CreateUserRequest, Gather, JoinGatherRequest, NewGather, Participant, Place};
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use ulid::Ulid;
use url::Url;

use crate::error::ClientError;

/// The gathers REST surface as the discovery controller sees it.
#[async_trait::async_trait]
pub trait GatherApi: Send + Sync {
	async fn find_by_place(&self, place: &Place) -> Result<Vec<Gather>, ClientError>;

	async fn find_by_bounds(&self, bounds: &Bounds) -> Result<Vec<Gather>, ClientError>;

	async fn create(&self, gather: NewGather) -> Result<Gather, ClientError>;

	async fn join(&self, gather_id: Ulid, user_id: Ulid) -> Result<Gather, ClientError>;
}

#[derive(serde::Deserialize)]
struct ErrorBody {
	message: String,
}

#[derive(Debug, Clone)]
pub struct GatherClient {
	http: reqwest::Client,
	base_url: Url,
}

impl GatherClient {
	pub fn new(base_url: &str) -> Result<Self, ClientError> {
		Self::with_client(reqwest::Client::new(), base_url)
	}

	pub fn with_client(http: reqwest::Client, base_url: &str) -> Result<Self, ClientError> {
		Ok(Self {
			http,
			base_url: crate::base_url(base_url)?,
		})
	}

	pub fn base_url(&self) -> &Url {
		&self.base_url
	}

	pub async fn create_user(&self, name: &str) -> Result<Participant, ClientError> {
		let body = CreateUserRequest { name: name.to_owned() };
		self.send(self.http.post(self.endpoint("users")?).json(&body)).await
	}

	pub async fn user(&self, id: Ulid) -> Result<Participant, ClientError> {
		self.send(self.http.get(self.endpoint(&format!("users/{id}"))?)).await
	}

	pub async fn health(&self) -> Result<(), ClientError> {
		self.send::<serde_json::Value>(self.http.get(self.endpoint("health")?))
			.await
			.map(|_| ())
	}

	fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
		Ok(self.base_url.join(path)?)
	}

	/// Non 2xx responses become [`ClientError::Status`] carrying the server's
	/// message, bodies that do not match `T` become [`ClientError::Decode`].
	async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ClientError> {
		let resp = req.send().await?;
		let status = resp.status();
		let body = resp.bytes().await?;

		if !status.is_success() {
			let message = serde_json::from_slice::<ErrorBody>(&body)
				.map(|body| body.message)
				.unwrap_or_else(|_| String::from_utf8_lossy(&body).into_owned());

			tracing::debug!(%status, %message, "request failed");
			return Err(ClientError::Status { status, message });
		}

		Ok(serde_json::from_slice(&body)?)
	}
}

#[async_trait::async_trait]
impl GatherApi for GatherClient {
	async fn find_by_place(&self, place: &Place) -> Result<Vec<Gather>, ClientError> {
		let mut query = vec![("googleId", place.google_id.clone())];
		if let Some(location) = place.location_string() {
			query.push(("location", location));
		}

		self.send(self.http.get(self.endpoint("gathers")?).query(&query)).await
	}

	async fn find_by_bounds(&self, bounds: &Bounds) -> Result<Vec<Gather>, ClientError> {
		let query = [("bounds", serde_json::to_string(bounds)?)];

		self.send(self.http.get(self.endpoint("gathers")?).query(&query)).await
	}

	async fn create(&self, gather: NewGather) -> Result<Gather, ClientError> {
		let body = CreateGatherRequest { gather };

		self.send(self.http.post(self.endpoint("gathers")?).json(&body)).await
	}

	async fn join(&self, gather_id: Ulid, user_id: Ulid) -> Result<Gather, ClientError> {
		let body = JoinGatherRequest { gather_id, user_id };

		self.send(self.http.post(self.endpoint("gathers/join")?).json(&body)).await
	}
}
