use std::collections::HashMap;

use common::http::ext::ResultExt;
use hyper::header::CONTENT_LENGTH;
use hyper::{Body, Request, StatusCode};
use serde::de::DeserializeOwned;

use super::error::Result;

/// Bodies are small JSON documents, anything bigger is refused up front.
pub const MAX_BODY_SIZE: u64 = 64 * 1024;

pub async fn json_body<T: DeserializeOwned>(req: Request<Body>) -> Result<T> {
	let declared = req
		.headers()
		.get(CONTENT_LENGTH)
		.and_then(|v| v.to_str().ok())
		.and_then(|v| v.parse::<u64>().ok());

	if declared.is_some_and(|len| len > MAX_BODY_SIZE) {
		return Err((StatusCode::PAYLOAD_TOO_LARGE, "request body too large").into());
	}

	let body = hyper::body::to_bytes(req.into_body())
		.await
		.map_err_route((StatusCode::BAD_REQUEST, "failed to read request body"))?;

	if body.len() as u64 > MAX_BODY_SIZE {
		return Err((StatusCode::PAYLOAD_TOO_LARGE, "request body too large").into());
	}

	serde_json::from_slice(&body).map_err_route((StatusCode::BAD_REQUEST, "invalid request body"))
}

pub fn query_params<B>(req: &Request<B>) -> HashMap<String, String> {
	req.uri()
		.query()
		.map(|query| url::form_urlencoded::parse(query.as_bytes()).into_owned().collect())
		.unwrap_or_default()
}
