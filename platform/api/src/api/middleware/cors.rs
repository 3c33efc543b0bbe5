use std::sync::Arc;
use std::time::Duration;

use common::http::RouteError;
use hyper::header::{self, HeaderValue};
use hyper::{Body, Request, Response, StatusCode};
use routerify::Middleware;

use crate::api::error::{ApiError, Result};
use crate::global::ApiGlobal;

pub fn cors_middleware<G: ApiGlobal>(_: &Arc<G>) -> Middleware<Body, RouteError<ApiError>> {
	Middleware::post(|mut resp| async move {
		let headers = resp.headers_mut();
		headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
		headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static("GET, POST, OPTIONS"));
		headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("Content-Type, Authorization"));
		headers.insert(
			header::ACCESS_CONTROL_MAX_AGE,
			HeaderValue::from(Duration::from_secs(86400).as_secs()),
		);

		Ok(resp)
	})
}

/// Browsers send a preflight before every JSON `POST`, the headers are added
/// by [`cors_middleware`].
pub async fn preflight(_: Request<Body>) -> Result<Response<Body>> {
	Ok(Response::builder()
		.status(StatusCode::NO_CONTENT)
		.body(Body::empty())
		.expect("failed to build response"))
}
