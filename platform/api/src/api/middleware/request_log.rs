use std::sync::Arc;

use common::http::RouteError;
use hyper::Body;
use routerify::{Middleware, RequestInfo};

use crate::api::error::ApiError;
use crate::global::ApiGlobal;

pub fn request_log_middleware<G: ApiGlobal>(_: &Arc<G>) -> Middleware<Body, RouteError<ApiError>> {
	Middleware::post_with_info(|resp, info: RequestInfo| async move {
		tracing::debug!(method = %info.method(), path = %info.uri().path(), status = %resp.status(), "request");

		Ok(resp)
	})
}
