use std::sync::Arc;

use common::http::ext::{RequestGlobalExt, ResultExt};
use common::http::RouteError;
use common::make_response;
use common::types::{Bounds, CreateGatherRequest, JoinGatherRequest};
use hyper::{Body, Request, Response, StatusCode};
use routerify::Router;
use serde_json::json;

use super::error::{ApiError, Result, ValidationResultExt};
use super::ext::{json_body, query_params};
use crate::global::ApiGlobal;

/// `GET /gathers?googleId=..&location=..` or `GET /gathers?bounds={..}`.
///
/// Bounds win when both are present. `location` is only informational, the
/// match is on `googleId` alone.
async fn find<G: ApiGlobal>(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.get_global::<G>()?;
	let params = query_params(&req);

	let gathers = if let Some(raw) = params.get("bounds") {
		let bounds: Bounds = serde_json::from_str(raw).map_err_route((StatusCode::BAD_REQUEST, "invalid bounds"))?;

		tracing::debug!(?bounds, "finding gathers in bounds");
		global.store().gathers_in_bounds(&bounds).await?
	} else if let Some(google_id) = params.get("googleId").filter(|id| !id.trim().is_empty()) {
		tracing::debug!(%google_id, location = ?params.get("location"), "finding gathers by place");
		global.store().gathers_by_place(google_id).await?
	} else {
		return Err((StatusCode::BAD_REQUEST, "expected either googleId or bounds").into());
	};

	Ok(make_response!(StatusCode::OK, json!(gathers)))
}

async fn create<G: ApiGlobal>(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.get_global::<G>()?;
	let CreateGatherRequest { mut gather } = json_body(req).await?;

	gather.name = gather.name.trim().to_owned();
	gather.dedup_participants();
	gather.validate().map_err_bad_request()?;

	let gather = global.store().insert_gather(gather).await?;

	tracing::info!(
		gather_id = %gather.id,
		google_id = %gather.google_place.google_id,
		participants = gather.participants.len(),
		"gather created"
	);

	Ok(make_response!(StatusCode::CREATED, json!(gather)))
}

async fn join<G: ApiGlobal>(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.get_global::<G>()?;
	let JoinGatherRequest { gather_id, user_id } = json_body(req).await?;

	let gather = global.store().add_participant(gather_id, user_id).await?;

	tracing::info!(%gather_id, %user_id, "user joined gather");

	Ok(make_response!(StatusCode::OK, json!(gather)))
}

pub fn routes<G: ApiGlobal>(_: &Arc<G>) -> Router<Body, RouteError<ApiError>> {
	Router::builder()
		.get("/gathers", find::<G>)
		.post("/gathers", create::<G>)
		.post("/gathers/join", join::<G>)
		.build()
		.expect("failed to build router")
}
