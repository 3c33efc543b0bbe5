use std::sync::Arc;

use common::http::ext::{OptionExt, RequestGlobalExt, ResultExt};
use common::http::RouteError;
use common::make_response;
use common::types::CreateUserRequest;
use hyper::{Body, Request, Response, StatusCode};
use routerify::prelude::RequestExt;
use routerify::Router;
use serde_json::json;
use ulid::Ulid;

use super::error::{ApiError, Result, ValidationResultExt};
use super::ext::json_body;
use crate::global::ApiGlobal;

async fn create<G: ApiGlobal>(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.get_global::<G>()?;
	let body: CreateUserRequest = json_body(req).await?;

	body.validate().map_err_bad_request()?;

	let user = global.store().insert_user(body.name.trim()).await?;

	tracing::info!(user_id = %user.id, "user created");

	Ok(make_response!(StatusCode::CREATED, json!(user)))
}

async fn get<G: ApiGlobal>(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.get_global::<G>()?;

	let id = req
		.param("id")
		.map_err_route((StatusCode::BAD_REQUEST, "missing user id"))?
		.parse::<Ulid>()
		.map_ignore_err_route((StatusCode::BAD_REQUEST, "invalid user id"))?;

	let user = global
		.store()
		.user_by_id(id)
		.await?
		.map_err_route((StatusCode::NOT_FOUND, format!("user {id} not found")))?;

	Ok(make_response!(StatusCode::OK, json!(user)))
}

pub fn routes<G: ApiGlobal>(_: &Arc<G>) -> Router<Body, RouteError<ApiError>> {
	Router::builder()
		.post("/users", create::<G>)
		.get("/users/:id", get::<G>)
		.build()
		.expect("failed to build router")
}
