use std::panic::Location;

use common::http::RouteError;
use common::types::ValidationError;
use hyper::StatusCode;

use crate::database::StoreError;

pub type Result<T, E = RouteError<ApiError>> = std::result::Result<T, E>;

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
	#[error("failed to read http body: {0}")]
	ParseHttpBody(#[from] hyper::Error),
	#[error("failed to parse json: {0}")]
	ParseJson(#[from] serde_json::Error),
	#[error("invalid request: {0}")]
	Validation(#[from] ValidationError),
	#[error("store error: {0}")]
	Store(#[from] StoreError),
}

impl From<StoreError> for RouteError<ApiError> {
	#[track_caller]
	fn from(err: StoreError) -> Self {
		let route_err = match &err {
			StoreError::GatherNotFound(_) | StoreError::UserNotFound(_) => {
				RouteError::from((StatusCode::NOT_FOUND, err.to_string()))
			}
			StoreError::Sqlx(_) => RouteError::from((StatusCode::INTERNAL_SERVER_ERROR, "internal server error")),
		};

		route_err.with_source(Some(err.into()))
	}
}

pub trait ValidationResultExt<T> {
	/// Answers 400 with the validation message, keeping the error as the
	/// source.
	fn map_err_bad_request(self) -> Result<T>;
}

impl<T> ValidationResultExt<T> for std::result::Result<T, ValidationError> {
	#[track_caller]
	fn map_err_bad_request(self) -> Result<T> {
		let location = Location::caller();
		self.map_err(|err| {
			RouteError::from((StatusCode::BAD_REQUEST, err.to_string()))
				.with_source(Some(err.into()))
				.with_location(location)
		})
	}
}
