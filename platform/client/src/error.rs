use common::types::ValidationError;
use reqwest::StatusCode;

use crate::discovery::Phase;
use crate::places::PlacesError;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
	#[error("invalid url: {0}")]
	InvalidUrl(#[from] url::ParseError),
	#[error("http error: {0}")]
	Http(#[from] reqwest::Error),
	#[error("server responded with {status}: {message}")]
	Status { status: StatusCode, message: String },
	#[error("failed to decode response: {0}")]
	Decode(#[from] serde_json::Error),
	#[error("place lookup failed: {0}")]
	Places(#[from] PlacesError),
	#[error("invalid gather: {0}")]
	Invalid(#[from] ValidationError),
	#[error("no place selected")]
	NoPlaceSelected,
	#[error("no gather selected")]
	NoGatherSelected,
	#[error("cannot {action} while {phase:?}")]
	NotAllowed { action: &'static str, phase: Phase },
}

impl ClientError {
	pub fn status(&self) -> Option<StatusCode> {
		match self {
			Self::Status { status, .. } => Some(*status),
			Self::Http(err) => err.status(),
			_ => None,
		}
	}
}
