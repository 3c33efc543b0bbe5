use std::collections::HashSet;

use chrono::{DateTime, Utc};
use ulid::Ulid;

use super::{Participant, Place, ValidationError};

/// A user created event anchored to a place.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gather {
	pub id: Ulid,
	pub name: String,
	pub description: String,
	pub pictures: Vec<String>,
	/// Snapshot of the place taken at creation, never refreshed.
	pub google_place: Place,
	pub participants: Vec<Participant>,
	pub created_at: DateTime<Utc>,
}

impl Gather {
	pub fn has_participant(&self, id: Ulid) -> bool {
		self.participants.iter().any(|p| p.id == id)
	}
}

/// A gather as submitted by a client, before the store assigns an id.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGather {
	pub name: String,
	#[serde(default)]
	pub description: String,
	#[serde(default)]
	pub pictures: Vec<String>,
	pub google_place: Place,
	pub participants: Vec<Participant>,
}

impl NewGather {
	pub const MAX_NAME_LEN: usize = 100;
	pub const MAX_DESCRIPTION_LEN: usize = 2000;
	pub const MAX_PICTURES: usize = 10;

	pub fn validate(&self) -> Result<(), ValidationError> {
		let name = self.name.trim();
		if name.is_empty() {
			return Err(ValidationError::EmptyName);
		}

		if name.chars().count() > Self::MAX_NAME_LEN {
			return Err(ValidationError::NameTooLong { max: Self::MAX_NAME_LEN });
		}

		if self.description.chars().count() > Self::MAX_DESCRIPTION_LEN {
			return Err(ValidationError::DescriptionTooLong {
				max: Self::MAX_DESCRIPTION_LEN,
			});
		}

		if self.pictures.len() > Self::MAX_PICTURES {
			return Err(ValidationError::TooManyPictures { max: Self::MAX_PICTURES });
		}

		if self.participants.is_empty() {
			return Err(ValidationError::NoParticipants);
		}

		self.google_place.validate()
	}

	/// Keeps the first occurrence of every participant id.
	pub fn dedup_participants(&mut self) {
		let mut seen = HashSet::new();
		self.participants.retain(|p| seen.insert(p.id));
	}
}

/// `POST /gathers`
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CreateGatherRequest {
	pub gather: NewGather,
}

/// `POST /gathers/join`
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinGatherRequest {
	pub gather_id: Ulid,
	pub user_id: Ulid,
}
