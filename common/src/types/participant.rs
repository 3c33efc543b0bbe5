use ulid::Ulid;

use super::ValidationError;

/// A user as seen from a gather.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Participant {
	pub id: Ulid,
	pub name: String,
}

impl Participant {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			id: Ulid::new(),
			name: name.into(),
		}
	}
}

/// `POST /users`
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CreateUserRequest {
	pub name: String,
}

impl CreateUserRequest {
	pub const MAX_NAME_LEN: usize = 64;

	pub fn validate(&self) -> Result<(), ValidationError> {
		let name = self.name.trim();
		if name.is_empty() {
			return Err(ValidationError::EmptyName);
		}

		if name.chars().count() > Self::MAX_NAME_LEN {
			return Err(ValidationError::NameTooLong { max: Self::MAX_NAME_LEN });
		}

		Ok(())
	}
}
