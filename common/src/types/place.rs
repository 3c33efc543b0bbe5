use super::{LatLng, ValidationError};

/// A geocoded point of interest, copied into a gather when it is created.
///
/// Coordinates are optional, a place the client could not geocode is still
/// a valid gather location. Such gathers are found by place id only.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Place {
	#[serde(rename = "googleId")]
	pub google_id: String,
	#[serde(default)]
	pub name: String,
	#[serde(default)]
	pub formatted_address: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub lat: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub lng: Option<f64>,
	/// Free form `"(lat, lng)"` text, kept for clients that send it.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub location: Option<String>,
}

impl Place {
	/// `None` unless both coordinates are known.
	pub fn position(&self) -> Option<LatLng> {
		Some(LatLng {
			lat: self.lat?,
			lng: self.lng?,
		})
	}

	/// The `"(lat, lng)"` form used in place lookups.
	pub fn location_string(&self) -> Option<String> {
		self.location
			.clone()
			.or_else(|| self.position().map(|pos| format!("({}, {})", pos.lat, pos.lng)))
	}

	pub fn validate(&self) -> Result<(), ValidationError> {
		if self.google_id.trim().is_empty() {
			return Err(ValidationError::MissingPlaceId);
		}

		match (self.lat, self.lng) {
			(Some(lat), Some(lng)) => LatLng { lat, lng }.validate(),
			(None, None) => Ok(()),
			_ => Err(ValidationError::PartialPosition),
		}
	}
}

/// An autocomplete candidate, pending resolution to a [`Place`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Suggestion {
	pub id: String,
	pub label: String,
}
