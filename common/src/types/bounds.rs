use super::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LatLng {
	pub lat: f64,
	pub lng: f64,
}

impl LatLng {
	pub fn validate(&self) -> Result<(), ValidationError> {
		if !self.lat.is_finite() || !(-90.0..=90.0).contains(&self.lat) {
			return Err(ValidationError::Latitude(self.lat));
		}

		if !self.lng.is_finite() || !(-180.0..=180.0).contains(&self.lng) {
			return Err(ValidationError::Longitude(self.lng));
		}

		Ok(())
	}
}

/// A rectangular viewport. When `sw.lng > ne.lng` the box crosses the
/// antimeridian and the longitude range wraps.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "BoundsRepr")]
pub struct Bounds {
	pub ne: LatLng,
	pub sw: LatLng,
}

/// Accepts both the corner form and the `{north, east, south, west}` literal
/// produced by map SDKs.
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum BoundsRepr {
	Corners { ne: LatLng, sw: LatLng },
	Literal { north: f64, east: f64, south: f64, west: f64 },
}

impl TryFrom<BoundsRepr> for Bounds {
	type Error = ValidationError;

	fn try_from(repr: BoundsRepr) -> Result<Self, Self::Error> {
		match repr {
			BoundsRepr::Corners { ne, sw } => Self::new(ne, sw),
			BoundsRepr::Literal {
				north,
				east,
				south,
				west,
			} => Self::new(LatLng { lat: north, lng: east }, LatLng { lat: south, lng: west }),
		}
	}
}

impl Bounds {
	pub fn new(ne: LatLng, sw: LatLng) -> Result<Self, ValidationError> {
		ne.validate()?;
		sw.validate()?;

		if sw.lat > ne.lat {
			return Err(ValidationError::InvertedBounds);
		}

		Ok(Self { ne, sw })
	}

	pub fn crosses_antimeridian(&self) -> bool {
		self.sw.lng > self.ne.lng
	}

	/// Edges are inclusive.
	pub fn contains(&self, point: LatLng) -> bool {
		if point.lat < self.sw.lat || point.lat > self.ne.lat {
			return false;
		}

		if self.crosses_antimeridian() {
			point.lng >= self.sw.lng || point.lng <= self.ne.lng
		} else {
			point.lng >= self.sw.lng && point.lng <= self.ne.lng
		}
	}
}
