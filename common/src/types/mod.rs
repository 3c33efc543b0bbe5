mod bounds;
mod gather;
mod participant;
mod place;

pub use bounds::*;
pub use gather::*;
pub use participant::*;
pub use place::*;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
	#[error("name must not be empty")]
	EmptyName,
	#[error("name must be at most {max} characters long")]
	NameTooLong { max: usize },
	#[error("description must be at most {max} characters long")]
	DescriptionTooLong { max: usize },
	#[error("at most {max} pictures are allowed")]
	TooManyPictures { max: usize },
	#[error("place id must not be empty")]
	MissingPlaceId,
	#[error("latitude {0} is out of range")]
	Latitude(f64),
	#[error("longitude {0} is out of range")]
	Longitude(f64),
	#[error("latitude and longitude must be given together")]
	PartialPosition,
	#[error("a gather needs at least one participant")]
	NoParticipants,
	#[error("southwest corner is north of the northeast corner")]
	InvertedBounds,
}
