use common::types::{Bounds, Gather, LatLng, Participant, Place, Suggestion};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
	#[default]
	Idle,
	/// Input is long enough and a lookup is in flight or done, suggestions
	/// are not revealed yet.
	Typing,
	SuggestionsVisible,
	/// A suggestion was picked and its place details are being fetched.
	Resolving,
	/// A place is selected and has no gather yet, the modal offers create.
	PlaceSelected,
	/// A gather at the selected place is selected, the modal offers join.
	GatherSelected,
}

/// The acting user. Everything the controller creates or joins is done as
/// this participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
	pub participant: Participant,
}

impl Session {
	pub fn new(participant: Participant) -> Self {
		Self { participant }
	}
}

/// Where the map should move after a place is selected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapFocus {
	pub center: LatLng,
	pub zoom: u8,
}

/// The input of a create, the rest comes from the selected place and the
/// session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GatherDraft {
	pub name: String,
	pub description: String,
	pub pictures: Vec<String>,
}

/// Snapshot of everything a view needs to render the search box, the modal
/// and the map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscoveryState {
	pub phase: Phase,
	pub input: String,
	pub suggestions: Vec<Suggestion>,
	pub suggestions_visible: bool,
	pub selected_place: Option<Place>,
	pub selected_gather: Option<Gather>,
	pub modal_open: bool,
	pub visible_gathers: Vec<Gather>,
	/// The last viewport reported, reused to refresh after a create.
	pub bounds: Option<Bounds>,
	pub map_focus: Option<MapFocus>,
	/// Informational message for the user, not an error.
	pub notice: Option<String>,
	pub last_error: Option<String>,
}
