use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use common::types::{Bounds, Gather, NewGather, Suggestion};
use parking_lot::Mutex;

use crate::api::GatherApi;
use crate::config::DiscoveryConfig;
use crate::debounce::Debouncer;
use crate::error::ClientError;
use crate::places::PlacesService;

mod state;

pub use state::{DiscoveryState, GatherDraft, MapFocus, Phase, Session};

/// Zoom level the map moves to when a place is selected.
pub const PLACE_ZOOM: u8 = 14;

pub const EXISTING_GATHER_NOTICE: &str = "There is already a gather at this place, you can join it.";

struct Inner {
	state: DiscoveryState,
	/// Set once the debounce delay passed since the last keystroke.
	reveal_elapsed: bool,
}

impl Inner {
	fn reveal(&mut self) {
		if self.state.phase == Phase::Typing && !self.state.suggestions.is_empty() {
			self.state.suggestions_visible = true;
			self.state.phase = Phase::SuggestionsVisible;
		}
	}
}

struct Shared<P, G> {
	places: P,
	api: G,
	session: Session,
	config: DiscoveryConfig,
	inner: Mutex<Inner>,
	lookup_seq: AtomicU64,
	bounds_seq: AtomicU64,
	reveal: Debouncer,
}

/// Drives place search, place selection, create or join and viewport
/// refreshes.
///
/// Lookups and bounds refreshes are numbered as they are issued, a response
/// is applied only if no newer request of the same kind was issued since.
/// The state lock is never held across an await, so methods may run
/// concurrently from clones of the controller.
pub struct DiscoveryController<P, G> {
	shared: Arc<Shared<P, G>>,
}

impl<P, G> Clone for DiscoveryController<P, G> {
	fn clone(&self) -> Self {
		Self {
			shared: self.shared.clone(),
		}
	}
}

impl<P, G> DiscoveryController<P, G>
where
	P: PlacesService + 'static,
	G: GatherApi + 'static,
{
	pub fn new(places: P, api: G, session: Session, config: DiscoveryConfig) -> Self {
		Self {
			shared: Arc::new(Shared {
				places,
				api,
				session,
				reveal: Debouncer::new(config.debounce()),
				config,
				inner: Mutex::new(Inner {
					state: DiscoveryState::default(),
					reveal_elapsed: false,
				}),
				lookup_seq: AtomicU64::new(0),
				bounds_seq: AtomicU64::new(0),
			}),
		}
	}

	pub fn state(&self) -> DiscoveryState {
		self.shared.inner.lock().state.clone()
	}

	pub fn session(&self) -> &Session {
		&self.shared.session
	}

	pub async fn handle_input(&self, input: &str) -> Result<(), ClientError> {
		let seq = self.shared.lookup_seq.fetch_add(1, Ordering::SeqCst) + 1;
		let too_short = input.chars().count() < self.shared.config.min_input_len;

		{
			let mut inner = self.shared.inner.lock();
			inner.state.input = input.to_owned();
			inner.state.suggestions_visible = false;
			inner.reveal_elapsed = false;

			// The previous input's list must not be revealed under the new text.
			inner.state.suggestions.clear();
			inner.state.phase = if too_short { Phase::Idle } else { Phase::Typing };
		}

		if too_short {
			self.shared.reveal.cancel();
			return Ok(());
		}

		self.schedule_reveal(seq);

		let result = self.shared.places.autocomplete(input).await;

		let mut inner = self.shared.inner.lock();
		if seq != self.shared.lookup_seq.load(Ordering::SeqCst) {
			tracing::debug!(seq, input, "discarding stale suggestions");
			return Ok(());
		}

		match result {
			Ok(mut suggestions) => {
				suggestions.truncate(self.shared.config.max_suggestions);
				inner.state.suggestions = suggestions;
				inner.state.last_error = None;

				if inner.reveal_elapsed {
					inner.reveal();
				}

				Ok(())
			}
			Err(err) => {
				tracing::warn!(input, error = %err, "place lookup failed");
				inner.state.suggestions.clear();
				inner.state.suggestions_visible = false;
				inner.state.last_error = Some(err.to_string());
				Err(err.into())
			}
		}
	}

	fn schedule_reveal(&self, seq: u64) {
		let shared = Arc::downgrade(&self.shared);

		self.shared.reveal.schedule(async move {
			let Some(shared) = shared.upgrade() else {
				return;
			};

			if shared.lookup_seq.load(Ordering::SeqCst) != seq {
				return;
			}

			let mut inner = shared.inner.lock();
			inner.reveal_elapsed = true;
			inner.reveal();
		});
	}

	/// Resolves the suggestion to a place, opens the modal and looks up the
	/// gathers already at that place. The first one, if any, is selected.
	pub async fn select_suggestion(&self, suggestion: &Suggestion) -> Result<(), ClientError> {
		// Lookups still in flight must not reopen the list.
		self.shared.lookup_seq.fetch_add(1, Ordering::SeqCst);
		self.shared.reveal.cancel();

		{
			let mut inner = self.shared.inner.lock();
			inner.state.input = suggestion.label.clone();
			inner.state.suggestions_visible = false;
			inner.state.phase = Phase::Resolving;
			inner.state.selected_place = None;
			inner.state.selected_gather = None;
			inner.state.modal_open = false;
			inner.state.notice = None;
		}

		let place = match self.shared.places.details(&suggestion.id).await {
			Ok(place) => place,
			Err(err) => {
				tracing::warn!(place_id = %suggestion.id, error = %err, "failed to resolve place");
				let mut inner = self.shared.inner.lock();
				inner.state.phase = Phase::Idle;
				inner.state.last_error = Some(err.to_string());
				return Err(err.into());
			}
		};

		{
			let mut inner = self.shared.inner.lock();
			inner.state.selected_place = Some(place.clone());
			inner.state.selected_gather = None;
			inner.state.modal_open = true;
			inner.state.phase = Phase::PlaceSelected;
			if let Some(center) = place.position() {
				inner.state.map_focus = Some(MapFocus { center, zoom: PLACE_ZOOM });
			}
			inner.state.last_error = None;
		}

		tracing::debug!(google_id = %place.google_id, "place selected");

		let result = self.shared.api.find_by_place(&place).await;

		let mut inner = self.shared.inner.lock();
		let still_selected = inner
			.state
			.selected_place
			.as_ref()
			.is_some_and(|selected| selected.google_id == place.google_id);

		if !still_selected {
			return Ok(());
		}

		match result {
			Ok(gathers) => {
				if let Some(gather) = gathers.into_iter().next() {
					inner.state.selected_gather = Some(gather);
					inner.state.phase = Phase::GatherSelected;
					inner.state.notice = Some(EXISTING_GATHER_NOTICE.to_owned());
				}

				Ok(())
			}
			Err(err) => {
				tracing::warn!(google_id = %place.google_id, error = %err, "failed to find gathers at place");
				inner.state.last_error = Some(err.to_string());
				Err(err)
			}
		}
	}

	/// Creates a gather at the selected place with the session user as the
	/// only participant, then refreshes the last known viewport. Only allowed
	/// while a place without a gather is selected.
	pub async fn create(&self, draft: GatherDraft) -> Result<Gather, ClientError> {
		let place = {
			let inner = self.shared.inner.lock();
			let place = inner.state.selected_place.clone().ok_or(ClientError::NoPlaceSelected)?;

			if inner.state.phase != Phase::PlaceSelected {
				return Err(ClientError::NotAllowed {
					action: "create",
					phase: inner.state.phase,
				});
			}

			place
		};

		let gather = NewGather {
			name: draft.name.trim().to_owned(),
			description: draft.description,
			pictures: draft.pictures,
			google_place: place,
			participants: vec![self.shared.session.participant.clone()],
		};

		gather.validate()?;

		let created = match self.shared.api.create(gather).await {
			Ok(created) => created,
			Err(err) => {
				tracing::warn!(error = %err, "failed to create gather");
				self.shared.inner.lock().state.last_error = Some(err.to_string());
				return Err(err);
			}
		};

		tracing::info!(gather_id = %created.id, "gather created");

		let bounds = {
			let mut inner = self.shared.inner.lock();
			inner.state.selected_gather = Some(created.clone());
			inner.state.phase = Phase::GatherSelected;
			inner.state.notice = None;
			inner.state.last_error = None;
			inner.state.bounds
		};

		if let Some(bounds) = bounds {
			// A failed refresh is recorded on the state, the create stands.
			self.on_bounds_changed(bounds).await.ok();
		}

		Ok(created)
	}

	/// Joins the selected gather as the session user. Joining twice is
	/// harmless, the server keeps one membership.
	pub async fn join(&self) -> Result<Gather, ClientError> {
		let gather_id = {
			let inner = self.shared.inner.lock();
			let gather_id = inner
				.state
				.selected_gather
				.as_ref()
				.map(|gather| gather.id)
				.ok_or(ClientError::NoGatherSelected)?;

			if inner.state.phase != Phase::GatherSelected {
				return Err(ClientError::NotAllowed {
					action: "join",
					phase: inner.state.phase,
				});
			}

			gather_id
		};

		let user_id = self.shared.session.participant.id;

		let result = self.shared.api.join(gather_id, user_id).await;

		let mut inner = self.shared.inner.lock();
		match result {
			Ok(gather) => {
				tracing::info!(%gather_id, %user_id, "joined gather");

				if inner.state.selected_gather.as_ref().is_some_and(|g| g.id == gather.id) {
					inner.state.selected_gather = Some(gather.clone());
				}

				if let Some(visible) = inner.state.visible_gathers.iter_mut().find(|g| g.id == gather.id) {
					*visible = gather.clone();
				}

				inner.state.notice = None;
				inner.state.last_error = None;

				Ok(gather)
			}
			Err(err) => {
				tracing::warn!(%gather_id, error = %err, "failed to join gather");
				inner.state.last_error = Some(err.to_string());
				Err(err)
			}
		}
	}

	/// Replaces the visible gathers with the ones inside `bounds`. The modal
	/// and selection are left alone. On failure the previous list stays.
	pub async fn on_bounds_changed(&self, bounds: Bounds) -> Result<(), ClientError> {
		let seq = self.shared.bounds_seq.fetch_add(1, Ordering::SeqCst) + 1;

		self.shared.inner.lock().state.bounds = Some(bounds);

		let result = self.shared.api.find_by_bounds(&bounds).await;

		let mut inner = self.shared.inner.lock();
		if seq != self.shared.bounds_seq.load(Ordering::SeqCst) {
			tracing::debug!(seq, "discarding stale bounds refresh");
			return Ok(());
		}

		match result {
			Ok(gathers) => {
				inner.state.visible_gathers = gathers;
				inner.state.last_error = None;
				Ok(())
			}
			Err(err) => {
				tracing::warn!(error = %err, "failed to refresh gathers in bounds");
				inner.state.last_error = Some(err.to_string());
				Err(err)
			}
		}
	}

	pub fn close_modal(&self) {
		self.shared.inner.lock().state.modal_open = false;
	}
}
