use std::collections::HashMap;

use chrono::Utc;
use common::types::{Bounds, Gather, NewGather, Participant};
use tokio::sync::RwLock;
use ulid::Ulid;

use super::{GatherStore, StoreError};

#[derive(Default)]
struct Inner {
	/// Kept in insertion order, which is creation order.
	gathers: Vec<Gather>,
	users: HashMap<Ulid, Participant>,
}

/// Keeps everything in process. Used by tests and `database.store = "memory"`.
#[derive(Default)]
pub struct MemoryStore {
	inner: RwLock<Inner>,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}
}

#[async_trait::async_trait]
impl GatherStore for MemoryStore {
	async fn gathers_by_place(&self, google_id: &str) -> Result<Vec<Gather>, StoreError> {
		let inner = self.inner.read().await;

		Ok(inner
			.gathers
			.iter()
			.filter(|g| g.google_place.google_id == google_id)
			.cloned()
			.collect())
	}

	async fn gathers_in_bounds(&self, bounds: &Bounds) -> Result<Vec<Gather>, StoreError> {
		let inner = self.inner.read().await;

		Ok(inner
			.gathers
			.iter()
			.filter(|g| g.google_place.position().is_some_and(|pos| bounds.contains(pos)))
			.cloned()
			.collect())
	}

	async fn gather_by_id(&self, id: Ulid) -> Result<Option<Gather>, StoreError> {
		let inner = self.inner.read().await;

		Ok(inner.gathers.iter().find(|g| g.id == id).cloned())
	}

	async fn insert_gather(&self, gather: NewGather) -> Result<Gather, StoreError> {
		let mut inner = self.inner.write().await;

		let participants = gather
			.participants
			.into_iter()
			.map(|p| inner.users.entry(p.id).or_insert(p).clone())
			.collect();

		let gather = Gather {
			id: Ulid::new(),
			name: gather.name,
			description: gather.description,
			pictures: gather.pictures,
			google_place: gather.google_place,
			participants,
			created_at: Utc::now(),
		};

		inner.gathers.push(gather.clone());

		Ok(gather)
	}

	async fn add_participant(&self, gather_id: Ulid, user_id: Ulid) -> Result<Gather, StoreError> {
		let mut inner = self.inner.write().await;

		let index = inner
			.gathers
			.iter()
			.position(|g| g.id == gather_id)
			.ok_or(StoreError::GatherNotFound(gather_id))?;

		let user = inner.users.get(&user_id).cloned().ok_or(StoreError::UserNotFound(user_id))?;

		let gather = &mut inner.gathers[index];

		if !gather.has_participant(user_id) {
			gather.participants.push(user);
		}

		Ok(gather.clone())
	}

	async fn insert_user(&self, name: &str) -> Result<Participant, StoreError> {
		let user = Participant::new(name);

		self.inner.write().await.users.insert(user.id, user.clone());

		Ok(user)
	}

	async fn user_by_id(&self, id: Ulid) -> Result<Option<Participant>, StoreError> {
		Ok(self.inner.read().await.users.get(&id).cloned())
	}
}
