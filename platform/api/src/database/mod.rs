use common::types::{Bounds, Gather, NewGather, Participant};
use ulid::Ulid;

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
	#[error("gather {0} not found")]
	GatherNotFound(Ulid),
	#[error("user {0} not found")]
	UserNotFound(Ulid),
	#[error("database error: {0}")]
	Sqlx(#[from] sqlx::Error),
}

/// Persistence boundary for gathers, users and memberships.
///
/// Gathers come back oldest first, and participants in the order they
/// joined.
#[async_trait::async_trait]
pub trait GatherStore: Send + Sync {
	async fn gathers_by_place(&self, google_id: &str) -> Result<Vec<Gather>, StoreError>;

	async fn gathers_in_bounds(&self, bounds: &Bounds) -> Result<Vec<Gather>, StoreError>;

	async fn gather_by_id(&self, id: Ulid) -> Result<Option<Gather>, StoreError>;

	/// Participants that are not known users yet are registered with the name
	/// they were submitted with. Known users keep their stored name.
	async fn insert_gather(&self, gather: NewGather) -> Result<Gather, StoreError>;

	/// Adding a participant that is already present is a no-op.
	async fn add_participant(&self, gather_id: Ulid, user_id: Ulid) -> Result<Gather, StoreError>;

	async fn insert_user(&self, name: &str) -> Result<Participant, StoreError>;

	async fn user_by_id(&self, id: Ulid) -> Result<Option<Participant>, StoreError>;
}
