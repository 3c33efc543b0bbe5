use std::collections::HashMap;

use chrono::{DateTime, Utc};
use common::types::{Bounds, Gather, NewGather, Participant, Place};
use ulid::Ulid;
use uuid::Uuid;

use super::{GatherStore, StoreError};

#[derive(Debug, sqlx::FromRow)]
struct GatherRow {
	id: Uuid,
	name: String,
	description: String,
	pictures: Vec<String>,
	place_google_id: String,
	place_name: String,
	place_formatted_address: String,
	place_location: Option<String>,
	place_lat: Option<f64>,
	place_lng: Option<f64>,
	created_at: DateTime<Utc>,
}

impl GatherRow {
	fn into_gather(self, participants: Vec<Participant>) -> Gather {
		Gather {
			id: Ulid::from(self.id),
			name: self.name,
			description: self.description,
			pictures: self.pictures,
			google_place: Place {
				google_id: self.place_google_id,
				name: self.place_name,
				formatted_address: self.place_formatted_address,
				lat: self.place_lat,
				lng: self.place_lng,
				location: self.place_location,
			},
			participants,
			created_at: self.created_at,
		}
	}
}

#[derive(Debug, sqlx::FromRow)]
struct ParticipantRow {
	gather_id: Uuid,
	id: Uuid,
	name: String,
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
	id: Uuid,
	name: String,
}

impl From<UserRow> for Participant {
	fn from(row: UserRow) -> Self {
		Self {
			id: Ulid::from(row.id),
			name: row.name,
		}
	}
}

pub struct PgStore {
	db: sqlx::PgPool,
}

impl PgStore {
	pub fn new(db: sqlx::PgPool) -> Self {
		Self { db }
	}

	pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
		sqlx::migrate!("../migrations").run(&self.db).await
	}

	pub fn pool(&self) -> &sqlx::PgPool {
		&self.db
	}

	/// Loads the participants of every row in one round trip.
	async fn hydrate<'e, E>(&self, executor: E, rows: Vec<GatherRow>) -> Result<Vec<Gather>, StoreError>
	where
		E: sqlx::PgExecutor<'e>,
	{
		if rows.is_empty() {
			return Ok(Vec::new());
		}

		let ids = rows.iter().map(|r| r.id).collect::<Vec<_>>();

		let participants: Vec<ParticipantRow> = sqlx::query_as(
			"SELECT gp.gather_id, u.id, u.name FROM gather_participants gp INNER JOIN users u ON u.id = gp.user_id WHERE gp.gather_id = ANY($1) ORDER BY gp.joined_at, u.id",
		)
		.bind(&ids)
		.fetch_all(executor)
		.await?;

		let mut by_gather = participants.into_iter().fold(HashMap::<Uuid, Vec<Participant>>::new(), |mut acc, row| {
			acc.entry(row.gather_id).or_default().push(Participant {
				id: Ulid::from(row.id),
				name: row.name,
			});
			acc
		});

		Ok(rows
			.into_iter()
			.map(|row| {
				let participants = by_gather.remove(&row.id).unwrap_or_default();
				row.into_gather(participants)
			})
			.collect())
	}
}

#[async_trait::async_trait]
impl GatherStore for PgStore {
	async fn gathers_by_place(&self, google_id: &str) -> Result<Vec<Gather>, StoreError> {
		let rows: Vec<GatherRow> = sqlx::query_as("SELECT * FROM gathers WHERE place_google_id = $1 ORDER BY created_at, id")
			.bind(google_id)
			.fetch_all(&self.db)
			.await?;

		self.hydrate(&self.db, rows).await
	}

	async fn gathers_in_bounds(&self, bounds: &Bounds) -> Result<Vec<Gather>, StoreError> {
		// $3 > $4 means the box wraps around the antimeridian.
		let rows: Vec<GatherRow> = sqlx::query_as(
			"SELECT * FROM gathers WHERE place_lat BETWEEN $1 AND $2 AND (CASE WHEN $3 <= $4 THEN place_lng BETWEEN $3 AND $4 ELSE place_lng >= $3 OR place_lng <= $4 END) ORDER BY created_at, id",
		)
		.bind(bounds.sw.lat)
		.bind(bounds.ne.lat)
		.bind(bounds.sw.lng)
		.bind(bounds.ne.lng)
		.fetch_all(&self.db)
		.await?;

		self.hydrate(&self.db, rows).await
	}

	async fn gather_by_id(&self, id: Ulid) -> Result<Option<Gather>, StoreError> {
		let row: Option<GatherRow> = sqlx::query_as("SELECT * FROM gathers WHERE id = $1")
			.bind(Uuid::from(id))
			.fetch_optional(&self.db)
			.await?;

		let Some(row) = row else {
			return Ok(None);
		};

		Ok(self.hydrate(&self.db, vec![row]).await?.pop())
	}

	async fn insert_gather(&self, gather: NewGather) -> Result<Gather, StoreError> {
		let mut tx = self.db.begin().await?;

		let row: GatherRow = sqlx::query_as(
			"INSERT INTO gathers (id, name, description, pictures, place_google_id, place_name, place_formatted_address, place_location, place_lat, place_lng) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING *",
		)
		.bind(Uuid::from(Ulid::new()))
		.bind(&gather.name)
		.bind(&gather.description)
		.bind(&gather.pictures)
		.bind(&gather.google_place.google_id)
		.bind(&gather.google_place.name)
		.bind(&gather.google_place.formatted_address)
		.bind(&gather.google_place.location)
		.bind(gather.google_place.lat)
		.bind(gather.google_place.lng)
		.fetch_one(&mut *tx)
		.await?;

		for participant in &gather.participants {
			sqlx::query("INSERT INTO users (id, name) VALUES ($1, $2) ON CONFLICT (id) DO NOTHING")
				.bind(Uuid::from(participant.id))
				.bind(&participant.name)
				.execute(&mut *tx)
				.await?;

			sqlx::query("INSERT INTO gather_participants (gather_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING")
				.bind(row.id)
				.bind(Uuid::from(participant.id))
				.execute(&mut *tx)
				.await?;
		}

		let gather = self
			.hydrate(&mut *tx, vec![row])
			.await?
			.pop()
			.ok_or(StoreError::Sqlx(sqlx::Error::RowNotFound))?;

		tx.commit().await?;

		Ok(gather)
	}

	async fn add_participant(&self, gather_id: Ulid, user_id: Ulid) -> Result<Gather, StoreError> {
		let mut tx = self.db.begin().await?;

		let row: GatherRow = sqlx::query_as("SELECT * FROM gathers WHERE id = $1 FOR UPDATE")
			.bind(Uuid::from(gather_id))
			.fetch_optional(&mut *tx)
			.await?
			.ok_or(StoreError::GatherNotFound(gather_id))?;

		let user_exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
			.bind(Uuid::from(user_id))
			.fetch_one(&mut *tx)
			.await?;

		if !user_exists {
			return Err(StoreError::UserNotFound(user_id));
		}

		sqlx::query("INSERT INTO gather_participants (gather_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING")
			.bind(Uuid::from(gather_id))
			.bind(Uuid::from(user_id))
			.execute(&mut *tx)
			.await?;

		let gather = self
			.hydrate(&mut *tx, vec![row])
			.await?
			.pop()
			.ok_or(StoreError::GatherNotFound(gather_id))?;

		tx.commit().await?;

		Ok(gather)
	}

	async fn insert_user(&self, name: &str) -> Result<Participant, StoreError> {
		let row: UserRow = sqlx::query_as("INSERT INTO users (id, name) VALUES ($1, $2) RETURNING id, name")
			.bind(Uuid::from(Ulid::new()))
			.bind(name)
			.fetch_one(&self.db)
			.await?;

		Ok(row.into())
	}

	async fn user_by_id(&self, id: Ulid) -> Result<Option<Participant>, StoreError> {
		let row: Option<UserRow> = sqlx::query_as("SELECT id, name FROM users WHERE id = $1")
			.bind(Uuid::from(id))
			.fetch_optional(&self.db)
			.await?;

		Ok(row.map(Participant::from))
	}
}
