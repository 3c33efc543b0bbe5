use std::sync::Arc;

use anyhow::Context as _;
use binary_helper::global::setup_database;
use binary_helper::{bootstrap, impl_global_traits};
use common::config::StoreKind;
use common::context::Context;
use gathers_api::config::ApiConfig;
use gathers_api::database::{GatherStore, MemoryStore, PgStore};

#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize)]
#[serde(default)]
struct ExtConfig {
	/// The API configuration.
	api: ApiConfig,
}

impl binary_helper::config::ConfigExtention for ExtConfig {
	const APP_NAME: &'static str = "gathers-api";
}

type AppConfig = binary_helper::config::AppConfig<ExtConfig>;

struct GlobalState {
	ctx: Context,
	config: AppConfig,
	store: Arc<dyn GatherStore>,
}

impl_global_traits!(GlobalState);

impl binary_helper::global::GlobalConfigProvider<ApiConfig> for GlobalState {
	#[inline(always)]
	fn provide_config(&self) -> &ApiConfig {
		&self.config.extra.api
	}
}

impl gathers_api::global::ApiState for GlobalState {
	#[inline(always)]
	fn store(&self) -> &Arc<dyn GatherStore> {
		&self.store
	}
}

impl binary_helper::Global<AppConfig> for GlobalState {
	async fn new(ctx: Context, config: AppConfig) -> anyhow::Result<Self> {
		let store: Arc<dyn GatherStore> = match config.database.store {
			StoreKind::Postgres => {
				let db = setup_database(&config.database).await?;
				let store = PgStore::new(db);
				store.migrate().await.context("failed to run migrations")?;
				Arc::new(store)
			}
			StoreKind::Memory => {
				tracing::warn!("using the in-memory store, nothing will be persisted");
				Arc::new(MemoryStore::default())
			}
		};

		Ok(Self { ctx, config, store })
	}
}

#[tokio::main]
pub async fn main() {
	if let Err(err) = bootstrap::<AppConfig, GlobalState, _>(|global| async move {
		gathers_api::api::run(global).await.context("api server stopped unexpectedly")
	})
	.await
	{
		tracing::error!("{:#}", err);
		std::process::exit(1);
	}
}
