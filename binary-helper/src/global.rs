use std::str::FromStr;
use std::time::Duration;

use anyhow::Context as _;
use common::config::DatabaseConfig;
use common::context::Context;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::ConnectOptions;

#[macro_export]
macro_rules! impl_global_traits {
	($struct:ty) => {
		impl binary_helper::global::GlobalCtx for $struct {
			#[inline(always)]
			fn ctx(&self) -> &common::context::Context {
				&self.ctx
			}
		}

		impl binary_helper::global::GlobalConfig for $struct {}
	};
}

pub trait GlobalCtx {
	fn ctx(&self) -> &Context;
}

pub trait GlobalConfig {
	#[inline(always)]
	fn config<C>(&self) -> &C
	where
		Self: GlobalConfigProvider<C>,
	{
		GlobalConfigProvider::provide_config(self)
	}
}

pub trait GlobalConfigProvider<C> {
	fn provide_config(&self) -> &C;
}

pub async fn setup_database(config: &DatabaseConfig) -> anyhow::Result<sqlx::PgPool> {
	let options = PgConnectOptions::from_str(&config.uri)
		.context("invalid database uri")?
		.disable_statement_logging();

	let pool = PgPoolOptions::new()
		.max_connections(config.max_connections)
		.acquire_timeout(Duration::from_secs(5))
		.connect_with(options)
		.await
		.context("failed to connect to database")?;

	tracing::info!("connected to database");

	Ok(pool)
}
