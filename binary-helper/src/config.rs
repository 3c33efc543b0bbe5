use common::config::{DatabaseConfig, LoggingConfig};

use super::Config;

/// Environment variables with this prefix override config keys.
pub const ENV_PREFIX: &str = "GATHERS_";

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default, bound(deserialize = "T: ConfigExtention"))]
pub struct AppConfig<T: ConfigExtention> {
	/// The name of the application
	pub name: String,

	/// The path to the config file
	pub config_file: Option<String>,

	/// The logging configuration
	pub logging: LoggingConfig,

	/// The database configuration
	pub database: DatabaseConfig,

	#[serde(flatten)]
	pub extra: T,
}

/// Binary specific config, flattened into [`AppConfig`].
pub trait ConfigExtention: serde::de::DeserializeOwned + Default {
	const APP_NAME: &'static str;

	fn config_default() -> AppConfig<Self> {
		AppConfig {
			name: Self::APP_NAME.to_owned(),
			config_file: Some("config".to_owned()),
			logging: Default::default(),
			database: Default::default(),
			extra: Self::default(),
		}
	}

	fn pre_hook(_config: &mut AppConfig<Self>) -> anyhow::Result<()> {
		Ok(())
	}
}

impl<T: ConfigExtention> Default for AppConfig<T> {
	fn default() -> Self {
		T::config_default()
	}
}

impl<T: ConfigExtention> Config for AppConfig<T> {
	fn logging(&self) -> &LoggingConfig {
		&self.logging
	}

	fn parse() -> anyhow::Result<Self> {
		let (mut config, config_file) = common::config::parse::<Self>(ENV_PREFIX, !cfg!(test), Self::default().config_file)?;

		config.config_file = config_file;

		Ok(config)
	}

	fn name(&self) -> &str {
		&self.name
	}

	fn pre_hook(&mut self) -> anyhow::Result<()> {
		T::pre_hook(self)
	}
}
