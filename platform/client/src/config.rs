use std::time::Duration;

use common::config::LoggingConfig;

/// Environment variables with this prefix override config keys.
pub const ENV_PREFIX: &str = "GATHERS_CLIENT_";

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct ClientConfig {
	/// Base url of the gathers API
	pub api_url: String,

	/// The path to the config file
	pub config_file: Option<String>,

	/// The places service configuration
	pub places: PlacesConfig,

	/// Search behaviour
	pub discovery: DiscoveryConfig,

	/// The logging configuration
	pub logging: LoggingConfig,
}

impl Default for ClientConfig {
	fn default() -> Self {
		Self {
			api_url: "http://localhost:4000".to_string(),
			config_file: Some("gathers".to_string()),
			places: PlacesConfig::default(),
			discovery: DiscoveryConfig::default(),
			logging: LoggingConfig {
				level: "warn".to_string(),
				..Default::default()
			},
		}
	}
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct PlacesConfig {
	/// Base url of the Google Places web service
	pub url: String,

	/// The API key sent with every request
	pub api_key: String,
}

impl Default for PlacesConfig {
	fn default() -> Self {
		Self {
			url: "https://maps.googleapis.com/maps/api/place".to_string(),
			api_key: String::new(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
	/// How long after the last keystroke suggestions are revealed
	pub debounce_ms: u64,

	/// Inputs shorter than this never hit the places service
	pub min_input_len: usize,

	/// How many suggestions are kept from each lookup
	pub max_suggestions: usize,
}

impl DiscoveryConfig {
	pub fn debounce(&self) -> Duration {
		Duration::from_millis(self.debounce_ms)
	}
}

impl Default for DiscoveryConfig {
	fn default() -> Self {
		Self {
			debounce_ms: 300,
			min_input_len: 2,
			max_suggestions: 5,
		}
	}
}
