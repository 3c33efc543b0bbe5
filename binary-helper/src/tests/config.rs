use serde_json::json;

use crate::config::{AppConfig, ConfigExtention};

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default)]
struct ExtConfig {
	port: u16,
	label: String,
}

impl Default for ExtConfig {
	fn default() -> Self {
		Self {
			port: 4000,
			label: "default".to_owned(),
		}
	}
}

impl ConfigExtention for ExtConfig {
	const APP_NAME: &'static str = "test-app";
}

#[test]
fn test_empty_config_uses_defaults() {
	let config: AppConfig<ExtConfig> = serde_json::from_value(json!({})).unwrap();

	assert_eq!(config, AppConfig::default());
	assert_eq!(config.name, "test-app");
	assert_eq!(config.config_file.as_deref(), Some("config"));
	assert_eq!(config.extra, ExtConfig::default());
}

#[test]
fn test_extension_keys_are_flattened() {
	let config: AppConfig<ExtConfig> = serde_json::from_value(json!({
		"name": "other",
		"port": 8080,
		"logging": { "level": "debug" },
	}))
	.unwrap();

	assert_eq!(config.name, "other");
	assert_eq!(config.logging.level, "debug");
	assert_eq!(
		config.extra,
		ExtConfig {
			port: 8080,
			label: "default".to_owned(),
		}
	);
}
