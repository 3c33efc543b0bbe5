use std::path::{Path, PathBuf};

use clap::Parser;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::logging;

#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct TlsConfig {
	/// The path to the TLS certificate
	pub cert: String,

	/// The path to the TLS private key
	pub key: String,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
	/// The log level to use, this is a tracing env filter
	pub level: String,

	/// What logging mode we should use
	pub mode: logging::Mode,
}

impl Default for LoggingConfig {
	fn default() -> Self {
		Self {
			level: "info".to_string(),
			mode: logging::Mode::Default,
		}
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
	#[default]
	Postgres,
	Memory,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
	/// The database URL to use
	pub uri: String,

	/// Which store backs the service, `memory` keeps everything in process
	pub store: StoreKind,

	/// Upper bound on pooled connections
	pub max_connections: u32,
}

impl Default for DatabaseConfig {
	fn default() -> Self {
		Self {
			uri: "postgres://root@localhost:5432/gathers_dev".to_string(),
			store: StoreKind::default(),
			max_connections: 10,
		}
	}
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("failed to read config file {path}: {source}")]
	Io { path: String, source: std::io::Error },
	#[error("invalid toml in {path}: {source}")]
	Toml { path: String, source: toml::de::Error },
	#[error("invalid yaml in {path}: {source}")]
	Yaml { path: String, source: serde_yaml::Error },
	#[error("invalid json in {path}: {source}")]
	Json { path: String, source: serde_json::Error },
	#[error("unsupported config file format: {0}")]
	UnsupportedFormat(String),
	#[error("config file not found: {0}")]
	NotFound(String),
	#[error("invalid override {0:?}, expected key=value")]
	InvalidOverride(String),
	#[error("invalid config: {0}")]
	Deserialize(#[from] serde_path_to_error::Error<serde_json::Error>),
}

/// The config flags every binary accepts. Binaries with their own command
/// line flatten this into their parser and hand it to [`parse_with_args`].
#[derive(Debug, Default, Clone, clap::Args)]
pub struct ConfigArgs {
	/// Path to the config file
	#[arg(long, short = 'c', global = true)]
	pub config_file: Option<String>,

	/// Override a single key, for example `--set api.bind_address=[::]:4000`
	#[arg(long = "set", value_name = "KEY=VALUE", global = true)]
	pub overrides: Vec<String>,
}

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct CliSource {
	#[command(flatten)]
	args: ConfigArgs,
}

const FILE_EXTENSIONS: [&str; 4] = ["toml", "yaml", "yml", "json"];

/// Builds `C` from, in increasing priority: its serde defaults, a config
/// file, environment variables starting with `env_prefix` and command line
/// overrides.
///
/// Nested keys are separated by `__` in the environment
/// (`GATHERS_API__BIND_ADDRESS`) and by `.` on the command line. Values that
/// look like booleans or numbers are typed as such. When the field at that
/// key turns out to be a string the raw text is used instead, except inside
/// `#[serde(flatten)]` structs where the failing key cannot be located. Wrap
/// a value in JSON quotes to force a string there.
///
/// Returns the config along with the canonical path of the file that was
/// loaded, if any.
pub fn parse<C: DeserializeOwned>(
	env_prefix: &str,
	enable_cli: bool,
	config_file: Option<String>,
) -> Result<(C, Option<String>), ConfigError> {
	let args = if enable_cli { CliSource::parse().args } else { ConfigArgs::default() };

	parse_with_args(env_prefix, args, config_file)
}

/// Same as [`parse`] with the command line already parsed by the caller.
pub fn parse_with_args<C: DeserializeOwned>(
	env_prefix: &str,
	cli: ConfigArgs,
	config_file: Option<String>,
) -> Result<(C, Option<String>), ConfigError> {
	let env = std::env::vars()
		.filter_map(|(key, value)| {
			let key = key.strip_prefix(env_prefix)?;
			let path = key.split("__").map(str::to_lowercase).collect::<Vec<_>>();
			Some((path, value))
		})
		.collect::<Vec<_>>();

	let env_config_file = env
		.iter()
		.find(|(path, _)| path.len() == 1 && path[0] == "config_file")
		.map(|(_, value)| value.clone());

	let explicit = cli.config_file.clone().or(env_config_file);
	let provided = explicit.is_some();

	let mut root = Value::Object(Map::new());
	let mut loaded = None;

	if let Some(path) = explicit.or(config_file) {
		match resolve_file(&path) {
			Some(file) => {
				root = read_file(&file)?;
				loaded = Some(std::fs::canonicalize(&file).unwrap_or(file).display().to_string());
			}
			None if provided => return Err(ConfigError::NotFound(path)),
			None => tracing::debug!(%path, "no config file found, using defaults"),
		}
	}

	// Keys whose value was typed from text, with the text it came from.
	let mut typed: Vec<(Vec<String>, String)> = Vec::new();
	let mut set = |root: &mut Value, path: Vec<String>, raw: &str| {
		let value = infer_value(raw);
		typed.retain(|(key, _)| *key != path);
		if !value.is_string() {
			typed.push((path.clone(), raw.to_owned()));
		}
		insert(root, &path, value);
	};

	for (path, value) in env {
		set(&mut root, path, &value);
	}

	for raw in &cli.overrides {
		let (key, value) = raw
			.split_once('=')
			.ok_or_else(|| ConfigError::InvalidOverride(raw.clone()))?;
		set(&mut root, key.split('.').map(str::to_owned).collect(), value);
	}

	loop {
		let err = match serde_path_to_error::deserialize::<_, C>(&root) {
			Ok(config) => return Ok((config, loaded)),
			Err(err) => err,
		};

		let failed = err.path().to_string();
		let Some(idx) = typed.iter().position(|(key, _)| key.join(".") == failed) else {
			return Err(err.into());
		};

		let (path, raw) = typed.swap_remove(idx);
		tracing::debug!(path = %failed, "typed override rejected, using it as a string");
		insert(&mut root, &path, Value::String(raw));
	}
}

/// A path without an extension is probed with every supported extension.
fn resolve_file(path: &str) -> Option<PathBuf> {
	let path = Path::new(path);

	if path.extension().is_some() {
		return path.is_file().then(|| path.to_path_buf());
	}

	FILE_EXTENSIONS
		.iter()
		.map(|ext| path.with_extension(ext))
		.find(|candidate| candidate.is_file())
}

fn read_file(path: &Path) -> Result<Value, ConfigError> {
	let display = path.display().to_string();
	let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
		path: display.clone(),
		source,
	})?;

	match path.extension().and_then(|ext| ext.to_str()) {
		Some("toml") => toml::from_str(&content).map_err(|source| ConfigError::Toml { path: display, source }),
		Some("yaml" | "yml") => serde_yaml::from_str(&content).map_err(|source| ConfigError::Yaml { path: display, source }),
		Some("json") => serde_json::from_str(&content).map_err(|source| ConfigError::Json { path: display, source }),
		_ => Err(ConfigError::UnsupportedFormat(display)),
	}
}

fn infer_value(raw: &str) -> Value {
	let trimmed = raw.trim();

	if trimmed.starts_with(['"', '[', '{']) {
		if let Ok(value) = serde_json::from_str(trimmed) {
			return value;
		}
	}

	match trimmed {
		"true" => return Value::Bool(true),
		"false" => return Value::Bool(false),
		_ => {}
	}

	if let Ok(int) = trimmed.parse::<i64>() {
		return Value::from(int);
	}

	if let Some(float) = trimmed.parse::<f64>().ok().and_then(serde_json::Number::from_f64) {
		return Value::Number(float);
	}

	Value::String(raw.to_owned())
}

fn insert(root: &mut Value, path: &[String], value: Value) {
	let Some((last, parents)) = path.split_last() else {
		return;
	};

	let mut node = root;
	for key in parents {
		node = object_mut(node)
			.entry(key.clone())
			.or_insert_with(|| Value::Object(Map::new()));
	}

	object_mut(node).insert(last.clone(), value);
}

/// Scalars in the way of a nested key are replaced by an empty object.
fn object_mut(node: &mut Value) -> &mut Map<String, Value> {
	if !node.is_object() {
		*node = Value::Object(Map::new());
	}

	match node {
		Value::Object(map) => map,
		_ => unreachable!("node was just made an object"),
	}
}
