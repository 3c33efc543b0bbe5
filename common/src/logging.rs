use std::str::FromStr;

use once_cell::sync::OnceCell;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

type ReloadHandle = Box<dyn Fn(&str) -> Result<(), LoggingError> + Sync + Send>;

static RELOAD_HANDLE: OnceCell<ReloadHandle> = OnceCell::new();

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
	#[default]
	Default,
	Json,
	Pretty,
	Compact,
}

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
	#[error("invalid log level: {0}")]
	InvalidLevel(#[from] tracing_subscriber::filter::ParseError),
	#[error("failed to init logger: {0}")]
	Init(#[from] tracing_subscriber::util::TryInitError),
	#[error("failed to reload logger: {0}")]
	Reload(#[from] tracing_subscriber::reload::Error),
}

/// Each formatter has its own builder type, so the install step is stamped out
/// per mode.
macro_rules! install {
	($builder:expr, $filter:expr) => {{
		let subscriber = $builder
			.with_line_number(true)
			.with_file(true)
			.with_env_filter($filter)
			.with_filter_reloading();

		let handle = subscriber.reload_handle();

		subscriber.finish().try_init()?;

		Ok::<_, LoggingError>(Box::new(move |level: &str| {
			handle.reload(EnvFilter::from_str(level)?)?;
			Ok(())
		}) as ReloadHandle)
	}};
}

/// Installs the global subscriber on the first call. Later calls only swap
/// the level filter, the mode is fixed for the life of the process.
pub fn init(level: &str, mode: Mode) -> Result<(), LoggingError> {
	let reload = RELOAD_HANDLE.get_or_try_init(|| {
		let env_filter = EnvFilter::from_str(level)?;

		match mode {
			Mode::Default => install!(tracing_subscriber::fmt(), env_filter),
			Mode::Json => install!(tracing_subscriber::fmt().json(), env_filter),
			Mode::Pretty => install!(tracing_subscriber::fmt().pretty(), env_filter),
			Mode::Compact => install!(tracing_subscriber::fmt().compact(), env_filter),
		}
	})?;

	reload(level)?;

	Ok(())
}
