use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use common::config::LoggingConfig;
use common::context::Context;
use common::{logging, signal};
use tokio::signal::unix::SignalKind;
use tokio::{select, time};

pub mod config;
pub mod global;

#[cfg(test)]
mod tests;

pub trait Config {
	fn parse() -> anyhow::Result<Self>
	where
		Self: Sized;

	fn logging(&self) -> &LoggingConfig;

	fn name(&self) -> &str;

	fn pre_hook(&mut self) -> anyhow::Result<()> {
		Ok(())
	}
}

/// Process wide state handed to every task. Built once the config is parsed
/// and logging is up.
#[allow(async_fn_in_trait)]
pub trait Global<C: Config> {
	async fn new(ctx: Context, config: C) -> anyhow::Result<Self>
	where
		Self: Sized;
}

/// Parses the config, installs logging, builds the global state and runs
/// `process` until it fails or the process receives SIGINT/SIGTERM. On
/// shutdown the root context is cancelled and tasks get 60 seconds to let go
/// of it, a second signal skips the wait.
pub async fn bootstrap<C: Config, G: Global<C>, F: Future<Output = anyhow::Result<()>> + Send + 'static>(
	process: impl FnOnce(Arc<G>) -> F,
) -> anyhow::Result<()> {
	let (ctx, handler) = Context::new();

	let config = C::parse()
		.and_then(|mut config| {
			config.pre_hook()?;
			Ok(config)
		})
		.map_err(|err| {
			// Still want to see why we refused to start.
			logging::init("info", Default::default()).ok();
			err
		})
		.context("failed to parse config")?;

	logging::init(&config.logging().level, config.logging().mode).context("failed to init logging")?;

	tracing::info!(name = config.name(), "starting up");

	let global = Arc::new(G::new(ctx, config).await.context("failed to create global state")?);

	tracing::debug!("global state created, starting process");

	let process_future = tokio::spawn(process(global));

	let mut signal_handler = signal::SignalHandler::new()
		.with_signal(SignalKind::interrupt())
		.with_signal(SignalKind::terminate());

	select! {
		_ = signal_handler.recv() => tracing::info!("shutting down"),
		r = process_future => match r {
			Ok(Ok(())) => tracing::warn!("process exited"),
			Ok(Err(err)) => tracing::error!("process stopped unexpectedly: {:#}", err),
			Err(err) => tracing::error!("process panicked: {}", err),
		},
	}

	tracing::info!("waiting for tasks to finish");

	select! {
		_ = time::sleep(Duration::from_secs(60)) => tracing::warn!("force shutting down"),
		_ = signal_handler.recv() => tracing::warn!("force shutting down"),
		_ = handler.cancel() => tracing::info!("shutting down"),
	}

	Ok(())
}
