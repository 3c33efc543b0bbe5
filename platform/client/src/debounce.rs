use std::future::Future;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

/// Runs at most one delayed task at a time. Scheduling a new task aborts the
/// pending one, so only the last call within `delay` ever runs.
pub struct Debouncer {
	delay: Duration,
	pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
	pub fn new(delay: Duration) -> Self {
		Self {
			delay,
			pending: Mutex::new(None),
		}
	}

	pub fn delay(&self) -> Duration {
		self.delay
	}

	/// Must be called from within a tokio runtime.
	pub fn schedule<F>(&self, task: F)
	where
		F: Future<Output = ()> + Send + 'static,
	{
		let delay = self.delay;
		let handle = tokio::spawn(async move {
			tokio::time::sleep(delay).await;
			task.await;
		});

		if let Some(previous) = self.pending.lock().replace(handle) {
			previous.abort();
		}
	}

	pub fn cancel(&self) {
		if let Some(pending) = self.pending.lock().take() {
			pending.abort();
		}
	}

	pub fn is_pending(&self) -> bool {
		self.pending.lock().as_ref().is_some_and(|handle| !handle.is_finished())
	}
}

impl Drop for Debouncer {
	fn drop(&mut self) {
		if let Some(pending) = self.pending.get_mut().take() {
			pending.abort();
		}
	}
}
