use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{oneshot, watch};
use tokio::time::Instant;

struct RawContext {
	// Dropped together with the last clone of the context, which is what
	// `Handler::cancel` waits on.
	_alive: oneshot::Sender<()>,
	deadline: Option<Instant>,
	parent: Option<Context>,
	cancelled: watch::Receiver<bool>,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum CancelReason {
	Parent,
	Deadline,
	Cancel,
}

impl Display for CancelReason {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Parent => write!(f, "Parent"),
			Self::Deadline => write!(f, "Deadline"),
			Self::Cancel => write!(f, "Cancel"),
		}
	}
}

/// Owner side of a [`Context`]. Cancelling signals every clone of the
/// context and then waits until all of them have been dropped.
pub struct Handler {
	alive: oneshot::Receiver<()>,
	cancel: watch::Sender<bool>,
}

impl Handler {
	/// Resolves once every clone of the context is gone, without cancelling.
	pub async fn done(&mut self) {
		let _ = (&mut self.alive).await;
	}

	pub async fn cancel(self) {
		let _ = self.cancel.send(true);
		drop(self.cancel);

		let _ = self.alive.await;
	}
}

#[derive(Clone)]
pub struct Context(Arc<RawContext>);

impl Context {
	fn build(parent: Option<Context>, deadline: Option<Instant>) -> (Self, Handler) {
		let (alive_tx, alive_rx) = oneshot::channel();
		let (cancel_tx, cancel_rx) = watch::channel(false);

		(
			Self(Arc::new(RawContext {
				_alive: alive_tx,
				deadline,
				parent,
				cancelled: cancel_rx,
			})),
			Handler {
				alive: alive_rx,
				cancel: cancel_tx,
			},
		)
	}

	#[must_use]
	pub fn new() -> (Self, Handler) {
		Self::build(None, None)
	}

	#[must_use]
	pub fn with_deadline(deadline: Instant) -> (Self, Handler) {
		Self::build(None, Some(deadline))
	}

	#[must_use]
	pub fn with_timeout(timeout: Duration) -> (Self, Handler) {
		Self::with_deadline(Instant::now() + timeout)
	}

	#[must_use]
	pub fn with_parent(parent: Context, deadline: Option<Instant>) -> (Self, Handler) {
		Self::build(Some(parent), deadline)
	}

	pub fn is_done(&self) -> bool {
		*self.0.cancelled.borrow()
			|| self.0.cancelled.has_changed().is_err()
			|| self.0.deadline.is_some_and(|d| d <= Instant::now())
			|| self.0.parent.as_ref().is_some_and(Context::is_done)
	}

	pub async fn done(&self) -> CancelReason {
		self.done_boxed().await
	}

	fn done_boxed(&self) -> Pin<Box<dyn Future<Output = CancelReason> + Send + '_>> {
		let mut cancelled = self.0.cancelled.clone();

		Box::pin(async move {
			// A dropped handler counts as a cancel.
			let cancel = async move {
				let _ = cancelled.wait_for(|c| *c).await;
			};

			let deadline = async {
				match self.0.deadline {
					Some(deadline) => tokio::time::sleep_until(deadline).await,
					None => std::future::pending::<()>().await,
				}
			};

			let parent = async {
				match &self.0.parent {
					Some(parent) => {
						parent.done_boxed().await;
					}
					None => std::future::pending::<()>().await,
				}
			};

			tokio::select! {
				_ = cancel => CancelReason::Cancel,
				_ = deadline => CancelReason::Deadline,
				_ = parent => CancelReason::Parent,
			}
		})
	}
}
