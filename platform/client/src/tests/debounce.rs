use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::debounce::Debouncer;

fn counter_task(counter: &Arc<AtomicUsize>) -> impl std::future::Future<Output = ()> + Send + 'static {
	let counter = counter.clone();
	async move {
		counter.fetch_add(1, Ordering::SeqCst);
	}
}

#[tokio::test(start_paused = true)]
async fn test_only_last_schedule_runs() {
	let debouncer = Debouncer::new(Duration::from_millis(300));
	let counter = Arc::new(AtomicUsize::new(0));

	for _ in 0..3 {
		debouncer.schedule(counter_task(&counter));
		tokio::time::sleep(Duration::from_millis(100)).await;
	}

	assert!(debouncer.is_pending());
	assert_eq!(counter.load(Ordering::SeqCst), 0);

	// 299ms after the last schedule.
	tokio::time::sleep(Duration::from_millis(199)).await;
	assert_eq!(counter.load(Ordering::SeqCst), 0);

	tokio::time::sleep(Duration::from_millis(2)).await;
	assert_eq!(counter.load(Ordering::SeqCst), 1);
	assert!(!debouncer.is_pending());

	tokio::time::sleep(Duration::from_secs(1)).await;
	assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_cancel() {
	let debouncer = Debouncer::new(Duration::from_millis(300));
	let counter = Arc::new(AtomicUsize::new(0));

	debouncer.schedule(counter_task(&counter));
	debouncer.cancel();
	assert!(!debouncer.is_pending());

	tokio::time::sleep(Duration::from_secs(1)).await;
	assert_eq!(counter.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_drop_cancels() {
	let counter = Arc::new(AtomicUsize::new(0));

	{
		let debouncer = Debouncer::new(Duration::from_millis(300));
		debouncer.schedule(counter_task(&counter));
	}

	tokio::time::sleep(Duration::from_secs(1)).await;
	assert_eq!(counter.load(Ordering::SeqCst), 0);
}
