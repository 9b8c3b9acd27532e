use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use parking_lot::Mutex;

use super::*;

fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(&'static str) -> Box<dyn Fn(&i32) + Send + Sync>) {
	let log = Arc::new(Mutex::new(Vec::new()));
	let sink = Arc::clone(&log);
	let make = move |tag: &'static str| -> Box<dyn Fn(&i32) + Send + Sync> {
		let sink = Arc::clone(&sink);
		Box::new(move |event: &i32| sink.lock().push(format!("{tag}:{event}")))
	};
	(log, make)
}

#[test]
fn test_dispatch_in_subscription_order() {
	let broadcast = Broadcast::<i32>::new();
	let (log, make) = recorder();
	broadcast.subscribe(make("a"));
	broadcast.subscribe(make("b"));
	broadcast.subscribe(make("c"));

	broadcast.dispatch(&1);

	assert_eq!(*log.lock(), vec!["a:1", "b:1", "c:1"]);
}

#[test]
fn test_panicking_listener_is_isolated() {
	let broadcast = Broadcast::<i32>::new();
	let (log, make) = recorder();
	broadcast.subscribe(|_: &i32| panic!("listener failure"));
	broadcast.subscribe(make("after"));

	broadcast.dispatch(&7);
	broadcast.dispatch(&8);

	assert_eq!(*log.lock(), vec!["after:7", "after:8"]);
	assert_eq!(broadcast.len(), 2);
}

#[test]
fn test_non_string_panic_payload_is_isolated() {
	let broadcast = Broadcast::<i32>::new();
	let hits = Arc::new(AtomicUsize::new(0));
	broadcast.subscribe(|_: &i32| std::panic::panic_any(42_u8));
	let counter = Arc::clone(&hits);
	broadcast.subscribe(move |_: &i32| {
		counter.fetch_add(1, Ordering::SeqCst);
	});

	broadcast.dispatch(&0);

	assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn test_unsubscribe_by_handle() {
	let broadcast = Broadcast::<i32>::new();
	let (log, make) = recorder();
	let first = broadcast.subscribe(make("first"));
	broadcast.subscribe(make("second"));

	assert!(broadcast.unsubscribe(first));
	broadcast.dispatch(&2);

	assert_eq!(*log.lock(), vec!["second:2"]);
	assert!(!broadcast.unsubscribe(first), "second removal must report absence");
}

#[test]
fn test_identical_listeners_are_distinct_subscriptions() {
	let broadcast = Broadcast::<i32>::new();
	let hits = Arc::new(AtomicUsize::new(0));
	let make = || {
		let hits = Arc::clone(&hits);
		move |_: &i32| {
			hits.fetch_add(1, Ordering::SeqCst);
		}
	};
	let a = broadcast.subscribe(make());
	let b = broadcast.subscribe(make());
	assert_ne!(a, b);

	broadcast.dispatch(&0);
	assert_eq!(hits.load(Ordering::SeqCst), 2);

	broadcast.unsubscribe(a);
	broadcast.dispatch(&0);
	assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[test]
fn test_subscribe_during_dispatch_does_not_duplicate() {
	let broadcast = Arc::new(Broadcast::<i32>::new());
	let hits = Arc::new(AtomicUsize::new(0));
	let inner = Arc::clone(&broadcast);
	let counter = Arc::clone(&hits);
	broadcast.subscribe(move |_: &i32| {
		counter.fetch_add(1, Ordering::SeqCst);
		let counter = Arc::clone(&counter);
		inner.subscribe(move |_: &i32| {
			counter.fetch_add(1, Ordering::SeqCst);
		});
	});

	broadcast.dispatch(&0);

	assert_eq!(hits.load(Ordering::SeqCst), 1, "in-flight dispatch uses its pinned list");
	assert_eq!(broadcast.len(), 2);
}

#[test]
fn test_unsubscribe_self_during_dispatch() {
	let broadcast = Arc::new(Broadcast::<i32>::new());
	let (log, make) = recorder();
	let own_id = Arc::new(Mutex::new(None::<SubscriptionId>));
	let inner = Arc::clone(&broadcast);
	let slot = Arc::clone(&own_id);
	let id = broadcast.subscribe(move |_: &i32| {
		if let Some(id) = *slot.lock() {
			inner.unsubscribe(id);
		}
	});
	*own_id.lock() = Some(id);
	broadcast.subscribe(make("tail"));

	broadcast.dispatch(&1);
	broadcast.dispatch(&2);

	assert_eq!(*log.lock(), vec!["tail:1", "tail:2"]);
	assert_eq!(broadcast.len(), 1);
}

#[test]
fn test_concurrent_subscribers_are_all_kept() {
	let broadcast = Arc::new(Broadcast::<i32>::new());
	let handles: Vec<_> = (0..8)
		.map(|_| {
			let broadcast = Arc::clone(&broadcast);
			thread::spawn(move || {
				for _ in 0..50 {
					broadcast.subscribe(|_: &i32| {});
				}
			})
		})
		.collect();
	for handle in handles {
		handle.join().unwrap();
	}

	assert_eq!(broadcast.len(), 400);
}
