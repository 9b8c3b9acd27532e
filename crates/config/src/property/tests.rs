use std::collections::VecDeque;
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;

use super::*;

/// Records every value a property delivers.
struct Spy<T> {
	events: Arc<Mutex<VecDeque<T>>>,
}

impl<T: PropertyValue> Spy<T> {
	fn attach(property: &DynamicProperty<T>) -> (Self, SubscriptionId) {
		let events = Arc::new(Mutex::new(VecDeque::new()));
		let sink = Arc::clone(&events);
		let id = property.subscribe(move |value: &T| sink.lock().push_back(value.clone()));
		(Self { events }, id)
	}

	fn receives(&self, expected: T) {
		assert_eq!(self.events.lock().pop_front(), Some(expected));
	}

	fn receives_nothing(&self) {
		let next = self.events.lock().pop_front();
		assert!(next.is_none(), "expected no change event, got {next:?}");
	}
}

#[test]
fn test_int_listener_notified_on_set() {
	let property = DynamicProperty::new(1_i32);
	let (spy, _) = Spy::attach(&property);

	spy.receives_nothing();
	property.set(2);
	spy.receives(2);
	assert_eq!(property.get(), 2);
}

#[test]
fn test_unsubscribed_listener_not_notified() {
	let property = DynamicProperty::new("1".to_string());
	let (spy, id) = Spy::attach(&property);
	property.set("2".to_string());
	spy.receives("2".to_string());

	assert!(property.unsubscribe(id));
	property.set("3".to_string());
	spy.receives_nothing();
	assert_eq!(property.listener_count(), 0);
}

#[test]
fn test_set_same_value_still_notifies() {
	let property = DynamicProperty::new(false);
	let (spy, _) = Spy::attach(&property);

	property.set(false);
	spy.receives(false);
}

#[test]
fn test_listener_panic_does_not_propagate() {
	let property = DynamicProperty::new(1_i64);
	property.subscribe(|_: &i64| panic!("boom"));

	property.set(2);

	assert_eq!(property.get(), 2);
}

#[test]
fn test_listener_after_failing_listener_is_notified() {
	let property = DynamicProperty::new(1_i32);
	property.subscribe(|_: &i32| panic!("boom"));
	let (spy, _) = Spy::attach(&property);

	property.set(2);

	spy.receives(2);
}

#[test]
fn test_listener_sees_published_value() {
	let property = Arc::new(DynamicProperty::new(0_i32));
	let observed = Arc::new(Mutex::new(Vec::new()));
	let reader = Arc::clone(&property);
	let sink = Arc::clone(&observed);
	property.subscribe(move |value: &i32| sink.lock().push((*value, reader.get())));

	property.set(5);

	assert_eq!(*observed.lock(), vec![(5, 5)]);
}

#[test]
fn test_optional_presence() {
	let property = DynamicProperty::<Option<String>>::default();
	assert!(!property.is_present());
	property.set(Some("x".to_string()));
	assert!(property.is_present());
	assert_eq!(*property.load(), Some("x".to_string()));
}

#[test]
fn test_concurrent_readers_see_a_written_value() {
	let property = Arc::new(DynamicProperty::new(0_u64));
	let writer = {
		let property = Arc::clone(&property);
		thread::spawn(move || {
			for value in 1..=1000 {
				property.set(value);
			}
		})
	};
	let readers: Vec<_> = (0..4)
		.map(|_| {
			let property = Arc::clone(&property);
			thread::spawn(move || {
				let mut last = 0;
				for _ in 0..1000 {
					let value = property.get();
					assert!(value <= 1000);
					assert!(value >= last, "single writer values never go backwards");
					last = value;
				}
			})
		})
		.collect();

	writer.join().unwrap();
	for reader in readers {
		reader.join().unwrap();
	}
	assert_eq!(property.get(), 1000);
}
