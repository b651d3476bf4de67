//! Event - Scoped Notification Channel

use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use super::node::NodeId;
use super::scope::{Scope, Subscription};

/// A declared event carrying a payload of type `T`.
///
/// Emitting calls every watcher attached in the same scope, in attachment order.
pub struct Event<T: 'static> {
	id: NodeId,
	name: Rc<str>,
	_payload: PhantomData<fn(T)>,
}

impl<T: 'static> Clone for Event<T> {
	fn clone(&self) -> Self {
		Self {
			id: self.id,
			name: Rc::clone(&self.name),
			_payload: PhantomData,
		}
	}
}

impl<T: 'static> Event<T> {
	/// Declares an anonymous event.
	pub fn new() -> Self {
		Self::named("event")
	}

	/// Declares an event with a diagnostic name.
	pub fn named(name: impl Into<Rc<str>>) -> Self {
		Self {
			id: NodeId::new(),
			name: name.into(),
			_payload: PhantomData,
		}
	}

	/// Calls every watcher attached in `scope` with `payload`.
	pub fn emit(&self, scope: &Scope, payload: T) {
		scope.notify(self.id, &payload);
	}

	/// Attaches a watcher in `scope`.
	pub fn watch<F>(&self, scope: &Scope, f: F) -> Subscription
	where
		F: Fn(&T) + 'static,
	{
		scope.subscribe::<T>(self.id, Rc::new(f))
	}

	/// Returns the node identifier of this event.
	pub fn id(&self) -> NodeId {
		self.id
	}

	/// Returns the diagnostic name.
	pub fn name(&self) -> &str {
		&self.name
	}
}

impl<T: 'static> Default for Event<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T: 'static> fmt::Debug for Event<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Event")
			.field("id", &self.id)
			.field("name", &self.name)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::cell::RefCell;

	#[rstest]
	fn test_event_emit_reaches_watchers_in_order() {
		let event = Event::<&'static str>::named("ping");
		let scope = Scope::new();
		let log = Rc::new(RefCell::new(Vec::new()));

		let first = Rc::clone(&log);
		event.watch(&scope, move |p| first.borrow_mut().push(format!("a:{p}")));
		let second = Rc::clone(&log);
		event.watch(&scope, move |p| second.borrow_mut().push(format!("b:{p}")));

		event.emit(&scope, "x");

		assert_eq!(*log.borrow(), vec!["a:x", "b:x"]);
	}

	#[rstest]
	fn test_event_emits_identical_payloads() {
		let event = Event::<u8>::new();
		let scope = Scope::new();
		let count = Rc::new(RefCell::new(0));

		let sink = Rc::clone(&count);
		event.watch(&scope, move |_| *sink.borrow_mut() += 1);

		event.emit(&scope, 1);
		event.emit(&scope, 1);

		assert_eq!(*count.borrow(), 2);
	}

	#[rstest]
	fn test_event_watchers_are_scoped() {
		let event = Event::<()>::new();
		let watched = Scope::new();
		let other = Scope::new();
		let count = Rc::new(RefCell::new(0));

		let sink = Rc::clone(&count);
		event.watch(&watched, move |_| *sink.borrow_mut() += 1);

		event.emit(&other, ());
		assert_eq!(*count.borrow(), 0);

		event.emit(&watched, ());
		assert_eq!(*count.borrow(), 1);
	}

	#[rstest]
	fn test_event_unsubscribe() {
		let event = Event::<()>::new();
		let scope = Scope::new();
		let count = Rc::new(RefCell::new(0));

		let sink = Rc::clone(&count);
		let subscription = event.watch(&scope, move |_| *sink.borrow_mut() += 1);
		event.emit(&scope, ());
		subscription.unsubscribe();
		event.emit(&scope, ());

		assert_eq!(*count.borrow(), 1);
		assert_eq!(scope.watcher_count(event.id()), 0);
	}
}
