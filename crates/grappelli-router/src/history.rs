//! History Adapter
//!
//! The router never owns the navigation stack. It talks to it through the
//! [`History`] trait: read the current location, subscribe to changes, and issue
//! push / replace / back / forward. [`MemoryHistory`] is the in-process
//! implementation used for tests and non-browser hosts.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::error::RouterError;
use crate::location::{Action, Location};

/// Callback invoked once per location change.
///
/// Errors returned by a listener propagate to whoever triggered the change.
pub type Listener = Rc<dyn Fn(&Location, Action) -> Result<(), RouterError>>;

/// Handle returned by [`History::listen`].
///
/// Dropping the handle keeps the listener attached; call [`Unlisten::unlisten`]
/// to detach it.
pub struct Unlisten(Option<Box<dyn FnOnce()>>);

impl Unlisten {
	/// Wraps a detach callback.
	pub fn new<F>(detach: F) -> Self
	where
		F: FnOnce() + 'static,
	{
		Self(Some(Box::new(detach)))
	}

	/// Detaches the listener.
	pub fn unlisten(mut self) {
		if let Some(detach) = self.0.take() {
			detach();
		}
	}
}

impl fmt::Debug for Unlisten {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Unlisten")
			.field("attached", &self.0.is_some())
			.finish()
	}
}

/// A navigation stack the router can observe and drive.
///
/// Implementations must call every listener exactly once per change, in order,
/// after the change is visible through [`History::location`].
///
/// Location keys are optional. A history that fills [`Location::key`] must give
/// each entry its own key: the router treats a second delivery of the key it
/// resolved last as a repeat and skips it. Locations with an empty key are always
/// resolved, so an adapter that builds locations with [`Location::parse`] needs no
/// key bookkeeping.
pub trait History {
	/// Returns the current location.
	fn location(&self) -> Location;

	/// Attaches a listener.
	fn listen(&self, listener: Listener) -> Unlisten;

	/// Appends an entry for `to` and moves to it.
	fn push(&self, to: &str, state: Value) -> Result<(), RouterError>;

	/// Overwrites the current entry with `to`.
	fn replace(&self, to: &str, state: Value) -> Result<(), RouterError>;

	/// Moves one entry back.
	fn back(&self) -> Result<(), RouterError>;

	/// Moves one entry forward.
	fn forward(&self) -> Result<(), RouterError>;
}

struct MemoryState {
	entries: Vec<Location>,
	index: usize,
	next_key: u64,
}

impl MemoryState {
	fn make_key(&mut self) -> String {
		let key = format!("m{}", self.next_key);
		self.next_key += 1;
		key
	}
}

struct MemoryHistoryInner {
	state: RefCell<MemoryState>,
	listeners: RefCell<Vec<(u64, Listener)>>,
	next_listener: Cell<u64>,
}

/// In-memory history stack.
///
/// Cloning yields another handle to the same stack.
#[derive(Clone)]
pub struct MemoryHistory {
	inner: Rc<MemoryHistoryInner>,
}

impl MemoryHistory {
	/// Creates a history with a single `/` entry.
	pub fn new() -> Self {
		Self::with_entries(["/"], 0)
	}

	/// Creates a history from hrefs, positioned at `index` (clamped to the last entry).
	///
	/// An empty list yields a single `/` entry.
	pub fn with_entries<I, S>(hrefs: I, index: usize) -> Self
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let mut state = MemoryState {
			entries: Vec::new(),
			index: 0,
			next_key: 0,
		};
		for href in hrefs {
			let mut location = Location::parse(href.as_ref());
			location.key = state.make_key();
			state.entries.push(location);
		}
		if state.entries.is_empty() {
			let mut location = Location::default();
			location.key = state.make_key();
			state.entries.push(location);
		}
		state.index = index.min(state.entries.len() - 1);

		Self {
			inner: Rc::new(MemoryHistoryInner {
				state: RefCell::new(state),
				listeners: RefCell::new(Vec::new()),
				next_listener: Cell::new(0),
			}),
		}
	}

	/// Returns the position of the current entry.
	pub fn index(&self) -> usize {
		self.inner.state.borrow().index
	}

	/// Returns the number of entries.
	pub fn len(&self) -> usize {
		self.inner.state.borrow().entries.len()
	}

	/// Always `false`: a memory history holds at least one entry.
	pub fn is_empty(&self) -> bool {
		self.inner.state.borrow().entries.is_empty()
	}

	/// Returns a copy of every entry.
	pub fn entries(&self) -> Vec<Location> {
		self.inner.state.borrow().entries.clone()
	}

	/// Returns the number of attached listeners.
	pub fn listener_count(&self) -> usize {
		self.inner.listeners.borrow().len()
	}

	/// Moves `delta` entries. Out-of-range moves and `go(0)` do nothing.
	pub fn go(&self, delta: isize) -> Result<(), RouterError> {
		let location = {
			let mut state = self.inner.state.borrow_mut();
			let Some(target) = state.index.checked_add_signed(delta) else {
				return Ok(());
			};
			if delta == 0 || target >= state.entries.len() {
				return Ok(());
			}
			state.index = target;
			state.entries[target].clone()
		};
		self.notify(&location, Action::Pop)
	}

	fn write(&self, to: &str, state_value: Value, action: Action) -> Result<(), RouterError> {
		let location = {
			let mut state = self.inner.state.borrow_mut();
			let index = state.index;
			let mut location = state.entries[index].resolve(to);
			location.key = state.make_key();
			location.state = state_value;

			match action {
				Action::Push => {
					state.entries.truncate(index + 1);
					state.entries.push(location.clone());
					state.index = index + 1;
				}
				_ => state.entries[index] = location.clone(),
			}
			location
		};
		self.notify(&location, action)
	}

	/// Calls every listener; the first error is returned after all have run.
	fn notify(&self, location: &Location, action: Action) -> Result<(), RouterError> {
		let listeners: Vec<Listener> = self
			.inner
			.listeners
			.borrow()
			.iter()
			.map(|(_, listener)| Rc::clone(listener))
			.collect();

		let mut result = Ok(());
		for listener in listeners {
			if let Err(err) = listener(location, action)
				&& result.is_ok()
			{
				result = Err(err);
			}
		}
		result
	}
}

impl Default for MemoryHistory {
	fn default() -> Self {
		Self::new()
	}
}

impl History for MemoryHistory {
	fn location(&self) -> Location {
		let state = self.inner.state.borrow();
		state.entries[state.index].clone()
	}

	fn listen(&self, listener: Listener) -> Unlisten {
		let id = self.inner.next_listener.get();
		self.inner.next_listener.set(id + 1);
		self.inner.listeners.borrow_mut().push((id, listener));

		let weak = Rc::downgrade(&self.inner);
		Unlisten::new(move || {
			if let Some(inner) = weak.upgrade() {
				let removed: Vec<(u64, Listener)> = {
					let mut listeners = inner.listeners.borrow_mut();
					let (removed, kept): (Vec<_>, Vec<_>) =
						listeners.drain(..).partition(|(lid, _)| *lid == id);
					*listeners = kept;
					removed
				};
				drop(removed);
			}
		})
	}

	fn push(&self, to: &str, state: Value) -> Result<(), RouterError> {
		self.write(to, state, Action::Push)
	}

	fn replace(&self, to: &str, state: Value) -> Result<(), RouterError> {
		self.write(to, state, Action::Replace)
	}

	fn back(&self) -> Result<(), RouterError> {
		self.go(-1)
	}

	fn forward(&self) -> Result<(), RouterError> {
		self.go(1)
	}
}

impl fmt::Debug for MemoryHistory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let state = self.inner.state.borrow();
		f.debug_struct("MemoryHistory")
			.field("index", &state.index)
			.field("entries", &state.entries.iter().map(Location::href).collect::<Vec<_>>())
			.field("listeners", &self.inner.listeners.borrow().len())
			.finish()
	}
}
