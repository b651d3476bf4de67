//! Store - Scoped Value Cell
//!
//! `Store<T>` declares a piece of state with a default value. The actual value lives
//! in a [`Scope`]; a scope that never wrote the store reads the default.
//!
//! Writes compare by value: setting a store to a value equal to its current value
//! neither stores anything nor notifies watchers.

use std::fmt;
use std::rc::Rc;

use super::node::NodeId;
use super::scope::{Scope, Subscription};

/// A declared reactive value.
///
/// Cloning a `Store` yields another handle to the same declaration.
pub struct Store<T: 'static> {
	id: NodeId,
	name: Rc<str>,
	default: Rc<T>,
}

impl<T: 'static> Clone for Store<T> {
	fn clone(&self) -> Self {
		Self {
			id: self.id,
			name: Rc::clone(&self.name),
			default: Rc::clone(&self.default),
		}
	}
}

impl<T: Clone + PartialEq + 'static> Store<T> {
	/// Declares an anonymous store.
	pub fn new(default: T) -> Self {
		Self::named("store", default)
	}

	/// Declares a store with a diagnostic name.
	pub fn named(name: impl Into<Rc<str>>, default: T) -> Self {
		Self {
			id: NodeId::new(),
			name: name.into(),
			default: Rc::new(default),
		}
	}

	/// Returns the value held in `scope`, or the default.
	pub fn get(&self, scope: &Scope) -> T {
		scope
			.read::<T>(self.id)
			.unwrap_or_else(|| (*self.default).clone())
	}

	/// Writes `value` into `scope`.
	///
	/// Returns `true` and notifies watchers if the value changed.
	pub fn set(&self, scope: &Scope, value: T) -> bool {
		let unchanged = scope.inspect::<T, _>(self.id, |current| {
			current.unwrap_or(&*self.default) == &value
		});
		if unchanged {
			return false;
		}

		scope.write(self.id, value.clone());
		scope.notify(self.id, &value);
		true
	}

	/// Modifies the value in place. Returns `true` if it changed.
	pub fn update<F>(&self, scope: &Scope, f: F) -> bool
	where
		F: FnOnce(&mut T),
	{
		let mut value = self.get(scope);
		f(&mut value);
		self.set(scope, value)
	}

	/// Restores the default value. Returns `true` if it changed.
	pub fn reset(&self, scope: &Scope) -> bool {
		self.set(scope, (*self.default).clone())
	}

	/// Attaches a watcher called with every new value written to `scope`.
	pub fn watch<F>(&self, scope: &Scope, f: F) -> Subscription
	where
		F: Fn(&T) + 'static,
	{
		scope.subscribe::<T>(self.id, Rc::new(f))
	}

	/// Returns a read-only view of this store.
	pub fn readonly(&self) -> ReadStore<T> {
		ReadStore {
			store: self.clone(),
		}
	}
}

impl<T: 'static> Store<T> {
	/// Returns the node identifier of this store.
	pub fn id(&self) -> NodeId {
		self.id
	}

	/// Returns the diagnostic name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Returns the default value.
	pub fn default_value(&self) -> &T {
		&self.default
	}
}

impl<T: fmt::Debug + 'static> fmt::Debug for Store<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Store")
			.field("id", &self.id)
			.field("name", &self.name)
			.field("default", &self.default)
			.finish()
	}
}

/// Read and watch access to a [`Store`] without write access.
pub struct ReadStore<T: 'static> {
	store: Store<T>,
}

impl<T: 'static> Clone for ReadStore<T> {
	fn clone(&self) -> Self {
		Self {
			store: self.store.clone(),
		}
	}
}

impl<T: Clone + PartialEq + 'static> ReadStore<T> {
	/// Returns the value held in `scope`, or the default.
	pub fn get(&self, scope: &Scope) -> T {
		self.store.get(scope)
	}

	/// Attaches a watcher called with every new value written to `scope`.
	pub fn watch<F>(&self, scope: &Scope, f: F) -> Subscription
	where
		F: Fn(&T) + 'static,
	{
		self.store.watch(scope, f)
	}
}

impl<T: 'static> ReadStore<T> {
	/// Returns the node identifier of the underlying store.
	pub fn id(&self) -> NodeId {
		self.store.id()
	}

	/// Returns the diagnostic name of the underlying store.
	pub fn name(&self) -> &str {
		self.store.name()
	}
}

impl<T: fmt::Debug + 'static> fmt::Debug for ReadStore<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("ReadStore").field(&self.store).finish()
	}
}
