//! Slot - Scope-local value without notifications.

use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use super::node::NodeId;
use super::scope::Scope;

/// A declared scope-local value.
///
/// Unlike [`Store`](super::Store), a slot has no default, no equality check and no
/// watchers. It is meant for per-scope bookkeeping such as engine state handles.
pub struct Slot<T: 'static> {
	id: NodeId,
	name: Rc<str>,
	_value: PhantomData<fn() -> T>,
}

impl<T: 'static> Clone for Slot<T> {
	fn clone(&self) -> Self {
		Self {
			id: self.id,
			name: Rc::clone(&self.name),
			_value: PhantomData,
		}
	}
}

impl<T: Clone + 'static> Slot<T> {
	/// Declares a slot with a diagnostic name.
	pub fn named(name: impl Into<Rc<str>>) -> Self {
		Self {
			id: NodeId::new(),
			name: name.into(),
			_value: PhantomData,
		}
	}

	/// Returns the value held in `scope`.
	pub fn get(&self, scope: &Scope) -> Option<T> {
		scope.read::<T>(self.id)
	}

	/// Stores `value` in `scope`, replacing any previous value.
	pub fn set(&self, scope: &Scope, value: T) {
		scope.write(self.id, value);
	}

	/// Removes and returns the value held in `scope`.
	pub fn take(&self, scope: &Scope) -> Option<T> {
		scope.remove::<T>(self.id)
	}

	/// Returns the value held in `scope`, initializing it with `init` first if absent.
	pub fn get_or_insert_with<F>(&self, scope: &Scope, init: F) -> T
	where
		F: FnOnce() -> T,
	{
		if let Some(value) = self.get(scope) {
			return value;
		}
		let value = init();
		self.set(scope, value.clone());
		value
	}

	/// Returns the node identifier of this slot.
	pub fn id(&self) -> NodeId {
		self.id
	}

	/// Returns the diagnostic name.
	pub fn name(&self) -> &str {
		&self.name
	}
}

impl<T: 'static> fmt::Debug for Slot<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Slot")
			.field("id", &self.id)
			.field("name", &self.name)
			.finish()
	}
}
