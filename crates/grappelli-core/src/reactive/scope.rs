//! Scope - Isolated Execution Context
//!
//! A [`Scope`] owns the values and watcher lists of every declaration used with it.
//! Cloning a scope clones the handle, not the state. Creating a new scope gives a
//! completely independent copy of the world: all stores read their defaults and no
//! watchers are attached.
//!
//! ## Re-entrancy
//!
//! Internal `RefCell` borrows are never held while user callbacks run. A watcher may
//! therefore read stores, write stores and emit events on the same scope.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use super::node::NodeId;

pub(crate) type Callback<T> = Rc<dyn Fn(&T)>;

struct Watcher {
	id: u64,
	/// Holds a `Callback<T>` for the `T` of the watched node.
	callback: Box<dyn Any>,
}

#[derive(Default)]
struct ScopeInner {
	values: RefCell<HashMap<NodeId, Box<dyn Any>>>,
	watchers: RefCell<HashMap<NodeId, Vec<Watcher>>>,
	next_watcher: Cell<u64>,
}

/// An isolated execution context holding reactive state.
#[derive(Clone)]
pub struct Scope {
	id: NodeId,
	inner: Rc<ScopeInner>,
}

impl Scope {
	/// Creates an empty scope.
	pub fn new() -> Self {
		Self {
			id: NodeId::new(),
			inner: Rc::new(ScopeInner::default()),
		}
	}

	/// Returns the identifier of this scope.
	pub fn id(&self) -> NodeId {
		self.id
	}

	/// Creates a weak handle that does not keep the scope alive.
	pub fn downgrade(&self) -> WeakScope {
		WeakScope {
			id: self.id,
			inner: Rc::downgrade(&self.inner),
		}
	}

	/// Returns `true` if both handles point to the same scope.
	pub fn ptr_eq(&self, other: &Scope) -> bool {
		Rc::ptr_eq(&self.inner, &other.inner)
	}

	/// Returns `true` if `node` holds an explicitly written value in this scope.
	pub fn contains(&self, node: NodeId) -> bool {
		self.inner.values.borrow().contains_key(&node)
	}

	/// Returns the number of watchers attached to `node` in this scope.
	pub fn watcher_count(&self, node: NodeId) -> usize {
		self.inner
			.watchers
			.borrow()
			.get(&node)
			.map(Vec::len)
			.unwrap_or(0)
	}

	pub(crate) fn read<T: Clone + 'static>(&self, node: NodeId) -> Option<T> {
		self.inner
			.values
			.borrow()
			.get(&node)
			.and_then(|value| value.downcast_ref::<T>())
			.cloned()
	}

	/// Runs `f` against the stored value. `f` must not write to this scope.
	pub(crate) fn inspect<T: 'static, R>(&self, node: NodeId, f: impl FnOnce(Option<&T>) -> R) -> R {
		let values = self.inner.values.borrow();
		f(values.get(&node).and_then(|value| value.downcast_ref::<T>()))
	}

	pub(crate) fn write<T: 'static>(&self, node: NodeId, value: T) {
		let previous = self.inner.values.borrow_mut().insert(node, Box::new(value));
		drop(previous);
	}

	pub(crate) fn remove<T: 'static>(&self, node: NodeId) -> Option<T> {
		let removed = self.inner.values.borrow_mut().remove(&node)?;
		removed.downcast::<T>().ok().map(|boxed| *boxed)
	}

	pub(crate) fn subscribe<T: 'static>(&self, node: NodeId, callback: Callback<T>) -> Subscription {
		let id = self.inner.next_watcher.get();
		self.inner.next_watcher.set(id + 1);
		self.inner
			.watchers
			.borrow_mut()
			.entry(node)
			.or_default()
			.push(Watcher {
				id,
				callback: Box::new(callback),
			});

		Subscription {
			scope: Rc::downgrade(&self.inner),
			node,
			watcher: id,
		}
	}

	/// Calls every watcher of `node` with `value`.
	///
	/// The watcher list is snapshotted first, so watchers attached or detached by a
	/// callback take effect from the next notification on.
	pub(crate) fn notify<T: 'static>(&self, node: NodeId, value: &T) {
		let callbacks: Vec<Callback<T>> = self
			.inner
			.watchers
			.borrow()
			.get(&node)
			.map(|list| {
				list.iter()
					.filter_map(|watcher| watcher.callback.downcast_ref::<Callback<T>>())
					.cloned()
					.collect()
			})
			.unwrap_or_default();

		for callback in callbacks {
			callback(value);
		}
	}
}

impl Default for Scope {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for Scope {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Scope")
			.field("id", &self.id)
			.field("values", &self.inner.values.borrow().len())
			.field("watched_nodes", &self.inner.watchers.borrow().len())
			.finish()
	}
}

/// A non-owning handle to a [`Scope`].
#[derive(Clone)]
pub struct WeakScope {
	id: NodeId,
	inner: Weak<ScopeInner>,
}

impl WeakScope {
	/// Returns the scope if it is still alive.
	pub fn upgrade(&self) -> Option<Scope> {
		self.inner.upgrade().map(|inner| Scope { id: self.id, inner })
	}

	/// Returns the identifier of the referenced scope.
	pub fn id(&self) -> NodeId {
		self.id
	}
}

impl fmt::Debug for WeakScope {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("WeakScope")
			.field("id", &self.id)
			.field("alive", &(self.inner.strong_count() > 0))
			.finish()
	}
}

/// Handle to a watcher attached with `watch`.
///
/// Dropping the handle leaves the watcher attached; call [`Subscription::unsubscribe`]
/// to detach it.
pub struct Subscription {
	scope: Weak<ScopeInner>,
	node: NodeId,
	watcher: u64,
}

impl Subscription {
	/// Detaches the watcher. Does nothing if the scope is gone.
	pub fn unsubscribe(self) {
		let Some(inner) = self.scope.upgrade() else {
			return;
		};

		let removed = {
			let mut watchers = inner.watchers.borrow_mut();
			let Some(list) = watchers.get_mut(&self.node) else {
				return;
			};
			let position = list.iter().position(|w| w.id == self.watcher);
			let removed = position.map(|index| list.remove(index));
			if list.is_empty() {
				watchers.remove(&self.node);
			}
			removed
		};
		// The callback may own values whose destructors touch the scope.
		drop(removed);
	}

	/// Returns the node this subscription watches.
	pub fn node(&self) -> NodeId {
		self.node
	}
}

impl fmt::Debug for Subscription {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Subscription")
			.field("node", &self.node)
			.field("watcher", &self.watcher)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_scope_read_write() {
		let scope = Scope::new();
		let node = NodeId::new();

		assert_eq!(scope.read::<i32>(node), None);
		scope.write(node, 7_i32);
		assert_eq!(scope.read::<i32>(node), Some(7));
		assert!(scope.contains(node));
	}

	#[rstest]
	fn test_scope_read_wrong_type_is_none() {
		let scope = Scope::new();
		let node = NodeId::new();

		scope.write(node, "text".to_string());
		assert_eq!(scope.read::<i32>(node), None);
	}

	#[rstest]
	fn test_scopes_are_isolated() {
		let first = Scope::new();
		let second = Scope::new();
		let node = NodeId::new();

		first.write(node, 1_u8);

		assert_eq!(first.read::<u8>(node), Some(1));
		assert_eq!(second.read::<u8>(node), None);
		assert!(!first.ptr_eq(&second));
		assert!(first.ptr_eq(&first.clone()));
	}

	#[rstest]
	fn test_notify_and_unsubscribe() {
		let scope = Scope::new();
		let node = NodeId::new();
		let hits = Rc::new(Cell::new(0));

		let counter = Rc::clone(&hits);
		let subscription = scope.subscribe::<u32>(
			node,
			Rc::new(move |value: &u32| counter.set(counter.get() + *value)),
		);
		assert_eq!(scope.watcher_count(node), 1);

		scope.notify(node, &2_u32);
		assert_eq!(hits.get(), 2);

		subscription.unsubscribe();
		assert_eq!(scope.watcher_count(node), 0);

		scope.notify(node, &5_u32);
		assert_eq!(hits.get(), 2);
	}

	#[rstest]
	fn test_watcher_may_reenter_scope() {
		let scope = Scope::new();
		let source = NodeId::new();
		let target = NodeId::new();

		let weak = scope.downgrade();
		scope.subscribe::<i32>(
			source,
			Rc::new(move |value: &i32| {
				if let Some(scope) = weak.upgrade() {
					scope.write(target, *value * 10);
				}
			}),
		);

		scope.notify(source, &4);
		assert_eq!(scope.read::<i32>(target), Some(40));
	}

	#[rstest]
	fn test_weak_scope_upgrade_after_drop() {
		let scope = Scope::new();
		let weak = scope.downgrade();
		assert!(weak.upgrade().is_some());

		drop(scope);
		assert!(weak.upgrade().is_none());
	}

	#[rstest]
	fn test_remove_returns_value() {
		let scope = Scope::new();
		let node = NodeId::new();
		scope.write(node, vec![1, 2, 3]);

		assert_eq!(scope.remove::<Vec<i32>>(node), Some(vec![1, 2, 3]));
		assert!(!scope.contains(node));
	}
}
