//! Grappelli Core - Scoped Reactive Primitives
//!
//! This crate provides the small observer/subject substrate the grappelli router is
//! built on. Every piece of mutable state lives inside an explicit [`Scope`], so that
//! two router instances (or two isolated copies of the same router used by parallel
//! tests) never observe each other's writes.
//!
//! ## Primitives
//!
//! - [`Store`]: a declared value cell with a default. Reads and writes go through a scope.
//!   Writing an equal value is a no-op and does not notify watchers.
//! - [`ReadStore`]: a read/watch-only view of a [`Store`].
//! - [`Event`]: a declared notification channel. Emitting calls every watcher in the scope.
//! - [`Slot`]: a scope-local value without notifications.
//! - [`Subscription`]: handle returned by `watch`, used to detach a watcher.
//!
//! ## Example
//!
//! ```
//! use grappelli_core::{Event, Scope, Store};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let count = Store::named("count", 0);
//! let reset = Event::<()>::named("reset");
//!
//! let scope = Scope::new();
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let sink = Rc::clone(&seen);
//! count.watch(&scope, move |value| sink.borrow_mut().push(*value));
//!
//! // Watchers run without internal borrows held, so they may write back.
//! let target = count.clone();
//! let weak = scope.downgrade();
//! reset.watch(&scope, move |_| {
//! 	if let Some(scope) = weak.upgrade() {
//! 		target.reset(&scope);
//! 	}
//! });
//!
//! count.set(&scope, 1);
//! count.set(&scope, 1);
//! count.set(&scope, 2);
//! reset.emit(&scope, ());
//!
//! assert_eq!(*seen.borrow(), vec![1, 2, 0]);
//! assert_eq!(count.get(&Scope::new()), 0);
//! ```

pub mod reactive;

pub use reactive::{Event, NodeId, ReadStore, Scope, Slot, Store, Subscription, WeakScope};
