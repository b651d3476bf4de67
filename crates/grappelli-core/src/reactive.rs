//! Scoped reactive system.
//!
//! Declarations ([`Store`], [`Event`], [`Slot`]) are plain identifiers plus metadata and
//! hold no state themselves. State and watchers are kept per [`Scope`], keyed by the
//! declaration's [`NodeId`].

mod event;
mod node;
mod scope;
mod slot;
mod store;

pub use event::Event;
pub use node::NodeId;
pub use scope::{Scope, Subscription, WeakScope};
pub use slot::Slot;
pub use store::{ReadStore, Store};
