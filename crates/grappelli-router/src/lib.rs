//! History-synchronized route entities.
//!
//! A [`Router`] is built from an ordered list of `(route, pattern)` registrations.
//! Once a [`History`] is bound in a [`Scope`](grappelli_core::Scope), every location
//! change is resolved against the registrations and each [`Route`] is kept in step:
//!
//! - `is_opened`, `params` and `query` stores reflect the latest match
//! - `opened`, `updated` and `closed` events fire once per transition
//! - [`Route::navigate`] turns params and query back into a history write
//!
//! ## Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use grappelli_core::Scope;
//! use grappelli_router::{History, MemoryHistory, Route, Router};
//! use grappelli_urls::query;
//!
//! let foo = Route::named("foo");
//! let post = Route::named("post");
//! let router = Router::builder()
//! 	.route(&foo, "/foo")
//! 	.route(&post, "/posts/:postId")
//! 	.build()
//! 	.unwrap();
//!
//! let scope = Scope::new();
//! let history = MemoryHistory::with_entries(["/posts/123"], 0);
//!
//! let closed = Rc::new(RefCell::new(0));
//! let sink = Rc::clone(&closed);
//! post.closed().watch(&scope, move |_| *sink.borrow_mut() += 1);
//!
//! router.set_history(&scope, Rc::new(history.clone())).unwrap();
//! assert_eq!(post.params().get(&scope)["postId"], "123");
//! assert!(!foo.is_opened().get(&scope));
//!
//! history.push("/foo?bar=baz", serde_json::Value::Null).unwrap();
//! assert_eq!(foo.query().get(&scope), query! { "bar" => "baz" });
//! assert!(post.query().get(&scope).is_empty());
//! assert_eq!(*closed.borrow(), 1);
//! ```

pub mod base;
mod engine;
pub mod error;
pub mod history;
pub mod location;
pub mod registry;
pub mod route;
pub mod router;

pub use base::{Base, Routable};
pub use error::RouterError;
pub use history::{History, Listener, MemoryHistory, Unlisten};
pub use location::{Action, Location};
pub use registry::{RouteEntry, RouteMatch, RouteRegistry};
pub use route::{NavigateParams, Route, RouteParams};
pub use router::{Router, RouterBuilder, RouterConfig};
