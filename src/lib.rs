//! # Grappelli
//!
//! A client-side router that keeps a navigation history and a set of route entities
//! synchronized in both directions.
//!
//! Each [`Route`] exposes reactive state (is it open, with which params, with which
//! query) and lifecycle events (`opened`, `updated`, `closed`). A [`Router`] matches
//! every location the bound [`History`] delivers against its registrations and
//! writes that state; going the other way, route navigation and router-level query
//! writes become history pushes or replaces.
//!
//! ## Crates
//!
//! - [`reactive`] (`grappelli-core`): scoped stores, events and slots
//! - [`urls`] (`grappelli-urls`): path patterns and query codecs
//! - [`router`] (`grappelli-router`): history adapter, routes and the synchronization engine
//!
//! ## Quick Example
//!
//! ```
//! use std::rc::Rc;
//! use grappelli::prelude::*;
//!
//! let home = Route::named("home");
//! let post = Route::named("post");
//! let router = Router::builder()
//! 	.route(&home, "/")
//! 	.route(&post, "/posts/:postId")
//! 	.base("/blog")
//! 	.build()
//! 	.unwrap();
//!
//! let scope = Scope::new();
//! let history = MemoryHistory::with_entries(["/blog/"], 0);
//! router.set_history(&scope, Rc::new(history.clone())).unwrap();
//! assert!(home.is_opened().get(&scope));
//!
//! post.navigate(
//! 	&scope,
//! 	NavigateParams::new()
//! 		.with_params(params! { "postId" => 1 })
//! 		.with_query(query! { "tab" => "comments" }),
//! )
//! .unwrap();
//!
//! assert_eq!(history.location().href(), "/blog/posts/1?tab=comments");
//! assert!(!home.is_opened().get(&scope));
//! assert_eq!(post.query().get(&scope), query! { "tab" => "comments" });
//! ```

pub use grappelli_core as reactive;
pub use grappelli_router as router;
pub use grappelli_urls as urls;

pub use grappelli_core::{Event, ReadStore, Scope, Store, Subscription};
pub use grappelli_router::{
	Action, Base, History, Location, MemoryHistory, NavigateParams, Route, RouteParams, Router,
	RouterBuilder, RouterConfig, RouterError,
};
pub use grappelli_urls::{
	Params, PathPattern, Query, QueryCodec, QueryError, QueryValue, UrlEncodedCodec,
	custom_codec, params, query,
};

/// Commonly used types and macros.
pub mod prelude {
	pub use crate::{
		History, MemoryHistory, NavigateParams, Params, Query, QueryCodec, QueryValue, Route,
		RouteParams, Router, RouterError, Scope, params, query,
	};
}
