//! Router, its configuration, and its builder.

use std::fmt;
use std::rc::Rc;

use grappelli_core::{NodeId, ReadStore, Scope, Slot, Store};
use grappelli_urls::{Params, Query, QueryCodec, UrlEncodedCodec};

use crate::base::Base;
use crate::engine::EngineHandle;
use crate::error::RouterError;
use crate::history::History;
use crate::location::Location;
use crate::registry::{RouteEntry, RouteRegistry};
use crate::route::{NavigateParams, Route};

/// Plain router configuration.
#[derive(Clone, Default)]
pub struct RouterConfig {
	/// Ordered `(route, pattern)` registrations.
	pub routes: Vec<(Route, String)>,
	/// Optional base: a path prefix such as `/root` or a hash root such as `#`.
	pub base: Option<String>,
	/// Query codec; defaults to [`UrlEncodedCodec`].
	pub codec: Option<Rc<dyn QueryCodec>>,
}

impl fmt::Debug for RouterConfig {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RouterConfig")
			.field(
				"routes",
				&self
					.routes
					.iter()
					.map(|(route, pattern)| (route.label(), pattern.as_str()))
					.collect::<Vec<_>>(),
			)
			.field("base", &self.base)
			.field("custom_codec", &self.codec.is_some())
			.finish()
	}
}

/// Fluent construction of a [`Router`].
#[derive(Debug, Default)]
pub struct RouterBuilder {
	config: RouterConfig,
}

impl RouterBuilder {
	/// Creates an empty builder.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers `route` under `pattern`. A route may be registered several times.
	pub fn route(mut self, route: &Route, pattern: impl Into<String>) -> Self {
		self.config.routes.push((route.clone(), pattern.into()));
		self
	}

	/// Sets the base.
	pub fn base(mut self, base: impl Into<String>) -> Self {
		self.config.base = Some(base.into());
		self
	}

	/// Sets a custom query codec.
	pub fn codec<C>(mut self, codec: C) -> Self
	where
		C: QueryCodec + 'static,
	{
		self.config.codec = Some(Rc::new(codec));
		self
	}

	/// Builds the router.
	///
	/// # Errors
	///
	/// See [`Router::new`].
	pub fn build(self) -> Result<Router, RouterError> {
		Router::new(self.config)
	}
}

pub(crate) struct RouterInner {
	pub(crate) id: NodeId,
	pub(crate) registry: RouteRegistry,
	pub(crate) base: Base,
	pub(crate) codec: Rc<dyn QueryCodec>,
	pub(crate) path: Store<String>,
	pub(crate) query: Store<Query>,
	pub(crate) active: Store<Vec<Route>>,
	pub(crate) engine: Slot<EngineHandle>,
}

/// Keeps a history and a set of route entities synchronized.
///
/// A router is configuration plus declarations: all mutable state (the matched
/// set, route stores, the bound history) lives in the [`Scope`] passed to each
/// call, so one router can drive any number of isolated scopes.
///
/// # Examples
///
/// ```
/// use std::rc::Rc;
/// use grappelli_core::Scope;
/// use grappelli_router::{History, MemoryHistory, Route, Router};
/// use grappelli_urls::params;
///
/// let post = Route::named("post");
/// let router = Router::builder().route(&post, "/posts/:postId").build().unwrap();
///
/// let scope = Scope::new();
/// let history = MemoryHistory::new();
/// router.set_history(&scope, Rc::new(history.clone())).unwrap();
///
/// post.open(&scope, params! { "postId" => 123 }).unwrap();
///
/// assert!(post.is_opened().get(&scope));
/// assert_eq!(post.params().get(&scope)["postId"], "123");
/// assert_eq!(history.location().pathname, "/posts/123");
/// ```
#[derive(Clone)]
pub struct Router {
	inner: Rc<RouterInner>,
}

impl Router {
	/// Returns a builder.
	pub fn builder() -> RouterBuilder {
		RouterBuilder::new()
	}

	/// Creates a router from a configuration.
	///
	/// # Errors
	///
	/// Returns [`RouterError::InvalidBase`] for an unusable base,
	/// [`RouterError::InvalidPattern`] if a pattern does not compile, and
	/// [`RouterError::HashPatternWithHashBase`] if a pattern has a `#` part while the
	/// base is a hash root.
	pub fn new(config: RouterConfig) -> Result<Self, RouterError> {
		let base = match config.base.as_deref() {
			Some(base) => Base::parse(base)?,
			None => Base::None,
		};

		let mut registry = RouteRegistry::new();
		for (route, pattern) in &config.routes {
			if base.is_hash() && pattern.contains('#') {
				return Err(RouterError::HashPatternWithHashBase {
					pattern: pattern.clone(),
					base: base.to_string(),
				});
			}
			registry.register(route, pattern)?;
		}

		let codec = config
			.codec
			.unwrap_or_else(|| Rc::new(UrlEncodedCodec) as Rc<dyn QueryCodec>);

		Ok(Self {
			inner: Rc::new(RouterInner {
				id: NodeId::new(),
				registry,
				base,
				codec,
				path: Store::named("router.$path", "/".to_string()),
				query: Store::named("router.$query", Query::new()),
				active: Store::named("router.activeRoutes", Vec::new()),
				engine: Slot::named("router.engine"),
			}),
		})
	}

	/// Returns the identifier of this router.
	pub fn id(&self) -> NodeId {
		self.inner.id
	}

	/// Binds `history` in `scope` and resolves its current location.
	///
	/// Rebinding detaches the previous history of the scope. Every registered route
	/// is bound to this router in `scope`, so [`Route::navigate`] goes through it.
	///
	/// # Errors
	///
	/// Returns any error of the initial resolution, such as a query codec failure.
	pub fn set_history(&self, scope: &Scope, history: Rc<dyn History>) -> Result<(), RouterError> {
		self.inner.attach(scope, history)
	}

	/// Returns the history bound in `scope`, if any.
	pub fn history(&self, scope: &Scope) -> Option<Rc<dyn History>> {
		self.inner.history(scope).ok()
	}

	/// Pathname of the last resolved location, relative to the base.
	pub fn path(&self) -> ReadStore<String> {
		self.inner.path.readonly()
	}

	/// Query of the last resolved location.
	pub fn query(&self) -> ReadStore<Query> {
		self.inner.query.readonly()
	}

	/// Routes opened by the last resolution, in registration order.
	pub fn active_routes(&self) -> ReadStore<Vec<Route>> {
		self.inner.active.readonly()
	}

	/// Pushes the current location with `query` in place of its query.
	///
	/// Writing the query that is already current does nothing.
	///
	/// # Errors
	///
	/// Returns [`RouterError::Unbound`] without a history in `scope`, or a codec error.
	pub fn set_query(&self, scope: &Scope, query: Query) -> Result<(), RouterError> {
		let history = self.inner.history(scope)?;
		if query == self.inner.query.get(scope) {
			return Ok(());
		}

		let search = self.inner.codec.encode(&query)?;
		let location = history.location();
		let href = match self.inner.base.strip(&location) {
			Some(routable) => self.inner.base.href(&routable.match_target(), &search),
			None => Location {
				search: if search.is_empty() {
					String::new()
				} else {
					format!("?{}", search)
				},
				..location
			}
			.href(),
		};
		self.inner.write(scope, &href, false)
	}

	/// Pushes `path` (relative to the base) with the current query.
	///
	/// Writing the path that is already current does nothing.
	///
	/// # Errors
	///
	/// Returns [`RouterError::Unbound`] without a history in `scope`,
	/// [`RouterError::NavigationFailed`] if `path` does not start with `/`, or a
	/// codec error.
	pub fn set_path(&self, scope: &Scope, path: &str) -> Result<(), RouterError> {
		self.inner.history(scope)?;
		if !path.starts_with('/') {
			return Err(RouterError::NavigationFailed(format!(
				"path '{}' must start with '/'",
				path
			)));
		}
		if path == self.inner.path.get(scope) {
			return Ok(());
		}

		let search = self.inner.codec.encode(&self.inner.query.get(scope))?;
		let href = self.inner.base.href(path, &search);
		self.inner.write(scope, &href, false)
	}

	/// Moves the history of `scope` one entry back.
	pub fn back(&self, scope: &Scope) -> Result<(), RouterError> {
		self.inner.history(scope)?.back()
	}

	/// Moves the history of `scope` one entry forward.
	pub fn forward(&self, scope: &Scope) -> Result<(), RouterError> {
		self.inner.history(scope)?.forward()
	}

	/// Navigates to `route`. Equivalent to [`Route::navigate`] on a route bound to
	/// this router.
	pub fn navigate(
		&self,
		scope: &Scope,
		route: &Route,
		params: NavigateParams,
	) -> Result<(), RouterError> {
		self.inner.navigate(scope, route, params)
	}

	/// Builds the href `navigate` would write, without writing it.
	///
	/// # Errors
	///
	/// Returns [`RouterError::RouteNotRegistered`], [`RouterError::MissingParameter`]
	/// or a codec error.
	pub fn reverse(&self, route: &Route, params: &Params, query: &Query) -> Result<String, RouterError> {
		self.inner.reverse(route, params, query)
	}

	/// Returns the distinct registered routes in order of first registration.
	pub fn routes(&self) -> Vec<Route> {
		self.inner.registry.routes()
	}

	/// Returns every registration in order.
	pub fn entries(&self) -> &[RouteEntry] {
		self.inner.registry.entries()
	}

	/// Returns the base.
	pub fn base(&self) -> &Base {
		&self.inner.base
	}
}

impl fmt::Debug for Router {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Router")
			.field("id", &self.inner.id)
			.field("routes_count", &self.inner.registry.len())
			.field("base", &self.inner.base)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::history::MemoryHistory;
	use grappelli_urls::{custom_codec, params, query, QueryError};
	use rstest::rstest;

	#[rstest]
	fn test_builder_registers_in_order() {
		let a = Route::named("a");
		let b = Route::named("b");
		let router = Router::builder()
			.route(&a, "/a")
			.route(&b, "/b/:id")
			.route(&a, "/alias")
			.build()
			.unwrap();

		assert_eq!(router.routes(), vec![a, b]);
		let sources: Vec<&str> = router.entries().iter().map(RouteEntry::source).collect();
		assert_eq!(sources, vec!["/a", "/b/:id", "/alias"]);
	}

	#[rstest]
	fn test_new_rejects_invalid_pattern() {
		let result = Router::builder().route(&Route::new(), "/a/:").build();
		assert!(matches!(result, Err(RouterError::InvalidPattern { .. })));
	}

	#[rstest]
	fn test_new_rejects_hash_pattern_under_hash_base() {
		let result = Router::builder()
			.route(&Route::new(), "/test/#/swap/:token")
			.base("#")
			.build();

		assert!(matches!(
			result,
			Err(RouterError::HashPatternWithHashBase { .. })
		));
	}

	#[rstest]
	fn test_new_rejects_invalid_base() {
		let result = Router::builder().base("root").build();
		assert_eq!(result.err(), Some(RouterError::InvalidBase("root".to_string())));
	}

	#[rstest]
	fn test_reverse() {
		let post = Route::named("post");
		let router = Router::builder()
			.route(&post, "/posts/:postId")
			.base("/root")
			.build()
			.unwrap();

		let href = router
			.reverse(&post, &params! { "postId" => "1" }, &query! { "tab" => "comments" })
			.unwrap();
		assert_eq!(href, "/root/posts/1?tab=comments");

		assert_eq!(
			router.reverse(&post, &Params::new(), &Query::new()),
			Err(RouterError::MissingParameter {
				route: "post".to_string(),
				name: "postId".to_string()
			})
		);
		assert_eq!(
			router.reverse(&Route::named("ghost"), &Params::new(), &Query::new()),
			Err(RouterError::RouteNotRegistered("ghost".to_string()))
		);
	}

	#[rstest]
	fn test_intents_without_history_fail() {
		let route = Route::new();
		let router = Router::builder().route(&route, "/").build().unwrap();
		let scope = Scope::new();

		assert_eq!(router.set_query(&scope, query! { "a" => "1" }), Err(RouterError::Unbound));
		assert_eq!(router.set_path(&scope, "/x"), Err(RouterError::Unbound));
		assert_eq!(router.back(&scope), Err(RouterError::Unbound));
		assert_eq!(router.forward(&scope), Err(RouterError::Unbound));
		assert_eq!(
			router.navigate(&scope, &route, NavigateParams::new()),
			Err(RouterError::Unbound)
		);
		assert!(router.history(&scope).is_none());
	}

	#[rstest]
	fn test_set_path_keeps_query() {
		let router = Router::builder().route(&Route::new(), "/a").build().unwrap();
		let scope = Scope::new();
		let history = MemoryHistory::with_entries(["/a?x=1"], 0);
		router.set_history(&scope, Rc::new(history.clone())).unwrap();

		router.set_path(&scope, "/b").unwrap();

		assert_eq!(history.location().href(), "/b?x=1");
		assert_eq!(router.path().get(&scope), "/b");
		assert_eq!(router.query().get(&scope), query! { "x" => "1" });
	}

	#[rstest]
	fn test_set_path_requires_leading_slash() {
		let router = Router::builder().build().unwrap();
		let scope = Scope::new();
		router.set_history(&scope, Rc::new(MemoryHistory::new())).unwrap();

		assert!(matches!(
			router.set_path(&scope, "relative"),
			Err(RouterError::NavigationFailed(_))
		));
	}

	#[rstest]
	fn test_equal_writes_do_not_push() {
		let router = Router::builder().build().unwrap();
		let scope = Scope::new();
		let history = MemoryHistory::with_entries(["/a?x=1"], 0);
		router.set_history(&scope, Rc::new(history.clone())).unwrap();

		router.set_query(&scope, query! { "x" => "1" }).unwrap();
		router.set_path(&scope, "/a").unwrap();

		assert_eq!(history.len(), 1);
	}

	#[rstest]
	fn test_codec_error_on_initial_resolution() {
		let router = Router::builder()
			.codec(custom_codec(
				|_: &str| -> Result<Query, QueryError> { Err(QueryError::Custom("read".into())) },
				|_: &Query| -> Result<String, QueryError> { Ok(String::new()) },
			))
			.build()
			.unwrap();
		let scope = Scope::new();

		let result = router.set_history(&scope, Rc::new(MemoryHistory::new()));

		assert_eq!(result, Err(RouterError::Query(QueryError::Custom("read".to_string()))));
	}

	#[rstest]
	fn test_debug_output() {
		let router = Router::builder().route(&Route::new(), "/").base("/root").build().unwrap();
		let debug = format!("{:?}", router);

		assert!(debug.contains("routes_count: 1"));
		assert!(debug.contains("Prefix"));
	}
}
