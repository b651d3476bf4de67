//! Route entities.
//!
//! A [`Route`] is an addressable unit of routing state. It does not know its own
//! patterns: a router registers it, writes its state on every resolution, and binds
//! its navigation intent in each scope where a history is attached.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use grappelli_core::{Event, NodeId, ReadStore, Scope, Slot, Store};
use grappelli_urls::{Params, Query};

use crate::error::RouterError;

/// Payload of the `opened` and `updated` events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteParams {
	/// Path parameters extracted by the matching pattern.
	pub params: Params,
	/// Query decoded from the location.
	pub query: Query,
}

/// Arguments of a navigation intent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigateParams {
	/// Path parameters for the route's pattern.
	pub params: Params,
	/// Query to encode into the target href.
	pub query: Query,
	/// Overwrite the current entry instead of appending one.
	pub replace: bool,
}

impl NavigateParams {
	/// Creates empty navigation arguments.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the path parameters.
	pub fn with_params(mut self, params: Params) -> Self {
		self.params = params;
		self
	}

	/// Sets the query.
	pub fn with_query(mut self, query: Query) -> Self {
		self.query = query;
		self
	}

	/// Sets whether the navigation replaces the current entry.
	pub fn with_replace(mut self, replace: bool) -> Self {
		self.replace = replace;
		self
	}
}

/// Navigation callback bound into a route by a router.
pub(crate) type Navigator = Rc<dyn Fn(&Scope, &Route, NavigateParams) -> Result<(), RouterError>>;

/// Which router a route is bound to in a scope, and how to reach it.
#[derive(Clone)]
pub(crate) struct RouteBinding {
	pub(crate) router: NodeId,
	pub(crate) navigate: Navigator,
}

struct RouteInner {
	id: NodeId,
	name: Option<String>,
	is_opened: Store<bool>,
	params: Store<Params>,
	query: Store<Query>,
	opened: Event<RouteParams>,
	updated: Event<RouteParams>,
	closed: Event<()>,
	binding: Slot<RouteBinding>,
}

/// A route entity.
///
/// Cloning yields another handle to the same entity; equality is identity.
#[derive(Clone)]
pub struct Route {
	inner: Rc<RouteInner>,
}

impl Route {
	/// Creates an anonymous route.
	pub fn new() -> Self {
		Self::build(None)
	}

	/// Creates a route with a name used in diagnostics.
	pub fn named(name: impl Into<String>) -> Self {
		Self::build(Some(name.into()))
	}

	fn build(name: Option<String>) -> Self {
		let label = name.clone().unwrap_or_else(|| "route".to_string());
		Self {
			inner: Rc::new(RouteInner {
				id: NodeId::new(),
				is_opened: Store::named(format!("{}.$isOpened", label), false),
				params: Store::named(format!("{}.$params", label), Params::new()),
				query: Store::named(format!("{}.$query", label), Query::new()),
				opened: Event::named(format!("{}.opened", label)),
				updated: Event::named(format!("{}.updated", label)),
				closed: Event::named(format!("{}.closed", label)),
				binding: Slot::named(format!("{}.binding", label)),
				name,
			}),
		}
	}

	/// Returns the identifier of this route.
	pub fn id(&self) -> NodeId {
		self.inner.id
	}

	/// Returns the route name, if any.
	pub fn name(&self) -> Option<&str> {
		self.inner.name.as_deref()
	}

	/// Returns the name, or the identifier for anonymous routes.
	pub fn label(&self) -> String {
		match &self.inner.name {
			Some(name) => name.clone(),
			None => self.inner.id.to_string(),
		}
	}

	/// Whether the route matched the most recent location.
	pub fn is_opened(&self) -> ReadStore<bool> {
		self.inner.is_opened.readonly()
	}

	/// Path parameters of the current match; empty when closed.
	pub fn params(&self) -> ReadStore<Params> {
		self.inner.params.readonly()
	}

	/// Query of the current match; empty when closed.
	pub fn query(&self) -> ReadStore<Query> {
		self.inner.query.readonly()
	}

	/// Emitted when the route goes from closed to open.
	pub fn opened(&self) -> &Event<RouteParams> {
		&self.inner.opened
	}

	/// Emitted when an open route matches again with different params or query.
	pub fn updated(&self) -> &Event<RouteParams> {
		&self.inner.updated
	}

	/// Emitted when an open route stops matching.
	pub fn closed(&self) -> &Event<()> {
		&self.inner.closed
	}

	/// Navigates to this route through the router bound in `scope`.
	///
	/// # Errors
	///
	/// Returns [`RouterError::Unbound`] if no router with a history is bound to this
	/// route in `scope`, [`RouterError::MissingParameter`] if `params` lacks a
	/// parameter of the route's pattern, and any error raised while the history
	/// delivers the new location.
	pub fn navigate(&self, scope: &Scope, params: NavigateParams) -> Result<(), RouterError> {
		let binding = self.inner.binding.get(scope).ok_or(RouterError::Unbound)?;
		(binding.navigate)(scope, self, params)
	}

	/// Navigates to this route with path parameters only.
	pub fn open(&self, scope: &Scope, params: Params) -> Result<(), RouterError> {
		self.navigate(scope, NavigateParams::new().with_params(params))
	}

	pub(crate) fn bind(&self, scope: &Scope, binding: RouteBinding) {
		if let Some(previous) = self.inner.binding.get(scope)
			&& previous.router != binding.router
		{
			tracing::warn!(
				route = %self.label(),
				previous = %previous.router,
				router = %binding.router,
				"route re-bound to another router in the same scope"
			);
		}
		self.inner.binding.set(scope, binding);
	}

	/// Writes the state of an open route. Emits nothing.
	pub(crate) fn write_open(&self, scope: &Scope, params: &Params, query: &Query) {
		self.inner.params.set(scope, params.clone());
		self.inner.query.set(scope, query.clone());
		self.inner.is_opened.set(scope, true);
	}

	/// Clears the state of a closed route. Emits nothing.
	pub(crate) fn write_closed(&self, scope: &Scope) {
		self.inner.is_opened.set(scope, false);
		self.inner.params.reset(scope);
		self.inner.query.reset(scope);
	}
}

impl Default for Route {
	fn default() -> Self {
		Self::new()
	}
}

impl PartialEq for Route {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.inner, &other.inner)
	}
}

impl Eq for Route {}

impl Hash for Route {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.inner.id.hash(state);
	}
}

impl fmt::Debug for Route {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Route")
			.field("id", &self.inner.id)
			.field("name", &self.inner.name)
			.finish()
	}
}
