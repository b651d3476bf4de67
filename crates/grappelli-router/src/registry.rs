//! Route Registry
//!
//! The ordered list of `(route, pattern)` registrations a router is built from.
//! Order only matters for one route registered under several patterns: the
//! earliest registered pattern that matches is the one whose params are used.

use grappelli_urls::{Params, PathPattern};

use crate::error::RouterError;
use crate::route::Route;

/// One immutable registration.
#[derive(Debug, Clone)]
pub struct RouteEntry {
	route: Route,
	pattern: PathPattern,
}

impl RouteEntry {
	/// Returns the registered route.
	pub fn route(&self) -> &Route {
		&self.route
	}

	/// Returns the compiled pattern.
	pub fn pattern(&self) -> &PathPattern {
		&self.pattern
	}

	/// Returns the pattern as configured.
	pub fn source(&self) -> &str {
		self.pattern.pattern()
	}
}

/// A route with the params of its first matching pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
	/// The matched route.
	pub route: Route,
	/// Params extracted by the first matching pattern of the route.
	pub params: Params,
}

/// Ordered registrations.
#[derive(Debug, Clone, Default)]
pub struct RouteRegistry {
	entries: Vec<RouteEntry>,
}

impl RouteRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Compiles `pattern` and appends a registration for `route`.
	///
	/// # Errors
	///
	/// Returns [`RouterError::InvalidPattern`] if the pattern does not compile.
	pub fn register(&mut self, route: &Route, pattern: &str) -> Result<(), RouterError> {
		let compiled = PathPattern::new(pattern).map_err(|source| RouterError::InvalidPattern {
			pattern: pattern.to_string(),
			source,
		})?;
		self.entries.push(RouteEntry {
			route: route.clone(),
			pattern: compiled,
		});
		Ok(())
	}

	/// Returns every registration in order.
	pub fn entries(&self) -> &[RouteEntry] {
		&self.entries
	}

	/// Returns the distinct routes in order of first registration.
	pub fn routes(&self) -> Vec<Route> {
		let mut routes: Vec<Route> = Vec::new();
		for entry in &self.entries {
			if !routes.contains(&entry.route) {
				routes.push(entry.route.clone());
			}
		}
		routes
	}

	/// Returns `true` if `route` has at least one registration.
	pub fn contains(&self, route: &Route) -> bool {
		self.entries.iter().any(|entry| &entry.route == route)
	}

	/// Returns the first registration of `route`, used to build its hrefs.
	pub fn first_entry(&self, route: &Route) -> Option<&RouteEntry> {
		self.entries.iter().find(|entry| &entry.route == route)
	}

	/// Matches `target` (routable pathname followed by hash) against every
	/// registration, keeping the first match per distinct route.
	pub fn resolve(&self, target: &str) -> Vec<RouteMatch> {
		let mut matches: Vec<RouteMatch> = Vec::new();
		for entry in &self.entries {
			if matches.iter().any(|m| m.route == entry.route) {
				continue;
			}
			if let Some(params) = entry.pattern.matches(target) {
				matches.push(RouteMatch {
					route: entry.route.clone(),
					params,
				});
			}
		}
		matches
	}

	/// Returns the number of registrations.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Returns `true` if nothing is registered.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use grappelli_urls::{PatternError, params};
	use rstest::{fixture, rstest};

	struct Routes {
		foo: Route,
		post: Route,
		twin: Route,
		overlap: Route,
	}

	#[fixture]
	fn routes() -> Routes {
		Routes {
			foo: Route::named("foo"),
			post: Route::named("post"),
			twin: Route::named("twin"),
			overlap: Route::named("overlap"),
		}
	}

	#[fixture]
	fn registry(routes: Routes) -> (RouteRegistry, Routes) {
		let mut registry = RouteRegistry::new();
		registry.register(&routes.foo, "/foo").unwrap();
		registry.register(&routes.post, "/posts/:postId").unwrap();
		registry.register(&routes.twin, "/posts/:postId").unwrap();
		registry.register(&routes.overlap, "/test/:foo").unwrap();
		registry.register(&routes.overlap, "/test/:foo/:bar").unwrap();
		registry.register(&routes.overlap, "/test/:bar").unwrap();
		(registry, routes)
	}

	#[rstest]
	fn test_routes_are_distinct_in_order(registry: (RouteRegistry, Routes)) {
		let (registry, routes) = registry;

		assert_eq!(registry.len(), 6);
		assert_eq!(
			registry.routes(),
			vec![routes.foo, routes.post, routes.twin, routes.overlap]
		);
	}

	#[rstest]
	fn test_identical_patterns_both_match(registry: (RouteRegistry, Routes)) {
		let (registry, routes) = registry;
		let matches = registry.resolve("/posts/123");

		assert_eq!(matches.len(), 2);
		assert_eq!(matches[0].route, routes.post);
		assert_eq!(matches[1].route, routes.twin);
		assert_eq!(matches[1].params, params! { "postId" => "123" });
	}

	#[rstest]
	fn test_earliest_registration_wins(registry: (RouteRegistry, Routes)) {
		let (registry, routes) = registry;
		let matches = registry.resolve("/test/x");

		assert_eq!(matches.len(), 1);
		assert_eq!(matches[0].route, routes.overlap);
		assert_eq!(matches[0].params, params! { "foo" => "x" });

		let matches = registry.resolve("/test/x/y");
		assert_eq!(matches[0].params, params! { "foo" => "x", "bar" => "y" });
	}

	#[rstest]
	fn test_first_entry(registry: (RouteRegistry, Routes)) {
		let (registry, routes) = registry;

		assert_eq!(
			registry.first_entry(&routes.overlap).map(RouteEntry::source),
			Some("/test/:foo")
		);
		assert!(registry.first_entry(&Route::new()).is_none());
		assert!(registry.contains(&routes.foo));
	}

	#[rstest]
	fn test_no_match(registry: (RouteRegistry, Routes)) {
		let (registry, _) = registry;
		assert!(registry.resolve("/nothing").is_empty());
	}

	#[rstest]
	fn test_invalid_pattern_is_reported() {
		let mut registry = RouteRegistry::new();
		let result = registry.register(&Route::new(), "/a/:id/:id");

		assert!(matches!(
			result,
			Err(RouterError::InvalidPattern {
				source: PatternError::DuplicateParameter { .. },
				..
			})
		));
		assert!(registry.is_empty());
	}
}
