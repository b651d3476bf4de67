//! Error types for router construction and navigation.

use grappelli_urls::{PatternError, QueryError};

/// Error type for router operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouterError {
	/// A route pattern failed to compile.
	#[error("Invalid route pattern '{pattern}': {source}")]
	InvalidPattern {
		/// The pattern as configured.
		pattern: String,
		/// Underlying compilation error.
		source: PatternError,
	},
	/// The configured base is not a usable prefix.
	#[error("Invalid base '{0}'")]
	InvalidBase(String),
	/// A pattern with a `#` part was registered under a hash-root base.
	#[error("Pattern '{pattern}' has a '#' part but base '{base}' already routes through the hash")]
	HashPatternWithHashBase {
		/// The offending pattern.
		pattern: String,
		/// The configured base.
		base: String,
	},
	/// Building a path for navigation lacked a required parameter.
	#[error("Missing parameter '{name}' for route {route}")]
	MissingParameter {
		/// Label of the target route.
		route: String,
		/// Name of the missing parameter.
		name: String,
	},
	/// The route is not registered with this router.
	#[error("Route {0} is not registered with this router")]
	RouteNotRegistered(String),
	/// No history is bound in the scope used for the operation.
	#[error("No history is bound to the router in this scope")]
	Unbound,
	/// The query codec failed.
	#[error(transparent)]
	Query(#[from] QueryError),
	/// The history implementation rejected a write.
	#[error("Navigation failed: {0}")]
	NavigationFailed(String),
}
