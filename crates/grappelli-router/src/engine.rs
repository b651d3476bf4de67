//! Synchronization engine.
//!
//! Keeps one history and the route entities of one router in step, per scope.
//!
//! Every location a history delivers goes through [`RouterInner::deliver`]. A
//! delivery that arrives while another one is being resolved (a watcher navigating
//! from inside `opened`, say) is queued and resolved after the current resolution
//! finishes, so each resolution sees a stable previous matched set.
//!
//! Writes issued by the engine record a pending token (the location the write
//! targets) before calling the history. The next delivery consumes it and is
//! tagged self-issued when it lands on that location, external otherwise. The tag
//! only feeds diagnostics: both origins resolve the same way. Resolution itself is
//! only ever driven by the history's listener, never eagerly by the write.
//!
//! Repeated deliveries of the last resolved location key are skipped. Locations
//! without a key are always resolved.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use grappelli_core::Scope;
use grappelli_urls::{Params, PatternError, Query};
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::RouterError;
use crate::history::{History, Listener, Unlisten};
use crate::location::{Action, Location};
use crate::route::{NavigateParams, Navigator, Route, RouteBinding, RouteParams};
use crate::router::RouterInner;

/// Where a delivered location came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
	/// Produced by a write this engine issued.
	SelfIssued,
	/// Produced by anything else (user traversal, foreign writes).
	External,
}

struct PendingWrite {
	/// Href of the target location, resolved against the location current at write time.
	target: String,
	action: Action,
}

impl PendingWrite {
	fn origin_of(&self, location: &Location) -> Origin {
		let delivered = location.href();
		if delivered == self.target {
			trace!(href = %delivered, action = ?self.action, "delivery of self-issued write");
			Origin::SelfIssued
		} else {
			debug!(
				expected = %self.target,
				delivered = %delivered,
				"history delivered another location than the one written"
			);
			Origin::External
		}
	}
}

struct Delivery {
	location: Location,
	action: Action,
	origin: Origin,
}

enum Transition {
	Opened(Route, RouteParams),
	Updated(Route, RouteParams),
}

/// Engine state of one router in one scope.
#[derive(Default)]
pub(crate) struct EngineState {
	history: Option<Rc<dyn History>>,
	unlisten: Option<Unlisten>,
	matched: Vec<Route>,
	last_key: Option<String>,
	pending: Option<PendingWrite>,
	resolving: bool,
	queue: VecDeque<Delivery>,
}

pub(crate) type EngineHandle = Rc<RefCell<EngineState>>;

impl RouterInner {
	fn engine(&self, scope: &Scope) -> EngineHandle {
		self.engine.get_or_insert_with(scope, EngineHandle::default)
	}

	/// Returns the history bound in `scope`.
	pub(crate) fn history(&self, scope: &Scope) -> Result<Rc<dyn History>, RouterError> {
		let engine = self.engine.get(scope).ok_or(RouterError::Unbound)?;
		let history = engine.borrow().history.clone();
		history.ok_or(RouterError::Unbound)
	}

	/// Binds `history` in `scope`, replacing any previous binding, and resolves its
	/// current location.
	pub(crate) fn attach(
		self: &Rc<Self>,
		scope: &Scope,
		history: Rc<dyn History>,
	) -> Result<(), RouterError> {
		let engine = self.engine(scope);
		let previous = {
			let mut state = engine.borrow_mut();
			state.history = Some(Rc::clone(&history));
			state.last_key = None;
			state.pending = None;
			state.unlisten.take()
		};
		if let Some(unlisten) = previous {
			unlisten.unlisten();
		}

		let router = Rc::downgrade(self);
		let weak_scope = scope.downgrade();
		let listener: Listener = Rc::new(
			move |location: &Location, action: Action| -> Result<(), RouterError> {
				match (router.upgrade(), weak_scope.upgrade()) {
					(Some(router), Some(scope)) => router.deliver(&scope, location, action),
					_ => Ok(()),
				}
			},
		);
		let unlisten = history.listen(listener);
		engine.borrow_mut().unlisten = Some(unlisten);

		let binding = RouteBinding {
			router: self.id,
			navigate: self.navigator(),
		};
		for route in self.registry.routes() {
			route.bind(scope, binding.clone());
		}

		debug!(router = %self.id, scope = %scope.id(), "history bound");
		self.deliver(scope, &history.location(), Action::Pop)
	}

	fn navigator(self: &Rc<Self>) -> Navigator {
		let router = Rc::downgrade(self);
		Rc::new(
			move |scope: &Scope, route: &Route, params: NavigateParams| -> Result<(), RouterError> {
				let router = router.upgrade().ok_or(RouterError::Unbound)?;
				router.navigate(scope, route, params)
			},
		)
	}

	/// Entry point for every location delivered by the bound history.
	pub(crate) fn deliver(
		&self,
		scope: &Scope,
		location: &Location,
		action: Action,
	) -> Result<(), RouterError> {
		let engine = self.engine(scope);
		{
			let mut state = engine.borrow_mut();
			let origin = match state.pending.take() {
				Some(write) => write.origin_of(location),
				None => Origin::External,
			};
			state.queue.push_back(Delivery {
				location: location.clone(),
				action,
				origin,
			});
			if state.resolving {
				trace!(href = %location.href(), "resolution in progress, location queued");
				return Ok(());
			}
			state.resolving = true;
		}

		let mut result = Ok(());
		loop {
			let next = engine.borrow_mut().queue.pop_front();
			let Some(delivery) = next else {
				break;
			};
			if let Err(err) = self.resolve(scope, &engine, &delivery) {
				engine.borrow_mut().queue.clear();
				result = Err(err);
				break;
			}
		}
		engine.borrow_mut().resolving = false;
		result
	}

	fn resolve(
		&self,
		scope: &Scope,
		engine: &EngineHandle,
		delivery: &Delivery,
	) -> Result<(), RouterError> {
		let location = &delivery.location;
		if !location.key.is_empty()
			&& engine.borrow().last_key.as_deref() == Some(location.key.as_str())
		{
			trace!(key = %location.key, "location already applied, skipping");
			return Ok(());
		}

		// A base mismatch matches nothing but still reports the raw location.
		let routable = self.base.strip(location);
		let (pathname, search) = match &routable {
			Some(routable) => (routable.pathname.clone(), routable.search.clone()),
			None => (location.pathname.clone(), location.search.clone()),
		};
		let query = self.codec.decode(search.strip_prefix('?').unwrap_or(&search))?;
		let matches = routable
			.map(|routable| self.registry.resolve(&routable.match_target()))
			.unwrap_or_default();

		let previous = {
			let mut state = engine.borrow_mut();
			state.last_key = Some(location.key.clone()).filter(|key| !key.is_empty());
			let current = matches.iter().map(|m| m.route.clone()).collect();
			std::mem::replace(&mut state.matched, current)
		};

		let closed: Vec<Route> = previous
			.iter()
			.filter(|route| !matches.iter().any(|m| &m.route == *route))
			.cloned()
			.collect();

		for route in &closed {
			route.write_closed(scope);
		}

		let mut transitions = Vec::with_capacity(matches.len());
		for m in &matches {
			let payload = RouteParams {
				params: m.params.clone(),
				query: query.clone(),
			};
			if previous.contains(&m.route) {
				let changed = m.route.params().get(scope) != payload.params
					|| m.route.query().get(scope) != payload.query;
				m.route.write_open(scope, &payload.params, &payload.query);
				if changed {
					transitions.push(Transition::Updated(m.route.clone(), payload));
				}
			} else {
				m.route.write_open(scope, &payload.params, &payload.query);
				transitions.push(Transition::Opened(m.route.clone(), payload));
			}
		}

		let opened = transitions
			.iter()
			.filter(|t| matches!(t, Transition::Opened(..)))
			.count();
		debug!(
			path = %pathname,
			origin = ?delivery.origin,
			action = ?delivery.action,
			opened,
			updated = transitions.len() - opened,
			closed = closed.len(),
			"location resolved"
		);

		for route in &closed {
			route.closed().emit(scope, ());
		}
		for transition in transitions {
			match transition {
				Transition::Opened(route, payload) => route.opened().emit(scope, payload),
				Transition::Updated(route, payload) => route.updated().emit(scope, payload),
			}
		}

		self.path.set(scope, pathname);
		self.query.set(scope, query);
		self.active
			.set(scope, matches.into_iter().map(|m| m.route).collect());
		Ok(())
	}

	/// Builds the href of `route` without navigating.
	pub(crate) fn reverse(
		&self,
		route: &Route,
		params: &Params,
		query: &Query,
	) -> Result<String, RouterError> {
		let entry = self
			.registry
			.first_entry(route)
			.ok_or_else(|| RouterError::RouteNotRegistered(route.label()))?;
		let path = entry.pattern().build(params).map_err(|err| match err {
			PatternError::MissingParameter { name } => RouterError::MissingParameter {
				route: route.label(),
				name,
			},
			source => RouterError::InvalidPattern {
				pattern: entry.source().to_string(),
				source,
			},
		})?;
		let search = self.codec.encode(query)?;
		Ok(self.base.href(&path, &search))
	}

	pub(crate) fn navigate(
		&self,
		scope: &Scope,
		route: &Route,
		params: NavigateParams,
	) -> Result<(), RouterError> {
		let href = self.reverse(route, &params.params, &params.query)?;
		self.write(scope, &href, params.replace)
	}

	/// Issues a push or replace on the history bound in `scope`.
	pub(crate) fn write(&self, scope: &Scope, href: &str, replace: bool) -> Result<(), RouterError> {
		let engine = self.engine(scope);
		let history = engine.borrow().history.clone().ok_or(RouterError::Unbound)?;
		let action = if replace {
			Action::Replace
		} else {
			Action::Push
		};

		let target = history.location().resolve(href).href();
		engine.borrow_mut().pending = Some(PendingWrite { target, action });
		trace!(%href, ?action, "issuing history write");

		let result = match action {
			Action::Replace => history.replace(href, Value::Null),
			_ => history.push(href, Value::Null),
		};
		if result.is_err() {
			engine.borrow_mut().pending = None;
		}
		result
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("/posts/1?tab=a", "/posts/1?tab=a", Origin::SelfIssued)]
	#[case("/posts/1?tab=a", "/posts/2", Origin::External)]
	#[case("/app#/swap/ETH", "/app#/swap/ETH", Origin::SelfIssued)]
	fn test_pending_write_classifies_delivery(
		#[case] target: &str,
		#[case] delivered: &str,
		#[case] expected: Origin,
	) {
		let write = PendingWrite {
			target: target.to_string(),
			action: Action::Push,
		};

		assert_eq!(write.origin_of(&Location::parse(delivered)), expected);
	}

	#[rstest]
	fn test_pending_target_resolves_relative_writes() {
		let current = Location::parse("/app?x=1#/old");
		let write = PendingWrite {
			target: current.resolve("#/new?y=2").href(),
			action: Action::Replace,
		};

		assert_eq!(
			write.origin_of(&Location::parse("/app?x=1#/new?y=2")),
			Origin::SelfIssued
		);
	}
}
