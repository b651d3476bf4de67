//! Location snapshots delivered by a history.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of history change that produced a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
	/// A new entry was appended.
	Push,
	/// The current entry was overwritten.
	Replace,
	/// The history moved to another existing entry (back, forward, go).
	Pop,
}

/// One entry of a history stack.
///
/// `search` is empty or starts with `?`; `hash` is empty or starts with `#`.
/// `key` identifies the entry. A history that tracks entries gives every write a
/// fresh non-empty key; an empty key means the history does not track entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
	/// Path part, always starting with `/`.
	pub pathname: String,
	/// Query part including its leading `?`, or empty.
	pub search: String,
	/// Fragment including its leading `#`, or empty.
	pub hash: String,
	/// Entry identifier, or empty when untracked.
	pub key: String,
	/// State attached to the entry by the writer.
	pub state: serde_json::Value,
}

impl Location {
	/// Parses an href of the form `/path?search#hash`.
	///
	/// The key is empty and the state is `null`.
	pub fn parse(href: &str) -> Self {
		let (rest, hash) = match href.find('#') {
			Some(index) => href.split_at(index),
			None => (href, ""),
		};
		let (pathname, search) = match rest.find('?') {
			Some(index) => rest.split_at(index),
			None => (rest, ""),
		};

		let pathname = if pathname.is_empty() {
			"/".to_string()
		} else if pathname.starts_with('/') {
			pathname.to_string()
		} else {
			format!("/{}", pathname)
		};

		Self {
			pathname,
			search: normalize(search),
			hash: normalize(hash),
			key: String::new(),
			state: serde_json::Value::Null,
		}
	}

	/// Resolves `to` against this location.
	///
	/// A target starting with `#` keeps the pathname and search; one starting with
	/// `?` keeps the pathname. Anything else is parsed as a full href.
	pub fn resolve(&self, to: &str) -> Self {
		let mut next = if let Some(hash) = to.strip_prefix('#') {
			let mut next = self.clone();
			next.hash = normalize(&format!("#{}", hash));
			next
		} else if to.starts_with('?') {
			let mut next = Location::parse(to);
			next.pathname = self.pathname.clone();
			next
		} else {
			Location::parse(to)
		};
		next.state = serde_json::Value::Null;
		next
	}

	/// Returns the full href: pathname, search and hash.
	pub fn href(&self) -> String {
		format!("{}{}{}", self.pathname, self.search, self.hash)
	}

	/// Returns the search text without its leading `?`.
	pub fn query_text(&self) -> &str {
		self.search.strip_prefix('?').unwrap_or(&self.search)
	}
}

impl Default for Location {
	fn default() -> Self {
		Self::parse("/")
	}
}

impl fmt::Display for Location {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.href())
	}
}

/// A lone `?` or `#` carries nothing.
fn normalize(part: &str) -> String {
	if part.len() == 1 {
		String::new()
	} else {
		part.to_string()
	}
}
