//! Router base: the part of a location that must apply before any pattern is tried.

use std::fmt;

use crate::error::RouterError;
use crate::location::Location;

/// Location prefix shared by every route of a router.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Base {
	/// No base; patterns see the whole pathname.
	#[default]
	None,
	/// Path prefix such as `/root`, stripped at a segment boundary.
	Prefix(String),
	/// Hash root such as `#` or `/app/#`: the routable path and query live in the
	/// fragment. The pathname before `#` is only used when building hrefs.
	Hash {
		/// Pathname written before `#` when building hrefs. Empty keeps the
		/// current pathname.
		prefix: String,
	},
}

/// The part of a location that patterns are matched against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routable {
	/// Pathname relative to the base, starting with `/`.
	pub pathname: String,
	/// Search including `?`, or empty.
	pub search: String,
	/// Fragment including `#`, or empty. Always empty under a hash base.
	pub hash: String,
}

impl Routable {
	/// Returns the text patterns are matched against: pathname followed by hash.
	pub fn match_target(&self) -> String {
		format!("{}{}", self.pathname, self.hash)
	}
}

impl Base {
	/// Parses a configured base.
	///
	/// `""` and `"/"` mean no base. A value ending in `#` is a hash root. Anything
	/// else is a path prefix and must start with `/`; a trailing `/` is ignored.
	pub fn parse(base: &str) -> Result<Self, RouterError> {
		let invalid = || RouterError::InvalidBase(base.to_string());

		if base.is_empty() || base == "/" {
			return Ok(Self::None);
		}
		if base.contains('?') {
			return Err(invalid());
		}

		if let Some(prefix) = base.strip_suffix('#') {
			if prefix.contains('#') || !(prefix.is_empty() || prefix.starts_with('/')) {
				return Err(invalid());
			}
			return Ok(Self::Hash {
				prefix: prefix.to_string(),
			});
		}

		if !base.starts_with('/') || base.contains('#') {
			return Err(invalid());
		}
		Ok(Self::Prefix(base.trim_end_matches('/').to_string()))
	}

	/// Returns `true` for a hash-root base.
	pub fn is_hash(&self) -> bool {
		matches!(self, Self::Hash { .. })
	}

	/// Extracts the routable part of `location`, or `None` if the base does not apply.
	pub fn strip(&self, location: &Location) -> Option<Routable> {
		match self {
			Self::None => Some(Routable {
				pathname: location.pathname.clone(),
				search: location.search.clone(),
				hash: location.hash.clone(),
			}),
			Self::Prefix(prefix) => {
				let rest = location.pathname.strip_prefix(prefix.as_str())?;
				let pathname = if rest.is_empty() {
					"/".to_string()
				} else if rest.starts_with('/') {
					rest.to_string()
				} else {
					return None;
				};
				Some(Routable {
					pathname,
					search: location.search.clone(),
					hash: location.hash.clone(),
				})
			}
			Self::Hash { .. } => {
				let fragment = location.hash.strip_prefix('#').unwrap_or(&location.hash);
				let (pathname, search) = match fragment.find('?') {
					Some(index) => fragment.split_at(index),
					None => (fragment, ""),
				};
				let pathname = match pathname {
					"" => "/",
					p if p.starts_with('/') => p,
					_ => return None,
				};
				Some(Routable {
					pathname: pathname.to_string(),
					search: if search.len() > 1 { search.to_string() } else { String::new() },
					hash: String::new(),
				})
			}
		}
	}

	/// Builds the href for a routable `path` (which may carry a `#` part) and
	/// encoded `search` (without `?`).
	pub fn href(&self, path: &str, search: &str) -> String {
		let search = if search.is_empty() {
			String::new()
		} else {
			format!("?{}", search)
		};

		match self {
			Self::None => join(path, &search),
			Self::Prefix(prefix) => join(&format!("{}{}", prefix, path), &search),
			Self::Hash { prefix } => format!("{}#{}{}", prefix, path, search),
		}
	}
}

/// Places `search` between the pathname and the `#` part of `path`.
fn join(path: &str, search: &str) -> String {
	match path.split_once('#') {
		Some((pathname, hash)) => format!("{}{}#{}", pathname, search, hash),
		None => format!("{}{}", path, search),
	}
}

impl fmt::Display for Base {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::None => Ok(()),
			Self::Prefix(prefix) => f.write_str(prefix),
			Self::Hash { prefix } => write!(f, "{}#", prefix),
		}
	}
}
