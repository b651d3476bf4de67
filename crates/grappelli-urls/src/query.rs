//! Query string decoding and encoding.
//!
//! A decoded query is a flat, ordered mapping from key to either a single value or,
//! for keys repeated in the query string, the list of their values. The router treats
//! a [`Query`] as an opaque structural value and only compares it by equality, so the
//! textual encoding is pluggable through [`QueryCodec`].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::QueryError;

/// Decoded query mapping.
pub type Query = BTreeMap<String, QueryValue>;

/// Value of one query key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryValue {
	/// Key present once.
	One(String),
	/// Key repeated; values in order of appearance.
	Many(Vec<String>),
}

impl QueryValue {
	/// Returns the single value, if this is not a list.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::One(value) => Some(value),
			Self::Many(_) => None,
		}
	}

	/// Returns the first value.
	pub fn first(&self) -> Option<&str> {
		match self {
			Self::One(value) => Some(value),
			Self::Many(values) => values.first().map(String::as_str),
		}
	}

	/// Iterates over every value in order.
	pub fn iter(&self) -> impl Iterator<Item = &str> {
		let values: &[String] = match self {
			Self::One(value) => std::slice::from_ref(value),
			Self::Many(values) => values,
		};
		values.iter().map(String::as_str)
	}

	/// Returns the number of values.
	pub fn len(&self) -> usize {
		match self {
			Self::One(_) => 1,
			Self::Many(values) => values.len(),
		}
	}

	/// Returns `true` for an empty list.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	fn push(&mut self, value: String) {
		match self {
			Self::One(first) => {
				let first = std::mem::take(first);
				*self = Self::Many(vec![first, value]);
			}
			Self::Many(values) => values.push(value),
		}
	}
}

impl fmt::Display for QueryValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::One(value) => f.write_str(value),
			Self::Many(values) => f.write_str(&values.join(",")),
		}
	}
}

impl PartialEq<str> for QueryValue {
	fn eq(&self, other: &str) -> bool {
		self.as_str() == Some(other)
	}
}

impl PartialEq<&str> for QueryValue {
	fn eq(&self, other: &&str) -> bool {
		self.as_str() == Some(*other)
	}
}

impl From<&str> for QueryValue {
	fn from(value: &str) -> Self {
		Self::One(value.to_string())
	}
}

impl From<String> for QueryValue {
	fn from(value: String) -> Self {
		Self::One(value)
	}
}

impl<S: Into<String>> From<Vec<S>> for QueryValue {
	fn from(values: Vec<S>) -> Self {
		Self::Many(values.into_iter().map(Into::into).collect())
	}
}

impl<S: Into<String>, const N: usize> From<[S; N]> for QueryValue {
	fn from(values: [S; N]) -> Self {
		Self::Many(values.into_iter().map(Into::into).collect())
	}
}

/// Bidirectional conversion between query text and [`Query`].
///
/// The router hands `decode` the search text without its leading `?` and expects
/// `encode` to return text without one. Errors are not recovered from: they reach
/// the caller of whichever router operation triggered the conversion.
pub trait QueryCodec {
	/// Parses query text into a mapping. An empty string decodes to an empty mapping.
	fn decode(&self, search: &str) -> Result<Query, QueryError>;

	/// Serializes a mapping into query text.
	fn encode(&self, query: &Query) -> Result<String, QueryError>;
}

/// Default codec: `application/x-www-form-urlencoded` pairs.
///
/// Repeated keys collapse into [`QueryValue::Many`]. A leading `?` is accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UrlEncodedCodec;

impl QueryCodec for UrlEncodedCodec {
	fn decode(&self, search: &str) -> Result<Query, QueryError> {
		let search = search.strip_prefix('?').unwrap_or(search);
		if search.is_empty() {
			return Ok(Query::new());
		}

		let pairs: Vec<(String, String)> =
			serde_urlencoded::from_str(search).map_err(|e| QueryError::Decode(e.to_string()))?;

		let mut query = Query::new();
		for (key, value) in pairs {
			match query.get_mut(&key) {
				Some(existing) => existing.push(value),
				None => {
					query.insert(key, QueryValue::One(value));
				}
			}
		}
		Ok(query)
	}

	fn encode(&self, query: &Query) -> Result<String, QueryError> {
		let pairs: Vec<(&str, &str)> = query
			.iter()
			.flat_map(|(key, value)| value.iter().map(move |v| (key.as_str(), v)))
			.collect();

		serde_urlencoded::to_string(pairs).map_err(|e| QueryError::Encode(e.to_string()))
	}
}

/// Codec assembled from user-supplied `read` and `write` functions.
#[derive(Clone)]
pub struct FnCodec<R, W> {
	read: R,
	write: W,
}

impl<R, W> QueryCodec for FnCodec<R, W>
where
	R: Fn(&str) -> Result<Query, QueryError>,
	W: Fn(&Query) -> Result<String, QueryError>,
{
	fn decode(&self, search: &str) -> Result<Query, QueryError> {
		(self.read)(search)
	}

	fn encode(&self, query: &Query) -> Result<String, QueryError> {
		(self.write)(query)
	}
}

impl<R, W> fmt::Debug for FnCodec<R, W> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FnCodec").finish_non_exhaustive()
	}
}

/// Creates a codec from a `read` and a `write` function.
///
/// # Examples
///
/// ```
/// use grappelli_urls::{custom_codec, query, Query, QueryCodec, QueryError, QueryValue};
///
/// // Comma-separated lists: `tags=a,b`
/// let codec = custom_codec(
/// 	|search: &str| -> Result<Query, QueryError> {
/// 		let mut query = Query::new();
/// 		for pair in search.split('&').filter(|p| !p.is_empty()) {
/// 			let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
/// 			let value = if value.contains(',') {
/// 				QueryValue::from(value.split(',').collect::<Vec<_>>())
/// 			} else {
/// 				QueryValue::from(value)
/// 			};
/// 			query.insert(key.to_string(), value);
/// 		}
/// 		Ok(query)
/// 	},
/// 	|query: &Query| -> Result<String, QueryError> {
/// 		Ok(query
/// 			.iter()
/// 			.map(|(k, v)| format!("{}={}", k, v))
/// 			.collect::<Vec<_>>()
/// 			.join("&"))
/// 	},
/// );
///
/// let decoded = codec.decode("tags=a,b").unwrap();
/// assert_eq!(decoded, query! { "tags" => ["a", "b"] });
/// assert_eq!(codec.encode(&decoded).unwrap(), "tags=a,b");
/// ```
pub fn custom_codec<R, W>(read: R, write: W) -> FnCodec<R, W>
where
	R: Fn(&str) -> Result<Query, QueryError>,
	W: Fn(&Query) -> Result<String, QueryError>,
{
	FnCodec { read, write }
}

/// Builds a [`Query`] from `key => value` pairs.
///
/// Values go through `QueryValue::from`, so strings produce single values and
/// vectors or arrays produce lists.
#[macro_export]
macro_rules! query {
	() => {
		$crate::Query::new()
	};
	($($key:expr => $value:expr),+ $(,)?) => {{
		let mut query = $crate::Query::new();
		$(
			query.insert(
				::std::string::ToString::to_string(&$key),
				$crate::QueryValue::from($value),
			);
		)+
		query
	}};
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::{fixture, rstest};

	#[fixture]
	fn codec() -> UrlEncodedCodec {
		UrlEncodedCodec
	}

	#[rstest]
	#[case("")]
	#[case("?")]
	fn test_decode_empty(codec: UrlEncodedCodec, #[case] search: &str) {
		assert_eq!(codec.decode(search).unwrap(), Query::new());
	}

	#[rstest]
	fn test_decode_single_pair(codec: UrlEncodedCodec) {
		let query = codec.decode("?bar=baz").unwrap();

		assert_eq!(query.len(), 1);
		assert_eq!(query["bar"], "baz");
	}

	#[rstest]
	fn test_decode_repeated_keys_collapse(codec: UrlEncodedCodec) {
		let query = codec.decode("a=1&b=2&a=3&a=4").unwrap();

		assert_eq!(query["a"], QueryValue::from(["1", "3", "4"]));
		assert_eq!(query["b"], "2");
	}

	#[rstest]
	fn test_decode_percent_and_plus(codec: UrlEncodedCodec) {
		let query = codec.decode("q=hello+world&name=J%C3%BCrgen").unwrap();

		assert_eq!(query["q"], "hello world");
		assert_eq!(query["name"], "Jürgen");
	}

	#[rstest]
	fn test_decode_key_without_value(codec: UrlEncodedCodec) {
		let query = codec.decode("flag").unwrap();
		assert_eq!(query["flag"], "");
	}

	#[rstest]
	fn test_encode(codec: UrlEncodedCodec) {
		let query = query! {
			"b" => "x y",
			"a" => vec!["1", "2"],
		};

		assert_eq!(codec.encode(&query).unwrap(), "a=1&a=2&b=x+y");
	}

	#[rstest]
	fn test_encode_empty(codec: UrlEncodedCodec) {
		assert_eq!(codec.encode(&Query::new()).unwrap(), "");
	}

	#[rstest]
	fn test_encode_then_decode_preserves_lists(codec: UrlEncodedCodec) {
		let original = codec.decode("tag=a&tag=b&page=2").unwrap();
		let text = codec.encode(&original).unwrap();

		assert_eq!(codec.decode(&text).unwrap(), original);
	}

	#[rstest]
	fn test_custom_codec_errors_pass_through() {
		let codec = custom_codec(
			|_: &str| -> Result<Query, QueryError> { Err(QueryError::Custom("nope".into())) },
			|_: &Query| -> Result<String, QueryError> { Ok(String::new()) },
		);

		assert_eq!(
			codec.decode("a=1"),
			Err(QueryError::Custom("nope".to_string()))
		);
	}

	#[rstest]
	fn test_query_value_accessors() {
		let one = QueryValue::from("x");
		let many = QueryValue::from(vec!["a".to_string(), "b".to_string()]);

		assert_eq!(one.as_str(), Some("x"));
		assert_eq!(one.len(), 1);
		assert_eq!(many.as_str(), None);
		assert_eq!(many.first(), Some("a"));
		assert_eq!(many.iter().collect::<Vec<_>>(), vec!["a", "b"]);
		assert_eq!(many.to_string(), "a,b");
		assert!(!many.is_empty());
	}

	#[rstest]
	fn test_query_value_serde_untagged() {
		let query = query! { "a" => "1", "b" => ["x", "y"] };

		let json = serde_json::to_string(&query).unwrap();
		assert_eq!(json, r#"{"a":"1","b":["x","y"]}"#);

		let back: Query = serde_json::from_str(&json).unwrap();
		assert_eq!(back, query);
	}
}
