//! Path Pattern Matching for client-side routes.
//!
//! Patterns are written as `/literal/:param/:other`. A single `#` splits a pattern
//! into a root part, matched against the pathname, and a fragment part, matched
//! against the location hash:
//!
//! - `/posts/` - Exact match
//! - `/posts/:postId` - Single path parameter
//! - `/users/:userId/posts/:postId` - Multiple parameters
//! - `/test/#/swap/:token` - Hash sub-route under `/test/`
//!
//! Matching is anchored and case-sensitive. A parameter matches one non-empty
//! segment made of anything except `/`, `?` and `#`.
//!
//! ## Parameter encoding
//!
//! [`PathPattern::build`] escapes only what cannot stay in a path segment: ASCII
//! controls, space, `/ ? #` and the other delimiters RFC 3986 excludes. Segment
//! characters (`:`, `@`, sub-delims such as `+` or `,`), `%` and non-ASCII text are
//! written as they are, so a value holding escapes is taken as already encoded.
//!
//! A matched segment is percent-decoded when building the decoded value writes the
//! segment back unchanged (`rust%20lang` gives `rust lang`). Otherwise the segment
//! is kept as written (`%2f`, `%C3%BC`, `%41`). Either way, building from matched
//! params reproduces the matched path for every segment made of RFC 3987 path
//! characters and percent escapes.

use std::collections::HashMap;
use std::fmt;

use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};
use regex::{Regex, RegexBuilder};

use crate::error::PatternError;

/// Path parameters extracted by a successful match.
pub type Params = HashMap<String, String>;

/// Maximum allowed length for a pattern string in bytes.
const MAX_PATTERN_LENGTH: usize = 1024;

/// Maximum allowed number of path segments in each part (root or fragment) of a pattern.
const MAX_PATH_SEGMENTS: usize = 32;

/// Maximum allowed size for a compiled pattern regex (in bytes).
const MAX_REGEX_SIZE: usize = 1 << 20; // 1 MiB

/// ASCII bytes escaped in parameter values.
const SEGMENT: &AsciiSet = &CONTROLS
	.add(b' ')
	.add(b'"')
	.add(b'#')
	.add(b'/')
	.add(b'<')
	.add(b'>')
	.add(b'?')
	.add(b'[')
	.add(b'\\')
	.add(b']')
	.add(b'^')
	.add(b'`')
	.add(b'{')
	.add(b'|')
	.add(b'}');

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
	Literal(String),
	Param(String),
}

/// One side of a pattern (root or fragment).
#[derive(Debug, Clone)]
struct CompiledPart {
	regex: Regex,
	tokens: Vec<Token>,
}

impl CompiledPart {
	fn compile(tokens: Vec<Token>) -> Result<Self, PatternError> {
		let mut regex_str = String::from("^");
		for token in &tokens {
			match token {
				Token::Literal(text) => regex_str.push_str(&regex::escape(text)),
				Token::Param(name) => {
					regex_str.push_str(&format!("(?P<{}>[^/?#]+)", name));
				}
			}
		}
		regex_str.push('$');

		// Use RegexBuilder with size limits to prevent memory exhaustion
		let regex = RegexBuilder::new(&regex_str)
			.size_limit(MAX_REGEX_SIZE)
			.build()
			.map_err(|e| PatternError::InvalidRegex(e.to_string()))?;

		Ok(Self { regex, tokens })
	}

	fn capture(&self, input: &str, params: &mut Params) -> Option<()> {
		let caps = self.regex.captures(input)?;
		for token in &self.tokens {
			if let Token::Param(name) = token {
				let raw = caps.name(name)?.as_str();
				params.insert(name.clone(), decode_segment(raw));
			}
		}
		Some(())
	}

	fn render(&self, params: &Params, out: &mut String) -> Result<(), PatternError> {
		for token in &self.tokens {
			match token {
				Token::Literal(text) => out.push_str(text),
				Token::Param(name) => {
					let value = params
						.get(name)
						.filter(|value| !value.is_empty())
						.ok_or_else(|| PatternError::MissingParameter { name: name.clone() })?;
					out.push_str(&encode_segment(value));
				}
			}
		}
		Ok(())
	}

	fn has_params(&self) -> bool {
		self.tokens.iter().any(|t| matches!(t, Token::Param(_)))
	}
}

/// A compiled route pattern: a matcher and its inverse builder.
#[derive(Debug, Clone)]
pub struct PathPattern {
	/// The original pattern string.
	pattern: String,
	root: CompiledPart,
	fragment: Option<CompiledPart>,
	/// Parameter names in order of appearance.
	param_names: Vec<String>,
}

impl PathPattern {
	/// Compiles a pattern string.
	///
	/// # Errors
	///
	/// Returns [`PatternError`] if:
	/// - Pattern exceeds maximum length (1024 bytes)
	/// - The root or the fragment part has too many path segments (>32 each)
	/// - Pattern does not start with `/`
	/// - Pattern has more than one `#`
	/// - A parameter name is empty, malformed or repeated
	pub fn new(pattern: &str) -> Result<Self, PatternError> {
		if pattern.len() > MAX_PATTERN_LENGTH {
			return Err(PatternError::TooLong {
				length: pattern.len(),
				max: MAX_PATTERN_LENGTH,
			});
		}

		if !pattern.starts_with('/') {
			return Err(PatternError::MissingLeadingSlash(pattern.to_string()));
		}

		let mut parts = pattern.split('#');
		let root_src = parts.next().unwrap_or_default();
		let fragment_src = parts.next();
		if parts.next().is_some() {
			return Err(PatternError::MultipleHashMarkers(pattern.to_string()));
		}

		for part in std::iter::once(root_src).chain(fragment_src) {
			let segments = part.split('/').count();
			if segments > MAX_PATH_SEGMENTS {
				return Err(PatternError::TooManySegments {
					segments,
					max: MAX_PATH_SEGMENTS,
				});
			}
		}

		let root_tokens = tokenize(root_src, pattern)?;
		let fragment_tokens = fragment_src.map(|src| tokenize(src, pattern)).transpose()?;

		let mut param_names: Vec<String> = Vec::new();
		let all_tokens = root_tokens.iter().chain(fragment_tokens.iter().flatten());
		for token in all_tokens {
			if let Token::Param(name) = token {
				if param_names.contains(name) {
					return Err(PatternError::DuplicateParameter {
						pattern: pattern.to_string(),
						name: name.clone(),
					});
				}
				param_names.push(name.clone());
			}
		}

		Ok(Self {
			pattern: pattern.to_string(),
			root: CompiledPart::compile(root_tokens)?,
			fragment: fragment_tokens.map(CompiledPart::compile).transpose()?,
			param_names,
		})
	}

	/// Returns the original pattern string.
	pub fn pattern(&self) -> &str {
		&self.pattern
	}

	/// Returns the parameter names in order of appearance.
	pub fn param_names(&self) -> &[String] {
		&self.param_names
	}

	/// Returns whether the pattern has a `#` fragment part.
	pub fn has_fragment(&self) -> bool {
		self.fragment.is_some()
	}

	/// Returns whether this is an exact match pattern (no parameters).
	pub fn is_exact(&self) -> bool {
		!self.root.has_params() && !self.fragment.as_ref().is_some_and(CompiledPart::has_params)
	}

	/// Attempts to match a path against this pattern.
	///
	/// `path` is a pathname optionally followed by `#` and the fragment. Patterns
	/// without a fragment part ignore anything after `#`.
	pub fn matches(&self, path: &str) -> Option<Params> {
		let (root_path, hash) = match path.split_once('#') {
			Some((root, hash)) => (root, hash),
			None => (path, ""),
		};

		let mut params = Params::with_capacity(self.param_names.len());
		self.root.capture(root_path, &mut params)?;
		if let Some(fragment) = &self.fragment {
			fragment.capture(hash, &mut params)?;
		}
		Some(params)
	}

	/// Checks if this pattern would match the given path.
	pub fn is_match(&self, path: &str) -> bool {
		self.matches(path).is_some()
	}

	/// Generates a path from this pattern with the given parameters.
	///
	/// Extra entries in `params` are ignored.
	///
	/// # Errors
	///
	/// Returns [`PatternError::MissingParameter`] if a parameter is absent or empty.
	pub fn build(&self, params: &Params) -> Result<String, PatternError> {
		let mut out = String::with_capacity(self.pattern.len());
		self.root.render(params, &mut out)?;
		if let Some(fragment) = &self.fragment {
			out.push('#');
			fragment.render(params, &mut out)?;
		}
		Ok(out)
	}
}

/// Splits one side of a pattern into literal and parameter tokens.
fn tokenize(source: &str, pattern: &str) -> Result<Vec<Token>, PatternError> {
	let mut tokens = Vec::new();
	let mut literal = String::new();
	let mut chars = source.chars().peekable();
	let mut at_segment_start = true;

	while let Some(c) = chars.next() {
		if c == ':' && at_segment_start {
			let mut name = String::new();
			while let Some(&next) = chars.peek() {
				if next.is_ascii_alphanumeric() || next == '_' {
					name.push(next);
					chars.next();
				} else {
					break;
				}
			}

			let starts_with_digit = name.chars().next().is_some_and(|c| c.is_ascii_digit());
			if name.is_empty() || starts_with_digit {
				let rest: String = chars.clone().take_while(|c| *c != '/').collect();
				return Err(PatternError::InvalidParameterName {
					pattern: pattern.to_string(),
					name: format!("{}{}", name, rest),
				});
			}

			if !literal.is_empty() {
				tokens.push(Token::Literal(std::mem::take(&mut literal)));
			}
			tokens.push(Token::Param(name));
			at_segment_start = false;
			continue;
		}

		at_segment_start = c == '/';
		literal.push(c);
	}

	if !literal.is_empty() {
		tokens.push(Token::Literal(literal));
	}
	Ok(tokens)
}

/// Escapes the ASCII bytes of `value` that cannot stay in a path segment.
fn encode_segment(value: &str) -> String {
	let mut out = String::with_capacity(value.len());
	let mut buf = [0u8; 4];
	for c in value.chars() {
		if c.is_ascii() {
			out.extend(utf8_percent_encode(c.encode_utf8(&mut buf), SEGMENT));
		} else {
			out.push(c);
		}
	}
	out
}

fn decode_segment(raw: &str) -> String {
	match percent_decode_str(raw).decode_utf8() {
		Ok(decoded) if encode_segment(&decoded) == raw => decoded.into_owned(),
		_ => raw.to_string(),
	}
}

impl PartialEq for PathPattern {
	fn eq(&self, other: &Self) -> bool {
		self.pattern == other.pattern
	}
}

impl Eq for PathPattern {}

impl fmt::Display for PathPattern {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.pattern)
	}
}

/// Builds a [`Params`] map from `key => value` pairs.
///
/// ```
/// use grappelli_urls::params;
///
/// let params = params! { "postId" => "123", "page" => 2 };
/// assert_eq!(params["postId"], "123");
/// assert_eq!(params["page"], "2");
/// ```
#[macro_export]
macro_rules! params {
	() => {
		$crate::Params::new()
	};
	($($key:expr => $value:expr),+ $(,)?) => {{
		let mut params = $crate::Params::new();
		$(
			params.insert(
				::std::string::ToString::to_string(&$key),
				::std::string::ToString::to_string(&$value),
			);
		)+
		params
	}};
}
