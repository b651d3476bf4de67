//! Error types for pattern compilation, path building and query coding.

/// Error type for path pattern compilation and path building.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
	/// Pattern text is longer than the allowed maximum.
	#[error("Pattern length {length} exceeds maximum allowed length of {max} bytes")]
	TooLong {
		/// Actual length in bytes.
		length: usize,
		/// Allowed maximum in bytes.
		max: usize,
	},
	/// Pattern has more segments than allowed.
	#[error("Pattern has {segments} path segments, exceeding maximum of {max}")]
	TooManySegments {
		/// Actual segment count.
		segments: usize,
		/// Allowed maximum.
		max: usize,
	},
	/// Pattern does not start with `/`.
	#[error("Pattern '{0}' must start with '/'")]
	MissingLeadingSlash(String),
	/// A `:name` parameter has an empty or malformed name.
	#[error("Invalid parameter name '{name}' in pattern '{pattern}'")]
	InvalidParameterName {
		/// The offending pattern.
		pattern: String,
		/// The malformed name.
		name: String,
	},
	/// The same parameter name is declared twice.
	#[error("Parameter '{name}' appears more than once in pattern '{pattern}'")]
	DuplicateParameter {
		/// The offending pattern.
		pattern: String,
		/// The repeated name.
		name: String,
	},
	/// More than one `#` marker in a pattern.
	#[error("Pattern '{0}' contains more than one '#' marker")]
	MultipleHashMarkers(String),
	/// The generated regex was rejected.
	#[error("Failed to compile pattern regex: {0}")]
	InvalidRegex(String),
	/// A required parameter was absent (or empty) while building a path.
	#[error("Missing parameter: {name}")]
	MissingParameter {
		/// Name of the missing parameter.
		name: String,
	},
}

/// Error type for query string decoding and encoding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
	/// The query string could not be decoded.
	#[error("Failed to decode query string: {0}")]
	Decode(String),
	/// The query mapping could not be encoded.
	#[error("Failed to encode query: {0}")]
	Encode(String),
	/// Failure reported by a user-supplied codec.
	#[error("Query codec failed: {0}")]
	Custom(String),
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_pattern_error_display() {
		let err = PatternError::MissingParameter {
			name: "postId".to_string(),
		};
		assert_eq!(err.to_string(), "Missing parameter: postId");

		let err = PatternError::TooLong {
			length: 2000,
			max: 1024,
		};
		assert!(err.to_string().contains("exceeds maximum allowed length"));
	}

	#[rstest]
	fn test_query_error_display() {
		assert_eq!(
			QueryError::Custom("bad array".to_string()).to_string(),
			"Query codec failed: bad array"
		);
		assert!(
			QueryError::Decode("x".to_string())
				.to_string()
				.starts_with("Failed to decode")
		);
	}
}
