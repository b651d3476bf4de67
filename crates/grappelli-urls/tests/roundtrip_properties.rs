//! Round-trip property tests
//!
//! Property-based tests for the two inverse pairs of this crate: pattern
//! matching/building and query decoding/encoding.

use grappelli_urls::{PathPattern, Query, QueryCodec, UrlEncodedCodec};
use proptest::prelude::*;
use rstest::*;

/// Path segments made of RFC 3987 path characters and percent escapes in either case.
fn segment() -> impl Strategy<Value = String> {
	prop::collection::vec(
		prop_oneof![
			"[A-Za-z0-9._~-]",
			"[!$&'()*+,;=:@]",
			"[\u{a0}-\u{d7ff}\u{f900}-\u{fdcf}]",
			"%[0-9A-Fa-f]{2}",
			Just("%20".to_string()),
			Just("%2F".to_string()),
			Just("%3F".to_string()),
			Just("%23".to_string()),
			Just("%C3%BC".to_string()),
			Just("%e2%82%ac".to_string()),
		],
		1..8,
	)
	.prop_map(|parts| parts.concat())
}

/// Parameter values a caller may pass to `build`: any text without `%`.
fn value() -> impl Strategy<Value = String> {
	"[^%\\pC]{1,12}"
}

// ============================================================================
// Property-Based Tests: PathPattern
// ============================================================================

proptest! {
	/// Test: build inverts matches for a single parameter
	///
	/// Category: Property
	/// Verifies that building from extracted params reproduces the matched path.
	#[rstest]
	fn prop_single_param_roundtrip(value in segment()) {
		let pattern = PathPattern::new("/posts/:postId").unwrap();
		let path = format!("/posts/{}", value);

		let params = pattern.matches(&path).unwrap();
		prop_assert_eq!(pattern.build(&params).unwrap(), path);
	}

	/// Test: build inverts matches for multiple parameters and literals
	///
	/// Category: Property
	/// Verifies the round trip across several parameters separated by literals.
	#[rstest]
	fn prop_multi_param_roundtrip(user in segment(), post in segment()) {
		let pattern = PathPattern::new("/users/:userId/posts/:postId/edit").unwrap();
		let path = format!("/users/{}/posts/{}/edit", user, post);

		let params = pattern.matches(&path).unwrap();
		prop_assert_eq!(params.len(), 2);
		prop_assert_eq!(pattern.build(&params).unwrap(), path);
	}

	/// Test: build inverts matches for hash patterns
	///
	/// Category: Property
	/// Verifies the round trip when a parameter lives in the fragment part.
	#[rstest]
	fn prop_hash_param_roundtrip(section in segment(), token in segment()) {
		let pattern = PathPattern::new("/app/:section/#/swap/:token").unwrap();
		let path = format!("/app/{}/#/swap/{}", section, token);

		let params = pattern.matches(&path).unwrap();
		prop_assert_eq!(pattern.build(&params).unwrap(), path);
	}

	/// Test: matches inverts build for caller-supplied values
	///
	/// Category: Property
	/// Verifies that values without escapes survive building then matching.
	#[rstest]
	fn prop_build_then_match(value in value()) {
		let pattern = PathPattern::new("/posts/:postId").unwrap();
		let params = grappelli_urls::params! { "postId" => value };

		let path = pattern.build(&params).unwrap();
		prop_assert_eq!(pattern.matches(&path), Some(params));
	}

	/// Test: literal patterns never match a different literal
	///
	/// Category: Property
	/// Verifies that matching is anchored on both ends.
	#[rstest]
	fn prop_exact_pattern_is_anchored(prefix in "[a-z]{1,5}", suffix in "[a-z]{1,5}") {
		let pattern = PathPattern::new("/foo").unwrap();

		let nested_prefix = format!("/{}/foo", prefix);
		let nested_suffix = format!("/foo/{}", suffix);
		let joined_suffix = format!("/foo{}", suffix);
		prop_assert!(!pattern.is_match(&nested_prefix));
		prop_assert!(!pattern.is_match(&nested_suffix));
		prop_assert!(!pattern.is_match(&joined_suffix));
	}
}

// ============================================================================
// Property-Based Tests: UrlEncodedCodec
// ============================================================================

proptest! {
	/// Test: decode inverts encode on decoded mappings
	///
	/// Category: Property
	/// Verifies that any mapping produced by decode survives encode then decode.
	#[rstest]
	fn prop_query_roundtrip(
		pairs in prop::collection::vec(("[a-c]{1,2}", "\\PC{0,8}"), 0..12)
	) {
		let codec = UrlEncodedCodec;
		let search = serde_urlencoded::to_string(&pairs).unwrap();
		let decoded: Query = codec.decode(&search).unwrap();

		let encoded = codec.encode(&decoded).unwrap();
		prop_assert_eq!(codec.decode(&encoded).unwrap(), decoded);
	}

	/// Test: every decoded key keeps all of its values
	///
	/// Category: Property
	/// Verifies that repeated keys collapse without losing values or order.
	#[rstest]
	fn prop_repeated_keys_keep_values(values in prop::collection::vec("[a-z0-9]{0,6}", 1..6)) {
		let codec = UrlEncodedCodec;
		let search = values
			.iter()
			.map(|v| format!("k={}", v))
			.collect::<Vec<_>>()
			.join("&");

		let decoded = codec.decode(&search).unwrap();
		let stored: Vec<&str> = decoded["k"].iter().collect();
		let expected: Vec<&str> = values.iter().map(String::as_str).collect();
		prop_assert_eq!(stored, expected);
	}
}
