//! Path patterns and query codecs for the grappelli router.
//!
//! This crate holds the two leaf components the router's synchronization engine is
//! built on:
//!
//! - [`PathPattern`]: compiles `/literal/:param` templates (with an optional `#`
//!   fragment part) into an anchored matcher and its inverse builder
//! - [`QueryCodec`]: converts query text to and from a [`Query`] mapping, with the
//!   default [`UrlEncodedCodec`] and user-supplied codecs via [`custom_codec`]
//!
//! ## Example
//!
//! ```
//! use grappelli_urls::{params, PathPattern, QueryCodec, UrlEncodedCodec};
//!
//! let pattern = PathPattern::new("/posts/:postId").unwrap();
//! let params = pattern.matches("/posts/123").unwrap();
//! assert_eq!(params["postId"], "123");
//! assert_eq!(pattern.build(&params! { "postId" => 7 }).unwrap(), "/posts/7");
//!
//! let query = UrlEncodedCodec.decode("?tag=a&tag=b").unwrap();
//! assert_eq!(UrlEncodedCodec.encode(&query).unwrap(), "tag=a&tag=b");
//! ```

pub mod error;
pub mod pattern;
pub mod query;

pub use error::{PatternError, QueryError};
pub use pattern::{Params, PathPattern};
pub use query::{FnCodec, Query, QueryCodec, QueryValue, UrlEncodedCodec, custom_codec};
