//! Request types tokens can be extracted from
//!
//! This module contains implementations of the [`TokenSource`](crate::TokenSource)
//! trait. Each source reads headers case-insensitively and exposes cookies by name.
//!
//! ## Available Sources
//!
//! - [`http`]: `http::HeaderMap`, `http::Request<B>` and `http::request::Parts`,
//!   with cookies parsed from the `Cookie` headers
//! - [`record`]: a plain [`RequestRecord`] with pre-parsed header and cookie maps
//!
//! ## Example
//!
//! ```rust
//! use jwts::extract_from_header;
//!
//! let request = http::Request::builder()
//!     .header("Authorization", "Bearer abc.def.ghi")
//!     .body(())
//!     .unwrap();
//!
//! assert_eq!(extract_from_header(&request).unwrap(), "abc.def.ghi");
//! ```

pub mod http;
pub mod record;

pub use record::RequestRecord;
