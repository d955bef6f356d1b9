//! # Resource Slice HTTP
//!
//! Operation builders for slices backed by JSON REST endpoints.
//!
//! A slice tracks the lifecycle of an injected operation; this crate
//! constructs those operations. Three concerns live here, each isolated on
//! purpose:
//!
//! - [`JsonEndpoint`]: method + URL + typed params/payload, producing an
//!   operation closure a [`ResourceSlice`] accepts directly
//! - [`CredentialProvider`]: credentials are an explicit dependency of the
//!   operation-constructing layer, never ambient state read inside business
//!   logic
//! - [`envelope`]: one adapter for the `{"data": …}` / `{"items": …}` /
//!   bare-payload response shapes, tested independently instead of being
//!   re-inlined at every call site
//!
//! [`ResourceSlice`]: https://docs.rs/resource-slice-runtime
//!
//! ## Example
//!
//! ```ignore
//! use resource_slice_http::{JsonEndpoint, StaticToken};
//! use resource_slice_runtime::ResourceSlice;
//!
//! let endpoint = JsonEndpoint::get("https://api.example.com/territories")
//!     .with_credentials(StaticToken::new(session_token));
//!
//! let territories: ResourceSlice<TerritoryQuery, Vec<Territory>, HttpError> =
//!     ResourceSlice::new(endpoint.into_operation());
//! ```

/// Explicit credential injection for outgoing requests
pub mod credentials;

/// JSON endpoint builder producing slice operations
pub mod endpoint;

/// Response-envelope adapter
pub mod envelope;

/// HTTP error taxonomy
pub mod error;

pub use credentials::{CredentialProvider, NoCredentials, StaticToken};
pub use endpoint::JsonEndpoint;
pub use envelope::{decode_envelope, extract_payload};
pub use error::HttpError;
