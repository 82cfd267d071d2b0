// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `Traktor` Core
//!
//! Core types, endpoint templates, and traits for the `Traktor` client
//! framework.
//!
//! This crate provides the foundational abstractions used across all other
//! `Traktor` crates, including:
//!
//! - Declarative endpoint templates and the namespaces that group them
//! - Parameter bags passed to endpoint calls
//! - The provider-neutral response type
//! - Cache entries and the [`CacheStore`] trait consumed by the cache layer
//! - Error types
//!
//! ## Key Types
//!
//! ### Templates
//! - [`Endpoint`] - Immutable descriptor of one API operation
//! - [`EndpointBuilder`] - Builder used by the provider endpoint trees
//! - [`Namespace`] / [`ApiNode`] - Nested tree of endpoints
//! - [`ParamRequirement`] - Required / optional / conditional parameters
//! - [`CachePolicy`] - Per-endpoint caching policy
//!
//! ### Calls
//! - [`Params`] - Parameter bag
//! - [`RequestInit`] - Per-call request overrides
//! - [`Response`] - Response with provider extensions and cache metadata
//!
//! ### Caching
//! - [`CacheEntry`] - Cached response with timestamps
//! - [`CacheStore`] - Storage backend trait

pub mod cache;
pub mod error;
pub mod models;
pub mod namespace;
pub mod params;
pub mod response;
pub mod template;

// Re-export error types
pub use error::{CacheError, CoreError};

// Re-export model types
pub use models::ProviderKind;

// Re-export template types
pub use namespace::{ApiNode, Namespace};
pub use params::Params;
pub use template::{
    AuthRequirement, BodyContract, CachePolicy, Endpoint, EndpointBuilder, EndpointOptions,
    HttpMethod, ParamRequirement, ParameterContract, RequestInit, TransformFn, ValidateFn,
};

// Re-export response and cache types
pub use cache::{CacheEntry, CacheStore};
pub use response::{CacheMetadata, CacheStamp, Pagination, Response};
