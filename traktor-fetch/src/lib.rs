// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `Traktor` Fetch
//!
//! Endpoint binding, caching, and HTTP dispatch for the `Traktor` client
//! framework.
//!
//! ## Building Blocks
//!
//! - [`request`] - Cancellable request futures
//! - [`resolver`] - URL and body resolution from endpoint templates
//! - [`cache`] - Get-or-populate cache decorator
//! - [`binder`] - Binds a namespace of templates to a client
//! - [`client`] - Base client with auth and call observers
//! - [`transport`] - HTTP transport trait and its reqwest implementation
//! - [`context`] - Transport, cache store, and settings shared by a client
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use traktor_core::{Namespace, Endpoint, Params, RequestInit};
//! use traktor_fetch::{BaseClient, ClientContext};
//!
//! let api = Namespace::new().endpoint("trending", Endpoint::get("/movies/trending").cached());
//! let context = ClientContext::new(Arc::new(MemoryCacheStore::new()))?;
//! let client = BaseClient::new(MyProvider::new(), &api, &context);
//!
//! let trending = client.endpoint("trending").unwrap();
//! let response = trending.call(Params::new(), RequestInit::new())?.await?;
//! ```

pub mod binder;
pub mod cache;
pub mod client;
pub mod context;
pub mod error;
pub mod observable;
pub mod request;
pub mod resolver;
pub mod transport;

// Errors
pub use error::ClientError;

// Requests
pub use request::CancellableRequest;
pub use resolver::{resolve_body, resolve_url};
pub use transport::{HttpRequest, ReqwestTransport, Transport};

// Caching
pub use cache::{CacheConfig, CacheKey, CacheOptions, CachedCall, CallFn, with_cache};

// Binding & client
pub use binder::{BoundEndpoint, BoundNamespace, BoundNode, CachedEndpoint, EndpointMetadata, bind};
pub use client::{AuthChange, BaseClient, CallQuery, CallRecord, Dispatcher, Provider};
pub use context::{ClientContext, ClientContextBuilder, ClientSettings};
pub use observable::{Observable, ObserverId};
