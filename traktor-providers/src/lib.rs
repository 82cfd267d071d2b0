// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `Traktor` Providers
//!
//! Trakt, TMDB and TVDB on top of the `traktor-fetch` framework.
//!
//! Each provider module includes:
//!
//! - **Provider**: header, URL and response hooks plus the auth record
//! - **Endpoints**: a representative endpoint tree
//! - **Client**: a typed wrapper around [`traktor_fetch::BaseClient`]
//! - **Descriptor**: static metadata for the [`ProviderRegistry`]
//!
//! | Provider | Credentials | User auth | Pagination |
//! |----------|-------------|-----------|------------|
//! | Trakt | `trakt-api-key` header | OAuth bearer token | `x-pagination-*` headers |
//! | TMDB | read access bearer token | `session_id` query | body fields |
//! | TVDB | API key (+ PIN) at `/login` | bearer token | `links` envelope |
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use traktor_core::{Params, RequestInit};
//! use traktor_fetch::ClientContext;
//! use traktor_providers::{TraktClient, TraktConfig};
//! use traktor_store::MemoryCacheStore;
//!
//! let context = ClientContext::new(Arc::new(MemoryCacheStore::new()))?;
//! let trakt = TraktClient::new(&TraktConfig::new("client-id"), &context)?;
//! let trending = trakt.endpoint("movies.trending").unwrap();
//! let response = trending.call(Params::new().with("limit", 10), RequestInit::new())?.await?;
//! ```

pub mod api_client;
pub mod descriptor;
pub mod error;
pub mod registry;

pub mod tmdb;
pub mod trakt;
pub mod tvdb;

pub use api_client::{ApiClient, KnownProvider};
pub use descriptor::{CliConfig, ProviderDescriptor, ProviderMetadata};
pub use error::ProviderError;
pub use registry::ProviderRegistry;

pub use tmdb::{TmdbAuth, TmdbClient, TmdbConfig, TmdbProvider, tmdb_descriptor};
pub use trakt::{TraktAuth, TraktClient, TraktConfig, TraktProvider, trakt_descriptor};
pub use tvdb::{TvdbAuth, TvdbClient, TvdbConfig, TvdbProvider, tvdb_descriptor};
