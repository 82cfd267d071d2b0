//! TheTVDB v4 provider.
//!
//! The API key is exchanged for a bearer token at `/login`; every other
//! endpoint needs that token. Responses come wrapped in a
//! `{status, data, links}` envelope which the response hook removes.

mod client;
mod descriptor;
mod endpoints;
mod provider;

pub use client::TvdbClient;
pub use descriptor::tvdb_descriptor;
pub use endpoints::tvdb_api;
pub use provider::{TVDB_API_URL, TvdbAuth, TvdbConfig, TvdbLinks, TvdbProvider};
