//! The Movie Database provider.
//!
//! Every request carries the application's read access token. User-scoped
//! endpoints additionally get the session id as a query parameter. Errors and
//! list pagination are reported in the JSON body.

mod client;
mod descriptor;
mod endpoints;
mod provider;

pub use client::TmdbClient;
pub use descriptor::tmdb_descriptor;
pub use endpoints::tmdb_api;
pub use provider::{
    SESSION_PARAM, TMDB_API_URL, TmdbAuth, TmdbConfig, TmdbErrorEnvelope, TmdbProvider,
    pagination_from_body,
};
