//! Trakt.tv provider.
//!
//! Requests carry `trakt-api-version` and `trakt-api-key`; the user's OAuth
//! token is sent as a bearer token on endpoints that accept it. Pagination
//! and sort order come back as response headers.

mod client;
mod descriptor;
mod endpoints;
mod provider;

pub use client::TraktClient;
pub use descriptor::trakt_descriptor;
pub use endpoints::trakt_api;
pub use provider::{
    SORT_EXTENSION, TRAKT_API_URL, TRAKT_API_VERSION, TraktAuth, TraktConfig, TraktProvider,
    VIP_CONDITION, pagination_from_headers,
};
