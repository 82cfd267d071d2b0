//! TMDB provider descriptor.

use traktor_core::ProviderKind;

use super::endpoints::tmdb_api;
use super::provider::TMDB_API_URL;
use crate::descriptor::{CliConfig, ProviderDescriptor, ProviderMetadata};

/// Describes TMDB.
pub fn tmdb_descriptor() -> ProviderDescriptor {
    ProviderDescriptor {
        id: ProviderKind::Tmdb,
        metadata: ProviderMetadata {
            display_name: "TMDB",
            default_endpoint: TMDB_API_URL,
            docs_url: "https://developer.themoviedb.org/reference",
            auth_scheme: "read access bearer token, session_id query parameter",
        },
        cli: CliConfig {
            name: "tmdb",
            aliases: &["themoviedb"],
        },
        api: tmdb_api,
    }
}
