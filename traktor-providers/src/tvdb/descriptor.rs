//! TVDB provider descriptor.

use traktor_core::ProviderKind;

use super::endpoints::tvdb_api;
use super::provider::TVDB_API_URL;
use crate::descriptor::{CliConfig, ProviderDescriptor, ProviderMetadata};

/// Describes TVDB.
pub fn tvdb_descriptor() -> ProviderDescriptor {
    ProviderDescriptor {
        id: ProviderKind::Tvdb,
        metadata: ProviderMetadata {
            display_name: "TVDB",
            default_endpoint: TVDB_API_URL,
            docs_url: "https://thetvdb.github.io/v4-api",
            auth_scheme: "bearer token from /login",
        },
        cli: CliConfig {
            name: "tvdb",
            aliases: &["thetvdb"],
        },
        api: tvdb_api,
    }
}
