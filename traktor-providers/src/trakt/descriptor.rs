//! Trakt provider descriptor.

use traktor_core::ProviderKind;

use super::endpoints::trakt_api;
use super::provider::TRAKT_API_URL;
use crate::descriptor::{CliConfig, ProviderDescriptor, ProviderMetadata};

/// Describes Trakt.
pub fn trakt_descriptor() -> ProviderDescriptor {
    ProviderDescriptor {
        id: ProviderKind::Trakt,
        metadata: ProviderMetadata {
            display_name: "Trakt",
            default_endpoint: TRAKT_API_URL,
            docs_url: "https://trakt.docs.apiary.io",
            auth_scheme: "trakt-api-key header, OAuth bearer token",
        },
        cli: CliConfig {
            name: "trakt",
            aliases: &["trakt.tv"],
        },
        api: trakt_api,
    }
}
