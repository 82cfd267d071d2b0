//! Provider registry.
//!
//! Static access to every provider descriptor, by kind or by CLI name.

use std::collections::HashMap;
use std::sync::OnceLock;

use traktor_core::ProviderKind;

use crate::descriptor::ProviderDescriptor;
use crate::tmdb::tmdb_descriptor;
use crate::trakt::trakt_descriptor;
use crate::tvdb::tvdb_descriptor;

// ============================================================================
// Static Registry
// ============================================================================

static DESCRIPTORS: OnceLock<Vec<ProviderDescriptor>> = OnceLock::new();

static CLI_NAME_MAP: OnceLock<HashMap<String, ProviderKind>> = OnceLock::new();

fn init_descriptors() -> Vec<ProviderDescriptor> {
    vec![trakt_descriptor(), tmdb_descriptor(), tvdb_descriptor()]
}

fn build_cli_name_map(descriptors: &[ProviderDescriptor]) -> HashMap<String, ProviderKind> {
    let mut map = HashMap::new();

    for desc in descriptors {
        map.insert(desc.cli.name.to_string(), desc.id);
        for alias in desc.cli.aliases {
            map.insert((*alias).to_string(), desc.id);
        }
    }

    map
}

// ============================================================================
// Provider Registry
// ============================================================================

/// Global registry of provider descriptors, initialised on first access.
pub struct ProviderRegistry;

impl ProviderRegistry {
    /// Returns all provider descriptors.
    pub fn all() -> &'static [ProviderDescriptor] {
        DESCRIPTORS.get_or_init(init_descriptors)
    }

    /// Gets a provider descriptor by kind.
    pub fn get(id: ProviderKind) -> Option<&'static ProviderDescriptor> {
        Self::all().iter().find(|d| d.id == id)
    }

    /// Returns the CLI name to provider kind mapping.
    pub fn cli_name_map() -> &'static HashMap<String, ProviderKind> {
        CLI_NAME_MAP.get_or_init(|| build_cli_name_map(Self::all()))
    }

    /// Looks up a provider by CLI name or alias, ignoring case.
    pub fn get_by_cli_name(name: &str) -> Option<&'static ProviderDescriptor> {
        let kind = Self::cli_name_map().get(&name.to_ascii_lowercase())?;
        Self::get(*kind)
    }

    /// Returns the number of registered providers.
    pub fn count() -> usize {
        Self::all().len()
    }

    /// Returns all provider kinds.
    pub fn kinds() -> Vec<ProviderKind> {
        Self::all().iter().map(|d| d.id).collect()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_has_every_kind() {
        assert_eq!(ProviderRegistry::count(), ProviderKind::all().len());
        for kind in ProviderKind::all() {
            let desc = ProviderRegistry::get(*kind).unwrap();
            assert_eq!(desc.id, *kind);
            assert_eq!(desc.cli_name(), kind.cli_name());
        }
    }

    #[test]
    fn test_cli_name_lookup() {
        assert_eq!(ProviderRegistry::get_by_cli_name("trakt").unwrap().id, ProviderKind::Trakt);
        assert_eq!(ProviderRegistry::get_by_cli_name("TheMovieDB").unwrap().id, ProviderKind::Tmdb);
        assert_eq!(ProviderRegistry::get_by_cli_name("thetvdb").unwrap().id, ProviderKind::Tvdb);
        assert!(ProviderRegistry::get_by_cli_name("imdb").is_none());
    }

    #[test]
    fn test_every_api_is_consistent() {
        for desc in ProviderRegistry::all() {
            let api = desc.api();
            assert!(!api.is_empty(), "{} has no endpoints", desc.display_name());
            api.check().unwrap();
        }
    }
}
