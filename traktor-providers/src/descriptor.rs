//! Provider descriptor system.
//!
//! A descriptor holds the static facts about a provider:
//! - Metadata (display name, default endpoint, documentation)
//! - CLI names and aliases
//! - The endpoint tree

use traktor_core::{Namespace, ProviderKind};

// ============================================================================
// Provider Descriptor
// ============================================================================

/// Static description of a provider.
#[derive(Debug)]
pub struct ProviderDescriptor {
    /// Provider identifier.
    pub id: ProviderKind,
    /// Display metadata.
    pub metadata: ProviderMetadata,
    /// CLI naming.
    pub cli: CliConfig,
    /// Builds the provider's endpoint tree.
    pub api: fn() -> Namespace,
}

impl ProviderDescriptor {
    /// Returns the display name.
    pub fn display_name(&self) -> &str {
        self.metadata.display_name
    }

    /// Returns the CLI name.
    pub fn cli_name(&self) -> &str {
        self.cli.name
    }

    /// Builds the endpoint tree.
    pub fn api(&self) -> Namespace {
        (self.api)()
    }
}

// ============================================================================
// Metadata
// ============================================================================

/// Display metadata.
#[derive(Debug, Clone)]
pub struct ProviderMetadata {
    /// Human-readable name.
    pub display_name: &'static str,
    /// Production API base URL.
    pub default_endpoint: &'static str,
    /// API documentation.
    pub docs_url: &'static str,
    /// How requests are authenticated.
    pub auth_scheme: &'static str,
}

// ============================================================================
// CLI Config
// ============================================================================

/// CLI naming.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Primary name.
    pub name: &'static str,
    /// Alternative names.
    pub aliases: &'static [&'static str],
}
