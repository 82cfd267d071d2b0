//! Cache command - inspect and clear the response cache.

use anyhow::Result;
use clap::{Args, Subcommand};
use tracing::info;
use traktor_core::{ApiNode, CacheStore, ProviderKind};
use traktor_fetch::cache::{cache_namespace, endpoint_key_prefix, provider_key_prefix};
use traktor_providers::ProviderDescriptor;
use traktor_providers::error::parse_endpoint;
use traktor_store::{CacheBackend, Settings, SettingsStore};

use super::find_provider;
use crate::output::JsonFormatter;
use crate::{Cli, OutputFormat};

/// Arguments for the cache command.
#[derive(Args)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub action: CacheAction,
}

/// Cache subcommands.
#[derive(Subcommand)]
pub enum CacheAction {
    /// Clear cached responses.
    ///
    /// Without options everything is cleared.
    Clear {
        /// Only clear entries of this provider.
        #[arg(long, conflicts_with = "key")]
        provider: Option<String>,

        /// Only clear entries of this endpoint (dotted path).
        #[arg(long, requires = "provider")]
        endpoint: Option<String>,

        /// Clear entries whose key starts with KEY.
        #[arg(long)]
        key: Option<String>,

        /// Treat KEY as an exact key instead of a prefix.
        #[arg(long, requires = "key")]
        exact: bool,
    },

    /// Show the cache backend and file.
    Path,
}

/// What to clear.
#[derive(Debug, PartialEq, Eq)]
enum ClearTarget {
    All,
    Key { key: String, exact: bool },
    Prefixes(Vec<String>),
}

/// Runs the cache command.
pub async fn run(args: &CacheArgs, cli: &Cli) -> Result<()> {
    match &args.action {
        CacheAction::Clear {
            provider,
            endpoint,
            key,
            exact,
        } => {
            let store = SettingsStore::load_default().await?;
            let settings = store.get().await;
            let target = clear_target(
                &settings,
                provider.as_deref(),
                endpoint.as_deref(),
                key.as_deref(),
                *exact,
            )?;
            clear(&settings, &target, cli).await
        }
        CacheAction::Path => show_path(cli).await,
    }
}

/// Key namespace of a provider's client built from `settings`.
fn configured_namespace(desc: &ProviderDescriptor, settings: &Settings) -> Result<String> {
    let configured = match desc.id {
        ProviderKind::Trakt => settings.trakt.endpoint.as_deref(),
        ProviderKind::Tmdb => settings.tmdb.endpoint.as_deref(),
        ProviderKind::Tvdb => settings.tvdb.endpoint.as_deref(),
    };
    let base = parse_endpoint(configured.unwrap_or(desc.metadata.default_endpoint))?;
    Ok(cache_namespace(desc.cli_name(), &base))
}

fn clear_target(
    settings: &Settings,
    provider: Option<&str>,
    endpoint: Option<&str>,
    key: Option<&str>,
    exact: bool,
) -> Result<ClearTarget> {
    if let Some(key) = key {
        return Ok(ClearTarget::Key {
            key: key.to_string(),
            exact,
        });
    }
    let Some(provider) = provider else {
        return Ok(ClearTarget::All);
    };

    let desc = find_provider(provider)?;
    let Some(path) = endpoint else {
        // Every host the provider was ever configured with
        return Ok(ClearTarget::Prefixes(vec![provider_key_prefix(desc.cli_name())]));
    };

    match desc.api().lookup(path) {
        Some(ApiNode::Endpoint(template)) if template.opts().cache.is_enabled() => {
            let namespace = configured_namespace(desc, settings)?;
            Ok(ClearTarget::Prefixes(vec![endpoint_key_prefix(&namespace, template)]))
        }
        Some(ApiNode::Endpoint(_)) => anyhow::bail!("Endpoint '{path}' is not cached"),
        _ => anyhow::bail!("Unknown {} endpoint: {path}", desc.display_name()),
    }
}

async fn clear(settings: &Settings, target: &ClearTarget, cli: &Cli) -> Result<()> {
    let cache = settings.cache.build_store();

    let removed = clear_store(cache.as_ref(), target).await?;
    info!(removed, store = cache.name(), "Cache cleared");

    match cli.format {
        OutputFormat::Text => {
            if !cli.quiet {
                println!(
                    "Removed {removed} cached response{}",
                    if removed == 1 { "" } else { "s" }
                );
            }
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&serde_json::json!({ "removed": removed }))?);
        }
    }
    Ok(())
}

async fn clear_store(cache: &dyn CacheStore, target: &ClearTarget) -> Result<usize> {
    let removed = match target {
        ClearTarget::All => cache.clear(None).await?,
        ClearTarget::Key { key, exact: true } => usize::from(cache.delete(key).await?),
        ClearTarget::Key { key, exact: false } => cache.clear(Some(key)).await?,
        ClearTarget::Prefixes(prefixes) => {
            let mut removed = 0;
            for prefix in prefixes {
                removed += cache.clear(Some(prefix)).await?;
            }
            removed
        }
    };
    Ok(removed)
}

async fn show_path(cli: &Cli) -> Result<()> {
    let store = SettingsStore::load_default().await?;
    let cache = store.cache().await;
    let file = match cache.backend {
        CacheBackend::File => Some(cache.file_path()),
        CacheBackend::Memory => None,
    };

    match cli.format {
        OutputFormat::Text => {
            println!("Backend: {}", cache.backend);
            match &file {
                Some(path) => println!("File:    {}", path.display()),
                None => println!("File:    (in-memory, not persisted)"),
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "backend": cache.backend,
                "file": file.map(|p| p.display().to_string()),
            });
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&output)?);
        }
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use traktor_core::{CacheEntry, Response};
    use traktor_store::MemoryCacheStore;

    #[test]
    fn test_clear_targets() {
        let settings = Settings::default();
        assert_eq!(
            clear_target(&settings, None, None, None, false).unwrap(),
            ClearTarget::All
        );
        assert_eq!(
            clear_target(&settings, None, None, Some("GET /x"), true).unwrap(),
            ClearTarget::Key {
                key: "GET /x".into(),
                exact: true
            }
        );

        let ClearTarget::Prefixes(prefixes) =
            clear_target(&settings, Some("trakt"), Some("movies.summary"), None, false).unwrap()
        else {
            panic!("expected prefixes");
        };
        assert_eq!(prefixes.len(), 1);
        assert!(prefixes[0].starts_with("trakt@https://api.trakt.tv/|GET /movies/:id"));

        assert_eq!(
            clear_target(&settings, Some("themoviedb"), None, None, false).unwrap(),
            ClearTarget::Prefixes(vec!["tmdb@".into()])
        );
    }

    #[test]
    fn test_clear_target_follows_configured_endpoint() {
        let mut settings = Settings::default();
        settings.trakt.endpoint = Some("https://api-staging.trakt.tv".into());

        let ClearTarget::Prefixes(prefixes) =
            clear_target(&settings, Some("trakt"), Some("movies.summary"), None, false).unwrap()
        else {
            panic!("expected prefixes");
        };
        assert!(prefixes[0].starts_with("trakt@https://api-staging.trakt.tv/|"));
    }

    #[test]
    fn test_clear_target_errors() {
        let settings = Settings::default();
        let err = clear_target(&settings, Some("trakt"), Some("sync.history.add"), None, false)
            .unwrap_err();
        assert!(err.to_string().contains("not cached"));

        let err =
            clear_target(&settings, Some("trakt"), Some("movies.nope"), None, false).unwrap_err();
        assert!(err.to_string().contains("Unknown"));
    }

    #[tokio::test]
    async fn test_clear_store() {
        let store = MemoryCacheStore::new();
        for key in [
            "trakt@https://api.trakt.tv/|GET /movies/:id?|a",
            "trakt@https://api.trakt.tv/|GET /movies/:id?|b",
            "tmdb@https://api.themoviedb.org/3|GET /movie/:id|a",
        ] {
            store
                .set(key, CacheEntry::new(Response::new("u", 200), Utc::now()))
                .await
                .unwrap();
        }

        let exact = ClearTarget::Key {
            key: "tmdb@https://api.themoviedb.org/3|GET /movie/:id|a".into(),
            exact: true,
        };
        assert_eq!(clear_store(&store, &exact).await.unwrap(), 1);

        let prefixes = ClearTarget::Prefixes(vec!["trakt@".into()]);
        assert_eq!(clear_store(&store, &prefixes).await.unwrap(), 2);
        assert!(store.is_empty().await);
    }
}
