//! Resolve command - print the URL a call would use.

use anyhow::Result;
use clap::Args;
use tracing::info;
use traktor_store::SettingsStore;

use super::client::connect;
use super::{build_params, find_provider, parse_key_value};
use crate::output::JsonFormatter;
use crate::{Cli, OutputFormat};

/// Arguments for the resolve command.
#[derive(Args)]
pub struct ResolveArgs {
    /// Provider (trakt, tmdb, tvdb).
    pub provider: String,

    /// Dotted endpoint path (e.g. `movies.summary`).
    pub endpoint: String,

    /// Call parameter as KEY=VALUE; JSON values are parsed.
    #[arg(long = "param", short = 'p', value_parser = parse_key_value)]
    pub params: Vec<(String, String)>,
}

/// Runs the resolve command.
pub async fn run(args: &ResolveArgs, cli: &Cli) -> Result<()> {
    let desc = find_provider(&args.provider)?;
    let store = SettingsStore::load_default().await?;
    let client = connect(desc.id, &store).await?;

    let url = client.resolve(&args.endpoint, build_params(&args.params))?;
    info!(provider = desc.display_name(), endpoint = %args.endpoint, "Resolved URL");

    match cli.format {
        OutputFormat::Text => println!("{url}"),
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            let output = serde_json::json!({
                "provider": desc.cli_name(),
                "endpoint": args.endpoint,
                "url": url.as_str(),
            });
            println!("{}", formatter.format(&output)?);
        }
    }

    Ok(())
}
