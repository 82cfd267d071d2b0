//! Endpoints command - list a provider's endpoint tree.

use anyhow::Result;
use clap::Args;
use tracing::info;

use super::find_provider;
use crate::output::{EndpointOutput, JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the endpoints command.
#[derive(Args)]
pub struct EndpointsArgs {
    /// Provider (trakt, tmdb, tvdb).
    pub provider: String,

    /// Only list endpoints under this dotted prefix (e.g. `sync.history`).
    #[arg(long)]
    pub prefix: Option<String>,
}

/// Runs the endpoints command.
pub fn run(args: &EndpointsArgs, cli: &Cli) -> Result<()> {
    let desc = find_provider(&args.provider)?;
    info!(provider = desc.display_name(), "Listing endpoints");

    let api = desc.api();
    let endpoints: Vec<EndpointOutput> = api
        .endpoints()
        .into_iter()
        .filter(|(path, _)| matches_prefix(path, args.prefix.as_deref()))
        .map(|(path, template)| EndpointOutput::new(path, template))
        .collect();

    if endpoints.is_empty() {
        if let Some(prefix) = &args.prefix {
            anyhow::bail!("No {} endpoints under '{prefix}'", desc.display_name());
        }
    }

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_endpoints(desc.display_name(), &endpoints));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&endpoints)?);
        }
    }

    Ok(())
}

/// Returns true if `path` is `prefix` or lies under it.
fn matches_prefix(path: &str, prefix: Option<&str>) -> bool {
    match prefix {
        None => true,
        Some(prefix) => {
            path == prefix
                || path
                    .strip_prefix(prefix)
                    .is_some_and(|rest| rest.starts_with('.'))
        }
    }
}
