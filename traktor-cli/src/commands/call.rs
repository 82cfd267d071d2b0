//! Call command - send a request to an endpoint.

use std::time::Duration;

use anyhow::Result;
use clap::Args;
use tracing::info;
use traktor_fetch::CacheOptions;
use traktor_store::SettingsStore;

use super::client::connect;
use super::{build_init, build_params, find_provider, parse_key_value};
use crate::output::{JsonFormatter, ResponseOutput, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the call command.
#[derive(Args)]
pub struct CallArgs {
    /// Provider (trakt, tmdb, tvdb).
    pub provider: String,

    /// Dotted endpoint path (e.g. `movies.summary`).
    pub endpoint: String,

    /// Call parameter as KEY=VALUE; JSON values are parsed.
    #[arg(long = "param", short = 'p', value_parser = parse_key_value)]
    pub params: Vec<(String, String)>,

    /// Extra request header as NAME=VALUE.
    #[arg(long = "header", short = 'H', value_parser = parse_key_value)]
    pub headers: Vec<(String, String)>,

    /// Use the endpoint's cached variant.
    #[arg(long)]
    pub cached: bool,

    /// Refresh the cache entry even if it is still fresh.
    #[arg(long, requires = "cached")]
    pub force: bool,

    /// Cache retention in seconds for this call.
    #[arg(long, value_name = "SECS", requires = "cached")]
    pub retention: Option<u64>,

    /// Drop the cache entry if the refresh fails.
    #[arg(long, requires = "cached")]
    pub evict_on_error: bool,

    /// Include response headers in the output.
    #[arg(long, short = 'i')]
    pub include_headers: bool,
}

impl CallArgs {
    /// Per-call cache options.
    pub fn cache_options(&self) -> CacheOptions {
        let mut options = if self.force {
            CacheOptions::forced()
        } else {
            CacheOptions::default()
        };
        if let Some(secs) = self.retention {
            options = options.with_retention(Duration::from_secs(secs));
        }
        if self.evict_on_error {
            options = options.with_evict_on_error(true);
        }
        options
    }
}

/// Runs the call command.
pub async fn run(args: &CallArgs, cli: &Cli) -> Result<()> {
    let desc = find_provider(&args.provider)?;
    let store = SettingsStore::load_default().await?;
    let client = connect(desc.id, &store).await?;

    let params = build_params(&args.params);
    let init = build_init(&args.headers);

    let response = if args.cached {
        client
            .call_cached(&args.endpoint, params, init, args.cache_options())
            .await?
    } else {
        client.call(&args.endpoint, params, init).await?
    };

    info!(
        provider = desc.display_name(),
        endpoint = %args.endpoint,
        status = response.status,
        from_cache = response.is_cache(),
        "Call complete"
    );

    let output = ResponseOutput::new(&response, args.include_headers);
    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_response(&output));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&output)?);
        }
    }

    Ok(())
}
