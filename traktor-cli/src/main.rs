// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! Traktor CLI - explore and call the Trakt, TMDB and TVDB APIs.
//!
//! # Examples
//!
//! ```bash
//! # List providers
//! traktor providers
//!
//! # List a provider's endpoints
//! traktor endpoints trakt
//!
//! # Show the URL a call would use
//! traktor resolve tmdb movies.details --param id=550
//!
//! # Call an endpoint through the cache
//! traktor call trakt movies.trending --param limit=5 --cached
//!
//! # JSON output
//! traktor --format json --pretty call tvdb series.base --param id=81189
//!
//! # Drop cached responses
//! traktor cache clear --provider trakt --endpoint movies.trending
//! ```

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use traktor_fetch::ClientError;
use traktor_providers::ProviderError;
use traktor_store::{LogLevel, Settings, default_settings_path, load_json};

use commands::{cache, call, config, endpoints, providers, resolve};

// ============================================================================
// CLI Definition
// ============================================================================

/// Traktor CLI - typed, cached access to Trakt, TMDB and TVDB.
#[derive(Parser)]
#[command(name = "traktor")]
#[command(about = "Explore and call the Trakt, TMDB and TVDB APIs")]
#[command(long_about = r#"
Traktor binds declarative endpoint definitions to Trakt, TMDB and TVDB and
calls them with optional response caching.

Supported providers:
  • Trakt (trakt)
  • The Movie Database (tmdb)
  • TheTVDB (tvdb)

Credentials are read from the settings file (see `traktor config path`).

Examples:
  traktor endpoints trakt                           # Endpoint tree
  traktor resolve tmdb movies.details -p id=550     # URL only
  traktor call trakt movies.trending --cached       # Cached call
  traktor cache clear                               # Drop the cache
"#)]
#[command(version)]
#[command(author = "Traktor Contributors")]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// List available providers.
    #[command(visible_alias = "p")]
    Providers,

    /// List a provider's endpoints.
    #[command(visible_alias = "e")]
    Endpoints(endpoints::EndpointsArgs),

    /// Resolve the URL of a call without sending it.
    #[command(visible_alias = "r")]
    Resolve(resolve::ResolveArgs),

    /// Call an endpoint.
    #[command(visible_alias = "c")]
    Call(call::CallArgs),

    /// Manage the response cache.
    Cache(cache::CacheArgs),

    /// Manage configuration.
    Config(config::ConfigArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[repr(i32)]
pub enum ExitCode {
    /// General error.
    Error = 1,
    /// The request could not be built (parameters, credentials).
    InvalidRequest = 2,
    /// The server answered with an error.
    RequestFailed = 3,
}

impl ExitCode {
    /// Picks the exit code for an error.
    fn for_error(error: &anyhow::Error) -> Self {
        let client = error
            .downcast_ref::<ClientError>()
            .or_else(|| match error.downcast_ref::<ProviderError>() {
                Some(ProviderError::Client(e)) => Some(e),
                _ => None,
            });

        match (client, error.downcast_ref::<ProviderError>()) {
            (Some(e), _) if e.is_configuration() => Self::InvalidRequest,
            (Some(ClientError::AuthenticationRequired(_)), _) => Self::InvalidRequest,
            (Some(e), _) if e.status().is_some() => Self::RequestFailed,
            (Some(ClientError::Envelope(_)), _) => Self::RequestFailed,
            (None, Some(_)) => Self::InvalidRequest,
            _ => Self::Error,
        }
    }
}

// ============================================================================
// Logging Setup
// ============================================================================

/// Filter directives: `--verbose` wins, then the stored log level.
fn log_filter(verbose: bool, stored: LogLevel) -> String {
    if verbose {
        "traktor=debug,info".to_string()
    } else {
        format!("traktor={}", stored.as_directive())
    }
}

/// Log level from the settings file; an unreadable file keeps the default
/// and is reported by the command that loads it.
async fn stored_log_level() -> LogLevel {
    load_json::<Settings>(&default_settings_path())
        .await
        .map(|settings| settings.log_level)
        .unwrap_or_default()
}

fn setup_logging(verbose: bool, quiet: bool, stored: LogLevel) {
    if quiet {
        return;
    }

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(EnvFilter::new(log_filter(verbose, stored)))
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let stored = if cli.verbose || cli.quiet {
        LogLevel::default()
    } else {
        stored_log_level().await
    };
    setup_logging(cli.verbose, cli.quiet, stored);

    let result = match &cli.command {
        Commands::Providers => providers::run(&cli),
        Commands::Endpoints(args) => endpoints::run(args, &cli),
        Commands::Resolve(args) => resolve::run(args, &cli).await,
        Commands::Call(args) => call::run(args, &cli).await,
        Commands::Cache(args) => cache::run(args, &cli).await,
        Commands::Config(args) => config::run(args, &cli).await,
    };

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e:#}");
        }
        std::process::exit(ExitCode::for_error(&e) as i32);
    }

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use traktor_core::Response;

    #[test]
    fn test_parse_call() {
        let cli = Cli::try_parse_from([
            "traktor",
            "--format",
            "json",
            "call",
            "tmdb",
            "movies.details",
            "-p",
            "id=550",
            "--param",
            "language=en-US",
            "-H",
            "x-trace=1",
            "--cached",
            "--retention",
            "60",
        ])
        .unwrap();

        assert_eq!(cli.format, OutputFormat::Json);
        let Commands::Call(args) = &cli.command else {
            panic!("expected call");
        };
        assert_eq!(args.provider, "tmdb");
        assert_eq!(args.params.len(), 2);
        assert_eq!(args.headers[0], ("x-trace".to_string(), "1".to_string()));
        let options = args.cache_options();
        assert!(!options.force);
        assert_eq!(options.retention, Some(std::time::Duration::from_secs(60)));
    }

    #[test]
    fn test_cache_flags_require_cached() {
        let forced =
            Cli::try_parse_from(["traktor", "call", "trakt", "movies.trending", "--force"]);
        assert!(forced.is_err());

        let bad_param =
            Cli::try_parse_from(["traktor", "call", "trakt", "movies.trending", "-p", "bad"]);
        assert!(bad_param.is_err());
    }

    #[test]
    fn test_parse_cache_clear() {
        let cli = Cli::try_parse_from([
            "traktor",
            "cache",
            "clear",
            "--provider",
            "trakt",
            "--endpoint",
            "movies.summary",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Cache(_)));

        let without_provider =
            Cli::try_parse_from(["traktor", "cache", "clear", "--endpoint", "movies.summary"]);
        assert!(without_provider.is_err());
        assert!(Cli::try_parse_from(["traktor", "cache", "clear", "--exact"]).is_err());
    }

    #[test]
    fn test_log_filter() {
        assert_eq!(log_filter(false, LogLevel::default()), "traktor=warn");
        assert_eq!(log_filter(false, LogLevel::Debug), "traktor=debug");
        assert_eq!(log_filter(true, LogLevel::Error), "traktor=debug,info");
    }

    #[test]
    fn test_exit_codes() {
        let missing = ClientError::MissingPathParameter("id".into());
        let invalid = anyhow::Error::new(ProviderError::from(missing));
        assert!(matches!(ExitCode::for_error(&invalid), ExitCode::InvalidRequest));

        let unknown = anyhow::Error::new(ProviderError::UnknownEndpoint("x".into()));
        assert!(matches!(ExitCode::for_error(&unknown), ExitCode::InvalidRequest));

        let response = Box::new(Response::new("u", 500));
        let failed = anyhow::Error::new(ClientError::Response(response));
        assert!(matches!(ExitCode::for_error(&failed), ExitCode::RequestFailed));

        let transport = anyhow::Error::new(ClientError::Transport("reset".into()));
        assert!(matches!(ExitCode::for_error(&transport), ExitCode::Error));
    }
}
