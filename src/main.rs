//! Sorts media files into per-label folders.
//!
//! Usage:
//!     shelve [OPTIONS] <ROOT>

use clap::{ArgAction, Parser};
use shelve_config::{Config, Delay};
use shelve_library::Context;
use shelve_library::resolve::{HttpResolver, HttpSettings};
use shelve_library::scan::Extensions;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const CRATES: [&str; 5] = ["shelve", "shelve_config", "shelve_extract", "shelve_library", "shelve_storage"];

#[derive(Parser, Debug)]
#[command(name = "shelve", version, about = "Sort media files into per-label folders")]
struct Args {
    /// Directory to organize; label folders are created directly inside it
    root: PathBuf,

    /// Configuration file (TOML, YAML or JSON), layered over the defaults
    #[arg(short, long, env = "SHELVE_CONFIG")]
    config: Option<PathBuf>,

    /// Maximum number of files in flight at once
    #[arg(short = 'j', long)]
    concurrency: Option<NonZeroUsize>,

    /// Lookup service root
    #[arg(long)]
    base_url: Option<String>,

    /// Skip the randomized delay before each lookup
    #[arg(long)]
    no_delay: bool,

    /// Increase log verbosity (-v debug, -vv trace); ignored when RUST_LOG is set
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    if !args.root.is_dir() {
        eprintln!("error: not a directory: {}", args.root.display());
        return ExitCode::FAILURE;
    }

    let config = match configure(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: invalid configuration: {e:?}");
            return ExitCode::FAILURE;
        },
    };

    let resolver = match HttpResolver::new(&settings(&config)) {
        Ok(resolver) => resolver,
        Err(e) => {
            eprintln!("error: {e:?}");
            return ExitCode::FAILURE;
        },
    };
    let Some(max_concurrency) = NonZeroUsize::new(config.max_concurrency) else {
        eprintln!("error: max_concurrency must be at least 1");
        return ExitCode::FAILURE;
    };
    let ctx = Context::new(Arc::new(resolver))
        .with_removables(config.remove_strings)
        .with_extensions(Extensions::new(&config.extensions))
        .with_max_concurrency(max_concurrency);

    match shelve_library::run(&ctx, &args.root).await {
        Ok(stats) => {
            println!("{stats}");
            ExitCode::SUCCESS
        },
        Err(e) => {
            eprintln!("error: {e:?}");
            ExitCode::FAILURE
        },
    }
}

fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        };
        let directives: Vec<String> = CRATES.iter().map(|name| format!("{name}={level}")).collect();
        EnvFilter::new(format!("warn,{}", directives.join(",")))
    });
    tracing_subscriber::registry().with(filter).with(tracing_subscriber::fmt::layer().with_target(false)).init();
}

/// Loads layered configuration and applies command-line overrides on top.
fn configure(args: &Args) -> shelve_config::error::Result<Config> {
    let mut config = shelve_config::load(args.config.as_deref())?;
    if let Some(concurrency) = args.concurrency {
        config.max_concurrency = concurrency.get();
    }
    if let Some(base_url) = &args.base_url {
        config.lookup.base_url.clone_from(base_url);
    }
    if args.no_delay {
        config.lookup.delay = Delay::NONE;
    }
    config.validated()
}

fn settings(config: &Config) -> HttpSettings {
    HttpSettings {
        base_url: config.lookup.base_url.clone(),
        timeout: Duration::from_secs(config.lookup.timeout_secs),
        min_delay: Duration::from_millis(config.lookup.delay.min_ms),
        max_delay: Duration::from_millis(config.lookup.delay.max_ms),
        user_agent: config.lookup.user_agent.clone(),
        accept: config.lookup.accept.clone(),
        accept_language: config.lookup.accept_language.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("shelve").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }

    #[test]
    fn test_overrides() {
        let parsed = args(&["-j", "2", "--base-url", "http://localhost:8080/", "--no-delay", "-vv", "/media"]);
        assert_eq!(parsed.root, PathBuf::from("/media"));
        assert_eq!(parsed.verbose, 2);

        let config = configure(&parsed).unwrap();
        assert_eq!(config.max_concurrency, 2);
        assert_eq!(config.lookup.base_url, "http://localhost:8080");
        assert_eq!(config.lookup.delay, Delay::NONE);

        let settings = settings(&config);
        assert_eq!(settings.max_delay, Duration::ZERO);
        assert_eq!(settings.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        assert!(Args::try_parse_from(["shelve", "-j", "0", "/media"]).is_err());
    }
}
