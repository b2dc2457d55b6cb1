// ABOUTME: Command-line front end that resolves a connection string and prints the result
// ABOUTME: Mirrors what a file transfer client shows in its title bar and hands to its auth layer

use anyhow::{Context, Result};
use clap::Parser;
use sshtarget::config::Config;
use sshtarget::{ConnectionTarget, SystemEnvironment};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Resolve an SSH target against ~/.ssh/config
#[derive(Parser, Debug)]
#[command(name = "sshtarget", version)]
struct Cli {
    /// Target in [user@]host[:port] or [user@][ipv6]:port format
    #[arg(required_unless_present = "init")]
    target: Option<String>,

    /// Private key to use instead of the configured and conventional ones
    #[arg(short = 'i', long = "identity-file")]
    identity_file: Option<PathBuf>,

    /// Settings file (defaults to <config dir>/sshtarget/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the resolved target as JSON
    #[arg(long)]
    json: bool,

    /// Write a commented default settings file and exit
    #[arg(long, conflicts_with = "target")]
    init: bool,

    /// Log which config files and directives were used
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.init {
        let path = match cli.config {
            Some(path) => path,
            None => Config::default_config_path()?,
        };
        Config::save_default_config(&path)?;
        println!("Wrote default configuration to {}", path.display());
        return Ok(());
    }

    let config = load_config(cli.config.as_deref())?;
    let env = SystemEnvironment::from_config(&config);

    let entered = cli.target.context("No target given")?;
    let target = ConnectionTarget::resolve_with(&entered, cli.identity_file.as_deref(), &env)
        .with_context(|| format!("Failed to resolve target: {entered}"))?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&target)?);
    } else {
        print_target(&target);
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "sshtarget=debug" } else { "sshtarget=warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .init();
}

fn load_config(path: Option<&std::path::Path>) -> Result<Config> {
    match path {
        // An explicitly named file has to exist.
        Some(path) => {
            let config = Config::load_from_file(path)?;
            config.validate()?;
            Ok(config)
        }
        None => Config::load_or_default(&Config::default_config_path()?),
    }
}

fn print_target(target: &ConnectionTarget) {
    println!("target:         {target}");
    println!("collapsed:      {}", target.to_full_collapsed());
    println!("host:           {}", target.to_host_string());
    println!("host collapsed: {}", target.to_host_collapsed());
    println!("identity files:");
    for path in target.identity_files() {
        println!("  {}", path.display());
    }
}
