use std::io;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use sigfind::cli::{setup, Cli};
use sigfind::config::{load_config, SigfindConfig};
use sigfind::resolver::{expand_patterns, Importer, PackageLocator};
use tracing::{debug, info};

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup::init_logging(cli.verbosity);

    if let Err(usage) = cli.validate() {
        eprintln!("{}", usage);
        eprintln!("{}", Cli::command().render_help());
        std::process::exit(1);
    }

    let config = build_config(&cli)?;
    debug!(?config, "effective configuration");

    let locator = PackageLocator::from_config(&config);
    let packages = expand_patterns(&cli.package_patterns(), &locator);
    debug!(packages = packages.len(), "expanded package patterns");

    let mut importer = Importer::new(locator).with_fallback(config.metadata_fallback);
    let stdout = io::stdout();
    let stderr = io::stderr();
    let outcome = sigfind::run_search(
        &mut importer,
        &packages,
        &cli.filter(),
        &mut stdout.lock(),
        &mut stderr.lock(),
    )?;
    info!(
        packages = packages.len(),
        declarations = outcome.declarations,
        errors = outcome.errors,
        groups = outcome.matches.package_count(),
        matched = outcome.matches.signature_count(),
        "search finished"
    );

    Ok(())
}

// Config file, then environment, then flags
fn build_config(cli: &Cli) -> Result<SigfindConfig> {
    let mut config = load_config(cli.config.as_deref())?;
    config.apply_env(|key| std::env::var_os(key));
    cli.apply_overrides(&mut config);

    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    Ok(config.with_default_root(cwd))
}
