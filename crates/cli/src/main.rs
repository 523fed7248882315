//! `recon`: one full reconciliation pass from raw payloads to the comparison dataset.

mod cli;

use anyhow::{bail, Context};
use clap::Parser;
use recon_assembler::{write_dataset, FsRawSource, ReconciliationAssembler};
use recon_core::Config;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::Cli;

fn init_tracing(log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_json_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::default(),
    };
    cli.apply(&mut config);
    config.validate().context("invalid configuration")?;
    Ok(config)
}

/// Run the pass. Missing input root or output directory aborts before any
/// payload is read.
fn run(config: &Config, dry_run: bool) -> anyhow::Result<()> {
    let root = &config.input.root;
    if !root.is_dir() {
        bail!("input root {} does not exist", root.display());
    }
    if !dry_run {
        if let Some(parent) = config.output.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.is_dir() {
                bail!("output directory {} does not exist", parent.display());
            }
        }
    }

    let assembler = ReconciliationAssembler::from_config(config)?;
    info!(
        chains = assembler.chains().len(),
        aliases = config.aliases.values().map(|m| m.len()).sum::<usize>(),
        input = %root.display(),
        "starting reconciliation pass"
    );

    let source = FsRawSource::new(root);
    let assembly = assembler.assemble(&source)?;
    assembly.stats.log_summary();

    if dry_run {
        info!("dry run, output not written");
        return Ok(());
    }
    write_dataset(&config.output.path, &assembly.dataset, config.output.pretty)
        .with_context(|| format!("writing {}", config.output.path.display()))?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let config = load_config(&cli)?;
    run(&config, cli.dry_run)
}
