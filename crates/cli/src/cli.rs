//! Command-line interface

use std::path::PathBuf;

use clap::Parser;
use recon_core::Config;

/// Cross-reference two providers' DeFi positions and write the comparison dataset
#[derive(Parser, Debug)]
#[command(name = "recon")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (JSON)
    #[arg(short, long, env = "RECON_CONFIG")]
    pub config: Option<PathBuf>,

    /// Root directory of raw provider payloads
    #[arg(short, long, env = "RECON_INPUT")]
    pub input: Option<PathBuf>,

    /// Path of the comparison dataset to write
    #[arg(short, long, env = "RECON_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Only process these addresses (repeatable)
    #[arg(long = "allow", value_name = "ADDRESS")]
    pub allow: Vec<String>,

    /// Write compact JSON
    #[arg(long)]
    pub compact: bool,

    /// Run the pass and log the summary without writing output
    #[arg(long)]
    pub dry_run: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RECON_LOG_LEVEL")]
    pub log_level: String,
}

impl Cli {
    /// Apply command-line overrides on top of the loaded configuration.
    pub fn apply(&self, config: &mut Config) {
        if let Some(input) = &self.input {
            config.input.root = input.clone();
        }
        if let Some(output) = &self.output {
            config.output.path = output.clone();
        }
        if !self.allow.is_empty() {
            config.address_allow_list = Some(self.allow.clone());
        }
        if self.compact {
            config.output.pretty = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["recon"]).unwrap();
        assert!(cli.allow.is_empty());
        assert!(!cli.dry_run);
        assert_eq!(cli.log_level, "info");

        let mut config = Config::default();
        cli.apply(&mut config);
        assert!(config.address_allow_list.is_none());
        assert!(config.output.pretty);
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::try_parse_from([
            "recon",
            "--input",
            "/tmp/raw",
            "--output",
            "/tmp/out.json",
            "--allow",
            "0xabc",
            "--allow",
            "0xdef",
            "--compact",
        ])
        .unwrap();

        let mut config = Config::default();
        cli.apply(&mut config);
        assert_eq!(config.input.root, PathBuf::from("/tmp/raw"));
        assert_eq!(config.output.path, PathBuf::from("/tmp/out.json"));
        assert_eq!(
            config.address_allow_list,
            Some(vec!["0xabc".to_string(), "0xdef".to_string()])
        );
        assert!(!config.output.pretty);
    }
}
