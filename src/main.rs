//! sfdx-decomposer
//!
//! Splits Salesforce metadata files into one file per record for version
//! control, and composes them back into deployable files.

use anyhow::Result;
use clap::Parser;
use sfdx_decomposer::cli::{Cli, Command, compose, decompose, verify};
use sfdx_decomposer::config::{ConfigLoader, ConfigPaths};
use sfdx_decomposer::descriptor::DescriptorRegistry;
use sfdx_decomposer::logging::{self, LogTarget};
use tracing::debug;

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(&LogTarget::parse(&cli.log), cli.verbose)?;

    let mut paths = ConfigPaths::discover();
    if let Some(config_path) = &cli.config {
        paths = paths.with_explicit_file(config_path);
    }
    let loader = ConfigLoader::load_with_paths(paths)?;
    for (tier, path) in loader.sources() {
        debug!("Loaded {} config from {}", tier, path.display());
    }
    let config = loader.into_config();
    let registry = DescriptorRegistry::from_config(&config)?;

    match cli.command {
        Command::Decompose(args) => {
            decompose::run(&args, &config, &registry)?;
        }
        Command::Compose(args) => {
            compose::run(&args, &config, &registry)?;
        }
        Command::Verify(args) => {
            verify::run(&args, &config, &registry)?;
        }
        Command::Types => {
            for descriptor in registry.iter() {
                println!(
                    "{}\t{}/\t<{}>",
                    descriptor.id, descriptor.directory_name, descriptor.root_tag
                );
            }
        }
    }
    Ok(())
}
