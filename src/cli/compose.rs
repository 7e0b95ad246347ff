//! Compose subcommand.

use super::{TargetArgs, TypeSelection};
use crate::compose::{ComposeReport, compose, compose_all};
use crate::config::Config;
use crate::descriptor::DescriptorRegistry;
use anyhow::Result;
use clap::Args;
use tracing::info;

/// Arguments for the compose subcommand
#[derive(Args, Debug)]
pub struct ComposeArgs {
    #[command(flatten)]
    pub target: TargetArgs,
}

/// Run the compose subcommand.
pub fn run(args: &ComposeArgs, config: &Config, registry: &DescriptorRegistry) -> Result<ComposeReport> {
    let output_root = args.target.output_root(&config.output_dir);
    let namespace = config.namespace.as_str();
    let report = match args.target.selection() {
        TypeSelection::One(type_id) => compose(registry, type_id, output_root, namespace)?,
        TypeSelection::All => compose_all(registry, output_root, namespace)?,
    };
    info!(
        "Composed {} file(s) from {} fragment(s)",
        report.families_written, report.fragments_merged
    );
    Ok(report)
}
