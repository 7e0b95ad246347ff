//! Decompose subcommand.
//!
//! Splits each canonical document of the selected types into per-record
//! fragments plus one simple-fields document per family.

use super::{TargetArgs, TypeSelection};
use crate::config::Config;
use crate::decompose::{DecomposeReport, decompose, decompose_all};
use crate::descriptor::DescriptorRegistry;
use anyhow::Result;
use clap::Args;
use tracing::info;

/// Arguments for the decompose subcommand
#[derive(Args, Debug)]
pub struct DecomposeArgs {
    #[command(flatten)]
    pub target: TargetArgs,
}

/// Run the decompose subcommand.
pub fn run(args: &DecomposeArgs, config: &Config, registry: &DescriptorRegistry) -> Result<DecomposeReport> {
    let output_root = args.target.output_root(&config.output_dir);
    let report = match args.target.selection() {
        TypeSelection::One(type_id) => decompose(registry, type_id, output_root)?,
        TypeSelection::All => decompose_all(registry, output_root)?,
    };
    info!(
        "Decomposed {} document(s) into {} fragment(s) and {} simple-fields file(s)",
        report.documents, report.fragments_written, report.simple_files_written
    );
    if report.parse_failures + report.unkeyable_skipped + report.write_failures > 0 {
        info!(
            "Skipped: {} unparseable document(s), {} unkeyable record(s), {} failed write(s)",
            report.parse_failures, report.unkeyable_skipped, report.write_failures
        );
    }
    Ok(report)
}
