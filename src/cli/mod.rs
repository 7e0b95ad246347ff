//! CLI command definitions for sfdx-decomposer
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

pub mod compose;
pub mod decompose;
pub mod verify;

use clap::{Args, Parser, Subcommand};
use compose::ComposeArgs;
use decompose::DecomposeArgs;
use std::path::{Path, PathBuf};
use verify::VerifyArgs;

/// Decompose Salesforce metadata into per-record files and compose it back
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Split metadata files into one file per record
    Decompose(DecomposeArgs),

    /// Reassemble decomposed records into deployable metadata files
    Compose(ComposeArgs),

    /// Compare composed files against a baseline directory by SHA-256
    Verify(VerifyArgs),

    /// List the configured metadata types
    Types,
}

/// Which metadata types a command runs on, and where.
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Metadata type id (e.g. labels, workflow, profile, permissionset)
    #[arg(
        short = 't',
        long = "metadata-type",
        value_name = "TYPE",
        required_unless_present = "all",
        conflicts_with = "all"
    )]
    pub metadata_type: Option<String>,

    /// Run on every configured metadata type
    #[arg(long)]
    pub all: bool,

    /// Output directory holding the metadata type folders (overrides config)
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,
}

/// Resolved type selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeSelection<'a> {
    One(&'a str),
    All,
}

impl TargetArgs {
    pub fn selection(&self) -> TypeSelection<'_> {
        match &self.metadata_type {
            Some(id) if !self.all => TypeSelection::One(id),
            _ => TypeSelection::All,
        }
    }

    /// The output root, falling back to the configured one.
    pub fn output_root<'a>(&'a self, configured: &'a Path) -> &'a Path {
        self.output.as_deref().unwrap_or(configured)
    }
}
