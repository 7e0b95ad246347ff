//! Verify subcommand.
//!
//! Optionally composes every type first, then checks that each baseline
//! file has a byte-identical counterpart under the output directory.

use super::compose::{ComposeArgs, run as run_compose};
use super::TargetArgs;
use crate::config::Config;
use crate::descriptor::DescriptorRegistry;
use crate::verify::{VerifyReport, verify_hashes};
use anyhow::{Result, bail};
use clap::Args;
use std::path::PathBuf;

/// Arguments for the verify subcommand
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Directory of expected composed files
    #[arg(short, long, value_name = "DIR")]
    pub baseline: PathBuf,

    /// Directory to search for composed files (defaults to the configured output directory)
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Compose every configured type before comparing
    #[arg(long)]
    pub compose: bool,
}

/// Run the verify subcommand. Fails when any baseline file is unmatched.
pub fn run(args: &VerifyArgs, config: &Config, registry: &DescriptorRegistry) -> Result<VerifyReport> {
    let output_dir = args.output.clone().unwrap_or_else(|| config.output_dir.clone());
    if args.compose {
        let compose_args = ComposeArgs {
            target: TargetArgs {
                metadata_type: None,
                all: true,
                output: Some(output_dir.clone()),
            },
        };
        run_compose(&compose_args, config, registry)?;
    }

    if !args.baseline.is_dir() {
        bail!("Baseline directory {} does not exist", args.baseline.display());
    }
    let report = verify_hashes(&args.baseline, &output_dir)?;
    if !report.is_success() {
        bail!(
            "{} baseline file(s) have no match in {}",
            report.unmatched.len(),
            output_dir.display()
        );
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Config, DescriptorRegistry) {
        let temp = TempDir::new().unwrap();
        let fragment = temp
            .path()
            .join("out/workflows/Case/rules/Escalate.rules-meta.xml");
        fs::create_dir_all(fragment.parent().unwrap()).unwrap();
        fs::write(&fragment, "<rules><fullName>Escalate</fullName></rules>").unwrap();
        fs::create_dir_all(temp.path().join("baselines")).unwrap();
        let config = Config::default();
        let registry = DescriptorRegistry::from_config(&config).unwrap();
        (temp, config, registry)
    }

    #[test]
    fn test_compose_then_verify_against_own_output() {
        let (temp, config, registry) = setup();
        let args = VerifyArgs {
            baseline: temp.path().join("baselines"),
            output: Some(temp.path().join("out")),
            compose: true,
        };
        // Empty baseline succeeds, and the compose step ran.
        run(&args, &config, &registry).unwrap();
        let composed = temp.path().join("out/workflows/Case.workflow-meta.xml");
        assert!(composed.is_file());

        fs::copy(&composed, temp.path().join("baselines/Case.workflow-meta.xml")).unwrap();
        let report = run(&args, &config, &registry).unwrap();
        assert_eq!(report.matched.len(), 1);
    }

    #[test]
    fn test_mismatch_is_an_error() {
        let (temp, config, registry) = setup();
        fs::write(temp.path().join("baselines/Case.workflow-meta.xml"), "<other/>").unwrap();
        let args = VerifyArgs {
            baseline: temp.path().join("baselines"),
            output: Some(temp.path().join("out")),
            compose: true,
        };
        assert!(run(&args, &config, &registry).is_err());
    }

    #[test]
    fn test_missing_baseline_is_an_error() {
        let (temp, config, registry) = setup();
        let args = VerifyArgs {
            baseline: temp.path().join("nowhere"),
            output: Some(temp.path().join("out")),
            compose: false,
        };
        assert!(run(&args, &config, &registry).is_err());
    }
}
