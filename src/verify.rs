//! Hash verification of composed output against a baseline corpus.
//!
//! Every baseline file must have a counterpart in the output directory with
//! the same file name and the same SHA-256 digest. Output files with no
//! baseline counterpart are ignored.

use crate::error::{Error, Result};
use crate::layout::{collect_files, file_name};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Outcome of a verification run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifyReport {
    /// Baseline files that found an identical output file.
    pub matched: Vec<PathBuf>,
    /// Baseline files with no identical output file.
    pub unmatched: Vec<PathBuf>,
}

impl VerifyReport {
    pub fn is_success(&self) -> bool {
        self.unmatched.is_empty()
    }
}

/// Hex SHA-256 of a file's contents.
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = File::open(path).map_err(|e| Error::read(path, e))?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher).map_err(|e| Error::read(path, e))?;
    Ok(hex::encode(hasher.finalize()))
}

/// Compare every file under `baseline_dir` against the files under `output_dir`.
pub fn verify_hashes(baseline_dir: &Path, output_dir: &Path) -> Result<VerifyReport> {
    // file name -> (baseline path, digest), several baselines may share a name
    let mut pending: HashMap<String, Vec<(PathBuf, String)>> = HashMap::new();
    let mut baseline_files = Vec::new();
    collect_files(baseline_dir, &mut baseline_files)?;
    for path in baseline_files {
        let digest = sha256_file(&path)?;
        pending.entry(file_name(&path)).or_default().push((path, digest));
    }

    let mut report = VerifyReport::default();
    let mut output_files = Vec::new();
    if output_dir.is_dir() {
        collect_files(output_dir, &mut output_files)?;
    }
    for path in output_files {
        let name = file_name(&path);
        let Some(candidates) = pending.get_mut(&name) else {
            continue;
        };
        let digest = sha256_file(&path)?;
        if let Some(index) = candidates.iter().position(|(_, d)| *d == digest) {
            let (baseline, _) = candidates.remove(index);
            info!("Hash match for file {name}");
            report.matched.push(baseline);
        }
    }

    let mut unmatched: Vec<PathBuf> = pending
        .into_values()
        .flatten()
        .map(|(path, _)| path)
        .collect();
    unmatched.sort();
    for path in &unmatched {
        warn!(
            "Hash mismatch: File {} in {} has no match in {}",
            file_name(path),
            baseline_dir.display(),
            output_dir.display()
        );
    }
    report.unmatched = unmatched;
    report.matched.sort();

    if report.is_success() {
        info!(
            "Success: All files in {} have matches in {}.",
            baseline_dir.display(),
            output_dir.display()
        );
    }
    Ok(report)
}
