//! Layered configuration.
//!
//! Consolidates configuration from several tiers with field-by-field YAML merging:
//! 1. **Defaults** - Built-in metadata types (labels, workflow, profile, permissionset)
//! 2. **Project** - `$CWD/sfdx-decomposer/config.yaml`
//! 3. **User** - `~/.sfdx-decomposer/config.yaml`
//! 4. **Environment** - `SFDX_DECOMPOSER_OUTPUT_DIR`
//!
//! ## Environment Variables
//! - `SFDX_DECOMPOSER_CONFIG_PATH` - Explicit config file (replaces project and user tiers)
//! - `SFDX_DECOMPOSER_OUTPUT_DIR` - Output root
//! - `SFDX_DECOMPOSER_PROJECT_DIR` - Project config dir (default: `./sfdx-decomposer`)
//! - `SFDX_DECOMPOSER_USER_DIR` - User config dir (default: `~/.sfdx-decomposer`)

mod loader;
mod merge;
mod types;

pub use loader::{
    CONFIG_PATH_ENV, ConfigLoader, ConfigPaths, ConfigTier, OUTPUT_DIR_ENV, PROJECT_DIR_ENV,
    USER_DIR_ENV,
};
pub use merge::deep_merge;
pub use types::*;
