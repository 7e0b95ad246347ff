//! sfdx-decomposer library
//!
//! Decomposes Salesforce metadata XML into per-record files and composes
//! them back. The binary in `main.rs` is a thin CLI over these modules.

pub mod classify;
pub mod cli;
pub mod compose;
pub mod config;
pub mod decompose;
pub mod descriptor;
pub mod error;
pub mod layout;
pub mod logging;
pub mod verify;
pub mod xml;
