//! Shared VCF normalisation domain primitives.
//!
//! This crate owns the invocation contract, object key derivation, and the
//! assembly of the `bcftools norm` command line. It intentionally excludes
//! AWS SDK, Lambda runtime, and process execution concerns.

pub mod command;
pub mod config;
pub mod contract;
pub mod storage_keys;
