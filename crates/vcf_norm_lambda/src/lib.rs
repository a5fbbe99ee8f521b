//! AWS-oriented adapters and handlers for VCF normalisation.
//!
//! This crate owns runtime integration details (the Lambda handler, scratch
//! workspace, storage and process adapters) on top of the contract, key, and
//! command primitives in `vcf_norm_core`.

pub mod adapters;
pub mod error;
pub mod handlers;
pub mod workspace;
