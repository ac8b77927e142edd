//! # decisiontrace-contracts
//!
//! Shared types for the DecisionTrace audit log.
//!
//! All crates in the workspace import from here. No I/O or hashing lives in
//! this crate, only data definitions and error types.

pub mod error;
pub mod record;
pub mod report;
