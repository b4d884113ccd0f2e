//! Integration tests module
//!
//! End-to-end tests for the daily delivery flow:
//! - Complete load → pick → assemble → deliver → record pipeline
//! - Rotation across several days with a persistent ledger
//! - Transport and ledger failure handling

pub mod error_scenarios;
pub mod fixtures;
pub mod pipeline_test;
