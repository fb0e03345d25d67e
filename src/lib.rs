// ABOUTME: Library root for skylift - exposes public types for testing.
// ABOUTME: The main binary is in main.rs.

pub mod build;
pub mod config;
pub mod deploy;
pub mod error;
pub mod report;
pub mod stack;
pub mod types;
pub mod validate;
