//! Command implementations for the CLI
//!
//! - start: Start the HTTP server
//! - test: Test configuration validity
//! - config: Configuration display
//! - user: User account management

pub mod config;
pub mod start;
pub mod user;
