//! Presenza Lessons Service Library
//!
//! This library exposes service internals for integration testing.
//! The main entry point for running the server is the `presenza` binary.

pub mod config;
pub mod db;
pub mod error;
pub mod lessons;
pub mod models;
pub mod routes;
pub mod state;

pub use config::Config;
pub use state::AppState;
