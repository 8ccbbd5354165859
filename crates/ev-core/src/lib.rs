//! Shared types for the EV registration dashboard.
//!
//! Holds the record model, derived view types, engine configuration, CLI
//! settings and the error type used across the workspace.

pub mod config;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;

pub use error::{EvError, Result};
