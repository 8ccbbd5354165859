//! Runtime layer for the EV registration dashboard.
//!
//! Owns the ingestion lifecycle and the interactive session state (group
//! selection, listing position, memoized views).

pub mod dashboard;
pub mod data_manager;

pub use ev_core as core;
pub use ev_data as data;
