//! Data layer for the EV registration dashboard.
//!
//! Loads CSV registration records, filters them by county, computes the
//! trend / distribution / ranked-average views and pages the listing.

pub mod aggregator;
pub mod analysis;
pub mod classifier;
pub mod filter;
pub mod pager;
pub mod reader;

pub use ev_core as core;
