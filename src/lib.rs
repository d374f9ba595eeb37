//! Content rendering and authenticated API client core for the BridgeUs
//! community site.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
