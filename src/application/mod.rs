//! Application services: content rendering and session state.

pub mod credentials;
pub mod error;
pub mod render;
