//! Sandbox module containing all execution-related components.

pub mod config;
pub mod executor;
pub mod io;
pub mod manifest;
pub(crate) mod vm;
