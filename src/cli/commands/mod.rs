//! Command implementations

pub mod config;
pub mod render;
pub mod search;
