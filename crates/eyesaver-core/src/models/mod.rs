//! Data models: colors, render modes and configuration.

pub mod color;
pub mod config;
pub mod mode;
