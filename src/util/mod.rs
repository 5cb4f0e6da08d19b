//! Utility modules: logging, configuration and per-application directories

pub mod config;
pub mod dirs;
pub mod logger;
