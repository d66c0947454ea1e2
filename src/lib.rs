//! Composed Vars Library
//!
//! This module exports the core components for testing and integration.

pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod host;
pub mod logging;
pub mod plugin;
