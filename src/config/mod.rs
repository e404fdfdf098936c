//! Configuration module.
//!
//! This module contains configuration types and constants used throughout
//! the application.

pub mod constants;
pub mod types;

pub use constants::*;
pub use types::{Config, LogLevel, ProviderSettings};
