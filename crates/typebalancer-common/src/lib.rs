//! TypeBalancer Common - Shared types and utilities
//!
//! This crate provides the error taxonomy and configuration types
//! used across all TypeBalancer components.

pub mod config;
pub mod error;

pub use config::{BalancerConfig, GapFillKind, StrategyKind};
pub use error::{Error, Result};
