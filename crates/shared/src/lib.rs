//! Shared types, errors, and configuration for Vatsplit.
//!
//! This crate provides common building blocks used by the pricing engine
//! and by the components that embed it:
//! - Money rounding primitives with decimal precision
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, PricingConfig};
pub use error::{AppError, AppResult};
