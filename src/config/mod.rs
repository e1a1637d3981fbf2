//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Core config struct definitions (Config, ClientOptions, IdentityConfig, ConnectionConfig)
//! - [`defaults`]: serde default functions and the guest identity
//! - [`validation`]: Startup checks returning every problem found

pub mod defaults;
mod types;
mod validation;

pub use types::{
    ClientOptions, Config, ConfigError, ConnectionConfig, Credentials, IdentityConfig, StoreConfig,
};
pub use validation::{ValidationError, validate};
