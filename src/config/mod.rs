//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: startup config loaded from TOML (Config, ClientConfig, ServerBlock)
//! - [`validation`]: checks run after parsing, reporting every problem at once
//! - [`options`]: the typed option store read and written at runtime

mod defaults;
pub mod options;
mod types;
pub mod validation;

pub use options::{
    Color, OptionDef, OptionEntry, OptionKind, OptionStore, OptionValue, Section, SetError,
    ValueError,
};
pub use types::{ClientConfig, Config, ConfigError, ServerBlock};
pub use validation::ValidationError;
