//! Route configuration: schema, loading, env substitution, validation.
//!
//! Config files: `crossrelay.toml`, `crossrelay.yaml`, or `crossrelay.json`,
//! searched in `./` then `~/.config/crossrelay/`.
//!
//! Supports `${ENV_VAR}` and `${ENV_VAR:-default}` substitution in the raw
//! document before parsing.

pub mod env_subst;
pub mod error;
pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    error::{Error, Result},
    loader::{LoadedConfig, config_dir, find_config_file, load, load_config, parse_config},
    schema::{
        DestinationConfig, DispatchConfig, RelayConfig, RouteConfig, RouteOptionsConfig,
        SourceConfig,
    },
    validate::{Diagnostic, Severity, ValidationResult, validate},
};
