use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::{
    env_subst::substitute_env,
    error::{Error, Result},
    schema::RelayConfig,
    validate::{Severity, ValidationResult, validate},
};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "crossrelay.toml",
    "crossrelay.yaml",
    "crossrelay.yml",
    "crossrelay.json",
];

/// A parsed, validated config plus where it came from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: RelayConfig,
    pub path: PathBuf,
    /// Warnings survive here; errors never do, they abort [`load`].
    pub validation: ValidationResult,
}

/// Read `path`, substitute `${ENV}` placeholders and parse it by extension.
pub fn load_config(path: &Path) -> Result<RelayConfig> {
    let raw = std::fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Locate (unless `explicit` is given), load and validate the config.
///
/// Validation errors are fatal. Warnings are logged and kept on the result.
pub fn load(explicit: Option<&Path>) -> Result<LoadedConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => find_config_file().ok_or(Error::NotFound)?,
    };
    debug!(path = %path.display(), "loading config");

    let config = load_config(&path)?;
    let validation = validate(&config);
    if validation.has_errors() {
        return Err(Error::Invalid {
            diagnostics: validation.errors().cloned().collect(),
        });
    }
    for diagnostic in validation.warnings() {
        warn!(
            path = %diagnostic.path,
            category = diagnostic.category,
            "{}",
            diagnostic.message
        );
    }
    info!(
        path = %path.display(),
        routes = config.routes.len(),
        warnings = validation.count(Severity::Warning),
        "config loaded"
    );

    Ok(LoadedConfig {
        config,
        path,
        validation,
    })
}

/// Find the first config file in standard locations.
///
/// Search order:
/// 1. `./crossrelay.{toml,yaml,yml,json}` (project-local)
/// 2. `~/.config/crossrelay/crossrelay.{toml,yaml,yml,json}` (user-global)
pub fn find_config_file() -> Option<PathBuf> {
    if let Some(path) = first_existing(Path::new(".")) {
        return Some(path);
    }
    config_dir().and_then(|dir| first_existing(&dir))
}

fn first_existing(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.exists())
}

/// Returns the user-global config directory (`~/.config/crossrelay/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "crossrelay").map(|d| d.config_dir().to_path_buf())
}

/// Parse `raw` according to the extension of `path` (TOML when absent).
pub fn parse_config(raw: &str, path: &Path) -> Result<RelayConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");
    let parse_err = |message: String| Error::Parse {
        path: path.to_path_buf(),
        message,
    };

    match ext {
        "toml" => toml::from_str(raw).map_err(|e| parse_err(e.to_string())),
        "yaml" | "yml" => serde_yaml::from_str(raw).map_err(|e| parse_err(e.to_string())),
        "json" => serde_json::from_str(raw).map_err(|e| parse_err(e.to_string())),
        _ => Err(Error::UnsupportedFormat {
            extension: ext.to_string(),
        }),
    }
}
