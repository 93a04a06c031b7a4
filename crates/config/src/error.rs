use std::path::PathBuf;

use crate::validate::Diagnostic;

/// Configuration failures. All of them are fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("unsupported config format: .{extension}")]
    UnsupportedFormat { extension: String },

    #[error("no config file found (looked for crossrelay.toml/.yaml/.yml/.json)")]
    NotFound,

    #[error("invalid configuration: {}", summarize(diagnostics))]
    Invalid { diagnostics: Vec<Diagnostic> },
}

fn summarize(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(|d| format!("{}: {}", d.path, d.message))
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, Error>;
