use std::{io::Read as _, path::Path};

use {
    anyhow::{Context as _, Result},
    clap::ValueEnum,
    crossrelay_common::{Network, StyledText},
    crossrelay_markup::{dialect_for, render as render_markup},
    tracing::warn,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DialectArg {
    /// Discord Markdown.
    Discord,
    /// Telegram HTML.
    Telegram,
}

impl From<DialectArg> for Network {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Discord => Self::Discord,
            DialectArg::Telegram => Self::Telegram,
        }
    }
}

/// Read a `StyledText` document from `file` (or stdin) and print it rendered.
pub fn render(dialect: DialectArg, file: Option<&Path>) -> Result<()> {
    let raw = match file {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        },
    };
    println!("{}", render_document(&raw, dialect)?);
    Ok(())
}

fn render_document(raw: &str, dialect: DialectArg) -> Result<String> {
    let text: StyledText = serde_json::from_str(raw).context("input is not a StyledText document")?;
    let len = text.char_len();
    for span in &text.spans {
        if let Err(e) = span.check_bounds(len) {
            warn!(error = %e, "span will be ignored");
        }
    }
    Ok(render_markup(
        &text.body,
        &text.spans,
        dialect_for(dialect.into()),
    ))
}
