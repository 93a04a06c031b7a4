use std::{fmt::Write as _, path::Path};

use {
    anyhow::{Result, bail},
    crossrelay_config::{Severity, find_config_file, load_config, validate},
    crossrelay_routing::RouteTable,
};

/// ANSI color codes.
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Validate the config, report diagnostics on stderr and print the route
/// table on stdout. Any error diagnostic makes the command fail.
pub fn check(explicit: Option<&Path>) -> Result<()> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => find_config_file().ok_or(crossrelay_config::Error::NotFound)?,
    };
    eprintln!("Checking {}\n", path.display());

    let config = load_config(&path)?;
    let result = validate(&config);

    for d in &result.diagnostics {
        let (color, label) = match d.severity {
            Severity::Error => (RED, "error"),
            Severity::Warning => (YELLOW, "warning"),
        };
        eprintln!("  {BOLD}{color}{label}{RESET} {}: {}", d.path, d.message);
    }

    let errors = result.count(Severity::Error);
    let warnings = result.count(Severity::Warning);
    if !result.diagnostics.is_empty() {
        eprintln!();
    }
    if errors > 0 {
        bail!("{errors} error(s), {warnings} warning(s) in {}", path.display());
    }
    if warnings == 0 {
        eprintln!("No issues found.\n");
    } else {
        eprintln!("{warnings} warning(s)\n");
    }

    let table = RouteTable::from_config(&config)?;
    print!("{}", format_table(&table));
    Ok(())
}

/// One line per route: id, state, source, destinations and options.
fn format_table(table: &RouteTable) -> String {
    let width = table.iter().map(|r| r.id.len()).max().unwrap_or(0);
    let mut out = String::new();
    for route in table.iter() {
        let destinations = route
            .destinations
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        let options = &route.options;
        let _ = write!(
            out,
            "{:<width$}  {:<8}  {} -> {}  delay={}ms window={}ms",
            route.id,
            if route.enabled { "enabled" } else { "disabled" },
            route.source,
            destinations,
            options.delay.as_millis(),
            options.batch_window.as_millis(),
        );
        if options.include_source_footer {
            out.push_str(" footer");
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {super::*, crossrelay_config::parse_config};

    #[test]
    fn table_lists_every_route() {
        let config = parse_config(
            r#"
            [[routes]]
            id = "news"
            source = { network = "telegram", chat_id = -100, handle = "@News" }
            destinations = [
                { network = "discord", chat_id = 42 },
                { network = "telegram", user = "ops" },
            ]
            options = { delay_ms = 250, include_source_footer = true }

            [[routes]]
            id = "dc"
            enabled = false
            source = { network = "discord", handle = "general" }
            destinations = [{ network = "telegram", chat_id = 7 }]
            "#,
            Path::new("crossrelay.toml"),
        )
        .unwrap();
        let table = RouteTable::from_config(&config).unwrap();

        assert_eq!(
            format_table(&table),
            "news  enabled   telegram chat -100 @news -> discord chat 42, telegram user ops  \
             delay=250ms window=1000ms footer\n\
             dc    disabled  discord #general -> telegram chat 7  delay=0ms window=1000ms\n"
        );
    }

    #[test]
    fn check_fails_on_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crossrelay.toml");
        std::fs::write(
            &path,
            r#"
            [[routes]]
            id = "x"
            source = { network = "discord" }
            destinations = [{ network = "telegram", chat_id = 1 }]
            "#,
        )
        .unwrap();
        assert!(check(Some(&path)).is_err());
    }

    #[test]
    fn check_accepts_valid_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crossrelay.yaml");
        std::fs::write(
            &path,
            "routes:\n  - id: y\n    source: { network: discord, chat_id: 1 }\n    destinations: [{ network: telegram, chat_id: 2 }]\n",
        )
        .unwrap();
        check(Some(&path)).unwrap();
    }
}
