mod check_command;
mod render_command;

use {
    clap::{Parser, Subcommand},
    tracing::debug,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "crossrelay", about = "crossrelay: Telegram/Discord message relay", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the route configuration and print the route table.
    Check {
        /// Config file (defaults to ./crossrelay.* then ~/.config/crossrelay/).
        #[arg(long, env = "CROSSRELAY_CONFIG")]
        config: Option<std::path::PathBuf>,
    },
    /// Render a StyledText JSON document in a destination dialect.
    Render {
        #[arg(long, value_enum)]
        dialect: render_command::DialectArg,
        /// Input file; reads stdin when omitted or `-`.
        file: Option<std::path::PathBuf>,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);
    debug!(version = env!("CARGO_PKG_VERSION"), "crossrelay starting");

    match cli.command {
        Commands::Check { config } => check_command::check(config.as_deref()),
        Commands::Render { dialect, file } => render_command::render(dialect, file.as_deref()),
    }
}
