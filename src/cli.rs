//! Command-line interface definitions using clap derive macros.
//!
//! Contains the top-level [`Cli`] parser, the [`Commands`] enum for
//! subcommands (run, health), and their associated argument structs.
//! Gateway settings come from environment variables. The equivalent long
//! flags still parse for local runs but are hidden from `--help`.

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "bank-gateway",
    version,
    about = "HTTP gateway for upstream banking operations",
    propagate_version = true,
    args_conflicts_with_subcommands = true,
    after_help = "\x1b[1mQuick start:\x1b[0m\n  \
        EXTERNAL_BASE_URL=http://core:8080/api bank-gateway      Start on port 3000\n  \
        bank-gateway health http://localhost:3000               Probe a running instance"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    // Used when no subcommand is given.
    #[command(flatten)]
    pub run: RunArgs,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the gateway (default)
    Run(Box<RunArgs>),

    /// Check health of a running instance
    Health(HealthArgs),
}

#[derive(Args, Clone)]
#[command(after_help = "\x1b[1mEnvironment:\x1b[0m\n  \
        EXTERNAL_BASE_URL    Base address of the upstream banking system (required)\n  \
        PORT                 Listen port [default: 3000]\n  \
        HOST                 Listen address [default: 0.0.0.0]\n  \
        REQUEST_TIMEOUT_MS   Upstream call timeout in milliseconds [default: 8000]\n  \
        MAX_BODY_SIZE        Max request body size in bytes [default: 102400]\n  \
        LOG_LEVEL            trace, debug, info, warn or error [default: info]")]
pub struct RunArgs {
    /// Listen port
    #[arg(short, long, env = "PORT", default_value_t = 3000, hide = true)]
    pub port: u16,

    /// Listen address
    #[arg(long, env = "HOST", default_value = "0.0.0.0", hide = true)]
    pub host: String,

    /// Base address of the upstream banking system
    #[arg(short = 'u', long, env = "EXTERNAL_BASE_URL", hide = true)]
    pub upstream_url: Option<String>,

    // -- Logging --
    /// Log level
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info", hide = true)]
    pub log_level: LogLevel,

    /// Force pretty (human-readable) log output
    #[arg(long)]
    pub pretty: bool,

    /// Force JSON log output (overrides TTY detection)
    #[arg(long, conflicts_with = "pretty")]
    pub json: bool,

    // -- Observability --
    /// Sentry DSN (enables error tracking)
    #[cfg(feature = "sentry-integration")]
    #[arg(long, env = "SENTRY_DSN", help_heading = "Observability")]
    pub sentry_dsn: Option<String>,

    /// Sentry environment tag
    #[cfg(feature = "sentry-integration")]
    #[arg(long, env = "SENTRY_ENVIRONMENT", help_heading = "Observability")]
    pub sentry_environment: Option<String>,

    /// Upstream call timeout in milliseconds
    #[arg(
        long,
        env = "REQUEST_TIMEOUT_MS",
        default_value_t = crate::config::DEFAULT_TIMEOUT_MS,
        hide = true
    )]
    pub timeout: u64,

    /// Max request body size in bytes
    #[arg(
        long,
        env = "MAX_BODY_SIZE",
        default_value_t = 102_400,
        hide = true
    )]
    pub max_body: usize,
}

#[derive(Args)]
pub struct HealthArgs {
    /// URL of the running instance
    #[arg(default_value = "http://localhost:3000")]
    pub url: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    #[must_use]
    pub const fn to_tracing_level(&self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_is_the_default() {
        let cli = Cli::try_parse_from(["bank-gateway", "--upstream-url", "http://core:9000"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.run.upstream_url.as_deref(), Some("http://core:9000"));
    }

    #[test]
    fn health_subcommand_parses() {
        let cli = Cli::try_parse_from(["bank-gateway", "health", "http://gw:3000", "--json"]).unwrap();
        match cli.command {
            Some(Commands::Health(args)) => {
                assert_eq!(args.url, "http://gw:3000");
                assert!(args.json);
            }
            _ => panic!("expected health subcommand"),
        }
    }

    #[test]
    fn settings_are_documented_as_environment_variables() {
        use clap::CommandFactory;

        let mut cmd = Cli::command();
        let run = cmd.find_subcommand_mut("run").unwrap();
        let help = run.render_long_help().to_string();
        assert!(help.contains("EXTERNAL_BASE_URL"));
        assert!(help.contains("REQUEST_TIMEOUT_MS"));
        assert!(!help.contains("--upstream-url"));
        assert!(!help.contains("--timeout"));

        // Hidden flags still parse.
        let cli = Cli::try_parse_from(["bank-gateway", "--timeout", "250"]).unwrap();
        assert_eq!(cli.run.timeout, 250);
    }

    #[test]
    fn pretty_conflicts_with_json() {
        assert!(Cli::try_parse_from(["bank-gateway", "--pretty", "--json"]).is_err());
    }
}
