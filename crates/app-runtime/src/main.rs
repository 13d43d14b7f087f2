//! # Spit Counter
//!
//! Command line front end for the counter application. Each invocation
//! restores the persisted bus state, runs one command and prints the result.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (env, then CLI overrides)
//! 2. Install logging
//! 3. Open storage and replay persisted topics
//! 4. Run the command, print state
//! 5. Flush storage and shut the bus down

use anyhow::Result;
use app_runtime::config::parse_topic_list;
use app_runtime::{logging, App, AppState, Command, RuntimeConfig};
use app_services::ToastVariant;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::debug;

/// Spit Counter: a persisted counter with toasts
#[derive(Parser, Debug)]
#[command(name = "spit-counter")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Storage file (overrides SC_STORAGE_PATH)
    #[arg(long)]
    storage: Option<PathBuf>,

    /// Log level or filter directive (overrides SC_LOG_LEVEL)
    #[arg(long)]
    log_level: Option<String>,

    /// Emit JSON logs
    #[arg(long)]
    json_logs: bool,

    /// Comma separated topics that are never persisted
    #[arg(long)]
    exclude: Option<String>,

    #[command(subcommand)]
    command: Option<Cmd>,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Print the current state
    Show,
    /// Add to the counter
    Increment {
        #[arg(short, long, default_value = "1")]
        times: u32,
    },
    /// Set the counter back to zero
    Reset,
    /// Show a toast
    Toast {
        text: String,
        #[arg(short, long, value_enum, default_value = "info")]
        variant: VariantArg,
    },
    /// Remove the toast at a position
    Dismiss { index: usize },
    /// Clear every topic
    ClearAll,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum VariantArg {
    Info,
    Warning,
    Error,
    Success,
}

impl From<VariantArg> for ToastVariant {
    fn from(arg: VariantArg) -> Self {
        match arg {
            VariantArg::Info => ToastVariant::Info,
            VariantArg::Warning => ToastVariant::Warning,
            VariantArg::Error => ToastVariant::Error,
            VariantArg::Success => ToastVariant::Success,
        }
    }
}

impl From<Cmd> for Command {
    fn from(cmd: Cmd) -> Self {
        match cmd {
            Cmd::Show => Command::Show,
            Cmd::Increment { times } => Command::Increment { times },
            Cmd::Reset => Command::Reset,
            Cmd::Toast { text, variant } => Command::Toast {
                message: text,
                variant: variant.into(),
            },
            Cmd::Dismiss { index } => Command::Dismiss { index },
            Cmd::ClearAll => Command::ClearAll,
        }
    }
}

impl Args {
    fn into_config(self, mut config: RuntimeConfig) -> (RuntimeConfig, Command) {
        if let Some(path) = self.storage {
            config.storage_path = path;
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }
        if self.json_logs {
            config.json_logs = true;
        }
        if let Some(raw) = self.exclude {
            config.excluded_topics = parse_topic_list(&raw);
        }
        let command = self.command.map(Command::from).unwrap_or(Command::Show);
        (config, command)
    }
}

fn print_state(state: &AppState) {
    println!("count: {}", state.count);
    if state.toasts.is_empty() {
        println!("toasts: none");
        return;
    }
    println!("toasts:");
    for (index, toast) in state.toasts.iter().enumerate() {
        println!("  [{}] {:?}: {}", index, toast.variant, toast.message);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let (config, command) = Args::parse().into_config(RuntimeConfig::from_env());
    logging::init_logging(&config)?;
    debug!(?config, "Configuration loaded");

    let app = App::start(&config)?;
    let state = app.execute(command)?;
    print_state(&state);

    app.shutdown()
}
