mod cmd;
mod output;

use clap::{Parser, Subcommand};
use cmd::config::ConfigSubcommand;
use cmd::Settings;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "selflow",
    about = "SelFlow central brain: chat, gated system commands and health",
    version,
    propagate_version = true
)]
struct Cli {
    /// Path to the brain config (YAML)
    #[arg(long, global = true, env = "SELFLOW_CONFIG")]
    config: Option<PathBuf>,

    /// Override the generation model name
    #[arg(long, global = true)]
    model: Option<String>,

    /// Override the Ollama server URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send one message to the brain
    Chat {
        message: String,

        /// Conversational mode: chat, system_control, agent_orchestration, embryo_training
        #[arg(long, default_value = "chat")]
        context_type: String,

        /// Print fragments as they are generated
        #[arg(long, conflicts_with = "agent")]
        stream: bool,

        /// Route through the user interface agent. The stand-alone binary
        /// registers no agent, so this falls back to direct generation
        /// unless a host process installs one with
        /// `BrainBuilder::user_interface`.
        #[arg(long)]
        agent: bool,
    },

    /// Translate a natural-language command and act on its disposition
    ///
    /// Needs a system controller. The stand-alone binary registers none, so
    /// this reports "SystemController not available" unless a host process
    /// installs one with `BrainBuilder::system_controller`.
    Command {
        #[arg(required = true, num_args = 1..)]
        words: Vec<String>,
    },

    /// Show aggregate health
    Health,

    /// Show usage insights
    Insights,

    /// Print a one-line status summary
    Status,

    /// Serve the HTTP API
    Serve {
        #[arg(long, default_value = "8000")]
        port: u16,
    },

    /// Inspect the configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let settings = Settings {
        config: cli.config,
        model: cli.model,
        base_url: cli.base_url,
    };

    let result = match cli.command {
        Commands::Chat {
            message,
            context_type,
            stream,
            agent,
        } => cmd::chat::run(&settings, &message, &context_type, stream, agent, cli.json),
        Commands::Command { words } => cmd::command::run(&settings, &words.join(" "), cli.json),
        Commands::Health => cmd::status::health(&settings, cli.json),
        Commands::Insights => cmd::status::insights(&settings, cli.json),
        Commands::Status => cmd::status::summary(&settings, cli.json),
        Commands::Serve { port } => cmd::serve::run(&settings, port),
        Commands::Config { subcommand } => cmd::config::run(&settings, subcommand, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
