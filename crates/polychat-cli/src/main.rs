//! Polychat CLI — entry point.
//!
//! # Commands
//!
//! - `polychat chat [-p PROVIDER] [-m MODEL] [-s PROMPT]` — interactive chat REPL
//! - `polychat status` — show configuration and provider credential status
//! - `polychat prompts <list|show|save|delete>` — manage system prompts
//! - `polychat chats <list|show|export|delete>` — manage saved chats
//! - `polychat dialogue -i MESSAGE [...]` — run a two-agent exchange

mod chats_cmd;
mod dialogue_cmd;
mod helpers;
mod prompts_cmd;
mod repl;
mod status;

use anyhow::Result;
use clap::{Parser, Subcommand};

use polychat_core::config::load_config;
use polychat_core::store::PromptStore;
use polychat_providers::{resolve, ChatClient, EnvCredentials};

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// Polychat — multi-provider LLM chat from the terminal
#[derive(Parser)]
#[command(name = "polychat", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat interactively with a provider
    Chat {
        /// Provider (internal or display name, e.g. "openai", "Anthropic")
        #[arg(short, long, default_value = "openai")]
        provider: String,

        /// Model identifier (defaults to the provider's first model)
        #[arg(short, long)]
        model: Option<String>,

        /// Stored system prompt to seed the conversation
        #[arg(short, long)]
        system: Option<String>,

        /// Disable streamed rendering
        #[arg(long, default_value_t = false)]
        no_stream: bool,

        /// Ask the provider for a JSON-object response
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Show configuration and provider credential status
    Status,

    /// Manage stored system prompts
    Prompts {
        #[command(subcommand)]
        action: prompts_cmd::PromptCommands,
    },

    /// Manage saved chats
    Chats {
        #[command(subcommand)]
        action: chats_cmd::ChatCommands,
    },

    /// Run a two-agent dialogue
    Dialogue {
        #[command(flatten)]
        args: dialogue_cmd::DialogueArgs,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Chat {
            provider,
            model,
            system,
            no_stream,
            json,
            logs,
        } => {
            init_logging(logs);
            run_chat(provider, model, system, no_stream, json).await
        }
        Commands::Status => {
            init_logging(false);
            status::run()
        }
        Commands::Prompts { action } => {
            init_logging(false);
            prompts_cmd::dispatch(action)
        }
        Commands::Chats { action } => {
            init_logging(false);
            chats_cmd::dispatch(action)
        }
        Commands::Dialogue { args, logs } => {
            init_logging(logs);
            dialogue_cmd::run(args).await
        }
    }
}

// ─────────────────────────────────────────────
// Chat command
// ─────────────────────────────────────────────

async fn run_chat(
    provider: String,
    model: Option<String>,
    system: Option<String>,
    no_stream: bool,
    json: bool,
) -> Result<()> {
    let config = load_config(None);

    let spec = resolve(&provider)?;
    let model = match model {
        Some(m) => m,
        None => spec.models[0].to_string(),
    };

    let api_base = config.api_base(spec.name).map(str::to_string);
    let client = ChatClient::new(spec.name, &model, Box::new(EnvCredentials), api_base)?;

    let mut gen_config = config.generation_config();
    if no_stream {
        gen_config.stream = false;
    }
    if json {
        gen_config.json_mode = true;
    }

    let system_prompt = match system {
        Some(name) => Some(PromptStore::new(None)?.load(&name)?.body),
        None => None,
    };

    repl::run(client, gen_config, system_prompt).await
}

/// Initialize tracing/logging.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("polychat=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
