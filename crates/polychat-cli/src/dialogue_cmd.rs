//! `polychat dialogue` — run a two-agent exchange and print the transcript.
//!
//! Each agent gets its own provider, model, and system prompt (a stored
//! prompt name, or literal text via `--*-text`). The first agent is seeded
//! with the initial message and the agents then alternate for a fixed
//! number of turns.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use polychat_core::config::load_config;
use polychat_core::store::PromptStore;
use polychat_core::types::GenerationConfig;
use polychat_dialogue::{Dialogue, DialogueAgent};
use polychat_providers::{resolve, ChatClient, EnvCredentials};

/// Arguments for the dialogue command.
#[derive(Args)]
pub struct DialogueArgs {
    /// First agent's provider
    #[arg(long, default_value = "openai")]
    first_provider: String,

    /// First agent's model (defaults to the provider's first model)
    #[arg(long)]
    first_model: Option<String>,

    /// First agent's system prompt, as a stored prompt name
    #[arg(long, conflicts_with = "first_text")]
    first_prompt: Option<String>,

    /// First agent's system prompt, as literal text
    #[arg(long)]
    first_text: Option<String>,

    /// Second agent's provider
    #[arg(long, default_value = "openai")]
    second_provider: String,

    /// Second agent's model (defaults to the provider's first model)
    #[arg(long)]
    second_model: Option<String>,

    /// Second agent's system prompt, as a stored prompt name
    #[arg(long, conflicts_with = "second_text")]
    second_prompt: Option<String>,

    /// Second agent's system prompt, as literal text
    #[arg(long)]
    second_text: Option<String>,

    /// Message that seeds the exchange (addressed to the first agent)
    #[arg(short, long)]
    initial: String,

    /// Number of turns to run
    #[arg(short, long, default_value_t = 6)]
    turns: u32,

    /// Write the transcript to a JSON file when done
    #[arg(long)]
    save: Option<std::path::PathBuf>,
}

/// Run the dialogue command.
pub async fn run(args: DialogueArgs) -> Result<()> {
    let config = load_config(None);
    let prompts = PromptStore::new(None)?;

    let first_prompt = resolve_prompt(&prompts, &args.first_prompt, &args.first_text)?;
    let second_prompt = resolve_prompt(&prompts, &args.second_prompt, &args.second_text)?;

    let first_client = make_client(&args.first_provider, &args.first_model, &config)?;
    let second_client = make_client(&args.second_provider, &args.second_model, &config)?;

    let first = DialogueAgent::new("Agent 1", first_prompt, first_client);
    let second = DialogueAgent::new("Agent 2", second_prompt, second_client);
    let mut dialogue = Dialogue::new(first, second);

    // The dialogue loop accumulates internally, so stream per-turn is off.
    let gen_config = GenerationConfig {
        stream: false,
        ..config.generation_config()
    };

    let outcome = dialogue
        .conduct(&args.initial, args.turns, &gen_config)
        .await
        .map(|_| ());

    for turn in dialogue.history() {
        let label = if turn.speaker == "user" {
            turn.speaker.green().bold()
        } else {
            turn.speaker.cyan().bold()
        };
        println!();
        println!("{} {label}", format!("[{}]", turn.turn).dimmed());
        println!("{}", turn.message);
    }
    println!();

    if let Some(path) = &args.save {
        let json = serde_json::to_string_pretty(dialogue.history())?;
        std::fs::write(path, json).with_context(|| format!("cannot write {}", path.display()))?;
        println!("  {} Transcript written to {}", "✓".green(), path.display());
    }

    outcome.context("dialogue aborted early")
}

/// System prompt from a stored name, literal text, or a bland default.
fn resolve_prompt(
    store: &PromptStore,
    name: &Option<String>,
    text: &Option<String>,
) -> Result<String> {
    match (name, text) {
        (Some(name), _) => Ok(store.load(name)?.body),
        (None, Some(text)) => Ok(text.clone()),
        (None, None) => Ok("You are a helpful assistant.".to_string()),
    }
}

fn make_client(
    provider: &str,
    model: &Option<String>,
    config: &polychat_core::config::Config,
) -> Result<Arc<ChatClient>> {
    let spec = resolve(provider)?;
    let model = match model {
        Some(m) => m.clone(),
        None => spec.models[0].to_string(),
    };
    let api_base = config.api_base(spec.name).map(str::to_string);
    let client = ChatClient::new(spec.name, &model, Box::new(EnvCredentials), api_base)?;
    Ok(Arc::new(client))
}
