//! Interactive chat REPL.
//!
//! Uses `rustyline` for readline-style editing with persistent history.
//! Besides plain messages, the loop understands a handful of slash
//! commands for managing the running conversation:
//!
//! - `/save [name]` — save the conversation (timestamp name when omitted)
//! - `/load <name>` — replace the conversation with a saved one
//! - `/clear` — drop all messages, keeping nothing
//! - `/system <name>` — set the system prompt from the prompt store
//! - `/export [file]` — write the conversation as download-ready JSON
//! - `/help` — show the command list

use anyhow::Result;
use colored::Colorize;
use futures::StreamExt;
use rustyline::config::Configurer;
use rustyline::history::DefaultHistory;
use rustyline::{DefaultEditor, Editor};
use tracing::debug;

use polychat_core::store::{ChatStore, PromptStore};
use polychat_core::types::{Conversation, GenerationConfig};
use polychat_providers::ChatClient;

use crate::helpers;

/// Exit commands (case-insensitive match).
const EXIT_COMMANDS: &[&str] = &["exit", "quit", "/exit", "/quit", ":q"];

/// One parsed line of REPL input.
#[derive(Debug, PartialEq)]
enum ReplInput<'a> {
    Exit,
    Help,
    Save(Option<&'a str>),
    Load(&'a str),
    Clear,
    System(&'a str),
    Export(Option<&'a str>),
    /// Unknown slash command.
    Unknown(&'a str),
    Message(&'a str),
}

fn parse_input(line: &str) -> ReplInput<'_> {
    let trimmed = line.trim();
    if EXIT_COMMANDS.contains(&trimmed.to_lowercase().as_str()) {
        return ReplInput::Exit;
    }
    if !trimmed.starts_with('/') {
        return ReplInput::Message(trimmed);
    }

    let (cmd, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((cmd, rest)) => (cmd, rest.trim()),
        None => (trimmed, ""),
    };
    let arg = if rest.is_empty() { None } else { Some(rest) };

    match cmd {
        "/help" => ReplInput::Help,
        "/save" => ReplInput::Save(arg),
        "/load" => match arg {
            Some(name) => ReplInput::Load(name),
            None => ReplInput::Unknown("/load needs a chat name"),
        },
        "/clear" => ReplInput::Clear,
        "/system" => match arg {
            Some(name) => ReplInput::System(name),
            None => ReplInput::Unknown("/system needs a prompt name"),
        },
        "/export" => ReplInput::Export(arg),
        _ => ReplInput::Unknown(cmd),
    }
}

/// Run the interactive REPL loop.
pub async fn run(
    client: ChatClient,
    gen_config: GenerationConfig,
    system_prompt: Option<String>,
) -> Result<()> {
    helpers::print_banner(client.provider_name(), client.model());

    let chats = ChatStore::new(None)?;
    let prompts = PromptStore::new(None)?;

    let mut conversation = match system_prompt {
        Some(prompt) => Conversation::with_system(prompt),
        None => Conversation::new(),
    };

    let mut editor = create_editor()?;

    loop {
        let line = match editor.readline("You: ") {
            Ok(line) => line,
            Err(rustyline::error::ReadlineError::Interrupted)
            | Err(rustyline::error::ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Input error: {e}");
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }
        let _ = editor.add_history_entry(&line);

        match parse_input(&line) {
            ReplInput::Exit => {
                println!("\nGoodbye!");
                break;
            }
            ReplInput::Help => print_help(),
            ReplInput::Save(name) => match chats.save(conversation.messages(), name) {
                Ok(saved) => println!("  {} Saved as '{}'", "✓".green(), saved.cyan()),
                Err(e) => helpers::print_error(&e),
            },
            ReplInput::Load(name) => match chats.load(name) {
                Ok(record) => {
                    conversation = Conversation::from_messages(record.messages);
                    println!(
                        "  {} Loaded '{}' ({} messages)",
                        "✓".green(),
                        name.cyan(),
                        conversation.len()
                    );
                }
                Err(e) => helpers::print_error(&e),
            },
            ReplInput::Clear => {
                conversation.clear();
                println!("  {} Conversation cleared", "✓".green());
            }
            ReplInput::System(name) => match prompts.load(name) {
                Ok(record) => {
                    conversation.set_system(record.body);
                    println!("  {} System prompt set to '{}'", "✓".green(), record.name.cyan());
                }
                Err(e) => helpers::print_error(&e),
            },
            ReplInput::Export(file) => match ChatStore::export(conversation.messages()) {
                Ok(json) => {
                    let path = file.map(str::to_string).unwrap_or_else(|| {
                        format!("chat_{}.json", polychat_core::utils::file_timestamp())
                    });
                    match std::fs::write(&path, json) {
                        Ok(()) => println!("  {} Exported to {}", "✓".green(), path.cyan()),
                        Err(e) => helpers::print_error(&e),
                    }
                }
                Err(e) => helpers::print_error(&e),
            },
            ReplInput::Unknown(what) => {
                println!("  {} {} (try /help)", "?".yellow(), what);
            }
            ReplInput::Message(text) => {
                conversation.push_user(text);
                debug!(messages = conversation.len(), "sending conversation");

                let reply = if gen_config.stream {
                    stream_reply(&client, &conversation, &gen_config).await
                } else {
                    let result = client.complete(conversation.messages(), &gen_config).await;
                    if let Ok(text) = &result {
                        helpers::print_response(text);
                    }
                    result
                };

                match reply {
                    Ok(text) => conversation.push_assistant(text),
                    Err(e) => helpers::print_error(&e),
                }
            }
        }
    }

    save_history(&mut editor);
    Ok(())
}

/// Stream a reply to stdout as deltas arrive, returning the full text.
async fn stream_reply(
    client: &ChatClient,
    conversation: &Conversation,
    gen_config: &GenerationConfig,
) -> polychat_core::error::Result<String> {
    use std::io::Write;

    let mut stream = client.stream_text(conversation.messages(), gen_config).await?;

    println!();
    helpers::print_assistant_label();

    let mut text = String::new();
    while let Some(delta) = stream.next().await {
        match delta {
            Ok(chunk) => {
                print!("{chunk}");
                let _ = std::io::stdout().flush();
                text.push_str(&chunk);
            }
            Err(e) => {
                println!();
                return Err(e);
            }
        }
    }
    println!("\n");
    Ok(text)
}

fn print_help() {
    println!();
    println!("  {:<18} save the conversation (timestamp name when omitted)", "/save [name]".bold());
    println!("  {:<18} replace the conversation with a saved chat", "/load <name>".bold());
    println!("  {:<18} drop all messages", "/clear".bold());
    println!("  {:<18} set the system prompt from the prompt store", "/system <name>".bold());
    println!("  {:<18} write the conversation as JSON", "/export [file]".bold());
    println!("  {:<18} quit", "exit".bold());
    println!();
}

/// Create a rustyline editor with history.
fn create_editor() -> Result<Editor<(), DefaultHistory>> {
    let mut editor = DefaultEditor::new()?;
    editor.set_max_history_size(1000)?;

    let history_path = history_path();
    if history_path.exists() {
        let _ = editor.load_history(&history_path);
        debug!("loaded REPL history from {}", history_path.display());
    }

    Ok(editor)
}

/// Save history to disk.
fn save_history(editor: &mut Editor<(), DefaultHistory>) {
    let path = history_path();
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    if let Err(e) = editor.save_history(&path) {
        debug!("failed to save history: {e}");
    }
}

/// Path to the history file.
fn history_path() -> std::path::PathBuf {
    polychat_core::utils::get_data_path()
        .join("history")
        .join("cli_history")
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_commands() {
        assert!(matches!(parse_input("exit"), ReplInput::Exit));
        assert!(matches!(parse_input("EXIT"), ReplInput::Exit));
        assert!(matches!(parse_input("/quit"), ReplInput::Exit));
        assert!(matches!(parse_input(":q"), ReplInput::Exit));
        assert!(matches!(parse_input("hello"), ReplInput::Message("hello")));
    }

    #[test]
    fn save_with_and_without_name() {
        assert_eq!(parse_input("/save"), ReplInput::Save(None));
        assert_eq!(parse_input("/save my chat"), ReplInput::Save(Some("my chat")));
    }

    #[test]
    fn load_requires_name() {
        assert_eq!(parse_input("/load rpg"), ReplInput::Load("rpg"));
        assert!(matches!(parse_input("/load"), ReplInput::Unknown(_)));
    }

    #[test]
    fn system_requires_name() {
        assert_eq!(parse_input("/system gm"), ReplInput::System("gm"));
        assert!(matches!(parse_input("/system"), ReplInput::Unknown(_)));
    }

    #[test]
    fn unknown_command() {
        assert!(matches!(parse_input("/frobnicate"), ReplInput::Unknown("/frobnicate")));
    }

    #[test]
    fn plain_message_trimmed() {
        assert_eq!(parse_input("  hi there  "), ReplInput::Message("hi there"));
    }

    #[test]
    fn history_path_under_data_dir() {
        let path = history_path();
        assert!(path.to_string_lossy().contains(".polychat"));
        assert!(path.to_string_lossy().contains("cli_history"));
    }
}
