//! `polychat chats` — manage saved conversations.
//!
//! - `polychat chats list` — list saved chats, newest first
//! - `polychat chats show <NAME>` — print a saved conversation
//! - `polychat chats export <NAME> [--out PATH]` — write a download-ready JSON file
//! - `polychat chats delete <NAME>`

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;

use polychat_core::store::ChatStore;
use polychat_core::types::Role;

use crate::helpers;

/// Chat-history subcommands.
#[derive(Subcommand)]
pub enum ChatCommands {
    /// List saved chats, newest first
    List,

    /// Print a saved conversation
    Show {
        /// Chat name
        name: String,
    },

    /// Export a saved conversation as JSON
    Export {
        /// Chat name
        name: String,

        /// Output path (defaults to <name>.json in the current directory)
        #[arg(short, long)]
        out: Option<std::path::PathBuf>,
    },

    /// Delete a saved chat
    Delete {
        /// Chat name
        name: String,
    },
}

/// Dispatch a chats subcommand.
pub fn dispatch(cmd: ChatCommands) -> Result<()> {
    let store = ChatStore::new(None)?;

    match cmd {
        ChatCommands::List => list(&store),
        ChatCommands::Show { name } => show(&store, &name),
        ChatCommands::Export { name, out } => export(&store, &name, out),
        ChatCommands::Delete { name } => delete(&store, &name),
    }
}

fn list(store: &ChatStore) -> Result<()> {
    let chats = store.list()?;
    if chats.is_empty() {
        println!("  No saved chats.");
        return Ok(());
    }

    println!();
    println!(
        "  {:<28} {:<18} {}",
        "Name".bold(),
        "Saved".bold(),
        "Messages".bold()
    );
    println!("  {}", "─".repeat(58));
    for chat in &chats {
        println!(
            "  {:<28} {:<18} {}",
            chat.name,
            helpers::format_local(chat.saved_at),
            chat.message_count,
        );
    }
    println!();
    Ok(())
}

fn show(store: &ChatStore, name: &str) -> Result<()> {
    let record = store.load(name)?;

    println!();
    println!(
        "{}  {}",
        name.cyan().bold(),
        format!("saved {}", helpers::format_local(record.saved_at)).dimmed()
    );
    println!();
    for message in &record.messages {
        let label = match message.role {
            Role::System => "system".yellow().bold(),
            Role::User => "you".green().bold(),
            Role::Assistant => "assistant".cyan().bold(),
        };
        println!("{label}: {}", message.content);
        println!();
    }
    Ok(())
}

fn export(store: &ChatStore, name: &str, out: Option<std::path::PathBuf>) -> Result<()> {
    let record = store.load(name)?;
    let json = ChatStore::export(&record.messages)?;

    let path = out.unwrap_or_else(|| std::path::PathBuf::from(format!("{name}.json")));
    std::fs::write(&path, json).with_context(|| format!("cannot write {}", path.display()))?;
    println!("  {} Exported '{}' to {}", "✓".green(), name.cyan(), path.display());
    Ok(())
}

fn delete(store: &ChatStore, name: &str) -> Result<()> {
    if store.delete(name)? {
        println!("  {} Deleted chat '{}'", "✓".green(), name.cyan());
    } else {
        println!("  {} Chat '{}' not found", "✗".red(), name);
    }
    Ok(())
}
