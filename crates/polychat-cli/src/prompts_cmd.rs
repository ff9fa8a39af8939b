//! `polychat prompts` — manage saved system prompts.
//!
//! - `polychat prompts list` — list stored prompts
//! - `polychat prompts show <NAME>` — print one prompt's body
//! - `polychat prompts save <NAME> (--body TEXT | --file PATH) [--description TEXT]`
//! - `polychat prompts delete <NAME>`

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;

use polychat_core::store::PromptStore;

use crate::helpers;

/// Prompt subcommands.
#[derive(Subcommand)]
pub enum PromptCommands {
    /// List stored prompts
    List,

    /// Print one prompt
    Show {
        /// Prompt name
        name: String,
    },

    /// Save (or overwrite) a prompt
    Save {
        /// Prompt name
        name: String,

        /// Prompt body as a literal string
        #[arg(short, long, conflicts_with = "file")]
        body: Option<String>,

        /// Read the prompt body from a file
        #[arg(short, long)]
        file: Option<std::path::PathBuf>,

        /// Short description shown in listings
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Delete a prompt
    Delete {
        /// Prompt name
        name: String,
    },
}

/// Dispatch a prompts subcommand.
pub fn dispatch(cmd: PromptCommands) -> Result<()> {
    let store = PromptStore::new(None)?;

    match cmd {
        PromptCommands::List => list(&store),
        PromptCommands::Show { name } => show(&store, &name),
        PromptCommands::Save {
            name,
            body,
            file,
            description,
        } => save(&store, &name, body, file, description),
        PromptCommands::Delete { name } => delete(&store, &name),
    }
}

fn list(store: &PromptStore) -> Result<()> {
    let prompts = store.load_all()?;
    if prompts.is_empty() {
        println!("  No stored prompts. Use 'polychat prompts save' to add one.");
        return Ok(());
    }

    println!();
    println!(
        "  {:<24} {:<18} {}",
        "Name".bold(),
        "Modified".bold(),
        "Description".bold()
    );
    println!("  {}", "─".repeat(68));
    for prompt in &prompts {
        println!(
            "  {:<24} {:<18} {}",
            prompt.name,
            helpers::format_local(prompt.modified_at),
            prompt.description.as_deref().unwrap_or("—").dimmed(),
        );
    }
    println!();
    Ok(())
}

fn show(store: &PromptStore, name: &str) -> Result<()> {
    let prompt = store.load(name)?;
    println!();
    println!("{}", prompt.name.cyan().bold());
    if let Some(desc) = &prompt.description {
        println!("{}", desc.dimmed());
    }
    println!();
    println!("{}", prompt.body);
    Ok(())
}

fn save(
    store: &PromptStore,
    name: &str,
    body: Option<String>,
    file: Option<std::path::PathBuf>,
    description: Option<String>,
) -> Result<()> {
    let body = match (body, file) {
        (Some(text), _) => text,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read {}", path.display()))?,
        (None, None) => anyhow::bail!("specify the prompt body with --body or --file"),
    };

    let saved = store.save(name, &body, description.as_deref())?;
    println!("  {} Saved prompt '{}'", "✓".green(), saved.cyan());
    Ok(())
}

fn delete(store: &PromptStore, name: &str) -> Result<()> {
    if store.delete(name)? {
        println!("  {} Deleted prompt '{}'", "✓".green(), name.cyan());
    } else {
        println!("  {} Prompt '{}' not found", "✗".red(), name);
    }
    Ok(())
}
