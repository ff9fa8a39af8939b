//! `polychat status` — show configuration and provider credential status.

use anyhow::Result;
use colored::Colorize;

use polychat_core::config::{get_config_path, load_config};
use polychat_core::utils::get_data_path;
use polychat_providers::{CredentialSource, EnvCredentials, PROVIDERS};

/// Run the status command.
pub fn run() -> Result<()> {
    let config = load_config(None);
    let config_path = get_config_path();
    let data_dir = get_data_path();

    println!();
    println!("{}", "Polychat Status".cyan().bold());
    println!();

    // Config
    let config_exists = config_path.exists();
    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        config_path.display(),
        if config_exists {
            "✓".green().to_string()
        } else {
            "(not found, using defaults)".dimmed().to_string()
        }
    );

    // Data dir
    println!("  {:<18} {}", "Data dir:".bold(), data_dir.display());

    // Generation defaults
    println!(
        "  {:<18} temp: {} | max_tokens: {} | top_p: {} | streaming: {}",
        "Defaults:".bold(),
        config.defaults.temperature,
        config.defaults.max_tokens,
        config.defaults.top_p,
        if config.defaults.streaming { "on" } else { "off" },
    );

    // Providers
    println!();
    println!("  {}", "Providers:".bold());
    let credentials = EnvCredentials;

    for spec in PROVIDERS {
        let key_status = if credentials.lookup(spec.env_key).is_some() {
            format!("{} ({} set)", "✓".green(), spec.env_key)
        } else {
            format!("{}", format!("· {} not set", spec.env_key).dimmed())
        };
        println!("    {:<20} {}", spec.display_name, key_status);
        println!("      {}", spec.models.join(", ").dimmed());
        if let Some(base) = config.api_base(spec.name) {
            println!("      {}", format!("api base: {}", base).dimmed());
        }
    }

    println!();
    Ok(())
}
