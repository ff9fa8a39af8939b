//! Shared CLI helpers — banner, response printing, timestamps.

use colored::Colorize;

/// Print the banner shown at REPL start.
pub fn print_banner(provider: &str, model: &str) {
    let version = env!("CARGO_PKG_VERSION");
    println!();
    println!("{}  v{}", "Polychat".cyan().bold(), version.dimmed());
    println!("{}", format!("{} / {}", provider, model).dimmed());
    println!(
        "{}",
        "Type a message, \"/help\" for commands, or \"exit\" to quit.".dimmed()
    );
    println!();
}

/// Print a full (non-streamed) assistant response.
pub fn print_response(response: &str) {
    println!();
    print_assistant_label();
    if response.is_empty() {
        println!("{}", "(no response)".dimmed());
    } else {
        println!("{response}");
    }
    println!();
}

/// Print the assistant label that precedes output.
pub fn print_assistant_label() {
    println!("{}", "Assistant".cyan().bold());
}

pub fn print_error(err: &dyn std::fmt::Display) {
    eprintln!("\n{} {err}\n", "✗".red());
}

/// Format a UTC timestamp as a local datetime string for listings.
pub fn format_local(ts: chrono::DateTime<chrono::Utc>) -> String {
    ts.with_timezone(&chrono::Local)
        .format("%Y-%m-%d %H:%M")
        .to_string()
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_local_is_not_empty() {
        let now = chrono::Utc::now();
        let formatted = format_local(now);
        assert!(!formatted.is_empty());
        assert!(formatted.contains('-'));
    }
}
