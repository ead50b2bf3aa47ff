//! Output formatting helpers.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use vestibule::{Classification, Presentation};

/// Print a success message.
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print an error message.
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a labeled field.
pub fn field(label: &str, value: &str) {
    println!("{}: {}", label.dimmed(), value);
}

/// Print a value as pretty-printed JSON.
pub fn json_pretty<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// Render a classified failure the way the boundary contract asks for:
/// blocking classifications as an interruptive error, the actionable
/// unverified case as a dismissible notice with its action.
pub fn classified(classification: &Classification) {
    match classification.presentation {
        Presentation::Notification => {
            println!("{} {}", "!".yellow(), classification.title.bold());
            println!("  {}", classification.message);
            if let Some(action) = classification.action {
                println!("  [{}]", action.label().yellow());
            }
        }
        Presentation::Blocking => {
            eprintln!("{} {}", "✗".red(), classification.title.bold());
            eprintln!("  {}", classification.message);
        }
    }
}
