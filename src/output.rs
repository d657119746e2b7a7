//! User-facing status lines. Diagnostics go through `tracing` instead.

use crossterm::style::Stylize;
use std::fmt::Display;

pub fn banner(title: &str) {
    let rule = "═".repeat(title.chars().count() + 6);
    println!();
    println!("{}", format!("╔{rule}╗").blue());
    println!("{}", format!("║   {title}   ║").blue());
    println!("{}", format!("╚{rule}╝").blue());
    println!();
}

pub fn info(msg: impl Display) {
    println!("{} {msg}", "ℹ".blue());
}

pub fn success(msg: impl Display) {
    println!("{} {msg}", "✅".green());
}

pub fn warning(msg: impl Display) {
    println!("{} {msg}", "⚠".yellow());
}

pub fn error(msg: impl Display) {
    eprintln!("{} {msg}", "❌".red());
}

/// Indented passthrough of text produced by the gateway CLI.
pub fn detail(text: &str) {
    for line in text.lines() {
        println!("    {line}");
    }
}

/// A shell command the user should run next.
pub fn command(cmd: &str) {
    println!("     {}", cmd.green());
}
