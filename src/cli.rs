//! Command-line interface and REPL
//!
//! Interactive console for inspecting the mirrored device state and sending
//! raw commands while the gateway runs.

use std::sync::Arc;

use anyhow::Result;
use colored::*;
use rustyline::DefaultEditor;

use crate::adapter::MatrixAdapter;
use crate::connection::ConnectionStatus;

pub async fn run_repl(adapter: Arc<MatrixAdapter>) -> Result<()> {
    let mut rl = DefaultEditor::new()?;
    println!("Type {} for available commands.", "help".bold());

    loop {
        let readline = rl.readline("matrix> ");
        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line);

                match line {
                    "exit" | "quit" => break,
                    "help" => print_help(),
                    "status" => print_status(&adapter),
                    "channels" => print_list("Virtual Channels", &adapter.channels()),
                    "presets" => print_list("Presets", &adapter.presets()),
                    "mutes" => print_channel_mutes(&adapter),
                    "crosspoints" => print_crosspoint_mutes(&adapter),
                    "dump" => println!(
                        "{}",
                        serde_json::to_string_pretty(&adapter.snapshot())?
                    ),
                    "reconnect" => adapter.reconnect().await,
                    other => {
                        if let Some(cmd) = other.strip_prefix("send ") {
                            adapter.send_command(cmd).await;
                        } else {
                            println!("Unknown command: {} (try 'help')", other.yellow());
                        }
                    }
                }
            }
            Err(_) => break,
        }
    }

    Ok(())
}

fn print_help() {
    println!("\n{}", "Commands:".bold());
    println!("  {}       connection state and last status", "status".cyan());
    println!("  {}     mirrored virtual channel list", "channels".cyan());
    println!("  {}      mirrored preset list", "presets".cyan());
    println!("  {}        per-channel mute states", "mutes".cyan());
    println!("  {}  per-crosspoint mute states", "crosspoints".cyan());
    println!("  {}         full mirror as JSON", "dump".cyan());
    println!("  {}    re-dial with the current config", "reconnect".cyan());
    println!("  {}   send a raw command line", "send <cmd>".cyan());
    println!("  {}\n", "exit".cyan());
}

fn print_status(adapter: &MatrixAdapter) {
    let state = format!("{:?}", adapter.state());
    let status = match adapter.status() {
        Some(ConnectionStatus::Ok) => "Ok".green().to_string(),
        Some(ConnectionStatus::Connecting) => "Connecting".yellow().to_string(),
        Some(ConnectionStatus::Error(msg)) => format!("{} ({})", "Error".red(), msg),
        Some(ConnectionStatus::Disconnected(msg)) => {
            format!("{} ({})", "Disconnected".red(), msg)
        }
        None => "no status reported yet".dimmed().to_string(),
    };
    println!("  State:  {}", state.bold());
    println!("  Status: {}", status);
}

fn print_list(title: &str, names: &[String]) {
    println!("\n{} ({}):", title.bold(), names.len());
    for name in names {
        println!("  {}", name);
    }
    println!();
}

fn print_channel_mutes(adapter: &MatrixAdapter) {
    let mutes = adapter.channel_mutes();
    println!("\n{} ({}):", "Channel Mutes".bold(), mutes.len());
    let mut entries: Vec<_> = mutes.into_iter().collect();
    entries.sort();
    for (channel, muted) in entries {
        println!("  {} = {}", channel, format_mute(muted));
    }
    println!();
}

fn print_crosspoint_mutes(adapter: &MatrixAdapter) {
    let mutes = adapter.crosspoint_mutes();
    println!("\n{} ({}):", "Crosspoint Mutes".bold(), mutes.len());
    let mut entries: Vec<_> = mutes.into_iter().collect();
    entries.sort();
    for ((input, output), muted) in entries {
        println!("  {} → {} = {}", input, output, format_mute(muted));
    }
    println!();
}

fn format_mute(muted: u8) -> ColoredString {
    if muted != 0 {
        "muted".red()
    } else {
        "open".green()
    }
}
