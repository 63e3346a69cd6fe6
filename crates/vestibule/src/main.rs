// SPDX-FileCopyrightText: 2026 Vestibule Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vestibule - a realtime chat synchronization client.
//!
//! This is the binary entry point for the Vestibule client.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod chats;
mod doctor;
mod send;
mod watch;

use clap::{Parser, Subcommand};

/// Vestibule - a realtime chat synchronization client.
#[derive(Parser, Debug)]
#[command(name = "vestibule", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Connect and watch for inbound messages, raising alerts.
    Watch,
    /// List conversations with unread counts.
    Chats,
    /// Send a message to a conversation.
    Send {
        /// Target conversation id.
        chat_id: String,
        /// Message text.
        text: String,
        /// Attachment URL, repeatable.
        #[arg(long = "file")]
        files: Vec<String>,
    },
    /// Run diagnostic checks against the environment.
    Doctor {
        /// Run additional intensive checks.
        #[arg(long)]
        deep: bool,
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup
    let config = match vestibule_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            vestibule_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Watch) => watch::run_watch(config).await,
        Some(Commands::Chats) => chats::run_chats(&config).await,
        Some(Commands::Send {
            chat_id,
            text,
            files,
        }) => send::run_send(config, &chat_id, &text, files).await,
        Some(Commands::Doctor { deep, plain }) => doctor::run_doctor(&config, deep, plain).await,
        None => {
            println!("vestibule: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("vestibule: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Verify jemalloc is the global allocator by advancing the epoch.
        // Only jemalloc supports this -- the system allocator would fail.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn binary_loads_config_defaults() {
        // Verify config loads with defaults (no config file needed)
        let config =
            vestibule_config::load_and_validate().expect("default config should be valid");
        assert_eq!(config.client.name, "vestibule");
    }
}
