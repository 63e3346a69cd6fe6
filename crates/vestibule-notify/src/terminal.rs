// SPDX-FileCopyrightText: 2026 Vestibule Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Terminal alert sink: a colored one-line toast and an ASCII BEL chime.

use std::io::{IsTerminal, Write};

use async_trait::async_trait;
use colored::Colorize;
use tracing::debug;
use vestibule_core::AlertSink;

/// Renders alerts to stdout. Color is used only when stdout is a terminal.
pub struct TerminalAlertSink {
    use_color: bool,
}

impl TerminalAlertSink {
    pub fn new() -> Self {
        Self {
            use_color: std::io::stdout().is_terminal(),
        }
    }

    /// Forces plain output regardless of the terminal.
    pub fn plain() -> Self {
        Self { use_color: false }
    }
}

impl Default for TerminalAlertSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AlertSink for TerminalAlertSink {
    async fn toast(&self, summary: &str) {
        if self.use_color {
            println!("  {} {}", "●".cyan(), summary.bold());
        } else {
            println!("  * {summary}");
        }
    }

    async fn chime(&self) {
        // BEL; terminals without audio simply ignore it.
        let mut stdout = std::io::stdout();
        if stdout.write_all(b"\x07").and_then(|_| stdout.flush()).is_err() {
            debug!("audible cue unavailable, toast-only alert");
        }
    }
}
