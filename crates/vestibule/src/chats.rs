// SPDX-FileCopyrightText: 2026 Vestibule Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `vestibule chats` command implementation.
//!
//! One-shot REST listing: no socket, no cache, just the conversation list
//! with unread counts from the current user's perspective.

use std::io::IsTerminal;

use vestibule_api::ApiClient;
use vestibule_config::model::VestibuleConfig;
use vestibule_core::{Conversation, UserId, VestibuleError};

/// Run the `vestibule chats` command.
pub async fn run_chats(config: &VestibuleConfig) -> Result<(), VestibuleError> {
    let api = ApiClient::new(
        &config.api.base_url,
        config.api.auth_token.as_deref(),
        config.api.timeout_secs,
    )?;
    let me = api.me().await?;
    let conversations = api.list_conversations().await?;

    let use_color = std::io::stdout().is_terminal();
    print_conversations(&conversations, &me.id, use_color);
    Ok(())
}

fn print_conversations(conversations: &[Conversation], viewer: &UserId, use_color: bool) {
    if conversations.is_empty() {
        println!("  no conversations");
        return;
    }

    let word = if conversations.len() == 1 {
        "conversation"
    } else {
        "conversations"
    };
    println!();
    println!("  {} {word}", conversations.len());
    println!("  {}", "-".repeat(50));

    for conversation in conversations {
        println!("{}", render_line(conversation, viewer, use_color));
    }
    println!();
}

/// One listing row: title, unread badge, last-message preview.
fn render_line(conversation: &Conversation, viewer: &UserId, use_color: bool) -> String {
    let title = conversation.title_for(viewer);
    let unread = conversation.unread_for(viewer);
    let preview = conversation
        .last_message
        .as_ref()
        .map(|m| {
            let sender = conversation
                .participant(&m.sender_id)
                .map(|p| p.name.as_str())
                .unwrap_or("?");
            if m.is_attachment_only() {
                format!("{sender}: [attachment]")
            } else {
                format!("{sender}: {}", m.text)
            }
        })
        .unwrap_or_default();

    if unread > 0 {
        let badge = format!("({unread} unread)");
        if use_color {
            use colored::Colorize;
            format!(
                "    {} {:<24} {:<12} {preview}",
                "●".green(),
                title.bold(),
                badge.green()
            )
        } else {
            format!("    * {title:<24} {badge:<12} {preview}")
        }
    } else {
        format!("      {title:<24} {:<12} {preview}", "")
    }
}
