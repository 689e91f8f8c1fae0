//! Notification sinks and the channel dispatcher.

use std::time::Duration;

use serde::Serialize;
use tracing::warn;

use super::NotifySink;
use crate::config::NotifyMethod;

/// Writes notifications to standard output.
pub struct ConsoleSink;

impl NotifySink for ConsoleSink {
    fn post(&self, text: &str) -> bool {
        println!("[NOTIFY][console] {text}");
        true
    }
}

#[derive(Serialize)]
struct DiscordPayload<'a> {
    content: &'a str,
    flags: u32,
    username: &'a str,
}

/// Posts to a Discord webhook with an `@mention` prefix and a bounded wait.
pub struct DiscordSink {
    client: reqwest::blocking::Client,
    webhook_url: String,
    mention_id: Option<String>,
}

impl DiscordSink {
    pub fn new(webhook_url: impl Into<String>, mention_id: Option<String>) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("failed to build HTTP client");
        Self {
            client,
            webhook_url: webhook_url.into(),
            mention_id,
        }
    }
}

impl NotifySink for DiscordSink {
    fn post(&self, text: &str) -> bool {
        let content = match &self.mention_id {
            Some(id) => format!("<@{id}> {text}"),
            None => text.to_string(),
        };
        let payload = DiscordPayload {
            content: &content,
            flags: 4,
            username: "stock agent bot",
        };
        match self.client.post(&self.webhook_url).json(&payload).send() {
            Ok(_) => true,
            Err(error) => {
                warn!(%error, "discord notification failed");
                false
            }
        }
    }
}

/// Routes a message to the selected channel.
///
/// Discord without a configured webhook, like any unknown method, behaves as
/// console. A failed delivery is logged and the run continues; there is no
/// retry.
pub struct Notifier {
    console: Box<dyn NotifySink>,
    discord: Option<Box<dyn NotifySink>>,
}

impl Notifier {
    pub fn new(console: Box<dyn NotifySink>, discord: Option<Box<dyn NotifySink>>) -> Self {
        Self { console, discord }
    }

    pub fn console_only() -> Self {
        Self::new(Box::new(ConsoleSink), None)
    }

    pub fn dispatch(&self, method: NotifyMethod, message: &str) {
        let sink = match (method, &self.discord) {
            (NotifyMethod::Discord, Some(discord)) => discord.as_ref(),
            _ => self.console.as_ref(),
        };
        if !sink.post(message) {
            warn!(method = ?method, "notification delivery failed");
        }
    }
}
