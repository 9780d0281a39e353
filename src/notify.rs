//! User-facing status messages
//!
//! The playback core reports progress ("Added to queue", "Now playing", ...)
//! through a `Notifier`. Delivery is fire-and-forget.

use serde::Serialize;

use crate::models::ChannelContext;

/// Sink for status text addressed to a chat channel
pub trait Notifier: Send + Sync {
    fn send(&self, channel: &ChannelContext, text: &str);
}

/// JSON line emitted in `--json` mode
#[derive(Debug, Serialize)]
struct NotificationLine<'a> {
    guild: &'a str,
    channel: &'a str,
    text: &'a str,
}

/// Prints notifications to stdout
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier {
    json: bool,
}

impl ConsoleNotifier {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    /// Render one notification the way `send` prints it
    pub fn format(&self, channel: &ChannelContext, text: &str) -> String {
        if self.json {
            let line = NotificationLine {
                guild: channel.guild.as_str(),
                channel: &channel.channel,
                text,
            };
            serde_json::to_string(&line).unwrap_or_else(|_| text.to_string())
        } else {
            format!("[{}] {}", channel, text)
        }
    }
}

impl Notifier for ConsoleNotifier {
    fn send(&self, channel: &ChannelContext, text: &str) {
        println!("{}", self.format(channel, text));
    }
}
