// Telegram Bot API transport.
//
// Single-operator bot: one getUpdates poll per loop slice with a
// short server-side timeout, offset tracking so consumed updates are
// acknowledged, sendMessage for everything outbound.  Callers decide
// what a failed call means; nothing here retries.

use anyhow::{bail, Result};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::http_client;

const API_BASE: &str = "https://api.telegram.org";

/// Server-side long-poll timeout in seconds.  Kept short so a single
/// poll never eats more than about one loop slice.
const POLL_TIMEOUT_SECS: u8 = 1;

pub struct ChatMessage {
    pub sender: i64,
    pub text: String,
}

#[derive(Deserialize)]
struct ApiReply<T> {
    ok: bool,
    result: Option<T>,
}

#[derive(Deserialize)]
struct Update {
    update_id: i64,
    message: Option<Message>,
}

#[derive(Deserialize)]
struct Message {
    text: Option<String>,
    from: Option<User>,
}

#[derive(Deserialize)]
struct User {
    id: i64,
    username: Option<String>,
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
}

pub struct Bot {
    token: &'static str,
    next_offset: i64,
}

impl Bot {
    pub fn new(token: &'static str) -> Self {
        Self {
            token,
            next_offset: 0,
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", API_BASE, self.token, method)
    }

    /// Startup connectivity probe; answers the bot's username.
    pub fn check_connectivity(&self) -> Result<String> {
        let url = self.method_url("getMe");
        http_client::https_get_json(&url, &[], |text| {
            let reply: ApiReply<User> = serde_json::from_str(text)?;
            match reply.result {
                Some(me) if reply.ok => Ok(me.username.unwrap_or_else(|| me.id.to_string())),
                _ => bail!("getMe rejected"),
            }
        })
    }

    /// One poll for the next pending message.  Non-text updates are
    /// consumed and skipped; at most one message comes back.
    pub fn next_message(&mut self) -> Result<Option<ChatMessage>> {
        let url = format!(
            "{}?offset={}&limit=1&timeout={}",
            self.method_url("getUpdates"),
            self.next_offset,
            POLL_TIMEOUT_SECS
        );
        let update = http_client::https_get_json(&url, &[], |text| {
            let reply: ApiReply<Vec<Update>> = serde_json::from_str(text)?;
            if !reply.ok {
                bail!("getUpdates rejected");
            }
            Ok(reply.result.unwrap_or_default().into_iter().next())
        })?;

        let Some(update) = update else {
            return Ok(None);
        };
        self.next_offset = update.update_id + 1;

        let message = update.message.and_then(|m| {
            let sender = m.from.as_ref()?.id;
            let text = m.text?;
            Some(ChatMessage { sender, text })
        });
        if message.is_none() {
            debug!("skipping non-text update {}", update.update_id);
        }
        Ok(message)
    }

    pub fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        let url = self.method_url("sendMessage");
        let payload = serde_json::to_vec(&SendMessage { chat_id, text })?;
        http_client::https_post_json(
            &url,
            &[("Content-Type", "application/json")],
            &payload,
            |text| {
                let reply: ApiReply<serde::de::IgnoredAny> = serde_json::from_str(text)?;
                if !reply.ok {
                    bail!("sendMessage rejected");
                }
                Ok(())
            },
        )
    }
}
