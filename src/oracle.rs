//! Boundary to the external move-suggestion service.
//!
//! The contract is deliberately thin: the caller sends the transcript of
//! the game so far and gets back one line of free text that may or may
//! not contain a usable move. Transport failures, timeouts and malformed
//! response bodies all collapse into an error the caller treats the same
//! as an unparsable reply: no move is applied that ply.

use std::time::Duration;

use anyhow::{anyhow, Context};
use serde::Deserialize;
use tracing::debug;

const COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const SYSTEM_PROMPT: &str = "Let's play chess. I will play as white and you will play as black. \
    At the start of my turn I will send the moves of the entire game so far. For your turn, just \
    send the move that you would play as black in this format \"... [your move here]\" where \
    [your move here] indicates any valid move for black. No extra text or explanation.";

/// Where the opponent's moves come from. Implementations may block; the
/// engine has no timeout of its own, that policy belongs to the client
/// behind this trait.
pub trait MoveSuggester {
    /// Produces a candidate reply for the position reached by
    /// `transcript` (whitespace-joined notation tokens). The reply is
    /// raw text; it still has to survive decoding and legality
    /// resolution.
    fn suggest(&self, transcript: &str) -> anyhow::Result<String>;
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

/// Chat-completions backed suggester playing Black.
pub struct OpenAiSuggester {
    client: reqwest::blocking::Client,
    api_key: String,
    model: String,
}

impl OpenAiSuggester {
    /// Builds a suggester from `OPENAI_API_KEY`, honoring an optional
    /// `GAMBIT_MODEL` override. Returns `None` when no key is
    /// configured, which callers treat as "play without an opponent".
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").ok()?;
        let model = std::env::var("GAMBIT_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Some(Self::new(api_key, model))
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: reqwest::blocking::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("TLS backend is available"),
            api_key,
            model,
        }
    }
}

impl MoveSuggester for OpenAiSuggester {
    fn suggest(&self, transcript: &str) -> anyhow::Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": transcript},
            ],
        });
        let response = self
            .client
            .post(COMPLETIONS_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .context("suggestion request failed")?
            .error_for_status()
            .context("suggestion request rejected")?;
        let completion: ChatCompletion = response
            .json()
            .context("malformed suggestion response body")?;
        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("suggestion response contained no choices"))?;
        let reply = choice.message.content.trim().to_string();
        debug!(reply = %reply, "suggester replied");
        Ok(reply)
    }
}
