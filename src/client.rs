use anyhow::{anyhow, Result};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

use crate::config::AgentConfig;
use crate::history::{Conversation, Role};

/// System instructions sent as the first chat message. The execute-block
/// contract here is the wire format the extractor parses.
const INSTRUCTIONS: &str = r#"# Role: Terminal Command Assistant

You are an expert terminal assistant for Linux and macOS. You turn the
user's natural-language requests into safe, reliable shell commands.

## Format requirements
1. When a command should be run, wrap it exactly like this:
   ```execute
   <command>
   ```
2. When you need the command's output for further analysis, use:
   ```execute #feedback
   <command>
   ```
3. Put each distinct command in its own execute block; never combine
   unrelated commands in one block.
4. Prefer built-in tools over ones that need installing, warn clearly
   before anything destructive, and say when sudo is required.
5. When a command carried the #feedback marker you will receive its
   execution result as a follow-up message; analyze it and reply with
   further guidance or more execute blocks if needed.
6. If the request is unrelated to terminal commands, just answer it
   briefly in plain text with no execute blocks."#;

/// Boundary to the language model. Implementations must normalize any
/// delivery mode (streamed or not) into a single string before returning.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn send(&self, query: &str, history: &Conversation, stream: bool) -> Result<String>;
}

/// Client for OpenAI-compatible chat-completions endpoints
pub struct OpenAiClient {
    client: Client,
    api_base: String,
    api_key: String,
    model_id: String,
}

impl OpenAiClient {
    pub fn new(config: &AgentConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .connect_timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model_id: config.model_id.clone(),
        }
    }

    /// Instructions first, then prior turns, then the current query
    fn build_messages(query: &str, history: &Conversation) -> Vec<Value> {
        let mut messages = vec![json!({"role": "system", "content": INSTRUCTIONS})];

        for entry in history.entries() {
            let role = match entry.role {
                Role::User => "user",
                Role::Assistant => "assistant",
                Role::System => "system",
            };
            messages.push(json!({"role": role, "content": entry.content}));
        }

        messages.push(json!({"role": "user", "content": query}));
        messages
    }

    async fn send_blocking(&self, query: &str, history: &Conversation) -> Result<String> {
        let body = json!({
            "model": self.model_id,
            "messages": Self::build_messages(query, history),
            "stream": false,
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| anyhow!("Failed to reach model API: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow!("Model API returned {}: {}", status, error_text));
        }

        let reply: Value = response
            .json()
            .await
            .map_err(|e| anyhow!("Failed to parse model response: {}", e))?;

        normalize_reply(&reply)
    }

    async fn send_streaming(&self, query: &str, history: &Conversation) -> Result<String> {
        let body = json!({
            "model": self.model_id,
            "messages": Self::build_messages(query, history),
            "stream": true,
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| anyhow!("Failed to reach model API: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow!("Model API returned {}: {}", status, error_text));
        }

        let mut accumulator = SseAccumulator::new();
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| anyhow!("Stream interrupted: {}", e))?;
            accumulator.feed(&String::from_utf8_lossy(&chunk));
        }

        Ok(accumulator.finish())
    }
}

#[async_trait]
impl ModelClient for OpenAiClient {
    async fn send(&self, query: &str, history: &Conversation, stream: bool) -> Result<String> {
        if stream {
            self.send_streaming(query, history).await
        } else {
            self.send_blocking(query, history).await
        }
    }
}

/// Pull the reply text out of a non-streamed response. Tolerates both the
/// chat-completions shape and a flat `response` field; always one string.
fn normalize_reply(reply: &Value) -> Result<String> {
    reply["choices"][0]["message"]["content"]
        .as_str()
        .or_else(|| reply["response"].as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| anyhow!("Unexpected response shape from model API"))
}

/// Accumulates server-sent-event chunks into the full response text.
///
/// Chunks may split lines arbitrarily, so complete lines are processed as
/// they appear and the trailing partial line waits for the next chunk.
struct SseAccumulator {
    pending: String,
    content: String,
}

impl SseAccumulator {
    fn new() -> Self {
        Self {
            pending: String::new(),
            content: String::new(),
        }
    }

    fn feed(&mut self, chunk: &str) {
        self.pending.push_str(chunk);

        while let Some(newline) = self.pending.find('\n') {
            let line: String = self.pending.drain(..=newline).collect();
            self.consume_line(line.trim());
        }
    }

    fn consume_line(&mut self, line: &str) {
        let Some(data) = line.strip_prefix("data:") else {
            return;
        };
        let data = data.trim();
        if data.is_empty() || data == "[DONE]" {
            return;
        }

        if let Ok(event) = serde_json::from_str::<Value>(data) {
            if let Some(delta) = event["choices"][0]["delta"]["content"].as_str() {
                self.content.push_str(delta);
            }
        }
    }

    fn finish(mut self) -> String {
        // Flush a final line that arrived without a trailing newline
        if !self.pending.is_empty() {
            let last = std::mem::take(&mut self.pending);
            self.consume_line(last.trim());
        }
        self.content
    }
}
