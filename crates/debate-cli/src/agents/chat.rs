//! Debate actor served by an OpenAI-compatible `/chat/completions` endpoint.
//!
//! The role instruction is the system message. The transcript so far is
//! rendered into one user message, one `Speaker: text` block per turn,
//! followed by a cue saying what this turn is for.
//!
//! Bindings with `reasoning` set are sent as streaming requests with
//! `enable_thinking`, the only form DashScope accepts for thinking mode.
//! Such requests cannot use JSON mode, so structured turns rely on the
//! schema in the prompt. Other bindings get a plain request and never see
//! the `enable_thinking` field.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use serde_json::{json, Value};
use tracing::debug;

use debate_coordination::debate::{
    ActorClient, ActorError, ActorReply, ActorRequest, Message, TurnCue,
};

use crate::config::ApiEndpoint;

/// Actor client for OpenAI-compatible chat completion APIs.
pub struct ChatCompletionsActor {
    endpoint: ApiEndpoint,
    client: reqwest::Client,
}

impl ChatCompletionsActor {
    pub fn new(endpoint: ApiEndpoint) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(endpoint.request_timeout)
            .build()?;
        Ok(Self { endpoint, client })
    }

    fn url_for(&self, request: &ActorRequest<'_>) -> String {
        let base = request
            .actor
            .binding()
            .endpoint
            .as_deref()
            .unwrap_or(&self.endpoint.url)
            .trim_end_matches('/');
        format!("{}/chat/completions", base)
    }
}

#[async_trait]
impl ActorClient for ChatCompletionsActor {
    async fn invoke(&self, request: ActorRequest<'_>) -> Result<ActorReply, ActorError> {
        let start = std::time::Instant::now();
        let url = self.url_for(&request);
        let body = request_body(&request);

        let mut http = self.client.post(&url).json(&body);
        if let Some(key) = &self.endpoint.api_key {
            http = http.bearer_auth(key);
        }

        let budget = self.endpoint.request_timeout;
        let response = http
            .send()
            .await
            .map_err(|e| transport_error(e, budget))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ActorError::Unavailable(format!(
                "API error ({}): {}",
                status,
                truncate(&body, 500)
            )));
        }

        let content = if request.actor.binding().reasoning {
            collect_stream(response, budget).await?
        } else {
            let resp_json: Value = response
                .json()
                .await
                .map_err(|e| transport_error(e, budget))?;
            reply_content(&resp_json)?
        };

        debug!(
            role = %request.role(),
            model = %request.actor.binding().model,
            chars = content.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Chat completion received"
        );

        match request.schema() {
            Some(_) => {
                let payload = parse_structured(&content)?;
                Ok(ActorReply::structured(content, payload))
            }
            None => Ok(ActorReply::text(content)),
        }
    }
}

fn transport_error(e: reqwest::Error, budget: Duration) -> ActorError {
    if e.is_timeout() {
        ActorError::Timeout {
            after_ms: budget.as_millis() as u64,
        }
    } else {
        ActorError::Unavailable(e.to_string())
    }
}

/// Build the chat completion request body for one turn.
pub fn request_body(request: &ActorRequest<'_>) -> Value {
    let binding = request.actor.binding();

    let mut user = format!(
        "## Debate so far\n\n{}\n\n## Your turn\n\n{}",
        render_context(request.context),
        cue_text(request.turn.cue, request.topic)
    );
    if let Some(schema) = request.schema() {
        user.push_str(&format!(
            "\n\nReply with a single JSON object and nothing else. It must match this JSON Schema:\n{}",
            serde_json::to_string_pretty(&schema.json_schema()).unwrap_or_default()
        ));
    }

    let mut body = json!({
        "model": binding.model,
        "messages": [
            {"role": "system", "content": request.instruction()},
            {"role": "user", "content": user}
        ],
    });
    if let Some(temperature) = binding.temperature {
        body["temperature"] = json!(temperature);
    }
    if binding.reasoning {
        body["stream"] = json!(true);
        body["enable_thinking"] = json!(true);
    } else if request.schema().is_some() {
        body["response_format"] = json!({"type": "json_object"});
    }
    body
}

/// Render prior turns as `Speaker: text` blocks.
pub fn render_context(context: &[Message]) -> String {
    if context.is_empty() {
        return "(Nothing has been said yet.)".to_string();
    }
    context
        .iter()
        .map(|m| format!("{}: {}", m.speaker.label(), m.content.trim()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// What the actor is asked to do this turn.
pub fn cue_text(cue: TurnCue, topic: &str) -> String {
    match cue {
        TurnCue::ExtractPositions => format!(
            "Open the debate on \"{}\" and assign the two opposing positions: \
             one for the affirmative, one for the negative.",
            topic
        ),
        TurnCue::Coach => {
            "Brief both debaters: argument dimensions, key arguments, delivery and likely clashes for each side."
                .to_string()
        }
        TurnCue::Announce => {
            "Announce the next segment of the debate and give the floor to the next speaker."
                .to_string()
        }
        TurnCue::OpeningStatement => {
            "Deliver your opening statement: your position and your main arguments.".to_string()
        }
        TurnCue::PoseQuestions => {
            "Put 3-5 pointed questions to your opponent.".to_string()
        }
        TurnCue::AnswerQuestions => {
            "Answer each of your opponent's questions directly. Do not ask questions back."
                .to_string()
        }
        TurnCue::Rebuttal { round } => format!(
            "Free debate, exchange {}: respond to your opponent's last turn, rebut or extend your case.",
            round
        ),
        TurnCue::ClosingStatement => {
            "Deliver your closing statement: summarize your case and why it should prevail."
                .to_string()
        }
        TurnCue::CallVerdict => {
            "Close the floor and ask the judge for the verdict.".to_string()
        }
        TurnCue::Adjudicate => {
            "Score both debaters and deliver your verdict.".to_string()
        }
    }
}

fn reply_content(resp_json: &Value) -> Result<String, ActorError> {
    non_empty(resp_json["choices"][0]["message"]["content"].as_str().unwrap_or_default())
}

fn non_empty(content: &str) -> Result<String, ActorError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(ActorError::Unavailable(
            "response contained no message content".into(),
        ));
    }
    Ok(content.to_string())
}

/// Read a server-sent-events reply to the end and return the answer text.
async fn collect_stream(response: reqwest::Response, budget: Duration) -> Result<String, ActorError> {
    let mut chunks = Box::pin(response.bytes_stream());
    let mut decoder = SseDecoder::default();
    while let Some(chunk) = chunks.next().await {
        let bytes = chunk.map_err(|e| transport_error(e, budget))?;
        if decoder.push(&bytes)? {
            break;
        }
    }
    decoder.finish()
}

/// Incremental decoder for streamed chat completion chunks.
///
/// Only `delta.content` is kept; `delta.reasoning_content` (the model's
/// thinking) is dropped. Bytes are buffered until a full line arrives so
/// multi-byte characters split across network chunks survive.
#[derive(Debug, Default)]
pub struct SseDecoder {
    pending: Vec<u8>,
    content: String,
    done: bool,
}

impl SseDecoder {
    /// Feed raw bytes. Returns `true` once `[DONE]` has been seen.
    pub fn push(&mut self, bytes: &[u8]) -> Result<bool, ActorError> {
        self.pending.extend_from_slice(bytes);
        while let Some(newline) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=newline).collect();
            self.apply_line(&String::from_utf8_lossy(&line))?;
            if self.done {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Flush any unterminated last line and return the accumulated answer.
    pub fn finish(mut self) -> Result<String, ActorError> {
        if !self.done && !self.pending.is_empty() {
            let line = std::mem::take(&mut self.pending);
            self.apply_line(&String::from_utf8_lossy(&line))?;
        }
        non_empty(&self.content)
    }

    fn apply_line(&mut self, line: &str) -> Result<(), ActorError> {
        let Some(data) = line.trim_end().strip_prefix("data:") else {
            return Ok(());
        };
        let data = data.trim_start();
        if data == "[DONE]" {
            self.done = true;
            return Ok(());
        }
        let chunk: Value = serde_json::from_str(data)
            .map_err(|e| ActorError::Unavailable(format!("malformed stream chunk: {}", e)))?;
        if let Some(error) = chunk.get("error") {
            return Err(ActorError::Unavailable(format!(
                "stream error: {}",
                truncate(&error.to_string(), 500)
            )));
        }
        if let Some(delta) = chunk["choices"][0]["delta"]["content"].as_str() {
            self.content.push_str(delta);
        }
        Ok(())
    }
}

/// Parse a structured reply, tolerating a surrounding Markdown code fence
/// or a sentence of prose around the object.
pub fn parse_structured(content: &str) -> Result<Value, ActorError> {
    let text = strip_code_fence(content);
    let value: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(e) => embedded_object(text)
            .and_then(|inner| serde_json::from_str(inner).ok())
            .ok_or_else(|| {
                ActorError::StructuredOutput(format!("reply is not valid JSON: {}", e))
            })?,
    };
    if !value.is_object() {
        return Err(ActorError::StructuredOutput(
            "reply is not a JSON object".to_string(),
        ));
    }
    Ok(value)
}

fn embedded_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop an optional language tag on the opening fence.
    let rest = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}
