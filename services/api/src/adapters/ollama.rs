//! services/api/src/adapters/ollama.rs
//!
//! This module contains the adapter for the local Ollama LLM backend.
//! It implements the `ChatService` port from the `core` crate, streaming
//! generated tokens back as they arrive.
//!
//! Ollama's generate endpoint replies with newline-delimited JSON: one
//! fragment object per line, with `done: true` marking the end of the
//! stream. `NdjsonDecoder` handles the framing explicitly so fragments
//! split across network chunks are reassembled before parsing.

use async_trait::async_trait;
use bytes::BytesMut;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use serenica_core::domain::{ChatMessage, ChatRole};
use serenica_core::ports::{ChatService, PortError, PortResult, TokenStream};

/// Sampling parameters matching the product's tuned defaults.
const TEMPERATURE: f32 = 0.7;
const TOP_P: f32 = 0.9;
const NUM_PREDICT: u32 = 2000;
const STOP_SEQUENCES: [&str; 3] = ["</s>", "Human:", "Assistant:"];

//=========================================================================================
// Wire Types
//=========================================================================================

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
    top_p: f32,
    num_predict: u32,
    stop: Vec<String>,
}

/// One line of the NDJSON generate stream.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateFragment {
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub done: bool,
}

#[derive(Deserialize)]
struct TagsResponse {
    models: Vec<ModelTag>,
}

#[derive(Deserialize)]
struct ModelTag {
    name: String,
}

//=========================================================================================
// NDJSON Decoder
//=========================================================================================

/// Incremental decoder for a newline-delimited JSON fragment stream.
///
/// Bytes are buffered until a full line is available; each complete line
/// parses to one `GenerateFragment`. The end of a generation is signaled
/// in-band by a fragment with `done: true`, not by the connection closing.
#[derive(Debug, Default)]
pub struct NdjsonDecoder {
    buffer: BytesMut,
}

impl NdjsonDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds a network chunk in and returns every fragment completed by it.
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<GenerateFragment>, serde_json::Error> {
        self.buffer.extend_from_slice(chunk);
        let mut fragments = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line = self.buffer.split_to(pos + 1);
            let line = &line[..line.len() - 1];
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            fragments.push(serde_json::from_slice(line)?);
        }
        Ok(fragments)
    }

    /// Drains a final unterminated line after the stream ends.
    pub fn finish(&mut self) -> Result<Option<GenerateFragment>, serde_json::Error> {
        if self.buffer.iter().all(u8::is_ascii_whitespace) {
            self.buffer.clear();
            return Ok(None);
        }
        let line = self.buffer.split_to(self.buffer.len());
        let fragment = serde_json::from_slice(&line)?;
        Ok(Some(fragment))
    }
}

//=========================================================================================
// Prompt Assembly
//=========================================================================================

/// Flattens a transcript into the Human:/Assistant: prompt format the
/// model was tuned against. The system message leads, followed by the
/// alternating turns, ending with a bare "Assistant:" cue.
pub fn build_prompt(messages: &[ChatMessage]) -> String {
    let system = messages
        .iter()
        .find(|m| m.role == ChatRole::System)
        .map(|m| m.content.as_str())
        .unwrap_or("");

    let history = messages
        .iter()
        .filter(|m| m.role != ChatRole::System)
        .map(|m| match m.role {
            ChatRole::User => format!("Human: {}", m.content),
            _ => format!("Assistant: {}", m.content),
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!("{}\n\n{}\nAssistant:", system, history)
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `ChatService` against a local Ollama server.
#[derive(Clone)]
pub struct OllamaChatAdapter {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaChatAdapter {
    /// Creates a new `OllamaChatAdapter`.
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }

    fn map_request_error(&self, e: reqwest::Error) -> PortError {
        if e.is_connect() {
            PortError::Unavailable(
                "Ollama service is not running. Start it with `ollama serve` and try again."
                    .to_string(),
            )
        } else {
            PortError::Unexpected(e.to_string())
        }
    }

    async fn fetch_models(&self) -> PortResult<Vec<String>> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;
        if !response.status().is_success() {
            return Err(PortError::Unavailable(format!(
                "Ollama returned HTTP {} listing models",
                response.status()
            )));
        }
        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }
}

//=========================================================================================
// `ChatService` Trait Implementation
//=========================================================================================

#[async_trait]
impl ChatService for OllamaChatAdapter {
    async fn stream_chat(&self, messages: &[ChatMessage]) -> PortResult<TokenStream> {
        let prompt = build_prompt(messages);
        let request = GenerateRequest {
            model: &self.model,
            prompt: &prompt,
            stream: true,
            options: GenerateOptions {
                temperature: TEMPERATURE,
                top_p: TOP_P,
                num_predict: NUM_PREDICT,
                stop: STOP_SEQUENCES.iter().map(|s| s.to_string()).collect(),
            },
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        if !response.status().is_success() {
            return Err(PortError::Unavailable(format!(
                "Ollama returned HTTP {} for generation. Is the model pulled? Try `ollama pull {}`.",
                response.status(),
                self.model
            )));
        }

        let model = self.model.clone();
        let stream = async_stream::stream! {
            let mut decoder = NdjsonDecoder::new();
            let mut body = response.bytes_stream();
            let mut finished = false;

            'outer: while let Some(chunk) = body.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        yield Err(PortError::Unexpected(e.to_string()));
                        return;
                    }
                };
                let fragments = match decoder.push(&chunk) {
                    Ok(fragments) => fragments,
                    Err(e) => {
                        yield Err(PortError::Unexpected(format!(
                            "malformed stream fragment from Ollama: {e}"
                        )));
                        return;
                    }
                };
                for fragment in fragments {
                    if !fragment.response.is_empty() {
                        yield Ok(fragment.response);
                    }
                    if fragment.done {
                        finished = true;
                        break 'outer;
                    }
                }
            }

            if !finished {
                // Connection closed without a done marker; surface whatever
                // trailing fragment is buffered, then report the truncation.
                match decoder.finish() {
                    Ok(Some(fragment)) => {
                        if !fragment.response.is_empty() {
                            yield Ok(fragment.response);
                        }
                        if !fragment.done {
                            yield Err(PortError::Unexpected(format!(
                                "generation stream from model {model} ended without completing"
                            )));
                        }
                    }
                    Ok(None) => {
                        yield Err(PortError::Unexpected(format!(
                            "generation stream from model {model} ended without completing"
                        )));
                    }
                    Err(e) => {
                        yield Err(PortError::Unexpected(format!(
                            "malformed stream fragment from Ollama: {e}"
                        )));
                    }
                }
            }
        };

        Ok(Box::pin(stream))
    }

    async fn model_ready(&self) -> PortResult<bool> {
        let models = self.fetch_models().await?;
        Ok(models.iter().any(|name| name == &self.model))
    }

    async fn list_models(&self) -> PortResult<Vec<String>> {
        self.fetch_models().await
    }
}

//=========================================================================================
// Tests
//=========================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decoder_parses_complete_lines() {
        let mut decoder = NdjsonDecoder::new();
        let fragments = decoder
            .push(b"{\"response\":\"Hel\",\"done\":false}\n{\"response\":\"lo\",\"done\":false}\n")
            .unwrap();
        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0].response, "Hel");
        assert_eq!(fragments[1].response, "lo");
        assert!(!fragments[1].done);
    }

    #[test]
    fn decoder_reassembles_fragments_split_across_chunks() {
        let mut decoder = NdjsonDecoder::new();
        let first = decoder.push(b"{\"response\":\"Hi\",\"do").unwrap();
        assert!(first.is_empty());
        let second = decoder.push(b"ne\":false}\n").unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].response, "Hi");
    }

    #[test]
    fn decoder_skips_blank_lines() {
        let mut decoder = NdjsonDecoder::new();
        let fragments = decoder
            .push(b"\n{\"response\":\"a\",\"done\":false}\n\n")
            .unwrap();
        assert_eq!(fragments.len(), 1);
    }

    #[test]
    fn decoder_reports_done_marker() {
        let mut decoder = NdjsonDecoder::new();
        let fragments = decoder.push(b"{\"response\":\"\",\"done\":true}\n").unwrap();
        assert_eq!(fragments.len(), 1);
        assert!(fragments[0].done);
        assert!(fragments[0].response.is_empty());
    }

    #[test]
    fn decoder_finish_drains_unterminated_line() {
        let mut decoder = NdjsonDecoder::new();
        assert!(decoder.push(b"{\"response\":\"tail\",\"done\":true}").unwrap().is_empty());
        let fragment = decoder.finish().unwrap().unwrap();
        assert_eq!(fragment.response, "tail");
        assert!(fragment.done);
        assert!(decoder.finish().unwrap().is_none());
    }

    #[test]
    fn decoder_rejects_malformed_json() {
        let mut decoder = NdjsonDecoder::new();
        assert!(decoder.push(b"not json\n").is_err());
    }

    #[test]
    fn prompt_places_system_first_and_cues_assistant() {
        let messages = vec![
            ChatMessage::system("You are a CBT therapist."),
            ChatMessage::user("I feel overwhelmed."),
            ChatMessage::assistant("Tell me more about that."),
            ChatMessage::user("Work has been hard."),
        ];
        let prompt = build_prompt(&messages);
        assert_eq!(
            prompt,
            "You are a CBT therapist.\n\nHuman: I feel overwhelmed.\nAssistant: Tell me more about that.\nHuman: Work has been hard.\nAssistant:"
        );
    }

    #[test]
    fn prompt_without_system_message_still_ends_with_cue() {
        let messages = vec![ChatMessage::user("Hello")];
        let prompt = build_prompt(&messages);
        assert!(prompt.ends_with("Human: Hello\nAssistant:"));
    }
}
