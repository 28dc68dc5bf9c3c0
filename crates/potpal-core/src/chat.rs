// ── Care helper chat relay ──
//
// Thin forwarding layer over the generative-text backend: one request,
// one response, transcript kept in memory. A failed send affects nothing
// outside this session.

use chrono::{DateTime, Utc};
use tracing::debug;

use potpal_api::GenAiClient;

use crate::error::ChatError;

/// Instruction prefixed to every request.
const PREAMBLE: &str = "You are the PotPal care helper, a friendly assistant for home \
     gardeners. Answer questions about plant care, watering, sunlight, soil, \
     and the PotPal smart pot. Keep answers short and practical.";

/// How many prior turns are replayed for context.
const CONTEXT_TURNS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

/// One transcript entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
    pub at: DateTime<Utc>,
}

/// An in-memory chat with the care helper.
pub struct ChatSession {
    client: GenAiClient,
    transcript: Vec<ChatTurn>,
}

impl ChatSession {
    pub fn new(client: GenAiClient) -> Self {
        Self {
            client,
            transcript: Vec::new(),
        }
    }

    /// Send a question and return the helper's reply.
    ///
    /// Both sides of the exchange are appended to the transcript. Errors
    /// leave the transcript untouched.
    pub async fn ask(&mut self, question: &str) -> Result<String, ChatError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(ChatError::Unknown("question must not be empty".into()));
        }

        let prompt = self.build_prompt(question);
        debug!(len = prompt.len(), "sending chat prompt");

        let reply = self
            .client
            .generate_content(&prompt)
            .await
            .map_err(ChatError::from)?;

        let now = Utc::now();
        self.transcript.push(ChatTurn {
            role: ChatRole::User,
            text: question.to_owned(),
            at: now,
        });
        self.transcript.push(ChatTurn {
            role: ChatRole::Assistant,
            text: reply.clone(),
            at: now,
        });

        Ok(reply)
    }

    pub fn transcript(&self) -> &[ChatTurn] {
        &self.transcript
    }

    /// Preamble + recent turns + the new question, in plain text.
    fn build_prompt(&self, question: &str) -> String {
        let mut prompt = String::from(PREAMBLE);
        prompt.push_str("\n\n");

        let start = self.transcript.len().saturating_sub(CONTEXT_TURNS);
        for turn in &self.transcript[start..] {
            let speaker = match turn.role {
                ChatRole::User => "Gardener",
                ChatRole::Assistant => "Helper",
            };
            prompt.push_str(speaker);
            prompt.push_str(": ");
            prompt.push_str(&turn.text);
            prompt.push('\n');
        }

        prompt.push_str("Gardener: ");
        prompt.push_str(question);
        prompt.push_str("\nHelper:");
        prompt
    }
}
