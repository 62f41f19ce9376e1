//! services/api/src/adapters/prompt_llm.rs
//!
//! This module contains the adapter for the prompt-writing LLM.
//! It implements the `PromptGenerationService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use postcraft_core::{
    domain::GeneratedPrompt,
    ports::{PortError, PortResult, PromptGenerationService},
};
use serde::Deserialize;
use tracing::{info, warn};

const SYSTEM_INSTRUCTIONS: &str = r#"You write LinkedIn post prompts for a professional who posts three times a week.

Each prompt has:
- "category": one of "story", "lesson", "insight", "opinion", "how-to"
- "hook": a single opening line that makes people stop scrolling
- "promptText": two or three sentences telling the writer what to post about
- "pillarNumber": the content pillar (1, 2 or 3) the prompt belongs to

Respond with ONLY a JSON object of the form {"prompts": [ ... ]} and nothing else."#;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `PromptGenerationService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiPromptAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiPromptAdapter {
    /// Creates a new `OpenAiPromptAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

#[derive(Deserialize)]
struct PromptBatch {
    prompts: Vec<GeneratedPrompt>,
}

/// Extracts the prompt batch from the model's reply, tolerating a fenced code block.
fn parse_batch(content: &str) -> PortResult<Vec<GeneratedPrompt>> {
    let trimmed = content.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed);

    let batch: PromptBatch = serde_json::from_str(body.trim()).map_err(|e| {
        PortError::Unexpected(format!("Prompt LLM returned malformed JSON: {}", e))
    })?;

    Ok(batch
        .prompts
        .into_iter()
        .filter(|p| !p.prompt_text.trim().is_empty())
        .collect())
}

//=========================================================================================
// `PromptGenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl PromptGenerationService for OpenAiPromptAdapter {
    async fn generate_prompts(
        &self,
        count: usize,
        pillar_hint: Option<i32>,
    ) -> PortResult<Vec<GeneratedPrompt>> {
        let mut request_text = format!("Write {} prompts.", count);
        if let Some(pillar) = pillar_hint {
            request_text.push_str(&format!(" Every prompt belongs to pillar {}.", pillar));
        }

        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_INSTRUCTIONS)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(request_text)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                PortError::Unexpected("Prompt LLM response contained no text content.".to_string())
            })?;

        let mut prompts = parse_batch(&content)?;
        if prompts.len() < count {
            warn!(requested = count, received = prompts.len(), "Prompt LLM returned a short batch");
        }
        prompts.truncate(count);
        info!(count = prompts.len(), "Generated prompts");
        Ok(prompts)
    }
}
