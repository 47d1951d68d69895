use std::future::Future;
use std::time::Duration;

use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        ChatCompletionTool, ChatCompletionToolArgs, ChatCompletionToolType,
        CreateChatCompletionRequestArgs, FunctionObjectArgs,
    },
};
use serde_json::json;
use tokio::time::timeout;

use crate::error::AIError;
use crate::message::{Role, Turn};
use crate::persona::{Persona, PersonaKind};

/// A persona the model may transfer the turn to, exposed as a function tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandoffTool {
    pub tool_name: String,
    pub target: PersonaKind,
    pub description: String,
}

impl HandoffTool {
    pub fn for_persona(persona: &Persona) -> Self {
        Self {
            tool_name: format!("transfer_to_{}", persona.name()),
            target: persona.kind(),
            description: format!(
                "{}\n\nInstructions of {}:\n{}",
                persona.handoff_description(),
                persona.name(),
                persona.instructions()
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub model: String,
    pub instructions: String,
    pub transcript: Vec<Turn>,
    pub handoffs: Vec<HandoffTool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Text(String),
    Handoff(PersonaKind),
}

/// The remote model boundary: instructions and transcript in, text or a handoff out.
pub trait CompletionClient: Send + Sync {
    fn complete(
        &self,
        request: CompletionRequest,
    ) -> impl Future<Output = Result<Completion, AIError>> + Send;
}

pub struct OpenAICompletionClient {
    client: Client<OpenAIConfig>,
    request_timeout: Duration,
}

impl OpenAICompletionClient {
    pub fn new(api_key: &str, base_url: &str, request_timeout: Duration) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(base_url.trim_end_matches('/'));
        let client = Client::with_config(openai_config);

        Self {
            client,
            request_timeout,
        }
    }

    fn build_messages(
        request: &CompletionRequest,
    ) -> Result<Vec<ChatCompletionRequestMessage>, AIError> {
        let mut messages: Vec<ChatCompletionRequestMessage> =
            Vec::with_capacity(request.transcript.len() + 1);
        messages.push(
            ChatCompletionRequestSystemMessageArgs::default()
                .content(request.instructions.as_str())
                .build()?
                .into(),
        );

        for turn in &request.transcript {
            let message: ChatCompletionRequestMessage = match turn.role {
                Role::User => ChatCompletionRequestUserMessageArgs::default()
                    .content(turn.content.as_str())
                    .build()?
                    .into(),
                Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                    .content(turn.content.as_str())
                    .build()?
                    .into(),
            };
            messages.push(message);
        }
        Ok(messages)
    }

    fn build_tools(handoffs: &[HandoffTool]) -> Result<Vec<ChatCompletionTool>, AIError> {
        handoffs
            .iter()
            .map(|handoff| -> Result<ChatCompletionTool, AIError> {
                let function = FunctionObjectArgs::default()
                    .name(handoff.tool_name.as_str())
                    .description(handoff.description.as_str())
                    .parameters(json!({
                        "type": "object",
                        "properties": {},
                        "additionalProperties": false
                    }))
                    .build()?;
                Ok(ChatCompletionToolArgs::default()
                    .r#type(ChatCompletionToolType::Function)
                    .function(function)
                    .build()?)
            })
            .collect()
    }
}

impl CompletionClient for OpenAICompletionClient {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, AIError> {
        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(request.model.as_str())
            .messages(Self::build_messages(&request)?);
        if !request.handoffs.is_empty() {
            args.tools(Self::build_tools(&request.handoffs)?);
        }
        let chat_request = args.build()?;

        log::debug!(
            "Chat completion: model {}, {} turns, {} handoffs",
            request.model,
            request.transcript.len(),
            request.handoffs.len()
        );

        let response = timeout(self.request_timeout, self.client.chat().create(chat_request))
            .await
            .map_err(|_| AIError::Timeout)??;

        let message = response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or(AIError::NoMessageFound)?;

        if let Some(call) = message.tool_calls.as_ref().and_then(|calls| calls.first()) {
            let name = &call.function.name;
            return request
                .handoffs
                .iter()
                .find(|handoff| &handoff.tool_name == name)
                .map(|handoff| Completion::Handoff(handoff.target))
                .ok_or_else(|| AIError::UnknownHandoff(name.clone()));
        }

        match message.content {
            Some(content) if !content.trim().is_empty() => Ok(Completion::Text(content)),
            _ => Err(AIError::NoMessageFound),
        }
    }
}
