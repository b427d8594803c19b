//! OpenAI Chat Completions client implementing `LlmClient`.
//!
//! Reads `OPENAI_API_KEY` (and `OPENAI_BASE_URL`) the way async-openai does unless
//! a config is passed to [`ChatOpenAI::with_config`]. Tools bound with
//! `with_tools` are offered on every call; the tool choice defaults to auto.

use async_trait::async_trait;
use tracing::{debug, trace};

use crate::error::AgentError;
use crate::llm::{LlmClient, LlmResponse, LlmUsage, ToolCall};
use crate::message::{Message, Role};
use crate::tool_source::ToolSpec;

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionMessageToolCalls, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessage, ChatCompletionRequestUserMessage, ChatCompletionTool,
        ChatCompletionToolChoiceOption, ChatCompletionTools, CreateChatCompletionRequestArgs,
        FunctionObject, ToolChoiceOptions,
    },
    Client,
};

use super::ToolChoiceMode;

/// Author name attached to tool-result messages sent to the API.
const TOOL_RESULT_NAME: &str = "tool";

/// Chat Completions client with optional bound tools.
pub struct ChatOpenAI {
    client: Client<OpenAIConfig>,
    model: String,
    tools: Option<Vec<ToolSpec>>,
    temperature: Option<f32>,
    tool_choice: ToolChoiceMode,
}

impl ChatOpenAI {
    /// Default config (API key from `OPENAI_API_KEY`).
    pub fn new(model: impl Into<String>) -> Self {
        Self::with_config(OpenAIConfig::default(), model)
    }

    pub fn with_config(config: OpenAIConfig, model: impl Into<String>) -> Self {
        Self {
            client: Client::with_config(config),
            model: model.into(),
            tools: None,
            temperature: None,
            tool_choice: ToolChoiceMode::Auto,
        }
    }

    pub fn with_tools(mut self, tools: Vec<ToolSpec>) -> Self {
        self.tools = Some(tools);
        self
    }

    /// Set temperature (0–2). The team runs at 0.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_tool_choice(mut self, mode: ToolChoiceMode) -> Self {
        self.tool_choice = mode;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Chat completions URL for log lines (base from OPENAI_BASE_URL or OPENAI_API_BASE).
    fn chat_completions_url() -> String {
        let base = std::env::var("OPENAI_BASE_URL")
            .or_else(|_| std::env::var("OPENAI_API_BASE"))
            .unwrap_or_else(|_| "https://api.openai.com".to_string());
        let base = base.trim_end_matches('/');
        if base.ends_with("/v1") {
            format!("{}/chat/completions", base)
        } else {
            format!("{}/v1/chat/completions", base)
        }
    }

    /// System messages stay system; everything else is sent as a user message
    /// named after its author so the model can tell the units apart.
    fn messages_to_request(messages: &[Message]) -> Vec<ChatCompletionRequestMessage> {
        messages
            .iter()
            .map(|m| match m.role() {
                Role::System => ChatCompletionRequestMessage::System(
                    ChatCompletionRequestSystemMessage::from(m.content()),
                ),
                Role::Human | Role::ToolResult => {
                    let mut user = ChatCompletionRequestUserMessage::from(m.content());
                    user.name = match (m.role(), m.author()) {
                        (Role::ToolResult, _) => Some(TOOL_RESULT_NAME.to_string()),
                        (_, Some(author)) => Some(author.to_string()),
                        (_, None) => None,
                    };
                    ChatCompletionRequestMessage::User(user)
                }
            })
            .collect()
    }

    fn tool_choice_option(mode: ToolChoiceMode) -> ChatCompletionToolChoiceOption {
        let opt = match mode {
            ToolChoiceMode::Auto => ToolChoiceOptions::Auto,
            ToolChoiceMode::None => ToolChoiceOptions::None,
            ToolChoiceMode::Required => ToolChoiceOptions::Required,
        };
        ChatCompletionToolChoiceOption::Mode(opt)
    }
}

#[async_trait]
impl LlmClient for ChatOpenAI {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, AgentError> {
        let trace_id = uuid::Uuid::new_v4().to_string();
        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(self.model.clone());
        args.messages(Self::messages_to_request(messages));

        if let Some(tools) = self.tools.as_ref().filter(|t| !t.is_empty()) {
            let chat_tools: Vec<ChatCompletionTools> = tools
                .iter()
                .map(|t| {
                    ChatCompletionTools::Function(ChatCompletionTool {
                        function: FunctionObject {
                            name: t.name.clone(),
                            description: t.description.clone(),
                            parameters: Some(t.input_schema.clone()),
                            ..Default::default()
                        },
                    })
                })
                .collect();
            args.tools(chat_tools);
            args.tool_choice(Self::tool_choice_option(self.tool_choice));
        }

        if let Some(t) = self.temperature {
            args.temperature(t);
        }

        let request = args.build().map_err(|e| {
            AgentError::ExecutionFailed(format!("OpenAI request build failed: {}", e))
        })?;

        let url = Self::chat_completions_url();
        debug!(
            trace_id = %trace_id,
            url = %url,
            model = %self.model,
            message_count = messages.len(),
            tools_count = self.tools.as_ref().map_or(0, |t| t.len()),
            temperature = ?self.temperature,
            tool_choice = ?self.tool_choice,
            "OpenAI chat create"
        );
        if let Ok(js) = serde_json::to_string_pretty(&request) {
            trace!(trace_id = %trace_id, request = %js, "OpenAI request body");
        }

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| AgentError::ExecutionFailed(format!("OpenAI API error: {}", e)))?;

        if let Ok(js) = serde_json::to_string_pretty(&response) {
            trace!(trace_id = %trace_id, response = %js, "OpenAI response body");
        }

        let usage = response.usage.as_ref().map(|u| LlmUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });
        let choice = response.choices.into_iter().next().ok_or_else(|| {
            AgentError::ExecutionFailed("OpenAI returned no choices".to_string())
        })?;

        let msg = choice.message;
        let tool_calls = msg
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .filter_map(|tc| match tc {
                ChatCompletionMessageToolCalls::Function(f) => Some(ToolCall {
                    name: f.function.name,
                    arguments: f.function.arguments,
                    id: Some(f.id),
                }),
                _ => None,
            })
            .collect();

        Ok(LlmResponse {
            content: msg.content.unwrap_or_default(),
            tool_calls,
            usage,
        })
    }
}
