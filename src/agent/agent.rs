//! Core Agent struct with execute/stream capabilities.

use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::CourierError;
use crate::executor::ConnectionDirectory;
use crate::generation::{generate_text, stream_text_with_tools, StreamEvent};
use crate::provider::ModelProvider;
use crate::tools::builtin::{list_connections_tool, think_tool};
use crate::tools::{DelegationTool, Tool, ToolSet};
use crate::types::*;

use super::conversation::Conversation;
use super::response::AgentResponse;

/// Instructions for the assistant that fronts the connector service.
pub const ORCHESTRATOR_INSTRUCTIONS: &[&str] = &[
    "You are an intelligent assistant that reasons about requests and delegates work on external services.",
    "For tasks involving external services (e.g., Gmail, GitHub), use the 'use_connector_agent' tool to delegate.",
    "Use 'list_connections' to check available connections if needed.",
    "If a required connection is missing, inform the user to set it up.",
    "Think step-by-step before responding, especially for complex tasks.",
    "Use the conversation history to keep track of context.",
    "Be helpful, concise, and accurate in your responses.",
];

/// A conversational agent with tools and bounded memory.
///
/// [`Agent::execute`] holds the history lock for its whole turn. [`Agent::stream`]
/// only locks to snapshot history before generating and again to record the
/// exchange once the stream finishes, so history stays readable mid-stream.
pub struct Agent {
    provider: Arc<dyn ModelProvider>,
    name: Option<String>,
    description: Option<String>,
    instructions: Vec<String>,
    tools: ToolSet,
    settings: GenerationSettings,
    conversation: Arc<Mutex<Conversation>>,
    add_datetime: bool,
    streaming: bool,
}

impl Agent {
    pub fn new(provider: Arc<dyn ModelProvider>) -> Self {
        Self {
            provider,
            name: None,
            description: None,
            instructions: Vec::new(),
            tools: ToolSet::new(),
            settings: GenerationSettings::default(),
            conversation: Arc::new(Mutex::new(Conversation::new())),
            add_datetime: false,
            streaming: true,
        }
    }

    /// The orchestrating assistant: delegation, connection listing, and a thinking scratchpad.
    pub fn orchestrator(
        provider: Arc<dyn ModelProvider>,
        delegation: DelegationTool,
        directory: Option<Arc<dyn ConnectionDirectory>>,
    ) -> Self {
        let mut agent = Self::new(provider)
            .with_name("Courier Assistant")
            .with_instructions(ORCHESTRATOR_INSTRUCTIONS.iter().copied())
            .with_tool(think_tool())
            .with_tool(Arc::new(delegation))
            .with_datetime(true);
        if let Some(directory) = directory {
            agent = agent.with_tool(list_connections_tool(directory));
        }
        agent
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_instructions<I, S>(mut self, instructions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.instructions.extend(instructions.into_iter().map(Into::into));
        self
    }

    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.register(tool);
        self
    }

    pub fn with_settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Number of past exchanges replayed on each turn.
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.conversation = Arc::new(Mutex::new(Conversation::with_limit(limit)));
        self
    }

    /// Append the current UTC time to the system prompt.
    pub fn with_datetime(mut self, enabled: bool) -> Self {
        self.add_datetime = enabled;
        self
    }

    /// Whether [`Agent::respond`] streams fragments or returns a complete answer.
    pub fn with_streaming(mut self, enabled: bool) -> Self {
        self.streaming = enabled;
        self
    }

    pub fn tools(&self) -> &ToolSet {
        &self.tools
    }

    pub fn provider(&self) -> &Arc<dyn ModelProvider> {
        &self.provider
    }

    /// System prompt assembled from name, description, instructions, and time.
    pub fn system_prompt(&self) -> Option<String> {
        let mut sections = Vec::new();
        if let Some(ref name) = self.name {
            sections.push(format!("Your name is {name}."));
        }
        if let Some(ref description) = self.description {
            sections.push(description.clone());
        }
        if !self.instructions.is_empty() {
            let list = self
                .instructions
                .iter()
                .map(|i| format!("- {i}"))
                .collect::<Vec<_>>()
                .join("\n");
            sections.push(format!("Instructions:\n{list}"));
        }
        if self.add_datetime {
            sections.push(format!(
                "The current time is {}.",
                chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
            ));
        }
        if sections.is_empty() {
            None
        } else {
            Some(sections.join("\n\n"))
        }
    }

    fn turn_messages(&self, history: &Conversation, message: &str) -> Vec<ModelMessage> {
        let mut messages = Vec::new();
        if let Some(system) = self.system_prompt() {
            messages.push(ModelMessage::system(system));
        }
        messages.extend(history.messages());
        messages.push(ModelMessage::user(message));
        messages
    }

    /// Execute a user message and get the final answer (with tool loop).
    pub async fn execute(&self, message: impl Into<String>) -> Result<String, CourierError> {
        let message = message.into();
        let mut history = self.conversation.lock().await;
        let messages = self.turn_messages(&history, &message);

        let result = generate_text(
            self.provider.as_ref(),
            messages,
            self.settings.clone(),
            &self.tools,
        )
        .await?;

        history.record(message, result.text.clone());
        Ok(result.text)
    }

    /// Stream the answer to a user message. History is updated once the stream is drained.
    pub async fn stream(&self, message: impl Into<String>) -> Result<AgentResponse, CourierError> {
        let message = message.into();
        let conversation = Arc::clone(&self.conversation);
        let messages = {
            let history = conversation.lock().await;
            self.turn_messages(&history, &message)
        };

        let mut events = stream_text_with_tools(
            Arc::clone(&self.provider),
            messages,
            self.settings.clone(),
            self.tools.clone(),
        );

        let fragments = async_stream::stream! {
            while let Some(event) = events.next().await {
                match event {
                    Ok(StreamEvent::Text(text)) => yield Ok(text),
                    Ok(StreamEvent::ToolResult { call, result }) => {
                        debug!(tool = %call.name, is_error = result.is_error, "tool finished");
                    }
                    Ok(StreamEvent::Finished { text, .. }) => {
                        conversation.lock().await.record(message.clone(), text);
                    }
                    Err(e) => {
                        yield Err(e);
                        break;
                    }
                }
            }
        };

        Ok(AgentResponse::Streaming(Box::pin(fragments)))
    }

    /// One turn, streamed or complete depending on [`Agent::with_streaming`].
    pub async fn respond(&self, message: &str) -> Result<AgentResponse, CourierError> {
        if self.streaming {
            self.stream(message).await
        } else {
            self.execute(message).await.map(AgentResponse::Complete)
        }
    }

    /// Snapshot of the retained history.
    pub async fn history(&self) -> Vec<ModelMessage> {
        self.conversation.lock().await.messages()
    }

    pub async fn clear_history(&self) {
        self.conversation.lock().await.clear();
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("model", &self.provider.model_id())
            .field("name", &self.name)
            .field("tools", &self.tools)
            .field("streaming", &self.streaming)
            .finish()
    }
}
