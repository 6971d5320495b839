//! Agent-backed email lookup and reply.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::error::CourierError;
use crate::generation::{generate_object, generate_text};
use crate::provider::ModelProvider;
use crate::tools::{DelegationTool, ToolSet};
use crate::types::{EmailReference, GenerationSettings, ModelMessage};

const EMAIL_AGENT_PROMPT: &str = "You are an expert Gmail agent that can read, draft and send emails. \
Use the 'use_connector_agent' tool to access the mailbox. \
While showing email contents, extract the key details exactly as the mailbox reports them.";

/// Looks up emails and replies to them.
#[async_trait]
pub trait EmailAssistant: Send + Sync {
    /// Find the most recent email from `address`.
    async fn find_email(&self, address: &str) -> Result<EmailReference, CourierError>;

    /// Reply in the thread of `email` with `body`; returns the service's confirmation.
    async fn reply_to_email(
        &self,
        email: &EmailReference,
        body: &str,
    ) -> Result<String, CourierError>;
}

/// Email assistant that drives an LLM which reaches the mailbox through the delegation tool.
pub struct AgentEmailAssistant {
    provider: Arc<dyn ModelProvider>,
    tools: ToolSet,
    settings: GenerationSettings,
}

impl AgentEmailAssistant {
    /// Lookups and replies run at temperature 0 unless overridden with [`Self::with_settings`].
    pub fn new(provider: Arc<dyn ModelProvider>, delegation: DelegationTool) -> Self {
        Self {
            provider,
            tools: ToolSet::new().with(Arc::new(delegation)),
            settings: GenerationSettings::builder().temperature(0.0).build(),
        }
    }

    pub fn with_settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = settings;
        self
    }

    fn messages(&self, request: String) -> Vec<ModelMessage> {
        vec![ModelMessage::system(EMAIL_AGENT_PROMPT), ModelMessage::user(request)]
    }
}

/// Instruction used to look up the last email from `address`.
pub fn find_email_instruction(address: &str) -> String {
    format!(
        "Find the last email from {address} along with the message id, thread id, \
         references and in-reply-to"
    )
}

/// Instruction used to reply to `email` with `body`.
pub fn reply_instruction(email: &EmailReference, body: &str) -> String {
    format!(
        "Send an email in order to reply to the email. \
         Use the thread_id {} and message_id {}. \
         The subject should be 'Re: {}' and the body should be '{}'",
        email.thread_id,
        email.reply_target_id(),
        email.subject,
        body
    )
}

#[async_trait]
impl EmailAssistant for AgentEmailAssistant {
    async fn find_email(&self, address: &str) -> Result<EmailReference, CourierError> {
        if address.trim().is_empty() {
            return Err(CourierError::InvalidArgument("email address must not be empty".into()));
        }
        info!(%address, "looking up last email");
        let result = generate_object::<EmailReference>(
            self.provider.as_ref(),
            self.messages(find_email_instruction(address)),
            self.settings.clone(),
            &self.tools,
            EmailReference::json_schema(),
            "email_data",
        )
        .await?;
        Ok(result.object)
    }

    async fn reply_to_email(
        &self,
        email: &EmailReference,
        body: &str,
    ) -> Result<String, CourierError> {
        info!(thread_id = %email.thread_id, "replying to email");
        let result = generate_text(
            self.provider.as_ref(),
            self.messages(reply_instruction(email, body)),
            self.settings.clone(),
            &self.tools,
        )
        .await?;
        Ok(result.text)
    }
}
