//! Delegate, extract, then chain email follow-ups.

use std::sync::Arc;

use tracing::info;

use crate::email::EmailAssistant;
use crate::error::CourierError;
use crate::extract::{Extractor, HeuristicEmailExtractor};
use crate::tools::DelegationTool;
use crate::types::{BatchEntry, EmailReference, Task, TaskResult, WorkflowOutcome};

pub const DEFAULT_STAR_COUNT: u32 = 5;

pub fn star_emails_instruction(address: &str, count: u32) -> String {
    format!("Star emails from {address} and list {count} of the starred emails.")
}

/// Chains a delegated task with email lookup and reply.
pub struct WorkflowDriver {
    delegation: DelegationTool,
    assistant: Arc<dyn EmailAssistant>,
    extractor: Box<dyn Extractor>,
}

impl WorkflowDriver {
    /// Driver using the heuristic email extractor.
    pub fn new(delegation: DelegationTool, assistant: Arc<dyn EmailAssistant>) -> Self {
        Self {
            delegation,
            assistant,
            extractor: Box::new(HeuristicEmailExtractor),
        }
    }

    pub fn with_extractor(mut self, extractor: impl Extractor + 'static) -> Self {
        self.extractor = Box::new(extractor);
        self
    }

    pub fn delegation(&self) -> &DelegationTool {
        &self.delegation
    }

    /// Run one instruction through the chain.
    ///
    /// A failed delegation is reported inside the outcome. The extractor sees
    /// the delegated text whether it succeeded or not, so an address quoted in
    /// an error message still starts a lookup. Lookup and reply failures are
    /// returned as [`CourierError::FollowUp`], which keeps the delegated result.
    pub async fn run_workflow(&self, instruction: &str) -> Result<WorkflowOutcome, CourierError> {
        let task = Task::new(instruction)?;
        let delegated = self.delegation.invoke(&task).await;
        info!(is_error = delegated.is_error(), "delegated step finished");

        let hints = self.extractor.extract(delegated.text());
        let Some(address) = hints.email_address() else {
            info!("no email address in delegated result");
            return Ok(WorkflowOutcome::delegated_only(delegated));
        };

        info!(%address, "following up on extracted address");
        let email = match self.assistant.find_email(address).await {
            Ok(email) => email,
            Err(e) => {
                info!(error = %e, "email lookup failed after delegated step");
                return Err(CourierError::follow_up(delegated, e));
            }
        };
        let reply = match hints.reply_body() {
            Some(body) => match self.assistant.reply_to_email(&email, body).await {
                Ok(confirmation) => Some(confirmation),
                Err(e) => {
                    info!(error = %e, "reply failed after delegated step");
                    return Err(CourierError::follow_up(delegated, e));
                }
            },
            None => None,
        };

        Ok(WorkflowOutcome {
            delegated,
            email: Some(email),
            reply,
        })
    }

    pub async fn run_batch(&self, tasks: &[Task]) -> Vec<BatchEntry> {
        super::run_batch(&self.delegation, tasks).await
    }

    pub async fn star_emails(&self, address: &str, count: u32) -> Result<TaskResult, CourierError> {
        self.delegation
            .invoke_instruction(&star_emails_instruction(address, count))
            .await
    }

    pub async fn find_email(&self, address: &str) -> Result<EmailReference, CourierError> {
        self.assistant.find_email(address).await
    }

    pub async fn reply_to_email(
        &self,
        email: &EmailReference,
        body: &str,
    ) -> Result<String, CourierError> {
        self.assistant.reply_to_email(email, body).await
    }
}

impl std::fmt::Debug for WorkflowDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowDriver")
            .field("delegation", &self.delegation)
            .finish_non_exhaustive()
    }
}
