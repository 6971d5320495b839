//! Bounded conversation history.

use std::collections::VecDeque;

use crate::types::ModelMessage;

/// Default number of past exchanges replayed to the model.
pub const DEFAULT_HISTORY_LIMIT: usize = 5;

/// One user message and the assistant's final answer to it.
#[derive(Debug, Clone)]
struct Exchange {
    user: ModelMessage,
    assistant: ModelMessage,
}

/// Keeps the most recent `limit` user/assistant exchanges; older ones are dropped.
///
/// Tool calls made while answering are not retained, only final answers.
#[derive(Debug, Clone)]
pub struct Conversation {
    exchanges: VecDeque<Exchange>,
    limit: usize,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            exchanges: VecDeque::with_capacity(limit),
            limit,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Record a completed exchange, evicting the oldest beyond the limit.
    pub fn record(&mut self, user: impl Into<String>, assistant: impl Into<String>) {
        if self.limit == 0 {
            return;
        }
        self.exchanges.push_back(Exchange {
            user: ModelMessage::user(user),
            assistant: ModelMessage::assistant(assistant),
        });
        while self.exchanges.len() > self.limit {
            self.exchanges.pop_front();
        }
    }

    /// Messages in chronological order, ready to prepend to a new turn.
    pub fn messages(&self) -> Vec<ModelMessage> {
        self.exchanges
            .iter()
            .flat_map(|e| [e.user.clone(), e.assistant.clone()])
            .collect()
    }

    pub fn clear(&mut self) {
        self.exchanges.clear();
    }

    /// Number of retained exchanges.
    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }
}
