use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::Intent;

/// One incoming chat message. Nothing outlives the turn it starts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversationRequest {
    pub utterance: String,
    #[serde(default)]
    pub summary: Option<String>,
}

impl ConversationRequest {
    pub fn new(utterance: impl Into<String>) -> Self {
        Self {
            utterance: utterance.into(),
            summary: None,
        }
    }
}

/// Read-only input handed to exactly one intent handler.
#[derive(Debug, Clone, PartialEq)]
pub struct IntentContext {
    pub utterance: String,
    pub summary: Option<String>,
    pub intent: Intent,
    pub now: DateTime<FixedOffset>,
}

/// Position of a single turn in the state machine. Each variant owns the data
/// that is valid at that point, so a response exists only once `Terminal`.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversationState {
    Start(ConversationRequest),
    Classified(IntentContext),
    Terminal { intent: Intent, response: String },
}

impl ConversationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversationState::Start(_) => "start",
            ConversationState::Classified(_) => "classified",
            ConversationState::Terminal { .. } => "terminal",
        }
    }
}
