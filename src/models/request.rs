use serde::{Deserialize, Serialize};

/// Body of both AI endpoints
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AiRequest {
    /// The prompt to send
    pub prompt: String,
    /// Extra context, e.g. the chapter being edited
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// Conversation to attach the exchange to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<i64>,
}

impl AiRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            context: None,
            conversation_id: None,
        }
    }

    /// Attach context (builder pattern)
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Attach a conversation (builder pattern)
    pub fn with_conversation(mut self, conversation_id: i64) -> Self {
        self.conversation_id = Some(conversation_id);
        self
    }
}
