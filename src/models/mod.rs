//! Data types exchanged with the content service.

mod conversation;
mod novel;
mod request;

pub use conversation::{Conversation, Message, MessageRole, DEFAULT_CONVERSATION_TITLE};
pub use novel::{Chapter, Novel};
pub use request::AiRequest;
