//! 记忆层：对话消息（调用方持有）与 token 计数

pub mod conversation;
pub mod tokenizer;

pub use conversation::{append_turn, render_history, Message, Role};
pub use tokenizer::{count_tokens, SegmentingCounter, TokenCounter, TokenizerError, WhitespaceCounter};
