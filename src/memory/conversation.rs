//! 对话历史
//!
//! 会话历史由调用方持有并在每次请求时回传；Coordinator 只在返回值中追加两条（指令 + 报告），
//! 不会原地修改调用方的列表。

use serde::{Deserialize, Serialize};

/// 消息角色（与 LLM API 一致）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

/// 单条消息
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// 将历史拼成纯文本（每行 `role: content`），用于 prompt 嵌入与 token 计数
pub fn render_history(history: &[Message]) -> String {
    history
        .iter()
        .map(|m| format!("{}: {}", m.role.as_str(), m.content))
        .collect::<Vec<_>>()
        .join("\n")
}

/// 返回追加了本轮指令与报告的新历史
pub fn append_turn(history: &[Message], order: &str, report: &str) -> Vec<Message> {
    let mut extended = Vec::with_capacity(history.len() + 2);
    extended.extend_from_slice(history);
    extended.push(Message::user(order));
    extended.push(Message::assistant(report));
    extended
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&Message::assistant("hi")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"hi"}"#);
    }

    #[test]
    fn test_append_turn_leaves_input_untouched() {
        let history = vec![Message::user("hello"), Message::assistant("hi")];
        let extended = append_turn(&history, "list attractions", "done");
        assert_eq!(history.len(), 2);
        assert_eq!(extended.len(), 4);
        assert_eq!(extended[2], Message::user("list attractions"));
        assert_eq!(extended[3], Message::assistant("done"));
    }

    #[test]
    fn test_render_history() {
        let history = vec![Message::user("a"), Message::assistant("b")];
        assert_eq!(render_history(&history), "user: a\nassistant: b");
    }
}
