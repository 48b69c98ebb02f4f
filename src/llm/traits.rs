//! LLM 客户端抽象
//!
//! 所有后端（OpenAI 兼容远程 / 本地推理服务 / Mock）实现 LlmClient：
//! 输入为有序消息（历史 + 本轮 prompt），输出为模型文本。

use async_trait::async_trait;

use crate::memory::Message;

/// LLM 客户端 trait：非流式完成
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// 非流式完成；Err 为后端调用失败的描述
    async fn complete(&self, messages: &[Message]) -> Result<String, String>;
}
