//! 工具调用解析器 - 驱动模型与外部函数保持同步的多轮对话循环

use thiserror::Error;

use crate::llm::chat::{ChatMessage, ChatModel, LlmError};
use crate::llm::tools::ToolRegistry;

/// 一次完整解析的产出：终态回复与完整的消息列表
#[derive(Debug, Clone)]
pub struct Resolution {
    /// 模型的最终文本回复
    pub content: String,
    /// 本次解析积累的全部消息（含工具调用请求与工具结果）
    pub messages: Vec<ChatMessage>,
    /// 模型端点调用次数
    pub model_calls: usize,
    /// 工具执行轮数
    pub tool_rounds: usize,
}

/// 解析失败
#[derive(Debug, Error)]
pub enum ResolveError {
    /// 模型端点调用失败，不在解析器内部重试
    #[error("模型服务调用失败: {0}")]
    Model(#[from] LlmError),

    /// 工具调用轮数超过上限
    #[error("工具调用循环超过最大迭代次数({limit})")]
    MaxIterationsExceeded { limit: usize },
}

/// 工具调用解析器
///
/// 循环调用模型直至产出不含工具调用的终态回复。工具执行失败不会
/// 中断循环：错误文本作为工具结果回传，由模型在下一轮自行应对。
pub struct ToolCallResolver<'a> {
    model: &'a dyn ChatModel,
    tools: &'a ToolRegistry,
    max_iterations: usize,
}

impl<'a> ToolCallResolver<'a> {
    pub fn new(model: &'a dyn ChatModel, tools: &'a ToolRegistry, max_iterations: usize) -> Self {
        Self {
            model,
            tools,
            max_iterations,
        }
    }

    /// 从初始消息列表出发解析出终态回复
    pub async fn resolve(&self, mut messages: Vec<ChatMessage>) -> Result<Resolution, ResolveError> {
        let specs = self.tools.specs();
        let mut model_calls = 0usize;
        let mut tool_rounds = 0usize;

        loop {
            let reply = self.model.chat(&messages, &specs).await?;
            model_calls += 1;

            if reply.is_terminal() {
                let content = reply.content.unwrap_or_default();
                messages.push(ChatMessage::assistant(&content));
                return Ok(Resolution {
                    content,
                    messages,
                    model_calls,
                    tool_rounds,
                });
            }

            if tool_rounds >= self.max_iterations {
                return Err(ResolveError::MaxIterationsExceeded {
                    limit: self.max_iterations,
                });
            }
            tool_rounds += 1;

            // 工具调用请求不是终态：先入列，再逐一应答后继续对话
            messages.push(ChatMessage::assistant_with_tool_calls(
                reply.content.clone(),
                reply.tool_calls.clone(),
            ));

            for call in &reply.tool_calls {
                let content = match self
                    .tools
                    .dispatch(&call.function.name, &call.function.arguments)
                    .await
                {
                    Ok(result) => result,
                    Err(e) => format!("工具执行出错: {}", e),
                };
                messages.push(ChatMessage::tool(&call.id, &content));
            }
        }
    }
}

// Include tests
#[cfg(test)]
mod tests;
