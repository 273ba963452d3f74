//! Agent可调用的外部工具

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

use crate::llm::chat::ToolSpec;

pub mod github_answer;
pub mod time;

pub use github_answer::AgentToolGithubAnswer;
pub use time::AgentToolTime;

/// 工具执行错误
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("未注册的工具: {0}")]
    UnknownTool(String),

    #[error("工具参数解析失败: {0}")]
    BadArguments(String),

    #[error("{0}")]
    Execution(String),
}

/// 可被模型调用的外部工具
///
/// 执行结果一律字符串化（非文本结果自行序列化为JSON文本）。
#[async_trait]
pub trait AgentTool: Send + Sync {
    /// 工具名称，即模型调用时使用的函数名
    fn name(&self) -> &'static str;

    /// 面向模型的功能说明
    fn description(&self) -> String;

    /// JSON Schema格式的参数声明
    fn parameters(&self) -> Value;

    /// 执行工具
    async fn call(&self, args: Value) -> anyhow::Result<String>;
}

/// 工具注册表 - 名称到可调用工具的映射
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn AgentTool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册一个工具
    pub fn register(&mut self, tool: Arc<dyn AgentTool>) {
        self.tools.push(tool);
    }

    /// 是否未注册任何工具
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// 生成声明给模型的工具集合（保持注册顺序）
    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools
            .iter()
            .map(|tool| ToolSpec::function(tool.name(), &tool.description(), tool.parameters()))
            .collect()
    }

    fn get(&self, name: &str) -> Option<&Arc<dyn AgentTool>> {
        self.tools.iter().find(|tool| tool.name() == name)
    }

    /// 按名称分发一次工具调用，参数为JSON编码的字符串
    pub async fn dispatch(&self, name: &str, arguments: &str) -> Result<String, ToolError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;

        let args: Value = if arguments.trim().is_empty() {
            Value::Object(serde_json::Map::new())
        } else {
            serde_json::from_str(arguments).map_err(|e| ToolError::BadArguments(e.to_string()))?
        };

        tool.call(args)
            .await
            .map_err(|e| ToolError::Execution(e.to_string()))
    }
}
