//! OpenAI兼容的聊天补全客户端

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::LLMConfig;
use crate::llm::chat::{ChatMessage, ChatModel, ChatReply, LlmError, ToolCallRequest, ToolSpec};

/// 聊天补全客户端
///
/// 适用于任何OpenAI兼容的`/chat/completions`端点（OpenAI、DeepSeek、
/// Moonshot、本地vLLM/Ollama等）。模型调用不设超时与重试，调用失败
/// 原样上报给调用方。
#[derive(Clone)]
pub struct OpenAiChatClient {
    http: Client,
    config: LLMConfig,
}

/// 请求体
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [ToolSpec]>,
    temperature: f64,
    max_tokens: u32,
}

/// 响应体
#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ToolCallRequest>>,
}

impl OpenAiChatClient {
    /// 创建新的聊天客户端
    pub fn new(config: LLMConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    fn chat_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.api_base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl ChatModel for OpenAiChatClient {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolSpec],
    ) -> Result<ChatReply, LlmError> {
        let request = ChatRequest {
            model: &self.config.model,
            messages,
            tools: if tools.is_empty() { None } else { Some(tools) },
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let mut builder = self.http.post(self.chat_url()).json(&request);
        if !self.config.api_key.is_empty() {
            builder = builder.bearer_auth(&self.config.api_key);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;
        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::Parse("响应缺少choices".to_string()))?;

        Ok(ChatReply {
            content: choice.message.content,
            tool_calls: choice.message.tool_calls.unwrap_or_default(),
        })
    }
}

/// 检查模型连接和功能是否正常
pub async fn check_connection(model: &dyn ChatModel) -> Result<(), LlmError> {
    println!("🔄 正在检查模型连接...");
    match model.chat(&[ChatMessage::user("Hello")], &[]).await {
        Ok(_) => {
            println!("✅ 模型连接正常");
            Ok(())
        }
        Err(e) => {
            eprintln!("❌ 模型连接失败: {}", e);
            Err(e)
        }
    }
}
