#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Mutex;

    use crate::llm::chat::{
        ChatMessage, ChatModel, ChatReply, LlmError, Role, ToolCallFunction, ToolCallRequest,
        ToolSpec,
    };
    use crate::llm::resolver::{ResolveError, ToolCallResolver};
    use crate::llm::tools::{AgentTool, ToolRegistry};

    /// 按预置脚本依次应答的模拟模型
    struct ScriptedModel {
        replies: Mutex<Vec<ChatReply>>,
        calls: AtomicUsize,
    }

    impl ScriptedModel {
        fn new(replies: Vec<ChatReply>) -> Self {
            Self {
                replies: Mutex::new(replies),
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ChatModel for ScriptedModel {
        async fn chat(
            &self,
            _messages: &[ChatMessage],
            _tools: &[ToolSpec],
        ) -> Result<ChatReply, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut replies = self.replies.lock().await;
            if replies.is_empty() {
                return Err(LlmError::Parse("脚本已耗尽".to_string()));
            }
            Ok(replies.remove(0))
        }
    }

    /// 回显参数的模拟工具
    struct EchoTool;

    #[async_trait]
    impl AgentTool for EchoTool {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn description(&self) -> String {
            "回显输入".to_string()
        }

        fn parameters(&self) -> Value {
            serde_json::json!({"type": "object", "properties": {"text": {"type": "string"}}})
        }

        async fn call(&self, args: Value) -> anyhow::Result<String> {
            Ok(format!("echo:{}", args["text"].as_str().unwrap_or("")))
        }
    }

    /// 永远失败的模拟工具
    struct BoomTool;

    #[async_trait]
    impl AgentTool for BoomTool {
        fn name(&self) -> &'static str {
            "boom"
        }

        fn description(&self) -> String {
            "总是失败".to_string()
        }

        fn parameters(&self) -> Value {
            serde_json::json!({"type": "object", "properties": {}})
        }

        async fn call(&self, _args: Value) -> anyhow::Result<String> {
            anyhow::bail!("爆炸了")
        }
    }

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool));
        registry.register(Arc::new(BoomTool));
        registry
    }

    fn tool_call(id: &str, name: &str, arguments: &str) -> ToolCallRequest {
        ToolCallRequest {
            id: id.to_string(),
            call_type: "function".to_string(),
            function: ToolCallFunction {
                name: name.to_string(),
                arguments: arguments.to_string(),
            },
        }
    }

    fn tool_reply(calls: Vec<ToolCallRequest>) -> ChatReply {
        ChatReply {
            content: None,
            tool_calls: calls,
        }
    }

    fn text_reply(content: &str) -> ChatReply {
        ChatReply {
            content: Some(content.to_string()),
            tool_calls: vec![],
        }
    }

    #[tokio::test]
    async fn test_terminal_reply_returns_immediately() {
        let model = ScriptedModel::new(vec![text_reply("直接回答")]);
        let tools = registry();
        let resolver = ToolCallResolver::new(&model, &tools, 8);

        let resolution = resolver
            .resolve(vec![ChatMessage::user("你好")])
            .await
            .unwrap();

        assert_eq!(resolution.content, "直接回答");
        assert_eq!(resolution.model_calls, 1);
        assert_eq!(resolution.tool_rounds, 0);
        assert_eq!(resolution.messages.len(), 2);
        assert_eq!(resolution.messages[1].role, Role::Assistant);
    }

    #[tokio::test]
    async fn test_k_tool_rounds_make_k_plus_one_model_calls() {
        let k = 3;
        let mut replies: Vec<ChatReply> = (0..k)
            .map(|i| {
                tool_reply(vec![tool_call(
                    &format!("call_{}", i),
                    "echo",
                    &format!(r#"{{"text": "t{}"}}"#, i),
                )])
            })
            .collect();
        replies.push(text_reply("完成"));

        let model = ScriptedModel::new(replies);
        let tools = registry();
        let resolver = ToolCallResolver::new(&model, &tools, 8);

        let resolution = resolver
            .resolve(vec![ChatMessage::user("问题")])
            .await
            .unwrap();

        assert_eq!(model.call_count(), k + 1);
        assert_eq!(resolution.model_calls, k + 1);
        assert_eq!(resolution.tool_rounds, k);

        // 工具结果消息按调用顺序出现，且回指各自的调用标识
        let tool_messages: Vec<&ChatMessage> = resolution
            .messages
            .iter()
            .filter(|m| m.role == Role::Tool)
            .collect();
        assert_eq!(tool_messages.len(), k);
        for (i, message) in tool_messages.iter().enumerate() {
            assert_eq!(message.tool_call_id.as_deref(), Some(format!("call_{}", i).as_str()));
            assert_eq!(message.content.as_deref(), Some(format!("echo:t{}", i).as_str()));
        }
    }

    #[tokio::test]
    async fn test_multiple_calls_in_one_round_answered_in_order() {
        let model = ScriptedModel::new(vec![
            tool_reply(vec![
                tool_call("call_a", "echo", r#"{"text": "a"}"#),
                tool_call("call_b", "echo", r#"{"text": "b"}"#),
            ]),
            text_reply("完成"),
        ]);
        let tools = registry();
        let resolver = ToolCallResolver::new(&model, &tools, 8);

        let resolution = resolver
            .resolve(vec![ChatMessage::user("问题")])
            .await
            .unwrap();

        let tool_ids: Vec<&str> = resolution
            .messages
            .iter()
            .filter(|m| m.role == Role::Tool)
            .filter_map(|m| m.tool_call_id.as_deref())
            .collect();
        assert_eq!(tool_ids, vec!["call_a", "call_b"]);
    }

    #[tokio::test]
    async fn test_tool_error_becomes_error_text_message() {
        let model = ScriptedModel::new(vec![
            tool_reply(vec![tool_call("call_0", "boom", "{}")]),
            text_reply("我注意到工具失败了"),
        ]);
        let tools = registry();
        let resolver = ToolCallResolver::new(&model, &tools, 8);

        let resolution = resolver
            .resolve(vec![ChatMessage::user("问题")])
            .await
            .unwrap();

        let tool_message = resolution
            .messages
            .iter()
            .find(|m| m.role == Role::Tool)
            .unwrap();
        assert!(tool_message.content.as_deref().unwrap().contains("工具执行出错"));
        assert_eq!(resolution.content, "我注意到工具失败了");
    }

    #[tokio::test]
    async fn test_unknown_tool_becomes_error_text_message() {
        let model = ScriptedModel::new(vec![
            tool_reply(vec![tool_call("call_0", "no_such_tool", "{}")]),
            text_reply("好的"),
        ]);
        let tools = registry();
        let resolver = ToolCallResolver::new(&model, &tools, 8);

        let resolution = resolver
            .resolve(vec![ChatMessage::user("问题")])
            .await
            .unwrap();

        let tool_message = resolution
            .messages
            .iter()
            .find(|m| m.role == Role::Tool)
            .unwrap();
        assert!(tool_message.content.as_deref().unwrap().contains("未注册的工具"));
    }

    #[tokio::test]
    async fn test_max_iterations_is_terminal_failure() {
        // 模型永远请求工具
        let replies: Vec<ChatReply> = (0..10)
            .map(|i| tool_reply(vec![tool_call(&format!("call_{}", i), "echo", r#"{"text": "x"}"#)]))
            .collect();
        let model = ScriptedModel::new(replies);
        let tools = registry();
        let resolver = ToolCallResolver::new(&model, &tools, 2);

        let result = resolver.resolve(vec![ChatMessage::user("问题")]).await;
        match result {
            Err(ResolveError::MaxIterationsExceeded { limit }) => assert_eq!(limit, 2),
            other => panic!("期望超限错误，实际为 {:?}", other.map(|r| r.content)),
        }
    }

    #[tokio::test]
    async fn test_model_failure_is_not_retried() {
        let model = ScriptedModel::new(vec![]);
        let tools = registry();
        let resolver = ToolCallResolver::new(&model, &tools, 8);

        let result = resolver.resolve(vec![ChatMessage::user("问题")]).await;
        assert!(matches!(result, Err(ResolveError::Model(_))));
        assert_eq!(model.call_count(), 1);
    }
}
