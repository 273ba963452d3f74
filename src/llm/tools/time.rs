//! 时间查询工具

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::AgentTool;

/// 时间工具
#[derive(Debug, Clone, Default)]
pub struct AgentToolTime;

/// 时间查询参数
#[derive(Debug, Deserialize)]
pub struct TimeArgs {
    #[serde(rename = "format")]
    pub format: Option<String>,
}

/// 时间查询结果
#[derive(Debug, Serialize)]
pub struct TimeResult {
    pub current_time: String,
    pub timestamp: i64,
    pub utc_time: String,
}

impl AgentToolTime {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AgentTool for AgentToolTime {
    fn name(&self) -> &'static str {
        "time"
    }

    fn description(&self) -> String {
        "获取当前日期和时间信息，包括本地时间和UTC时间以及时间戳。".to_string()
    }

    fn parameters(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "format": {
                    "type": "string",
                    "description": "时间格式字符串（默认为'%Y-%m-%d %H:%M:%S'）。支持chrono格式化语法。"
                }
            },
            "required": []
        })
    }

    async fn call(&self, args: Value) -> Result<String> {
        println!("   🔧 tool called...time@{:?}", args);

        let args: TimeArgs = serde_json::from_value(args)?;
        let format = args.format.as_deref().unwrap_or("%Y-%m-%d %H:%M:%S");

        let now_local = chrono::Local::now();
        let now_utc = chrono::Utc::now();

        let result = TimeResult {
            current_time: now_local.format(format).to_string(),
            timestamp: now_utc.timestamp(),
            utc_time: now_utc.format(format).to_string(),
        };

        Ok(serde_json::to_string(&result)?)
    }
}
