use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub mod prompts;

pub use prompts::PromptTable;

/// 应用程序配置
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    /// 代码托管平台API配置
    pub github: GithubConfig,

    /// 联网搜索API配置
    pub websearch: WebSearchConfig,

    /// LLM模型配置
    pub llm: LLMConfig,

    /// 文档存储配置
    pub store: StoreConfig,

    /// 提示词配置文件路径
    pub prompts_path: PathBuf,

    /// 是否启用详细日志
    pub verbose: bool,
}

/// LLM模型配置
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LLMConfig {
    /// LLM API KEY
    pub api_key: String,

    /// LLM API基地址（OpenAI兼容协议）
    pub api_base_url: String,

    /// 模型名称
    pub model: String,

    /// 最大tokens
    pub max_tokens: u32,

    /// 温度
    pub temperature: f64,

    /// 工具调用循环的最大迭代次数，超限即终止并报告失败
    pub max_tool_iterations: usize,
}

/// 代码托管平台API配置
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GithubConfig {
    /// API基地址
    pub api_base_url: String,

    /// 访问令牌，为空时匿名访问（速率受限）
    pub token: String,

    /// 请求的User-Agent标识
    pub user_agent: String,

    /// 超时时间（秒）
    pub timeout_seconds: u64,

    /// 搜索结果每页数量
    pub search_page_size: u32,

    /// 进入详情补全环节的候选数量上限（成本控制）
    pub enrich_limit: usize,

    /// README内容截断长度（字符）
    pub readme_max_chars: usize,
}

/// 联网搜索API配置
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WebSearchConfig {
    /// API端点
    pub endpoint: String,

    /// API KEY
    pub api_key: String,

    /// 自定义搜索引擎ID
    pub cse_id: String,

    /// 返回结果数量
    pub result_count: u32,

    /// 工具聚合内容的字符预算
    pub content_max_chars: usize,
}

/// 文档存储配置
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StoreConfig {
    /// 搜索结果文档根目录
    pub search_root: PathBuf,

    /// 汇总报告根目录
    pub report_root: PathBuf,
}

impl Config {
    /// 从文件加载配置
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {:?}", path))?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            github: GithubConfig::default(),
            websearch: WebSearchConfig::default(),
            llm: LLMConfig::default(),
            store: StoreConfig::default(),
            prompts_path: PathBuf::from("./prompts.toml"),
            verbose: false,
        }
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            api_key: std::env::var("API_KEY").unwrap_or_default(),
            api_base_url: std::env::var("BASE_URL")
                .unwrap_or_else(|_| String::from("https://api.deepseek.com/v1")),
            model: std::env::var("MODEL").unwrap_or_else(|_| String::from("deepseek-chat")),
            max_tokens: 4096,
            temperature: 0.1,
            max_tool_iterations: 8,
        }
    }
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_base_url: String::from("https://api.github.com"),
            token: std::env::var("GITHUB_TOKEN").unwrap_or_default(),
            user_agent: std::env::var("search_user_agent")
                .unwrap_or_else(|_| String::from("reposcout-rs")),
            timeout_seconds: 10,
            search_page_size: 20,
            enrich_limit: 10,
            readme_max_chars: 2000,
        }
    }
}

impl Default for WebSearchConfig {
    fn default() -> Self {
        Self {
            endpoint: String::from("https://www.googleapis.com/customsearch/v1"),
            api_key: std::env::var("GOOGLE_SEARCH_API_KEY").unwrap_or_default(),
            cse_id: std::env::var("CSE_ID").unwrap_or_default(),
            result_count: 5,
            content_max_chars: 24000,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            search_root: PathBuf::from("./auto_search"),
            report_root: PathBuf::from("./report"),
        }
    }
}
