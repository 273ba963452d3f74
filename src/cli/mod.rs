use crate::config::Config;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// RepoScout-RS - 由Rust与AI驱动的仓库发现与评估引擎
#[derive(Parser, Debug)]
#[command(name = "reposcout-rs")]
#[command(
    about = "AI-based repository discovery and evaluation engine. It searches code-hosting platforms for projects matching a free-text query, enriches candidates with metadata, and generates LLM-driven analysis, categorization and recommendation reports."
)]
#[command(author = "Sopaco")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: CliCommand,

    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// LLM API基地址
    #[arg(long)]
    pub llm_api_base_url: Option<String>,

    /// LLM API KEY
    #[arg(long)]
    pub llm_api_key: Option<String>,

    /// 模型名称
    #[arg(long)]
    pub model: Option<String>,

    /// 温度参数
    #[arg(long)]
    pub temperature: Option<f64>,

    /// 最大tokens数
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// 工具调用循环的最大迭代次数
    #[arg(long)]
    pub max_tool_iterations: Option<usize>,

    /// GitHub访问令牌
    #[arg(long)]
    pub github_token: Option<String>,

    /// 搜索结果文档根目录
    #[arg(long)]
    pub search_root: Option<PathBuf>,

    /// 汇总报告根目录
    #[arg(long)]
    pub report_root: Option<PathBuf>,

    /// 提示词配置文件路径
    #[arg(long)]
    pub prompts: Option<PathBuf>,

    /// 是否启用详细日志
    #[arg(short, long)]
    pub verbose: bool,
}

/// 子命令 - 对应编排器的各个解析入口
#[derive(Subcommand, Debug, PartialEq)]
pub enum CliCommand {
    /// 搜索与查询相关的仓库并缓存候选记录
    Search {
        /// 自由文本查询
        query: String,
    },
    /// 对已缓存的仓库执行分析、分类与报告流水线
    Inspect {
        /// 原始搜索查询
        query: String,
        /// 仓库标识（owner/name）
        repo: String,
    },
    /// 基于多个已缓存仓库生成横向对比汇总报告
    Summarize {
        /// 原始搜索查询
        query: String,
        /// 仓库标识列表（owner/name）
        #[arg(required = true)]
        repos: Vec<String>,
    },
    /// 通过工具调用对话回答自由提问
    Ask {
        /// 提问内容
        question: String,
    },
}

impl Args {
    /// 将CLI参数转换为配置与指令
    pub fn into_parts(self) -> (Config, CliCommand) {
        let mut config = if let Some(config_path) = &self.config {
            // 如果显式指定了配置文件路径，从该路径加载
            Config::from_file(config_path).unwrap_or_else(|e| {
                panic!("⚠️ 警告: 无法读取配置文件 {:?}: {}", config_path, e)
            })
        } else {
            // 如果没有显式指定配置文件，尝试从默认位置加载
            let default_config_path = std::env::current_dir()
                .unwrap_or_else(|_| PathBuf::from("."))
                .join("reposcout.toml");

            if default_config_path.exists() {
                Config::from_file(&default_config_path).unwrap_or_else(|e| {
                    panic!(
                        "⚠️ 警告: 无法读取默认配置文件 {:?}: {}",
                        default_config_path, e
                    )
                })
            } else {
                // 默认配置文件不存在，使用默认值
                Config::default()
            }
        };

        // 覆盖LLM配置
        if let Some(llm_api_base_url) = self.llm_api_base_url {
            config.llm.api_base_url = llm_api_base_url;
        }
        if let Some(llm_api_key) = self.llm_api_key {
            config.llm.api_key = llm_api_key;
        }
        if let Some(model) = self.model {
            config.llm.model = model;
        }
        if let Some(temperature) = self.temperature {
            config.llm.temperature = temperature;
        }
        if let Some(max_tokens) = self.max_tokens {
            config.llm.max_tokens = max_tokens;
        }
        if let Some(max_tool_iterations) = self.max_tool_iterations {
            config.llm.max_tool_iterations = max_tool_iterations;
        }

        // 覆盖GitHub配置
        if let Some(github_token) = self.github_token {
            config.github.token = github_token;
        }

        // 覆盖存储配置
        if let Some(search_root) = self.search_root {
            config.store.search_root = search_root;
        }
        if let Some(report_root) = self.report_root {
            config.store.report_root = report_root;
        }

        // 其他配置
        if let Some(prompts) = self.prompts {
            config.prompts_path = prompts;
        }
        config.verbose = self.verbose;

        (config, self.command)
    }
}
