//! 流水线编排器 - 阶段顺序调度、缓存命中判定与结果合并

use anyhow::{Context, Result, anyhow, bail};
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;

use crate::agents::{AnalysisAgent, CategorizationAgent, ReportingAgent, SearchAgent};
use crate::cli::CliCommand;
use crate::config::{Config, PromptTable};
use crate::github::{GithubClient, RepositoryProvider};
use crate::llm::chat::{ChatMessage, ChatModel};
use crate::llm::client::{OpenAiChatClient, check_connection};
use crate::llm::resolver::ToolCallResolver;
use crate::llm::tools::{AgentToolGithubAnswer, AgentToolTime, ToolRegistry};
use crate::store::DocumentStore;
use crate::types::{ProjectRecord, SearchBatch};
use crate::utils::sanitize::sanitize_component;
use crate::websearch::WebSearchClient;

/// 汇总报告产出
#[derive(Debug, Clone)]
pub struct SummaryOutcome {
    /// 报告文件路径
    pub report_path: PathBuf,
    /// 报告文本
    pub summary: String,
    /// 覆盖的项目数量
    pub projects_count: usize,
}

/// 流水线编排器
///
/// 持有全部阶段Agent与文档存储，是唯一向缓存文档合并派生结果的写入方。
pub struct Orchestrator {
    store: Arc<DocumentStore>,
    search_agent: SearchAgent,
    analysis_agent: AnalysisAgent,
    categorization_agent: CategorizationAgent,
    reporting_agent: ReportingAgent,
    report_root: PathBuf,
}

impl Orchestrator {
    /// 创建新的编排器
    pub fn new(
        model: Arc<dyn ChatModel>,
        provider: Arc<dyn RepositoryProvider>,
        store: Arc<DocumentStore>,
        prompts: &PromptTable,
        config: &Config,
    ) -> Self {
        Self {
            search_agent: SearchAgent::new(provider, store.clone(), &config.github),
            analysis_agent: AnalysisAgent::new(model.clone(), prompts),
            categorization_agent: CategorizationAgent::new(model.clone(), prompts),
            reporting_agent: ReportingAgent::new(model, prompts),
            store,
            report_root: config.store.report_root.clone(),
        }
    }

    /// 查询解析：只执行搜索阶段，不触发任何模型调用（成本控制）
    pub async fn process_query(&self, query: &str) -> Result<SearchBatch> {
        let query = query.trim();
        if query.is_empty() {
            bail!("查询内容不能为空");
        }
        println!("🚀 开始处理查询: {}", query);
        Ok(self.search_agent.search_projects(query).await)
    }

    /// 选择解析：对已缓存的仓库执行 分析 → 分类 → 报告
    ///
    /// 三个派生结果全部在场即缓存命中，原样返回且不调用模型；
    /// 缺任何一个则三个阶段全部重跑（完整性判定是全有或全无的）。
    pub async fn process_selected(&self, query: &str, repo_name: &str) -> Result<Value> {
        let query = query.trim();
        if query.is_empty() {
            bail!("查询内容不能为空");
        }
        if repo_name.trim().is_empty() {
            bail!("未提供仓库标识");
        }

        let document = self
            .store
            .load_value(query, repo_name)
            .await
            .map_err(|e| anyhow!("读取缓存文档失败: {}", e))?;
        let record: ProjectRecord = serde_json::from_value(document.clone())
            .map_err(|e| anyhow!("缓存文档内容无效 {}: {}", repo_name, e))?;

        if record.is_fully_derived() {
            println!("✅ 缓存命中，跳过模型调用: {}", repo_name);
            return Ok(document);
        }

        println!(
            "🚀 开始处理选中的项目: {} (当前阶段: {:?})",
            repo_name,
            record.stage()
        );

        println!("   步骤1: 分析项目详情...");
        let analysis = self.analysis_agent.analyze_project(&record).await;

        println!("   步骤2: 分类整理项目...");
        let category = self
            .categorization_agent
            .categorize_project(&record, &analysis)
            .await;

        println!("   步骤3: 生成推荐报告...");
        let report = self
            .reporting_agent
            .generate_report(&record, &analysis, &category)
            .await;

        let mut fields = Map::new();
        fields.insert("analysis_result".to_string(), serde_json::to_value(&analysis)?);
        fields.insert("category_result".to_string(), serde_json::to_value(&category)?);
        fields.insert("report_result".to_string(), serde_json::to_value(&report)?);

        let merged = self
            .store
            .upsert_fields(query, repo_name, fields)
            .await
            .context("合并派生结果失败")?;
        println!("✅ 已更新项目文档（分析、分类、报告）: {}", repo_name);

        Ok(merged)
    }

    /// 汇总解析：对多个已缓存仓库生成横向汇总报告并落盘
    ///
    /// 缺失的文档记录日志后跳过，全部缺失才算失败；
    /// 模型失败时回退到由缓存字段拼装的确定性报告。
    pub async fn summarize(&self, query: &str, repo_names: &[String]) -> Result<SummaryOutcome> {
        let query = query.trim();
        if query.is_empty() {
            bail!("查询内容不能为空");
        }
        if repo_names.is_empty() {
            bail!("未提供选中项目列表");
        }

        println!("🚀 开始生成汇总报告: {}", query);

        let mut documents = Vec::new();
        for repo_name in repo_names {
            match self.store.load_value(query, repo_name).await {
                Ok(document) => documents.push(document),
                Err(e) => eprintln!("⚠️ 跳过缺失的项目文档 {}: {}", repo_name, e),
            }
        }
        if documents.is_empty() {
            bail!("没有找到有效的项目数据");
        }

        let digests: Vec<Value> = documents.iter().map(project_digest).collect();
        let summary = match self.reporting_agent.generate_summary(query, &digests).await {
            Ok(text) => text,
            Err(e) => {
                eprintln!("❌ 生成汇总报告出错，使用备用报告: {}", e);
                ReportingAgent::fallback_summary(query, &digests)
            }
        };

        let report_path = self.save_summary_report(query, &summary).await?;
        println!("✅ 汇总报告已保存到: {}", report_path.display());

        Ok(SummaryOutcome {
            report_path,
            summary,
            projects_count: documents.len(),
        })
    }

    /// 保存汇总报告到带时间戳的文件，从不覆盖已有报告
    async fn save_summary_report(&self, query: &str, summary: &str) -> Result<PathBuf> {
        let report_dir = self.report_root.join(sanitize_component(query));
        fs::create_dir_all(&report_dir)
            .await
            .context("创建报告目录失败")?;

        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let report_path = report_dir.join(format!("summary_report_{}.md", timestamp));
        fs::write(&report_path, summary)
            .await
            .context("写入汇总报告失败")?;

        Ok(report_path)
    }
}

/// 提取文档中参与汇总的字段子集
fn project_digest(document: &Value) -> Value {
    let pick = |key: &str| document.get(key).cloned().unwrap_or(Value::Null);
    serde_json::json!({
        "repo_name": pick("repo_name"),
        "description": pick("description"),
        "stars": pick("stars"),
        "forks": pick("forks"),
        "languages": pick("languages"),
        "topics": pick("topics"),
        "analysis_result": pick("analysis_result"),
        "category_result": pick("category_result"),
        "report_result": pick("report_result"),
    })
}

/// 按CLI指令装配依赖并执行对应的解析流程
pub async fn run(config: &Config, command: CliCommand) -> Result<()> {
    let prompts = PromptTable::load_or_default(&config.prompts_path);
    let model: Arc<dyn ChatModel> = Arc::new(OpenAiChatClient::new(config.llm.clone()));
    let provider: Arc<dyn RepositoryProvider> = Arc::new(GithubClient::new(config.github.clone()));
    let store = Arc::new(DocumentStore::new(config.store.search_root.clone()));
    let orchestrator = Orchestrator::new(
        model.clone(),
        provider.clone(),
        store,
        &prompts,
        config,
    );

    match command {
        CliCommand::Search { query } => {
            let batch = orchestrator.process_query(&query).await?;
            println!("共找到 {} 个项目:", batch.total_count);
            for (i, project) in batch.projects.iter().enumerate() {
                println!(
                    "{}. {} (⭐ {})\n   {}",
                    i + 1,
                    project.repo_name,
                    project.stars,
                    project.description
                );
            }
        }
        CliCommand::Inspect { query, repo } => {
            check_connection(model.as_ref()).await?;
            let merged = orchestrator.process_selected(&query, &repo).await?;
            println!("{}", serde_json::to_string_pretty(&merged)?);
        }
        CliCommand::Summarize { query, repos } => {
            check_connection(model.as_ref()).await?;
            let outcome = orchestrator.summarize(&query, &repos).await?;
            println!(
                "📄 报告已生成（覆盖{}个项目）: {}",
                outcome.projects_count,
                outcome.report_path.display()
            );
            println!("{}", outcome.summary);
        }
        CliCommand::Ask { question } => {
            check_connection(model.as_ref()).await?;

            let mut registry = ToolRegistry::new();
            registry.register(Arc::new(AgentToolTime::new()));
            registry.register(Arc::new(AgentToolGithubAnswer::new(
                WebSearchClient::new(config.websearch.clone()),
                provider,
                config.websearch.content_max_chars,
            )));

            let resolver =
                ToolCallResolver::new(model.as_ref(), &registry, config.llm.max_tool_iterations);
            let resolution = resolver.resolve(vec![ChatMessage::user(&question)]).await?;
            println!("{}", resolution.content);
        }
    }

    Ok(())
}
