//! 端到端集成测试：搜索 → 选择 → 汇总 全流程（模拟外部服务）

use async_trait::async_trait;
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;
use tokio::sync::Mutex;

use reposcout_rs::config::{Config, PromptTable, StoreConfig};
use reposcout_rs::github::{GithubError, RepoHit, RepositoryProvider};
use reposcout_rs::llm::chat::{ChatMessage, ChatModel, ChatReply, LlmError, ToolSpec};
use reposcout_rs::orchestrator::Orchestrator;
use reposcout_rs::store::DocumentStore;

/// 按脚本应答并统计调用次数的模拟模型
struct ScriptedModel {
    replies: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl ScriptedModel {
    fn new(replies: Vec<String>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies),
            calls: AtomicUsize::new(0),
        })
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
        Ok(ChatReply {
            content: Some(replies.remove(0)),
            tool_calls: vec![],
        })
    }
}

/// 返回固定命中集的模拟仓库元数据提供方
struct MockProvider {
    hits: Vec<RepoHit>,
    /// README获取会报错的仓库（整条记录作废）
    failing: HashSet<String>,
}

impl MockProvider {
    fn new(hits: Vec<RepoHit>) -> Self {
        Self {
            hits,
            failing: HashSet::new(),
        }
    }

    fn with_failing(mut self, full_name: &str) -> Self {
        self.failing.insert(full_name.to_string());
        self
    }
}

#[async_trait]
impl RepositoryProvider for MockProvider {
    async fn search_repositories(&self, _query: &str) -> Result<Vec<RepoHit>, GithubError> {
        Ok(self.hits.clone())
    }

    async fn languages(&self, full_name: &str) -> Result<HashMap<String, u64>, GithubError> {
        if full_name.contains("no-languages") {
            return Err(GithubError::Status {
                status: 500,
                url: full_name.to_string(),
            });
        }
        Ok(HashMap::from([("Python".to_string(), 1000_u64)]))
    }

    async fn root_entries(&self, _full_name: &str) -> Result<Vec<String>, GithubError> {
        Ok(vec![
            "README.md".to_string(),
            "requirements.txt".to_string(),
            "Dockerfile".to_string(),
            "src".to_string(),
        ])
    }

    async fn readme(&self, full_name: &str) -> Result<String, GithubError> {
        if self.failing.contains(full_name) {
            return Err(GithubError::Status {
                status: 500,
                url: full_name.to_string(),
            });
        }
        Ok("内容".repeat(1500))
    }
}

fn hit(full_name: &str, stars: u64) -> RepoHit {
    RepoHit {
        full_name: full_name.to_string(),
        html_url: format!("https://github.com/{}", full_name),
        stargazers_count: stars,
        forks_count: stars / 10,
        watchers_count: stars,
        updated_at: "2024-05-01T00:00:00Z".to_string(),
        created_at: "2022-01-01T00:00:00Z".to_string(),
        size: 1024,
        description: Some(format!("{} description", full_name)),
        topics: vec!["llm".to_string()],
        ..Default::default()
    }
}

fn stage_replies() -> Vec<String> {
    vec![
        r#"{"activity_score": 9.0, "code_quality_score": 8.0, "tech_stack": ["Python"], "complexity_level": "complex", "maintenance_status": "active"}"#.to_string(),
        r#"{"primary_category": "AI框架", "secondary_categories": [], "tags": ["llm"]}"#.to_string(),
        r#"{"rating": "⭐", "summary": "总结", "recommendation_reason": "理由"}"#.to_string(),
    ]
}

fn build(
    model: Arc<ScriptedModel>,
    provider: MockProvider,
) -> (Orchestrator, Arc<DocumentStore>, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let config = Config {
        store: StoreConfig {
            search_root: temp_dir.path().join("auto_search"),
            report_root: temp_dir.path().join("report"),
        },
        ..Default::default()
    };
    let store = Arc::new(DocumentStore::new(config.store.search_root.clone()));
    let orchestrator = Orchestrator::new(
        model,
        Arc::new(provider),
        store.clone(),
        &PromptTable::default(),
        &config,
    );
    (orchestrator, store, temp_dir)
}

#[tokio::test]
async fn test_search_resolution_returns_and_persists_three_records() {
    let provider = MockProvider::new(vec![
        hit("langchain-ai/langchain", 90000),
        hit("run-llama/llama_index", 35000),
        hit("deepset-ai/haystack", 15000),
    ]);
    let model = ScriptedModel::new(vec![]);
    let (orchestrator, _store, temp_dir) = build(model.clone(), provider);

    let batch = orchestrator.process_query("LLM framework").await.unwrap();

    assert_eq!(batch.total_count, 3);
    assert_eq!(batch.projects.len(), 3);
    assert_eq!(batch.search_query, "LLM framework");
    // 搜索阶段不触发任何模型调用
    assert_eq!(model.call_count(), 0);

    // repo_name唯一
    let names: HashSet<&str> = batch
        .projects
        .iter()
        .map(|p| p.repo_name.as_str())
        .collect();
    assert_eq!(names.len(), 3);

    // 每条记录对应一个缓存文件
    let query_dir = temp_dir.path().join("auto_search").join("LLM framework");
    let files = std::fs::read_dir(&query_dir).unwrap().count();
    assert_eq!(files, 3);
}

#[tokio::test]
async fn test_search_enrichment_flags_and_truncation() {
    let provider = MockProvider::new(vec![hit("owner/repo", 100)]);
    let model = ScriptedModel::new(vec![]);
    let (orchestrator, store, _temp_dir) = build(model, provider);

    let batch = orchestrator.process_query("q").await.unwrap();
    let project = &batch.projects[0];

    assert!(project.has_manifest);
    assert!(project.has_containerfile);
    assert!(project.has_readme);
    // README被截断到2000字符
    assert_eq!(project.readme_content.chars().count(), 2000);
    assert_eq!(project.languages["Python"], 1000);

    // 写入后立即重读，关键字段一致
    let reloaded = store.load_record("q", "owner/repo").await.unwrap();
    assert_eq!(reloaded.repo_name, project.repo_name);
    assert_eq!(reloaded.stars, project.stars);
    assert_eq!(reloaded.languages, project.languages);
    assert_eq!(reloaded.readme_content, project.readme_content);
}

#[tokio::test]
async fn test_search_caps_batch_at_ten_records() {
    let hits: Vec<RepoHit> = (0..12).map(|i| hit(&format!("owner/repo-{}", i), 100)).collect();
    let provider = MockProvider::new(hits);
    let model = ScriptedModel::new(vec![]);
    let (orchestrator, _store, _temp_dir) = build(model, provider);

    let batch = orchestrator.process_query("q").await.unwrap();
    assert_eq!(batch.total_count, 10);
}

#[tokio::test]
async fn test_search_skips_failing_repository() {
    let provider = MockProvider::new(vec![
        hit("good/one", 100),
        hit("bad/broken", 90),
        hit("good/two", 80),
    ])
    .with_failing("bad/broken");
    let model = ScriptedModel::new(vec![]);
    let (orchestrator, store, _temp_dir) = build(model, provider);

    let batch = orchestrator.process_query("q").await.unwrap();

    assert_eq!(batch.total_count, 2);
    assert!(batch.projects.iter().all(|p| p.repo_name != "bad/broken"));
    // 失败的仓库不会被部分持久化
    assert!(store.load_value("q", "bad/broken").await.is_err());
}

#[tokio::test]
async fn test_search_degrades_languages_to_empty_map() {
    let provider = MockProvider::new(vec![hit("owner/no-languages", 100)]);
    let model = ScriptedModel::new(vec![]);
    let (orchestrator, _store, _temp_dir) = build(model, provider);

    let batch = orchestrator.process_query("q").await.unwrap();
    assert_eq!(batch.total_count, 1);
    assert!(batch.projects[0].languages.is_empty());
}

#[tokio::test]
async fn test_search_deduplicates_repeated_hits() {
    let provider = MockProvider::new(vec![
        hit("owner/repo", 100),
        hit("owner/repo", 100),
        hit("other/repo", 50),
    ]);
    let model = ScriptedModel::new(vec![]);
    let (orchestrator, _store, _temp_dir) = build(model, provider);

    let batch = orchestrator.process_query("q").await.unwrap();
    assert_eq!(batch.total_count, 2);
}

#[tokio::test]
async fn test_repeat_search_does_not_erase_derived_results() {
    let provider = MockProvider::new(vec![hit("owner/repo", 100)]);
    let model = ScriptedModel::new(vec![]);
    let (orchestrator, store, _temp_dir) = build(model, provider);

    orchestrator.process_query("q").await.unwrap();

    // 人为写入派生结果，模拟已完成的选择解析
    let mut fields = serde_json::Map::new();
    fields.insert("report_result".to_string(), json!({"rating": "⭐⭐⭐"}));
    store.upsert_fields("q", "owner/repo", fields).await.unwrap();

    // 重新搜索会重写基础字段，但派生结果必须保留
    orchestrator.process_query("q").await.unwrap();

    let value = store.load_value("q", "owner/repo").await.unwrap();
    assert_eq!(value["report_result"]["rating"], json!("⭐⭐⭐"));
}

#[tokio::test]
async fn test_full_pipeline_search_inspect_summarize() {
    let provider = MockProvider::new(vec![
        hit("langchain-ai/langchain", 90000),
        hit("run-llama/llama_index", 35000),
    ]);
    let mut replies = stage_replies();
    replies.push("# 汇总报告\n两个项目各有千秋".to_string());
    let model = ScriptedModel::new(replies);
    let (orchestrator, _store, _temp_dir) = build(model.clone(), provider);

    let batch = orchestrator.process_query("LLM framework").await.unwrap();
    assert_eq!(batch.total_count, 2);

    let merged = orchestrator
        .process_selected("LLM framework", "langchain-ai/langchain")
        .await
        .unwrap();
    assert_eq!(model.call_count(), 3);
    assert_eq!(merged["report_result"]["rating"], json!("⭐⭐⭐⭐"));

    // 汇总只要求文档在场，未分析过的仓库同样计入
    let outcome = orchestrator
        .summarize(
            "LLM framework",
            &[
                "langchain-ai/langchain".to_string(),
                "run-llama/llama_index".to_string(),
            ],
        )
        .await
        .unwrap();
    assert_eq!(model.call_count(), 4);
    assert_eq!(outcome.projects_count, 2);
    assert!(outcome.report_path.exists());
    assert_eq!(
        std::fs::read_to_string(&outcome.report_path).unwrap(),
        "# 汇总报告\n两个项目各有千秋"
    );
}
