//! 搜索Agent - 仓库发现与元数据补全（不调用模型）

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::config::GithubConfig;
use crate::github::{GithubError, RepoHit, RepositoryProvider};
use crate::store::DocumentStore;
use crate::types::{ProjectRecord, SearchBatch};
use crate::utils::sanitize::truncate_chars;

/// 视为依赖清单的文件名
const MANIFEST_FILES: [&str; 7] = [
    "requirements.txt",
    "Cargo.toml",
    "package.json",
    "pyproject.toml",
    "go.mod",
    "pom.xml",
    "Gemfile",
];

/// 视为容器构建文件的文件名
const CONTAINER_FILES: [&str; 2] = ["Dockerfile", "Containerfile"];

/// 搜索Agent
///
/// 搜索按热度降序的候选仓库，对前若干个补全元数据，逐条持久化后返回。
/// 单个仓库的失败只影响它自己，不影响整个批次。
pub struct SearchAgent {
    provider: Arc<dyn RepositoryProvider>,
    store: Arc<DocumentStore>,
    enrich_limit: usize,
    readme_max_chars: usize,
}

impl SearchAgent {
    pub fn new(
        provider: Arc<dyn RepositoryProvider>,
        store: Arc<DocumentStore>,
        config: &GithubConfig,
    ) -> Self {
        Self {
            provider,
            store,
            enrich_limit: config.enrich_limit,
            readme_max_chars: config.readme_max_chars,
        }
    }

    /// 搜索并补全项目，每条成功的记录先持久化再进入返回批次
    pub async fn search_projects(&self, query: &str) -> SearchBatch {
        println!("🔍 正在搜索与「{}」相关的仓库...", query);

        let hits = match self.provider.search_repositories(query).await {
            Ok(hits) => hits,
            Err(e) => {
                eprintln!("❌ 搜索仓库失败: {}", e);
                return SearchBatch {
                    search_query: query.to_string(),
                    ..Default::default()
                };
            }
        };

        let mut seen = HashSet::new();
        let mut projects = Vec::new();

        for hit in hits.into_iter().take(self.enrich_limit) {
            if !seen.insert(hit.full_name.clone()) {
                continue;
            }
            match self.enrich(&hit).await {
                Ok(record) => match self.store.save_record(query, &record).await {
                    Ok(path) => {
                        println!("   💾 项目数据已保存: {}", path.display());
                        projects.push(record);
                    }
                    Err(e) => {
                        eprintln!("❌ 保存项目数据失败 {}: {}", record.repo_name, e);
                    }
                },
                Err(e) => {
                    eprintln!("❌ 获取项目详情失败 {}: {}", hit.full_name, e);
                }
            }
        }

        SearchBatch {
            total_count: projects.len(),
            projects,
            search_query: query.to_string(),
        }
    }

    /// 补全单个仓库的元数据
    ///
    /// 语言构成与根目录列表失败时降级为空值；README获取出错则整条记录作废。
    async fn enrich(&self, hit: &RepoHit) -> Result<ProjectRecord, GithubError> {
        let languages = match self.provider.languages(&hit.full_name).await {
            Ok(languages) => languages,
            Err(e) => {
                eprintln!("⚠️ 获取语言信息失败 {}: {}", hit.full_name, e);
                HashMap::new()
            }
        };

        let entries = match self.provider.root_entries(&hit.full_name).await {
            Ok(entries) => entries,
            Err(e) => {
                eprintln!("⚠️ 获取文件列表失败 {}: {}", hit.full_name, e);
                Vec::new()
            }
        };

        let readme_content = self.provider.readme(&hit.full_name).await?;
        let readme_content = truncate_chars(&readme_content, self.readme_max_chars);

        Ok(ProjectRecord {
            repo_name: hit.full_name.clone(),
            url: hit.html_url.clone(),
            stars: hit.stargazers_count,
            forks: hit.forks_count,
            watchers: hit.watchers_count,
            last_commit: hit.updated_at.clone(),
            created_at: hit.created_at.clone(),
            size: hit.size,
            description: hit.description.clone().unwrap_or_default(),
            languages,
            license: hit
                .license
                .as_ref()
                .and_then(|license| license.name.clone())
                .unwrap_or_default(),
            topics: hit.topics.clone(),
            has_manifest: entries
                .iter()
                .any(|name| MANIFEST_FILES.contains(&name.as_str())),
            has_containerfile: entries
                .iter()
                .any(|name| CONTAINER_FILES.contains(&name.as_str())),
            has_readme: entries
                .iter()
                .any(|name| name.to_lowercase().starts_with("readme")),
            readme_content,
            analysis_result: None,
            category_result: None,
            report_result: None,
        })
    }
}
