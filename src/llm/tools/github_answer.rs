//! GitHub联网搜索工具 - 定位模型不认识的仓库并聚合其README

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use super::AgentTool;
use crate::github::RepositoryProvider;
use crate::websearch::{SearchHit, WebSearchClient};

/// GitHub联网搜索工具
pub struct AgentToolGithubAnswer {
    websearch: WebSearchClient,
    provider: Arc<dyn RepositoryProvider>,
    content_max_chars: usize,
}

/// 搜索参数
#[derive(Debug, Deserialize)]
pub struct GithubAnswerArgs {
    pub q: String,
}

impl AgentToolGithubAnswer {
    pub fn new(
        websearch: WebSearchClient,
        provider: Arc<dyn RepositoryProvider>,
        content_max_chars: usize,
    ) -> Self {
        Self {
            websearch,
            provider,
            content_max_chars,
        }
    }
}

/// 从搜索结果中筛选出GitHub项目主页链接，提取owner/repo
///
/// 只接受形如`https://github.com/<owner>/<repo>`的链接，
/// issue页与文件页不算项目主页。
pub fn extract_project_links(hits: &[SearchHit]) -> Vec<String> {
    hits.iter()
        .filter(|hit| {
            hit.link.contains("github.com")
                && !hit.link.contains("/issues/")
                && !hit.link.contains("/blob/")
        })
        .filter_map(|hit| {
            let parts: Vec<&str> = hit.link.split('/').collect();
            if parts.len() == 5 && !parts[3].is_empty() && !parts[4].is_empty() {
                Some(format!("{}/{}", parts[3], parts[4]))
            } else {
                None
            }
        })
        .collect()
}

#[async_trait]
impl AgentTool for AgentToolGithubAnswer {
    fn name(&self) -> &'static str {
        "get_answer_github"
    }

    fn description(&self) -> String {
        "GitHub联网搜索工具。当用户的问题涉及你不了解的开源项目，或用户点名要求在GitHub上搜索时，\
         调用该函数。函数会联网定位相关仓库并返回其README文本，你可以围绕返回的文本进行总结并回答用户提问。"
            .to_string()
    }

    fn parameters(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "q": {
                    "type": "string",
                    "description": "一个适合在GitHub上搜索的项目关键词，通常需要从用户问题中提炼。"
                }
            },
            "required": ["q"]
        })
    }

    async fn call(&self, args: Value) -> Result<String> {
        println!("   🔧 tool called...get_answer_github@{:?}", args);

        let args: GithubAnswerArgs = serde_json::from_value(args)?;

        println!("   🔍 正在接入联网搜索，查找和问题相关的仓库...");
        let hits = self
            .websearch
            .search(&args.q, Some("https://github.com/"))
            .await?;
        let repos = extract_project_links(&hits);
        if repos.is_empty() {
            return Ok(format!("没有在GitHub上找到与「{}」相关的项目主页。", args.q));
        }

        println!("   📖 正在读取搜索得到的相关仓库README...");
        let mut content = String::new();
        for full_name in repos {
            let readme = match self.provider.readme(&full_name).await {
                Ok(text) => text,
                Err(e) => {
                    eprintln!("⚠️ 获取README失败 {}: {}", full_name, e);
                    continue;
                }
            };
            if readme.is_empty() {
                continue;
            }
            content.push_str(&format!("## {}\n{}\n\n", full_name, readme));
            if content.chars().count() > self.content_max_chars {
                break;
            }
        }

        if content.is_empty() {
            return Ok(format!(
                "找到了与「{}」相关的仓库，但未能读取到任何README内容。",
                args.q
            ));
        }

        Ok(content)
    }
}
