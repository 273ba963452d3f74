//! 分析Agent - 评估项目活跃度、质量、复杂度与维护状态

use std::sync::Arc;

use super::{format_instructions, joined_languages, joined_topics, parse_structured, readme_summary};
use crate::config::PromptTable;
use crate::config::prompts::{render, stage};
use crate::llm::chat::{ChatMessage, ChatModel};
use crate::types::{AnalysisReport, ProjectRecord};

/// 项目分析员Agent
pub struct AnalysisAgent {
    model: Arc<dyn ChatModel>,
    template: String,
}

impl AnalysisAgent {
    pub fn new(model: Arc<dyn ChatModel>, prompts: &PromptTable) -> Self {
        Self {
            model,
            template: prompts.template(stage::ANALYSIS),
        }
    }

    /// 分析项目，调用或解析失败时回退到固定默认结果
    pub async fn analyze_project(&self, record: &ProjectRecord) -> AnalysisReport {
        let prompt = render(
            &self.template,
            &[
                ("repo_name", record.repo_name.clone()),
                ("url", record.url.clone()),
                ("description", record.description.clone()),
                ("stars", record.stars.to_string()),
                ("forks", record.forks.to_string()),
                ("watchers", record.watchers.to_string()),
                ("size", record.size.to_string()),
                ("created_at", record.created_at.clone()),
                ("last_commit", record.last_commit.clone()),
                ("languages", joined_languages(record)),
                ("license", record.license.clone()),
                ("topics", joined_topics(record)),
                ("has_manifest", record.has_manifest.to_string()),
                ("has_containerfile", record.has_containerfile.to_string()),
                ("has_readme", record.has_readme.to_string()),
                ("readme_content", readme_summary(record)),
                ("format_instructions", format_instructions::<AnalysisReport>()),
            ],
        );

        match self.model.chat(&[ChatMessage::user(&prompt)], &[]).await {
            Ok(reply) => {
                let text = reply.content.unwrap_or_default();
                match parse_structured::<AnalysisReport>(&text) {
                    Ok(result) => result,
                    Err(e) => {
                        eprintln!("❌ 解析分析结果失败 {}: {}", record.repo_name, e);
                        Self::fallback(record)
                    }
                }
            }
            Err(e) => {
                eprintln!("❌ 分析项目出错 {}: {}", record.repo_name, e);
                Self::fallback(record)
            }
        }
    }

    /// 固定默认结果：中位评分，技术栈取自语言构成
    pub fn fallback(record: &ProjectRecord) -> AnalysisReport {
        let mut tech_stack: Vec<String> = record.languages.keys().cloned().collect();
        tech_stack.sort_unstable();
        AnalysisReport {
            activity_score: 5.0,
            code_quality_score: 5.0,
            tech_stack,
            complexity_level: "medium".to_string(),
            maintenance_status: "moderate".to_string(),
        }
    }
}
