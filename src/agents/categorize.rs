//! 分类Agent - 基于分析结论对项目归类打标

use std::sync::Arc;

use super::{format_instructions, joined_languages, joined_topics, parse_structured};
use crate::config::PromptTable;
use crate::config::prompts::{render, stage};
use crate::llm::chat::{ChatMessage, ChatModel};
use crate::types::{AnalysisReport, CategoryReport, ProjectRecord};

/// 分类整理员Agent
pub struct CategorizationAgent {
    model: Arc<dyn ChatModel>,
    template: String,
}

impl CategorizationAgent {
    pub fn new(model: Arc<dyn ChatModel>, prompts: &PromptTable) -> Self {
        Self {
            model,
            template: prompts.template(stage::CATEGORIZATION),
        }
    }

    /// 对项目进行分类，调用或解析失败时回退到固定默认结果
    pub async fn categorize_project(
        &self,
        record: &ProjectRecord,
        analysis: &AnalysisReport,
    ) -> CategoryReport {
        let prompt = render(
            &self.template,
            &[
                ("repo_name", record.repo_name.clone()),
                ("description", record.description.clone()),
                ("stars", record.stars.to_string()),
                ("forks", record.forks.to_string()),
                ("watchers", record.watchers.to_string()),
                ("last_commit", record.last_commit.clone()),
                ("languages", joined_languages(record)),
                ("license", record.license.clone()),
                ("topics", joined_topics(record)),
                ("tech_stack", analysis.tech_stack.join(", ")),
                ("complexity_level", analysis.complexity_level.clone()),
                ("maintenance_status", analysis.maintenance_status.clone()),
                ("format_instructions", format_instructions::<CategoryReport>()),
            ],
        );

        match self.model.chat(&[ChatMessage::user(&prompt)], &[]).await {
            Ok(reply) => {
                let text = reply.content.unwrap_or_default();
                match parse_structured::<CategoryReport>(&text) {
                    Ok(result) => result,
                    Err(e) => {
                        eprintln!("❌ 解析分类结果失败 {}: {}", record.repo_name, e);
                        Self::fallback(record)
                    }
                }
            }
            Err(e) => {
                eprintln!("❌ 分类项目出错 {}: {}", record.repo_name, e);
                Self::fallback(record)
            }
        }
    }

    /// 固定默认结果：归入other，标签沿用主题标签
    pub fn fallback(record: &ProjectRecord) -> CategoryReport {
        CategoryReport {
            primary_category: "other".to_string(),
            secondary_categories: Vec::new(),
            tags: record.topics.clone(),
        }
    }
}
