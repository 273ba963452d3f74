//! 报告Agent - 单项目推荐报告与跨项目汇总报告

use serde_json::Value;
use std::sync::Arc;

use super::{format_instructions, parse_structured};
use crate::config::PromptTable;
use crate::config::prompts::{render, stage};
use crate::llm::chat::{ChatMessage, ChatModel, LlmError};
use crate::types::{AnalysisReport, CategoryReport, ProjectRecord, RecommendReport};
use crate::utils::sanitize::truncate_chars;

/// 备用总结的描述截断长度
const FALLBACK_SUMMARY_CHARS: usize = 100;

/// 汇总报告员Agent
pub struct ReportingAgent {
    model: Arc<dyn ChatModel>,
    report_template: String,
    summary_template: String,
}

impl ReportingAgent {
    pub fn new(model: Arc<dyn ChatModel>, prompts: &PromptTable) -> Self {
        Self {
            model,
            report_template: prompts.template(stage::REPORT),
            summary_template: prompts.template(stage::SUMMARY),
        }
    }

    /// 综合评分转换为1-5个星号
    ///
    /// 活跃度与代码质量的均值除以2后四舍五入，夹取到[1, 5]。
    pub fn star_rating(analysis: &AnalysisReport) -> String {
        let mean = (analysis.activity_score + analysis.code_quality_score) / 2.0;
        let count = ((mean / 2.0).round() as i64).clamp(1, 5);
        "⭐".repeat(count as usize)
    }

    /// 生成单项目推荐报告
    ///
    /// 评分一律取确定性计算值，模型只负责总结与推荐理由；
    /// 调用或解析失败时回退到由原始字段拼装的固定默认结果。
    pub async fn generate_report(
        &self,
        record: &ProjectRecord,
        analysis: &AnalysisReport,
        category: &CategoryReport,
    ) -> RecommendReport {
        let rating = Self::star_rating(analysis);

        let prompt = render(
            &self.report_template,
            &[
                ("repo_name", record.repo_name.clone()),
                ("url", record.url.clone()),
                ("description", record.description.clone()),
                ("stars", record.stars.to_string()),
                ("forks", record.forks.to_string()),
                ("watchers", record.watchers.to_string()),
                ("activity_score", analysis.activity_score.to_string()),
                (
                    "code_quality_score",
                    analysis.code_quality_score.to_string(),
                ),
                ("tech_stack", analysis.tech_stack.join(", ")),
                ("maintenance_status", analysis.maintenance_status.clone()),
                ("primary_category", category.primary_category.clone()),
                ("tags", category.tags.join(", ")),
                (
                    "format_instructions",
                    format_instructions::<RecommendReport>(),
                ),
            ],
        );

        match self.model.chat(&[ChatMessage::user(&prompt)], &[]).await {
            Ok(reply) => {
                let text = reply.content.unwrap_or_default();
                match parse_structured::<RecommendReport>(&text) {
                    Ok(mut result) => {
                        result.rating = rating;
                        result
                    }
                    Err(e) => {
                        eprintln!("❌ 解析报告结果失败 {}: {}", record.repo_name, e);
                        Self::fallback(record, analysis, rating)
                    }
                }
            }
            Err(e) => {
                eprintln!("❌ 生成报告出错 {}: {}", record.repo_name, e);
                Self::fallback(record, analysis, rating)
            }
        }
    }

    /// 固定默认结果：总结取自描述，推荐理由引用两项评分
    pub fn fallback(
        record: &ProjectRecord,
        analysis: &AnalysisReport,
        rating: String,
    ) -> RecommendReport {
        let summary = if record.description.is_empty() {
            "暂无描述".to_string()
        } else {
            truncate_chars(&record.description, FALLBACK_SUMMARY_CHARS)
        };
        RecommendReport {
            rating,
            summary,
            recommendation_reason: format!(
                "基于活跃度评分{}和代码质量评分{}的综合推荐",
                analysis.activity_score, analysis.code_quality_score
            ),
        }
    }

    /// 生成跨项目汇总报告文本，模型失败时由调用方回退
    pub async fn generate_summary(
        &self,
        query: &str,
        projects: &[Value],
    ) -> Result<String, LlmError> {
        let projects_data =
            serde_json::to_string_pretty(&Value::Array(projects.to_vec())).unwrap_or_default();
        let prompt = render(
            &self.summary_template,
            &[
                ("query", query.to_string()),
                ("projects_count", projects.len().to_string()),
                ("projects_data", projects_data),
            ],
        );

        let reply = self.model.chat(&[ChatMessage::user(&prompt)], &[]).await?;
        Ok(reply.content.unwrap_or_default())
    }

    /// 确定性的备用汇总报告：由缓存字段拼装的Markdown列表
    pub fn fallback_summary(query: &str, projects: &[Value]) -> String {
        let mut report = format!("# {} 项目汇总报告\n\n", query);
        report.push_str(&format!(
            "本次搜索共找到 {} 个相关项目：\n\n",
            projects.len()
        ));

        for (i, project) in projects.iter().enumerate() {
            let name = project
                .get("repo_name")
                .and_then(Value::as_str)
                .unwrap_or("未知项目");
            let description = project
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or("暂无描述");
            let stars = project.get("stars").and_then(Value::as_u64).unwrap_or(0);
            let forks = project.get("forks").and_then(Value::as_u64).unwrap_or(0);

            report.push_str(&format!("{}. **{}**\n", i + 1, name));
            report.push_str(&format!("   - 描述: {}\n", description));
            report.push_str(&format!("   - 星标数: {}\n", stars));
            report.push_str(&format!("   - 分叉数: {}\n\n", forks));
        }

        report
    }
}
