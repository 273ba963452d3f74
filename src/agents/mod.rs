//! 流水线阶段Agent - 搜索、分析、分类、报告

use serde::de::DeserializeOwned;

pub mod analysis;
pub mod categorize;
pub mod report;
pub mod search;

pub use analysis::AnalysisAgent;
pub use categorize::CategorizationAgent;
pub use report::ReportingAgent;
pub use search::SearchAgent;

use crate::types::ProjectRecord;
use crate::utils::sanitize::truncate_chars;

/// 提供给分析模型的README摘要长度
const README_SUMMARY_CHARS: usize = 500;

/// 从模型回复中截取JSON片段并解析为结构化结果
///
/// 容忍markdown代码围栏与夹杂的说明文字：取回复中最宽的`{...}`切片。
pub(crate) fn parse_structured<T: DeserializeOwned>(reply: &str) -> Result<T, serde_json::Error> {
    let payload = match (reply.find('{'), reply.rfind('}')) {
        (Some(start), Some(end)) if end > start => &reply[start..=end],
        _ => reply.trim(),
    };
    serde_json::from_str(payload)
}

/// 渲染输出类型的JSON Schema作为格式说明
pub(crate) fn format_instructions<T: schemars::JsonSchema>() -> String {
    let schema = schemars::SchemaGenerator::default().into_root_schema_for::<T>();
    let schema_json = serde_json::to_string_pretty(&schema).unwrap_or_default();
    format!(
        "请只输出一个符合以下JSON Schema的JSON对象，不要输出任何其他文字：\n```json\n{}\n```",
        schema_json
    )
}

/// 语言构成拼接为文本（按名称排序保证稳定）
pub(crate) fn joined_languages(record: &ProjectRecord) -> String {
    let mut names: Vec<&str> = record.languages.keys().map(String::as_str).collect();
    names.sort_unstable();
    names.join(", ")
}

/// 主题标签拼接为文本
pub(crate) fn joined_topics(record: &ProjectRecord) -> String {
    record.topics.join(", ")
}

/// 截取README前若干字符用于提示词
pub(crate) fn readme_summary(record: &ProjectRecord) -> String {
    if record.readme_content.chars().count() > README_SUMMARY_CHARS {
        format!(
            "{}...",
            truncate_chars(&record.readme_content, README_SUMMARY_CHARS)
        )
    } else {
        record.readme_content.clone()
    }
}
