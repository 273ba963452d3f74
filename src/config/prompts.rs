//! 提示词配置表 - 进程启动时加载一次，显式传入各阶段Agent

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// 各流水线阶段的提示词键名
pub mod stage {
    pub const ANALYSIS: &str = "analysis";
    pub const CATEGORIZATION: &str = "categorization";
    pub const REPORT: &str = "report";
    pub const SUMMARY: &str = "summary";
}

/// 分析阶段内置提示词
const FALLBACK_ANALYSIS: &str = r#"你是一名资深的开源项目分析员，请基于以下信息对GitHub项目进行客观评估。

## 项目信息
- 仓库名称: {repo_name}
- 项目地址: {url}
- 项目描述: {description}
- 星标数: {stars}，分叉数: {forks}，关注数: {watchers}
- 仓库大小: {size} KB
- 创建时间: {created_at}，最近提交: {last_commit}
- 语言构成: {languages}
- 许可证: {license}
- 主题标签: {topics}
- 依赖清单: {has_manifest}，容器构建文件: {has_containerfile}

## README摘要
{readme_content}

## 评估要求
- activity_score与code_quality_score均为0-10的数值
- complexity_level只能取 simple / medium / complex 之一
- maintenance_status只能取 active / moderate / stale 之一
- tech_stack列出项目实际使用的核心技术

{format_instructions}"#;

/// 分类阶段内置提示词
const FALLBACK_CATEGORIZATION: &str = r#"你是一名开源项目分类整理员，请对以下项目进行分类并打标签。

## 项目信息
- 仓库名称: {repo_name}
- 项目描述: {description}
- 星标数: {stars}，分叉数: {forks}，关注数: {watchers}
- 最近提交: {last_commit}
- 语言构成: {languages}
- 主题标签: {topics}

## 先前分析结论
- 技术栈: {tech_stack}
- 复杂度等级: {complexity_level}
- 维护状态: {maintenance_status}

## 分类要求
- primary_category给出唯一的主要分类
- secondary_categories给出0-3个次要分类
- tags给出便于检索的标签集合

{format_instructions}"#;

/// 报告阶段内置提示词
const FALLBACK_REPORT: &str = r#"你是一名技术选型顾问，请为以下项目撰写结构化的推荐报告。

## 项目信息
- 仓库名称: {repo_name}
- 项目地址: {url}
- 项目描述: {description}
- 星标数: {stars}，分叉数: {forks}，关注数: {watchers}

## 评估结论
- 活跃度评分: {activity_score}
- 代码质量评分: {code_quality_score}
- 技术栈: {tech_stack}
- 维护状态: {maintenance_status}
- 主要分类: {primary_category}
- 标签: {tags}

## 报告要求
- summary用两三句话概括项目的定位与能力
- recommendation_reason说明适合引入该项目的场景

{format_instructions}"#;

/// 汇总报告内置提示词
const FALLBACK_SUMMARY: &str = r#"你是一名技术调研报告撰写员。针对搜索查询「{query}」，以下是{projects_count}个候选项目的完整资料（JSON格式）：

{projects_data}

请输出一份Markdown格式的横向对比汇总报告，包含：
1. 本次调研的整体结论
2. 每个项目的一段式点评（引用其分析评分与分类）
3. 不同使用场景下的选型建议"#;

/// 提示词配置表
///
/// 缺失的键回退到内置模板，保证流水线在没有配置文件时也能运转。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptTable {
    #[serde(default)]
    templates: HashMap<String, String>,
}

impl PromptTable {
    /// 从文件加载提示词配置
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read prompts file: {:?}", path))?;
        let table: PromptTable =
            toml::from_str(&content).context("Failed to parse prompts file")?;
        Ok(table)
    }

    /// 加载提示词配置，文件缺失或解析失败时回退到内置模板
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::from_file(path) {
            Ok(table) => table,
            Err(e) => {
                eprintln!("⚠️ 加载提示词配置失败，使用内置模板: {}", e);
                Self::default()
            }
        }
    }

    /// 获取指定阶段的提示词模板
    pub fn template(&self, stage_key: &str) -> String {
        if let Some(tpl) = self.templates.get(stage_key) {
            return tpl.clone();
        }
        match stage_key {
            stage::ANALYSIS => FALLBACK_ANALYSIS.to_string(),
            stage::CATEGORIZATION => FALLBACK_CATEGORIZATION.to_string(),
            stage::REPORT => FALLBACK_REPORT.to_string(),
            stage::SUMMARY => FALLBACK_SUMMARY.to_string(),
            _ => String::new(),
        }
    }
}

/// 渲染提示词模板，将`{name}`占位符替换为对应值
pub fn render(template: &str, values: &[(&str, String)]) -> String {
    let mut out = template.to_string();
    for (key, value) in values {
        out = out.replace(&format!("{{{}}}", key), value);
    }
    out
}
