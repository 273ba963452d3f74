//! 项目记录数据结构 - (查询, 仓库)维度的持久化文档模型

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 项目记录 - 每个(查询, 仓库)对应一份文档
///
/// 跨流水线阶段只增不减：后写入的阶段不会删除先前阶段已持久化的字段。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    /// 仓库名称（owner/name）
    pub repo_name: String,

    /// 仓库主页地址
    #[serde(default)]
    pub url: String,

    /// 星标数
    #[serde(default)]
    pub stars: u64,

    /// 分叉数
    #[serde(default)]
    pub forks: u64,

    /// 关注数
    #[serde(default)]
    pub watchers: u64,

    /// 最近一次提交时间
    #[serde(default)]
    pub last_commit: String,

    /// 创建时间
    #[serde(default)]
    pub created_at: String,

    /// 仓库大小（KB）
    #[serde(default)]
    pub size: u64,

    /// 项目描述
    #[serde(default)]
    pub description: String,

    /// 语言构成，语言名称 -> 字节数
    #[serde(default)]
    pub languages: HashMap<String, u64>,

    /// 许可证名称，未知时为空串
    #[serde(default)]
    pub license: String,

    /// 主题标签
    #[serde(default)]
    pub topics: Vec<String>,

    /// 是否存在依赖清单文件
    #[serde(default)]
    pub has_manifest: bool,

    /// 是否存在容器构建文件
    #[serde(default)]
    pub has_containerfile: bool,

    /// 是否存在README
    #[serde(default)]
    pub has_readme: bool,

    /// README内容（截断后）
    #[serde(default)]
    pub readme_content: String,

    /// 分析阶段产出，缺席表示该阶段尚未执行
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_result: Option<AnalysisReport>,

    /// 分类阶段产出
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_result: Option<CategoryReport>,

    /// 报告阶段产出
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_result: Option<RecommendReport>,
}

/// 分析结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisReport {
    /// 活跃度评分 (0-10)
    pub activity_score: f64,
    /// 代码质量评分 (0-10)
    pub code_quality_score: f64,
    /// 技术栈
    #[serde(default)]
    pub tech_stack: Vec<String>,
    /// 复杂度等级: simple / medium / complex
    pub complexity_level: String,
    /// 维护状态: active / moderate / stale
    pub maintenance_status: String,
}

/// 分类结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CategoryReport {
    /// 主要分类
    pub primary_category: String,
    /// 次要分类
    #[serde(default)]
    pub secondary_categories: Vec<String>,
    /// 标签
    #[serde(default)]
    pub tags: Vec<String>,
}

/// 推荐报告结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RecommendReport {
    /// 评分（⭐符号串，1-5个）
    pub rating: String,
    /// 项目总结
    pub summary: String,
    /// 推荐理由
    pub recommendation_reason: String,
}

/// 搜索批次结果
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchBatch {
    /// 搜索到的项目列表
    pub projects: Vec<ProjectRecord>,
    /// 总项目数量
    pub total_count: usize,
    /// 搜索查询
    pub search_query: String,
}

/// 记录所处的流水线阶段，由字段存在性推导，只进不退
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RecordStage {
    Discovered,
    Enriched,
    Analyzed,
    Categorized,
    Reported,
}

impl ProjectRecord {
    /// 推导记录当前所处阶段
    pub fn stage(&self) -> RecordStage {
        if self.report_result.is_some() {
            return RecordStage::Reported;
        }
        if self.category_result.is_some() {
            return RecordStage::Categorized;
        }
        if self.analysis_result.is_some() {
            return RecordStage::Analyzed;
        }
        if !self.languages.is_empty() || !self.readme_content.is_empty() {
            return RecordStage::Enriched;
        }
        RecordStage::Discovered
    }

    /// 三个派生结果是否全部就绪（缓存命中判定是全有或全无的）
    pub fn is_fully_derived(&self) -> bool {
        self.analysis_result.is_some()
            && self.category_result.is_some()
            && self.report_result.is_some()
    }
}
