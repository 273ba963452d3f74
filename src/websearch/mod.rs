//! 联网搜索客户端 - Google Custom Search API

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::config::WebSearchConfig;

/// 联网搜索错误
#[derive(Debug, Error)]
pub enum SearchApiError {
    #[error("搜索服务网络错误: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("搜索服务返回错误状态 {status}")]
    Status { status: u16 },

    #[error("搜索结果解析失败: {0}")]
    Parse(String),
}

/// 一条搜索结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub title: String,
    pub link: String,
    #[serde(default)]
    pub snippet: String,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchHit>,
}

/// 联网搜索客户端
#[derive(Clone)]
pub struct WebSearchClient {
    http: Client,
    config: WebSearchConfig,
}

impl WebSearchClient {
    /// 创建新的搜索客户端
    pub fn new(config: WebSearchConfig) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|e| {
                eprintln!("⚠️ 构建HTTP客户端失败，使用默认客户端: {}", e);
                Client::new()
            });
        Self { http, config }
    }

    /// 执行一次搜索，`site`非空时限定站点范围
    pub async fn search(
        &self,
        query: &str,
        site: Option<&str>,
    ) -> Result<Vec<SearchHit>, SearchApiError> {
        let mut params = vec![
            ("q", query.to_string()),
            ("key", self.config.api_key.clone()),
            ("cx", self.config.cse_id.clone()),
            ("num", self.config.result_count.to_string()),
        ];
        if let Some(site) = site {
            params.push(("siteSearch", site.to_string()));
        }

        let response = self
            .http
            .get(&self.config.endpoint)
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchApiError::Status {
                status: status.as_u16(),
            });
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| SearchApiError::Parse(e.to_string()))?;
        Ok(parsed.items)
    }
}
