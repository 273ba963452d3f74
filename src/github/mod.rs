//! 代码托管平台客户端 - GitHub REST API

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

use crate::config::GithubConfig;

/// 按优先顺序尝试的README文件名
const README_CANDIDATES: [&str; 4] = ["README.md", "README.rst", "README.txt", "README"];

/// GitHub API错误
#[derive(Debug, Error)]
pub enum GithubError {
    #[error("GitHub API网络错误: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("GitHub API返回错误状态 {status}: {url}")]
    Status { status: u16, url: String },

    #[error("GitHub API响应解析失败: {0}")]
    Parse(String),

    #[error("内容解码失败: {0}")]
    Decode(String),
}

/// 仓库搜索命中项
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RepoHit {
    pub full_name: String,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    #[serde(default)]
    pub watchers_count: u64,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub license: Option<LicenseInfo>,
    #[serde(default)]
    pub topics: Vec<String>,
}

/// 许可证信息
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LicenseInfo {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Deserialize)]
struct SearchRepositoriesResponse {
    #[serde(default)]
    items: Vec<RepoHit>,
}

#[derive(Deserialize)]
struct ContentEntry {
    name: String,
    #[serde(rename = "type")]
    entry_type: String,
}

#[derive(Deserialize)]
struct ContentBlob {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
}

/// 仓库元数据提供方抽象
#[async_trait]
pub trait RepositoryProvider: Send + Sync {
    /// 按热度降序搜索仓库
    async fn search_repositories(&self, query: &str) -> Result<Vec<RepoHit>, GithubError>;

    /// 获取语言构成（语言名称 -> 字节数）
    async fn languages(&self, full_name: &str) -> Result<HashMap<String, u64>, GithubError>;

    /// 获取根目录下的文件名列表
    async fn root_entries(&self, full_name: &str) -> Result<Vec<String>, GithubError>;

    /// 获取README内容，所有候选文件名均缺失时返回空串
    async fn readme(&self, full_name: &str) -> Result<String, GithubError>;
}

/// GitHub REST API客户端
#[derive(Clone)]
pub struct GithubClient {
    http: Client,
    config: GithubConfig,
}

impl GithubClient {
    /// 创建新的客户端（固定超时，可选令牌）
    pub fn new(config: GithubConfig) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.clone())
            .build()
            .unwrap_or_else(|e| {
                eprintln!("⚠️ 构建HTTP客户端失败，使用默认客户端: {}", e);
                Client::new()
            });
        Self { http, config }
    }

    fn request(&self, url: &str) -> reqwest::RequestBuilder {
        let mut builder = self.http.get(url);
        if !self.config.token.is_empty() {
            builder = builder.header("Authorization", format!("token {}", self.config.token));
        }
        builder
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: String,
        query: &[(&str, String)],
    ) -> Result<T, GithubError> {
        let response = self.request(&url).query(query).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GithubError::Status {
                status: status.as_u16(),
                url,
            });
        }
        response
            .json::<T>()
            .await
            .map_err(|e| GithubError::Parse(e.to_string()))
    }
}

#[async_trait]
impl RepositoryProvider for GithubClient {
    async fn search_repositories(&self, query: &str) -> Result<Vec<RepoHit>, GithubError> {
        let url = format!("{}/search/repositories", self.config.api_base_url);
        let params = [
            ("q", query.to_string()),
            ("sort", "stars".to_string()),
            ("order", "desc".to_string()),
            ("per_page", self.config.search_page_size.to_string()),
        ];
        let parsed: SearchRepositoriesResponse = self.get_json(url, &params).await?;
        Ok(parsed.items)
    }

    async fn languages(&self, full_name: &str) -> Result<HashMap<String, u64>, GithubError> {
        let url = format!("{}/repos/{}/languages", self.config.api_base_url, full_name);
        self.get_json(url, &[]).await
    }

    async fn root_entries(&self, full_name: &str) -> Result<Vec<String>, GithubError> {
        let url = format!("{}/repos/{}/contents", self.config.api_base_url, full_name);
        let entries: Vec<ContentEntry> = self.get_json(url, &[]).await?;
        Ok(entries
            .into_iter()
            .filter(|entry| entry.entry_type == "file")
            .map(|entry| entry.name)
            .collect())
    }

    async fn readme(&self, full_name: &str) -> Result<String, GithubError> {
        for candidate in README_CANDIDATES {
            let url = format!(
                "{}/repos/{}/contents/{}",
                self.config.api_base_url, full_name, candidate
            );
            let response = match self.request(&url).send().await {
                Ok(response) => response,
                Err(_) => continue,
            };
            if !response.status().is_success() {
                continue;
            }
            let blob: ContentBlob = match response.json().await {
                Ok(blob) => blob,
                Err(_) => continue,
            };
            if blob.encoding.as_deref() == Some("base64") {
                let encoded = blob.content.unwrap_or_default();
                return decode_base64_content(&encoded);
            }
            if let Some(content) = blob.content {
                return Ok(content);
            }
        }
        Ok(String::new())
    }
}

/// 解码GitHub内容接口返回的base64文本（内容中夹杂换行）
pub fn decode_base64_content(encoded: &str) -> Result<String, GithubError> {
    let cleaned: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = BASE64_STANDARD
        .decode(cleaned.as_bytes())
        .map_err(|e| GithubError::Decode(e.to_string()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
