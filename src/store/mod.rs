//! 文档存储 - 以(查询, 仓库)为键的单文件JSON文档缓存

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::fs;
use tokio::sync::Mutex;

use crate::types::ProjectRecord;
use crate::utils::sanitize::sanitize_component;

/// 文档存储错误
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("文档不存在: {path:?}")]
    NotFound { path: PathBuf },

    #[error("文档读写失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("文档解析失败 {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// 文档存储管理器
///
/// 每份文档是一个扁平JSON对象，字段级upsert只覆盖本次写入的键，
/// 已存在的其他字段（包括本结构未知的字段）原样保留。
/// 同一文档的读改写通过per-key写锁串行化，避免并发合并互相覆盖。
pub struct DocumentStore {
    root: PathBuf,
    locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl DocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// 计算文档路径：`<root>/<清洗后的查询>/<清洗后的仓库名>.json`
    pub fn document_path(&self, query: &str, repo_name: &str) -> PathBuf {
        self.root
            .join(sanitize_component(query))
            .join(format!("{}.json", sanitize_component(repo_name)))
    }

    /// 获取指定文档的写锁（按路径惰性创建）
    async fn writer_lock(&self, path: &PathBuf) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks.entry(path.clone()).or_default().clone()
    }

    /// 读取文档原始JSON对象
    pub async fn load_value(&self, query: &str, repo_name: &str) -> Result<Value, StoreError> {
        let path = self.document_path(query, repo_name);
        if !path.exists() {
            return Err(StoreError::NotFound { path });
        }
        let content = fs::read_to_string(&path).await?;
        serde_json::from_str(&content).map_err(|source| StoreError::Parse { path, source })
    }

    /// 读取文档并解析为项目记录
    pub async fn load_record(
        &self,
        query: &str,
        repo_name: &str,
    ) -> Result<ProjectRecord, StoreError> {
        let path = self.document_path(query, repo_name);
        let value = self.load_value(query, repo_name).await?;
        serde_json::from_value(value).map_err(|source| StoreError::Parse { path, source })
    }

    /// 字段级upsert：把给定字段合并进已有文档并持久化，返回合并后的文档
    pub async fn upsert_fields(
        &self,
        query: &str,
        repo_name: &str,
        fields: Map<String, Value>,
    ) -> Result<Value, StoreError> {
        let path = self.document_path(query, repo_name);
        let lock = self.writer_lock(&path).await;
        let _guard = lock.lock().await;

        let mut document = if path.exists() {
            let content = fs::read_to_string(&path).await?;
            match serde_json::from_str::<Value>(&content) {
                Ok(Value::Object(map)) => map,
                Ok(_) | Err(_) => {
                    eprintln!("⚠️ 文档内容损坏，重建: {:?}", path);
                    Map::new()
                }
            }
        } else {
            Map::new()
        };

        for (key, value) in fields {
            document.insert(key, value);
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let merged = Value::Object(document);
        let content = serde_json::to_string_pretty(&merged)
            .map_err(|source| StoreError::Parse {
                path: path.clone(),
                source,
            })?;
        fs::write(&path, content).await?;

        Ok(merged)
    }

    /// 持久化一条项目记录（对已有文档做字段级upsert，不清除先前阶段的产出）
    pub async fn save_record(
        &self,
        query: &str,
        record: &ProjectRecord,
    ) -> Result<PathBuf, StoreError> {
        let path = self.document_path(query, &record.repo_name);
        let value = serde_json::to_value(record).map_err(|source| StoreError::Parse {
            path: path.clone(),
            source,
        })?;
        let fields = match value {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        self.upsert_fields(query, &record.repo_name, fields).await?;
        Ok(path)
    }
}
