// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::models::site_pattern::TemplateError;

/// 模式存储错误类型
#[derive(Error, Debug)]
pub enum StoreError {
    /// 指定域名没有缓存的模式
    #[error("No pattern stored for domain: {0}")]
    NotFound(String),
    /// 文件读写错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// 后端错误（Redis 等）
    #[error("Backend error: {0}")]
    Backend(String),
    /// 序列化错误
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// 更新后的模板不合法
    #[error("Invalid template: {0}")]
    InvalidTemplate(#[from] TemplateError),
}

/// 模式存储后端特质
///
/// 以域名为键的键值存储，值为模式的 JSON 文本。
/// 过期判断由上层 PatternStore 负责，后端只做原样存取
#[async_trait]
pub trait PatternBackend: Send + Sync {
    /// 读取键对应的值
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    /// 写入（覆盖）键值
    async fn set(&self, key: &str, value: String) -> Result<(), StoreError>;
    /// 删除键，键不存在时不报错
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
    /// 列出全部键
    async fn list(&self) -> Result<Vec<String>, StoreError>;
}
