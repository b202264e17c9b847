// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 推断服务错误类型
#[derive(Error, Debug)]
pub enum InferenceError {
    /// 未配置（如缺少 API 密钥）
    #[error("Inference not configured: {0}")]
    NotConfigured(String),
    /// 请求失败
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// 服务返回错误状态
    #[error("Inference API returned {status}: {body}")]
    Api { status: u16, body: String },
    /// 响应格式不符合预期
    #[error("Malformed inference response: {0}")]
    Malformed(String),
}

/// 推断得到的详情页模板
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferredPattern {
    /// 含 `{id}` 占位符的模板
    pub pattern: String,
    /// 置信度（0~1）
    pub confidence: f64,
}

/// URL 模式推断特质
///
/// 根据样本 URL 给出详情页模板，仅作为多数模板的佐证
#[async_trait]
pub trait PatternInference: Send + Sync {
    async fn infer(&self, sample_urls: &[String]) -> Result<InferredPattern, InferenceError>;
}

/// 空推断实现，总是让学习器采用多数模板
pub struct NoopInference;

#[async_trait]
impl PatternInference for NoopInference {
    async fn infer(&self, _sample_urls: &[String]) -> Result<InferredPattern, InferenceError> {
        Err(InferenceError::NotConfigured("no inference backend".to_string()))
    }
}
