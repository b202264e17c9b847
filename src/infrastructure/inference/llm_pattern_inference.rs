// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use crate::domain::services::pattern_inference::{InferenceError, InferredPattern, PatternInference};

/// LLM 模式推断服务
///
/// # 功能
///
/// 调用 OpenAI 兼容的 chat completion 接口，根据样本 URL 推断详情页模板
///
/// # 配置
///
/// - `api_key` - API密钥，为空时推断直接失败
/// - `model` - 模型名称
/// - `api_base_url` - API基础URL
pub struct LlmPatternInference {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    api_base_url: String,
    timeout: Duration,
}

impl LlmPatternInference {
    pub fn new(api_key: Option<String>, model: impl Into<String>, api_base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model: model.into(),
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn prompt(sample_urls: &[String]) -> String {
        format!(
            "The following URLs are job detail pages from one website:\n{}\n\n\
            Infer the common URL template. Replace the numeric posting id with {{id}} \
            (exactly one placeholder). Keep only the path and, if the id is a query \
            parameter, that single parameter. Return ONLY a JSON object of the form \
            {{\"pattern\": \"/path/{{id}}\", \"confidence\": 0.0-1.0}}, no markdown formatting.",
            sample_urls.join("\n")
        )
    }
}

#[async_trait]
impl PatternInference for LlmPatternInference {
    async fn infer(&self, sample_urls: &[String]) -> Result<InferredPattern, InferenceError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| InferenceError::NotConfigured("LLM API key not configured".to_string()))?;

        let request_body = json!({
            "model": self.model,
            "messages": [
                {
                    "role": "system",
                    "content": "You analyse URL structures. You output only valid JSON."
                },
                {
                    "role": "user",
                    "content": Self::prompt(sample_urls)
                }
            ],
            "temperature": 0.0
        });

        let url = format!("{}/chat/completions", self.api_base_url);
        let response = self
            .client
            .post(url)
            .bearer_auth(api_key)
            .timeout(self.timeout)
            .json(&request_body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(InferenceError::Api { status, body });
        }

        let body: Value = response.json().await?;
        let content = body["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| InferenceError::Malformed("missing message content".to_string()))?;
        debug!("Pattern inference response: {}", content);

        parse_inferred(content)
    }
}

/// 解析模型输出，容忍 markdown 代码块包裹
pub fn parse_inferred(content: &str) -> Result<InferredPattern, InferenceError> {
    let clean_content = content
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    let inferred: InferredPattern =
        serde_json::from_str(clean_content).map_err(|e| InferenceError::Malformed(e.to_string()))?;
    if inferred.pattern.trim().is_empty() {
        return Err(InferenceError::Malformed("empty pattern".to_string()));
    }
    Ok(inferred)
}
