// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use futures::future::join_all;
use metrics::counter;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::models::job::Job;
use crate::engines::traits::DEFAULT_USER_AGENT;

/// 链接探测错误类型
#[derive(Error, Debug)]
pub enum ProbeError {
    /// 请求失败
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// 超时
    #[error("Timed out after {0:?}")]
    Timeout(Duration),
}

/// 链接存在性探测特质
#[async_trait]
pub trait LinkProbe: Send + Sync {
    /// 发送轻量请求，返回 HTTP 状态码
    async fn probe(&self, url: &str, timeout: Duration) -> Result<u16, ProbeError>;
}

/// 基于reqwest的探测实现
///
/// 先发送 HEAD 请求，服务器返回 405 时改用 GET
pub struct ReqwestLinkProbe {
    client: reqwest::Client,
}

impl ReqwestLinkProbe {
    pub fn new() -> Result<Self, ProbeError> {
        let client = reqwest::Client::builder()
            .user_agent(DEFAULT_USER_AGENT)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl LinkProbe for ReqwestLinkProbe {
    async fn probe(&self, url: &str, timeout: Duration) -> Result<u16, ProbeError> {
        let map_err = |e: reqwest::Error| {
            if e.is_timeout() {
                ProbeError::Timeout(timeout)
            } else {
                ProbeError::Request(e)
            }
        };

        let head = self.client.head(url).timeout(timeout).send().await.map_err(map_err)?;
        if head.status() != StatusCode::METHOD_NOT_ALLOWED {
            return Ok(head.status().as_u16());
        }

        debug!("HEAD not allowed for {}, retrying with GET", url);
        let get = self.client.get(url).timeout(timeout).send().await.map_err(map_err)?;
        Ok(get.status().as_u16())
    }
}

/// 存活检查选项
#[derive(Debug, Clone)]
pub struct LivenessOptions {
    /// 每批并发请求数
    pub concurrency: usize,
    /// 单个请求超时
    pub timeout_per_request: Duration,
    /// 批次之间的礼貌延迟
    pub politeness_delay: Duration,
    /// 只检查前 N 条职位
    pub sample_size: Option<usize>,
}

impl Default for LivenessOptions {
    fn default() -> Self {
        Self {
            concurrency: 5,
            timeout_per_request: Duration::from_secs(10),
            politeness_delay: Duration::from_secs(1),
            sample_size: None,
        }
    }
}

/// 失效链接
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeadLink {
    pub job_id: String,
    pub url: String,
    pub reason: String,
}

/// 存活检查报告
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LivenessReport {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
    /// 存活率（百分比）
    pub success_rate: f64,
    pub dead_links: Vec<DeadLink>,
    /// 实际执行的批次数
    pub batches: usize,
}

/// 链接存活检查器
///
/// 按 `concurrency` 切分为顺序执行的批次，批内并行、批间插入礼貌延迟
pub struct LinkChecker {
    probe: Arc<dyn LinkProbe>,
}

impl LinkChecker {
    pub fn new(probe: Arc<dyn LinkProbe>) -> Self {
        Self { probe }
    }

    /// 检查职位详情链接是否仍然有效
    ///
    /// 2xx/3xx 视为有效，其余状态码、超时和网络错误视为失效
    pub async fn validate_links_live(&self, jobs: &[Job], options: &LivenessOptions) -> LivenessReport {
        let selected = match options.sample_size {
            Some(n) => &jobs[..n.min(jobs.len())],
            None => jobs,
        };
        let concurrency = options.concurrency.max(1);

        let mut dead_links = Vec::new();
        let mut batches = 0;
        for (i, batch) in selected.chunks(concurrency).enumerate() {
            if i > 0 && !options.politeness_delay.is_zero() {
                tokio::time::sleep(options.politeness_delay).await;
            }
            batches += 1;

            let checks = batch
                .iter()
                .map(|job| self.check_one(job, options.timeout_per_request));
            dead_links.extend(join_all(checks).await.into_iter().flatten());
        }

        let total = selected.len();
        let invalid = dead_links.len();
        let valid = total - invalid;
        let success_rate = if total == 0 {
            0.0
        } else {
            valid as f64 / total as f64 * 100.0
        };

        info!(
            "Checked {} links in {} batches: {} live, {} dead",
            total, batches, valid, invalid
        );

        LivenessReport {
            total,
            valid,
            invalid,
            success_rate,
            dead_links,
            batches,
        }
    }

    /// 检查单条链接，失效时返回 DeadLink
    async fn check_one(&self, job: &Job, timeout: Duration) -> Option<DeadLink> {
        let dead = |reason: String| {
            warn!("Dead link for job {}: {} ({})", job.id, job.source_url, reason);
            counter!("links_checked_total", "result" => "dead").increment(1);
            Some(DeadLink {
                job_id: job.id.clone(),
                url: job.source_url.clone(),
                reason,
            })
        };

        if url::Url::parse(&job.source_url).is_err() {
            return dead("invalid URL".to_string());
        }

        let outcome = tokio::time::timeout(timeout, self.probe.probe(&job.source_url, timeout)).await;
        match outcome {
            Ok(Ok(status)) if (200..400).contains(&status) => {
                counter!("links_checked_total", "result" => "live").increment(1);
                None
            }
            Ok(Ok(status)) => dead(format!("HTTP {}", status)),
            Ok(Err(e)) => dead(e.to_string()),
            Err(_) => dead(format!("timed out after {:?}", timeout)),
        }
    }
}

#[cfg(test)]
#[path = "link_checker_test.rs"]
mod tests;
