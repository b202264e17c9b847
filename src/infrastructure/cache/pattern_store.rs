// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Duration, Utc};
use metrics::counter;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::models::site_pattern::{normalize_domain, SelectorSet, SitePattern};
use crate::domain::repositories::pattern_repository::{PatternBackend, StoreError};

/// 硬过期天数
pub const DEFAULT_TTL_DAYS: i64 = 30;
/// 软新鲜度天数
pub const DEFAULT_FRESH_DAYS: i64 = 7;

/// 模式的部分更新，None 字段保持不变
#[derive(Debug, Clone, Default)]
pub struct PatternUpdate {
    pub list_template: Option<String>,
    pub detail_template: Option<String>,
    pub field_params: Option<BTreeMap<String, String>>,
    pub selectors: Option<SelectorSet>,
    pub confidence: Option<f64>,
    pub sample_urls: Option<Vec<String>>,
}

/// 站点模式缓存
///
/// 以规范化域名为键，值为模式 JSON。`lastUpdated` 超过 TTL 的条目仍留在后端，
/// 但读取时视为不存在。同一域名的并发写入以最后一次为准
pub struct PatternStore {
    backend: Arc<dyn PatternBackend>,
    ttl: Duration,
}

impl PatternStore {
    pub fn new(backend: Arc<dyn PatternBackend>) -> Self {
        Self::with_ttl_days(backend, DEFAULT_TTL_DAYS)
    }

    pub fn with_ttl_days(backend: Arc<dyn PatternBackend>, ttl_days: i64) -> Self {
        Self {
            backend,
            ttl: Duration::days(ttl_days),
        }
    }

    /// 保存（覆盖）模式
    pub async fn save(&self, pattern: &SitePattern) -> Result<(), StoreError> {
        let key = normalize_domain(&pattern.domain);
        let value = serde_json::to_string_pretty(pattern)?;
        self.backend.set(&key, value).await?;
        debug!("Saved pattern for {}", key);
        Ok(())
    }

    /// 读取模式，不存在或已过期时返回 None
    pub async fn load(&self, domain: &str) -> Result<Option<SitePattern>, StoreError> {
        self.load_at(domain, Utc::now()).await
    }

    async fn load_at(&self, domain: &str, now: DateTime<Utc>) -> Result<Option<SitePattern>, StoreError> {
        let key = normalize_domain(domain);
        let Some(raw) = self.backend.get(&key).await? else {
            counter!("pattern_cache_misses_total").increment(1);
            return Ok(None);
        };

        let pattern: SitePattern = match serde_json::from_str(&raw) {
            Ok(p) => p,
            Err(e) => {
                warn!("Ignoring unreadable pattern for {}: {}", key, e);
                counter!("pattern_cache_misses_total").increment(1);
                return Ok(None);
            }
        };

        if pattern.age(now) > self.ttl {
            debug!("Pattern for {} expired (last updated {})", key, pattern.last_updated);
            counter!("pattern_cache_misses_total").increment(1);
            return Ok(None);
        }

        counter!("pattern_cache_hits_total").increment(1);
        Ok(Some(pattern))
    }

    /// 删除模式，不存在时不报错
    pub async fn delete(&self, domain: &str) -> Result<(), StoreError> {
        self.backend.delete(&normalize_domain(domain)).await
    }

    /// 列出后端中的全部域名（包括已过期的条目）
    pub async fn list_domains(&self) -> Result<Vec<String>, StoreError> {
        let mut domains = self.backend.list().await?;
        domains.sort();
        Ok(domains)
    }

    /// 部分更新模式并刷新 `lastUpdated`
    ///
    /// # 返回值
    ///
    /// * `Ok(SitePattern)` - 更新后的模式
    /// * `Err(StoreError::NotFound)` - 模式不存在或已过期
    /// * `Err(StoreError::InvalidTemplate)` - 新的详情页模板不合法
    pub async fn update(&self, domain: &str, update: PatternUpdate) -> Result<SitePattern, StoreError> {
        let mut pattern = self
            .load(domain)
            .await?
            .ok_or_else(|| StoreError::NotFound(normalize_domain(domain)))?;

        if let Some(template) = update.detail_template {
            pattern.set_detail_template(template)?;
        }
        if let Some(list_template) = update.list_template {
            pattern.list_template = list_template;
        }
        if let Some(field_params) = update.field_params {
            pattern.field_params = field_params;
        }
        if let Some(selectors) = update.selectors {
            pattern.selectors = selectors;
        }
        if let Some(confidence) = update.confidence {
            pattern.confidence = confidence.clamp(0.0, 1.0);
        }
        if let Some(sample_urls) = update.sample_urls {
            pattern.sample_urls = sample_urls;
        }
        pattern.last_updated = Utc::now();

        self.save(&pattern).await?;
        Ok(pattern)
    }

    /// 模式是否存在且不超过 `max_age_days` 天
    pub async fn is_fresh(&self, domain: &str, max_age_days: i64) -> Result<bool, StoreError> {
        self.is_fresh_at(domain, max_age_days, Utc::now()).await
    }

    async fn is_fresh_at(&self, domain: &str, max_age_days: i64, now: DateTime<Utc>) -> Result<bool, StoreError> {
        Ok(self
            .load_at(domain, now)
            .await?
            .is_some_and(|p| p.age(now) <= Duration::days(max_age_days)))
    }
}

#[cfg(test)]
#[path = "pattern_store_test.rs"]
mod tests;
