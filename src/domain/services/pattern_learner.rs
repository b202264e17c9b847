// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::counter;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use crate::domain::models::site_pattern::{
    canonical_target, compile_template, id_param, same_domain, SitePattern, TemplateError,
};
use crate::domain::services::pattern_inference::{InferredPattern, PatternInference};
use crate::domain::services::selector_probe::detect_selectors;
use crate::domain::services::template_inference::{
    derive_field_params, is_job_like, rank_templates, TemplateCandidate,
};
use crate::engines::traits::{FetchError, NavigateOptions, PageFetcher, DEFAULT_USER_AGENT};

pub const DEFAULT_MIN_ID_DIGITS: usize = 4;
pub const DEFAULT_MAX_AI_SAMPLES: usize = 10;

/// 模式学习错误类型
#[derive(Error, Debug)]
pub enum PatternError {
    /// 页面抓取失败（含超时）
    #[error("Failed to fetch page: {0}")]
    Fetch(#[from] FetchError),
    /// 页面中没有职位链接
    #[error("No job-like links found on {0}")]
    NoCandidateLinks(String),
    /// 生成的模板不合法
    #[error("Invalid template: {0}")]
    InvalidTemplate(#[from] TemplateError),
}

/// 学习选项
#[derive(Debug, Clone)]
pub struct LearnOptions {
    pub timeout: Duration,
    pub headless: bool,
    /// 详情页所在域名，为 None 时取页面自身的域名；模式以该域名为键，
    /// 也只统计该域名下的链接
    pub detail_domain: Option<String>,
}

impl Default for LearnOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            headless: true,
            detail_domain: None,
        }
    }
}

/// 站点模式学习器
///
/// 抓取站点页面，从职位链接中归纳详情页模板并探测字段选择器。
/// 学习结果不会自动保存，由调用方决定是否写入 PatternStore
pub struct PatternLearner {
    fetcher: Arc<dyn PageFetcher>,
    inference: Arc<dyn PatternInference>,
    min_id_digits: usize,
    max_ai_samples: usize,
    user_agent: String,
}

impl PatternLearner {
    pub fn new(fetcher: Arc<dyn PageFetcher>, inference: Arc<dyn PatternInference>) -> Self {
        Self {
            fetcher,
            inference,
            min_id_digits: DEFAULT_MIN_ID_DIGITS,
            max_ai_samples: DEFAULT_MAX_AI_SAMPLES,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    pub fn with_min_id_digits(mut self, min_id_digits: usize) -> Self {
        self.min_id_digits = min_id_digits.max(1);
        self
    }

    pub fn with_max_ai_samples(mut self, max_ai_samples: usize) -> Self {
        self.max_ai_samples = max_ai_samples;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// 学习站点模式
    ///
    /// # 参数
    ///
    /// * `site_url` - 站点中包含职位链接的页面（通常是搜索/列表页）
    /// * `options` - 抓取超时与无头模式
    ///
    /// # 返回值
    ///
    /// * `Ok(SitePattern)` - 学习到的模式
    /// * `Err(PatternError::Fetch)` - 页面抓取失败或超时
    /// * `Err(PatternError::NoCandidateLinks)` - 页面中找不到职位链接
    pub async fn learn(&self, site_url: &str, options: &LearnOptions) -> Result<SitePattern, PatternError> {
        let base = Url::parse(site_url)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", site_url, e)))?;
        let page_host = base
            .host_str()
            .ok_or_else(|| FetchError::InvalidUrl(format!("{} has no host", site_url)))?;
        let host = options
            .detail_domain
            .clone()
            .unwrap_or_else(|| page_host.to_string());

        let navigate = NavigateOptions {
            timeout: options.timeout,
            headless: options.headless,
            user_agent: self.user_agent.clone(),
            ..NavigateOptions::default()
        };
        let page = self.fetcher.navigate(site_url, &navigate).await?;
        let page_url = Url::parse(&page.url).unwrap_or_else(|_| base.clone());

        let links = collect_job_links(&page.html, &page_url, &host, self.min_id_digits);
        debug!("Found {} job-like links on {}", links.len(), site_url);

        let ranked = rank_templates(&links, self.min_id_digits);
        let majority = ranked
            .first()
            .ok_or_else(|| PatternError::NoCandidateLinks(site_url.to_string()))?;

        let samples: Vec<String> = majority
            .samples
            .iter()
            .take(self.max_ai_samples)
            .cloned()
            .collect();
        let (template, confidence) = self.corroborate(majority, &samples).await;

        let (list_template, field_params) = derive_field_params(&page_url);
        let pattern = SitePattern::new(&host, list_template, template, detect_selectors(&page.html))?
            .with_field_params(field_params)
            .with_confidence(confidence)
            .with_samples(majority.samples.clone());

        info!(
            "Learned pattern for {}: {} (confidence {:.2}, {} of {} links)",
            pattern.domain,
            pattern.detail_template(),
            pattern.confidence,
            majority.count,
            links.len()
        );
        counter!("patterns_learned_total").increment(1);

        Ok(pattern)
    }

    /// 用推断服务佐证多数模板
    ///
    /// 推断失败、模板不合法、无法匹配全部样本或置信度不高于多数模板时，保留多数模板
    async fn corroborate(&self, majority: &TemplateCandidate, samples: &[String]) -> (String, f64) {
        let keep = (majority.template.clone(), majority.confidence);
        if samples.is_empty() {
            return keep;
        }

        let inferred = match self.inference.infer(samples).await {
            Ok(inferred) => inferred,
            Err(e) => {
                debug!("Pattern inference unavailable, keeping majority template: {}", e);
                return keep;
            }
        };

        match accept_inferred(&inferred, samples, majority.confidence) {
            Some(template) => {
                info!(
                    "Adopting inferred template {} (confidence {:.2} > {:.2})",
                    template, inferred.confidence, majority.confidence
                );
                (template, inferred.confidence.clamp(0.0, 1.0))
            }
            None => {
                warn!(
                    "Rejected inferred template '{}', keeping majority {}",
                    inferred.pattern, majority.template
                );
                keep
            }
        }
    }
}

/// 检查推断模板是否可以采用，返回规范化后的模板
fn accept_inferred(inferred: &InferredPattern, samples: &[String], majority_confidence: f64) -> Option<String> {
    if !inferred.confidence.is_finite() || inferred.confidence <= majority_confidence {
        return None;
    }

    let template = strip_origin(inferred.pattern.trim());
    let matcher = compile_template(&template).ok()?;
    let param = id_param(&template);

    let all_match = samples.iter().all(|sample| {
        Url::parse(sample)
            .map(|u| matcher.is_match(&canonical_target(&u, param.as_deref())))
            .unwrap_or(false)
    });
    all_match.then_some(template)
}

/// 去掉模板中的协议与主机部分，只保留路径与查询
fn strip_origin(pattern: &str) -> String {
    match pattern.split_once("://") {
        Some((_, rest)) => rest.find('/').map(|i| rest[i..].to_string()).unwrap_or_default(),
        None if pattern.starts_with('/') => pattern.to_string(),
        None => format!("/{}", pattern),
    }
}

/// 收集页面中指定域名下的职位链接（按出现顺序去重）
fn collect_job_links(html: &str, page_url: &Url, host: &str, min_digits: usize) -> Vec<Url> {
    let document = Html::parse_document(html);
    let Ok(anchor) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut links = Vec::new();
    for element in document.select(&anchor) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Ok(mut url) = page_url.join(href.trim()) else {
            continue;
        };
        if !matches!(url.scheme(), "http" | "https") {
            continue;
        }
        if !url.host_str().is_some_and(|h| same_domain(h, host)) {
            continue;
        }
        url.set_fragment(None);

        let text: String = element.text().collect::<Vec<_>>().join(" ");
        if is_job_like(&url, &text, min_digits) && seen.insert(url.to_string()) {
            links.push(url);
        }
    }
    links
}

#[cfg(test)]
#[path = "pattern_learner_test.rs"]
mod tests;
