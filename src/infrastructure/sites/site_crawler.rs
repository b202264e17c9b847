// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use metrics::counter;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use crate::domain::models::job::Job;
use crate::domain::models::scrape_request::ScrapeRequest;
use crate::domain::models::site_pattern::SitePattern;
use crate::domain::repositories::pattern_repository::StoreError;
use crate::domain::services::pattern_learner::{LearnOptions, PatternError, PatternLearner};
use crate::domain::sites::adapter::{ListingSelectors, ParseContext, SiteAdapter};
use crate::domain::sites::listing::extract_raw_listings;
use crate::engines::traits::{FetchError, NavigateOptions, PageFetcher, DEFAULT_USER_AGENT};
use crate::infrastructure::cache::pattern_store::{PatternStore, DEFAULT_FRESH_DAYS};

/// 单个站点爬取错误
///
/// 只影响当前站点；聚合模式下由编排器记录后继续其他站点
#[derive(Error, Debug)]
pub enum CrawlError {
    /// 页面抓取失败
    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),
    /// 缓存未命中且模式学习失败
    #[error("Pattern learning failed: {0}")]
    Pattern(#[from] PatternError),
    /// 模式缓存读取失败
    #[error("Pattern store error: {0}")]
    Store(#[from] StoreError),
    /// 站点整体爬取超时
    #[error("Site crawl timed out after {0:?}")]
    Timeout(Duration),
}

/// 职位来源特质
///
/// 编排器只依赖该特质，便于替换为其他来源
#[async_trait]
pub trait JobSource: Send + Sync {
    /// 来源标识
    fn site_id(&self) -> &'static str;

    /// 爬取职位
    async fn crawl(&self, request: &ScrapeRequest) -> Result<Vec<Job>, CrawlError>;
}

/// 爬取选项
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// 页面抓取超时
    pub fetch_timeout: Duration,
    /// 等待列表选择器的超时
    pub wait_timeout: Duration,
    pub headless: bool,
    pub user_agent: String,
    /// 超过该天数的模式会被主动重新学习
    pub fresh_days: i64,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(30),
            wait_timeout: Duration::from_secs(5),
            headless: true,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            fresh_days: DEFAULT_FRESH_DAYS,
        }
    }
}

/// 站点爬虫
///
/// 由站点适配器描述站点差异，本身负责模式缓存、抓取、解析与逐条规范化
pub struct SiteCrawler {
    adapter: Arc<dyn SiteAdapter>,
    fetcher: Arc<dyn PageFetcher>,
    store: Arc<PatternStore>,
    learner: Arc<PatternLearner>,
    options: CrawlOptions,
}

impl SiteCrawler {
    pub fn new(
        adapter: Arc<dyn SiteAdapter>,
        fetcher: Arc<dyn PageFetcher>,
        store: Arc<PatternStore>,
        learner: Arc<PatternLearner>,
    ) -> Self {
        Self {
            adapter,
            fetcher,
            store,
            learner,
            options: CrawlOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CrawlOptions) -> Self {
        self.options = options;
        self
    }

    /// 爬取一个站点
    ///
    /// # 返回值
    ///
    /// * `Ok(Vec<Job>)` - 最多 `request.limit` 条职位，可能为空
    /// * `Err(CrawlError)` - 抓取失败、缓存读取失败，或缓存未命中时学习失败
    pub async fn crawl_site(&self, request: &ScrapeRequest) -> Result<Vec<Job>, CrawlError> {
        let site = self.adapter.id();
        let pattern = self.ensure_pattern().await?;

        let search_url = self.adapter.build_search_url(request);
        let defaults = self.adapter.selectors();
        let navigate = NavigateOptions {
            timeout: self.options.fetch_timeout,
            headless: self.options.headless,
            user_agent: self.options.user_agent.clone(),
            wait_timeout: self.options.wait_timeout,
            ..NavigateOptions::default()
        }
        .wait_for(defaults.container.clone());

        debug!("Crawling {} via {}: {}", site, self.fetcher.name(), search_url);
        let page = self.fetcher.navigate(&search_url, &navigate).await?;
        if !page.selector_found {
            debug!(
                "Listing selector '{}' not found on {} within {:?}, parsing returned HTML",
                defaults.container, site, self.options.wait_timeout
            );
        }

        let base_url = Url::parse(&page.url)
            .or_else(|_| Url::parse(self.adapter.base_url()))
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", page.url, e)))?;

        let jobs = self.parse_listings(&page.html, Some(&pattern), &base_url, request.limit, Utc::now());

        info!("Crawled {} jobs from {}", jobs.len(), site);
        counter!("jobs_crawled_total", "site" => site).increment(jobs.len() as u64);
        Ok(jobs)
    }

    /// 读取缓存模式，未命中时学习并保存；模式不新鲜时尝试重新学习
    async fn ensure_pattern(&self) -> Result<SitePattern, CrawlError> {
        let domain = self.adapter.domain();
        let learn_options = LearnOptions {
            timeout: self.options.fetch_timeout,
            headless: self.options.headless,
            detail_domain: Some(domain.to_string()),
        };

        let Some(cached) = self.store.load(domain).await? else {
            info!("No cached pattern for {}, learning", domain);
            let learned = self.learner.learn(&self.adapter.seed_url(), &learn_options).await?;
            self.persist(&learned).await;
            return Ok(learned);
        };

        if self.store.is_fresh(domain, self.options.fresh_days).await? {
            return Ok(cached);
        }

        debug!("Pattern for {} is older than {} days, re-learning", domain, self.options.fresh_days);
        match self.learner.learn(&self.adapter.seed_url(), &learn_options).await {
            Ok(learned) => {
                self.persist(&learned).await;
                Ok(learned)
            }
            Err(e) => {
                warn!("Re-learning pattern for {} failed, using cached pattern: {}", domain, e);
                Ok(cached)
            }
        }
    }

    async fn persist(&self, pattern: &SitePattern) {
        if let Err(e) = self.store.save(pattern).await {
            warn!("Failed to save pattern for {}: {}", pattern.domain, e);
        }
    }

    /// 解析列表页并逐条规范化
    ///
    /// 先使用站点默认选择器，没有命中任何记录时改用学习到的选择器。
    /// 单条记录的解析错误会被记录并跳过
    pub fn parse_listings(
        &self,
        html: &str,
        pattern: Option<&SitePattern>,
        base_url: &Url,
        limit: usize,
        now: DateTime<Utc>,
    ) -> Vec<Job> {
        let site = self.adapter.id();

        let mut raw = extract_raw_listings(html, &self.adapter.selectors(), limit);
        if raw.is_empty() {
            if let Some(pattern) = pattern {
                debug!("Default selectors matched nothing on {}, trying learned selectors", site);
                raw = extract_raw_listings(html, &ListingSelectors::from(&pattern.selectors), limit);
            }
        }

        let mut jobs = Vec::with_capacity(raw.len());
        for (index, listing) in raw.iter().enumerate() {
            let ctx = ParseContext {
                now,
                index,
                base_url: base_url.clone(),
            };
            match self.adapter.normalize(listing, &ctx) {
                Ok(Some(job)) => jobs.push(job),
                Ok(None) => {
                    debug!("Skipping entry {} on {}: missing title or company", index, site);
                    counter!("records_skipped_total", "site" => site, "reason" => "missing_field").increment(1);
                }
                Err(e) => {
                    warn!("Skipping entry {} on {}: {}", index, site, e);
                    counter!("records_skipped_total", "site" => site, "reason" => "parse_error").increment(1);
                }
            }
        }
        jobs
    }
}

#[async_trait]
impl JobSource for SiteCrawler {
    fn site_id(&self) -> &'static str {
        self.adapter.id()
    }

    async fn crawl(&self, request: &ScrapeRequest) -> Result<Vec<Job>, CrawlError> {
        self.crawl_site(request).await
    }
}

#[cfg(test)]
#[path = "site_crawler_test.rs"]
mod tests;
