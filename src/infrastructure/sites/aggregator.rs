// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use futures::future::join_all;
use metrics::counter;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::domain::models::job::Job;
use crate::domain::models::scrape_request::ScrapeRequest;
use crate::domain::models::validation::ValidationReport;
use crate::domain::services::validator::{dedupe, JobValidator};
use crate::infrastructure::sites::site_crawler::{CrawlError, JobSource};

/// 聚合选项
#[derive(Debug, Clone)]
pub struct AggregateOptions {
    /// 单个站点的整体超时
    pub site_timeout: Duration,
    /// 合并后去重
    pub dedupe: bool,
    /// 合并后批量校验
    pub validate: bool,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            site_timeout: Duration::from_secs(120),
            dedupe: true,
            validate: true,
        }
    }
}

/// 聚合结果
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateResult {
    /// 按站点顺序拼接的职位
    pub jobs: Vec<Job>,
    /// 每个站点返回的职位数，失败的站点为 0
    pub per_site_counts: BTreeMap<String, usize>,
    /// 失败站点的错误信息
    pub errors: BTreeMap<String, String>,
    pub duplicate_count: usize,
    pub report: Option<ValidationReport>,
}

/// 多站点爬取编排器
pub struct CrawlAggregator {
    sources: Vec<Arc<dyn JobSource>>,
    validator: JobValidator,
    options: AggregateOptions,
}

impl CrawlAggregator {
    pub fn new(sources: Vec<Arc<dyn JobSource>>) -> Self {
        Self {
            sources,
            validator: JobValidator::default(),
            options: AggregateOptions::default(),
        }
    }

    pub fn with_options(mut self, options: AggregateOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_validator(mut self, validator: JobValidator) -> Self {
        self.validator = validator;
        self
    }

    /// 已注册的站点标识
    pub fn site_ids(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.site_id()).collect()
    }

    /// 并发爬取多个站点并合并结果
    ///
    /// `sites` 为空时爬取全部已注册站点。单个站点的失败或超时只记录在结果中，
    /// 不影响其他站点
    pub async fn crawl_all(&self, request: &ScrapeRequest, sites: &[String]) -> AggregateResult {
        let mut per_site_counts = BTreeMap::new();
        let mut errors = BTreeMap::new();

        let selected: Vec<&Arc<dyn JobSource>> = if sites.is_empty() {
            self.sources.iter().collect()
        } else {
            for site in sites {
                if !self.sources.iter().any(|s| s.site_id() == site.as_str()) {
                    warn!("Unknown site '{}' requested, skipping", site);
                    errors.insert(site.clone(), "unknown site".to_string());
                    per_site_counts.insert(site.clone(), 0);
                }
            }
            self.sources
                .iter()
                .filter(|s| sites.iter().any(|id| id == s.site_id()))
                .collect()
        };

        let futures = selected.into_iter().map(|source| async move {
            let site = source.site_id();
            let result = match tokio::time::timeout(self.options.site_timeout, source.crawl(request)).await {
                Ok(result) => result,
                Err(_) => Err(CrawlError::Timeout(self.options.site_timeout)),
            };
            (site, result)
        });

        let mut jobs = Vec::new();
        for (site, result) in join_all(futures).await {
            match result {
                Ok(site_jobs) => {
                    info!("Site {} returned {} jobs", site, site_jobs.len());
                    per_site_counts.insert(site.to_string(), site_jobs.len());
                    jobs.extend(site_jobs);
                }
                Err(e) => {
                    warn!("Site {} failed: {}", site, e);
                    counter!("crawl_failures_total", "site" => site).increment(1);
                    per_site_counts.insert(site.to_string(), 0);
                    errors.insert(site.to_string(), e.to_string());
                }
            }
        }

        let mut duplicate_count = 0;
        if self.options.dedupe {
            let outcome = dedupe(jobs);
            duplicate_count = outcome.duplicate_count;
            jobs = outcome.unique;
        }

        let report = self
            .options
            .validate
            .then(|| self.validator.validate_batch(&jobs));

        info!(
            "Aggregated {} jobs from {} sites ({} failed, {} duplicates)",
            jobs.len(),
            per_site_counts.len(),
            errors.len(),
            duplicate_count
        );

        AggregateResult {
            jobs,
            per_site_counts,
            errors,
            duplicate_count,
            report,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::job::{Salary, SalarySource, WorkType};
    use crate::engines::traits::FetchError;
    use async_trait::async_trait;
    use chrono::Utc;

    fn job(site: &str, id: &str, url: &str) -> Job {
        Job {
            id: id.to_string(),
            title: "개발자".to_string(),
            company: "회사".to_string(),
            company_id: "hoesa".to_string(),
            location: "서울".to_string(),
            salary: Salary::new(3000, 4000),
            salary_source: SalarySource::Listed,
            experience: None,
            education: None,
            employment_type: None,
            work_type: WorkType::Onsite,
            description: "충분히 긴 직무 설명입니다. 백엔드 서비스를 개발합니다.".to_string(),
            requirements: vec![],
            skills: vec![],
            industry: String::new(),
            deadline: Some(Utc::now() + chrono::Duration::days(10)),
            posted_at: Utc::now(),
            source_url: url.to_string(),
            source: site.to_string(),
        }
    }

    enum Behaviour {
        Jobs(Vec<Job>),
        Fail,
        Hang,
    }

    struct FakeSource {
        id: &'static str,
        behaviour: Behaviour,
    }

    #[async_trait]
    impl JobSource for FakeSource {
        fn site_id(&self) -> &'static str {
            self.id
        }

        async fn crawl(&self, _request: &ScrapeRequest) -> Result<Vec<Job>, CrawlError> {
            match &self.behaviour {
                Behaviour::Jobs(jobs) => Ok(jobs.clone()),
                Behaviour::Fail => Err(CrawlError::Fetch(FetchError::Status {
                    url: "https://down.example.com".to_string(),
                    status: 503,
                })),
                Behaviour::Hang => std::future::pending().await,
            }
        }
    }

    fn source(id: &'static str, behaviour: Behaviour) -> Arc<dyn JobSource> {
        Arc::new(FakeSource { id, behaviour })
    }

    #[tokio::test]
    async fn test_failed_site_does_not_abort_others() {
        let aggregator = CrawlAggregator::new(vec![
            source(
                "alpha",
                Behaviour::Jobs(vec![
                    job("alpha", "1", "https://alpha.example.com/jobs/1"),
                    job("alpha", "2", "https://alpha.example.com/jobs/2"),
                ]),
            ),
            source("beta", Behaviour::Fail),
            source("gamma", Behaviour::Jobs(vec![job("gamma", "9", "https://gamma.example.com/jobs/9")])),
        ]);

        let result = aggregator.crawl_all(&ScrapeRequest::new(), &[]).await;
        assert_eq!(result.jobs.len(), 3);
        assert_eq!(result.jobs[0].source, "alpha");
        assert_eq!(result.jobs[2].source, "gamma");
        assert_eq!(result.per_site_counts["alpha"], 2);
        assert_eq!(result.per_site_counts["beta"], 0);
        assert!(result.errors["beta"].contains("503"));

        let report = result.report.unwrap();
        assert_eq!(report.total, 3);
        assert_eq!(report.invalid, 0);
    }

    #[tokio::test]
    async fn test_duplicates_across_sites_are_removed() {
        let shared = "https://shared.example.com/jobs/7";
        let aggregator = CrawlAggregator::new(vec![
            source("alpha", Behaviour::Jobs(vec![job("alpha", "a-7", shared)])),
            source("beta", Behaviour::Jobs(vec![job("beta", "b-7", shared)])),
        ]);

        let result = aggregator.crawl_all(&ScrapeRequest::new(), &[]).await;
        assert_eq!(result.jobs.len(), 1);
        assert_eq!(result.jobs[0].id, "a-7");
        assert_eq!(result.duplicate_count, 1);

        let raw = aggregator
            .with_options(AggregateOptions {
                dedupe: false,
                validate: false,
                ..AggregateOptions::default()
            })
            .crawl_all(&ScrapeRequest::new(), &[])
            .await;
        assert_eq!(raw.jobs.len(), 2);
        assert!(raw.report.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_site_timeout_counts_as_failure() {
        let aggregator = CrawlAggregator::new(vec![
            source("slow", Behaviour::Hang),
            source("fast", Behaviour::Jobs(vec![job("fast", "1", "https://fast.example.com/jobs/1")])),
        ])
        .with_options(AggregateOptions {
            site_timeout: Duration::from_secs(5),
            ..AggregateOptions::default()
        });

        let result = aggregator.crawl_all(&ScrapeRequest::new(), &[]).await;
        assert_eq!(result.jobs.len(), 1);
        assert!(result.errors["slow"].contains("timed out"));
    }

    #[tokio::test]
    async fn test_site_selection() {
        let aggregator = CrawlAggregator::new(vec![
            source("alpha", Behaviour::Jobs(vec![job("alpha", "1", "https://alpha.example.com/jobs/1")])),
            source("beta", Behaviour::Jobs(vec![job("beta", "2", "https://beta.example.com/jobs/2")])),
        ]);

        let result = aggregator
            .crawl_all(&ScrapeRequest::new(), &["beta".to_string(), "nowhere".to_string()])
            .await;
        assert_eq!(result.jobs.len(), 1);
        assert_eq!(result.jobs[0].source, "beta");
        assert!(!result.per_site_counts.contains_key("alpha"));
        assert_eq!(result.errors["nowhere"], "unknown site");
    }
}
