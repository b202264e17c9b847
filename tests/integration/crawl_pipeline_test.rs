// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use std::time::Duration;

use jobcrawlrs::domain::models::job::{Salary, SalarySource};
use jobcrawlrs::domain::models::scrape_request::ScrapeRequest;
use jobcrawlrs::domain::services::pattern_inference::NoopInference;
use jobcrawlrs::domain::services::pattern_learner::PatternLearner;
use jobcrawlrs::domain::sites::adapter::{lookup_code, ListingSelectors, SiteAdapter};
use jobcrawlrs::engines::reqwest_engine::HttpFetcher;
use jobcrawlrs::infrastructure::cache::file_backend::FilePatternBackend;
use jobcrawlrs::infrastructure::cache::pattern_store::PatternStore;
use jobcrawlrs::infrastructure::liveness::link_checker::{LinkChecker, LivenessOptions, ReqwestLinkProbe};
use jobcrawlrs::infrastructure::sites::aggregator::CrawlAggregator;
use jobcrawlrs::infrastructure::sites::site_crawler::{JobSource, SiteCrawler};
use jobcrawlrs::utils::url_utils::numeric_query_param;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// 指向本地 mock 服务器的测试站点
struct LocalBoard {
    base: &'static str,
}

impl LocalBoard {
    fn new(server: &MockServer) -> Self {
        Self {
            base: Box::leak(server.uri().into_boxed_str()),
        }
    }
}

impl SiteAdapter for LocalBoard {
    fn id(&self) -> &'static str {
        "localboard"
    }

    fn domain(&self) -> &'static str {
        "127.0.0.1"
    }

    fn base_url(&self) -> &'static str {
        self.base
    }

    fn build_search_url(&self, request: &ScrapeRequest) -> String {
        let mut url = Url::parse(&format!("{}/jobs/search", self.base)).unwrap();
        {
            let mut query = url.query_pairs_mut();
            if let Some(keyword) = &request.keyword {
                query.append_pair("q", keyword);
            }
            if let Some(code) = request
                .location
                .as_deref()
                .and_then(|l| lookup_code(&[("서울", "SEL")], l))
            {
                query.append_pair("area", code);
            }
        }
        url.to_string()
    }

    fn selectors(&self) -> ListingSelectors {
        let mut s = ListingSelectors::new("li.job", "a.title", "a.title", ".company");
        s.salary = Some(".pay".to_string());
        s.deadline = Some(".due".to_string());
        s.experience = Some(".career".to_string());
        s
    }

    fn extract_id(&self, url: &Url) -> Option<String> {
        numeric_query_param(url, "no")
    }

    fn default_salary(&self) -> Salary {
        Salary::new(3000, 4000)
    }
}

fn listing_html() -> String {
    let rows = [
        (10001, "Rust 백엔드", "알파", Some("연봉 4,000~5,000만원"), "D-7", "경력 3~5년"),
        (10002, "플랫폼 엔지니어", "베타", None, "상시채용", "신입"),
        (10003, "데이터 엔지니어", "감마", Some("면접 후 결정"), "2030.01.31", "5년 이상"),
    ];
    let mut items = String::new();
    for (no, title, company, pay, due, career) in rows {
        items.push_str(&format!(
            r#"<li class="job"><a class="title" href="/jobs/view?no={no}">{title}</a>
                <span class="company">{company}</span>{pay}<span class="due">{due}</span>
                <span class="career">{career}</span></li>"#,
            pay = pay.map(|p| format!(r#"<span class="pay">{p}</span>"#)).unwrap_or_default(),
        ));
    }
    // 标题缺失的记录会被丢弃，重复记录由去重移除
    items.push_str(r#"<li class="job"><a class="title" href="/jobs/view?no=10004"></a><span class="company">델타</span></li>"#);
    items.push_str(r#"<li class="job"><a class="title" href="/jobs/view?no=10001">Rust 백엔드</a><span class="company">알파</span></li>"#);
    format!(r#"<html><body><a href="/about">회사 소개</a><ul>{items}</ul></body></html>"#)
}

async fn start_board() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_html()))
        .mount(&server)
        .await;
    for live in ["10001", "10002"] {
        Mock::given(method("HEAD"))
            .and(path("/jobs/view"))
            .and(query_param("no", live))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
    }
    server
}

#[tokio::test]
async fn test_learn_crawl_validate_and_check_links() {
    let server = start_board().await;
    let dir = tempfile::tempdir().unwrap();

    let fetcher = Arc::new(HttpFetcher::new().unwrap());
    let store = Arc::new(PatternStore::new(Arc::new(FilePatternBackend::new(dir.path()))));
    let learner = Arc::new(PatternLearner::new(fetcher.clone(), Arc::new(NoopInference)));
    let crawler = SiteCrawler::new(
        Arc::new(LocalBoard::new(&server)),
        fetcher.clone(),
        store.clone(),
        learner,
    );

    let sources: Vec<Arc<dyn JobSource>> = vec![Arc::new(crawler)];
    let aggregator = CrawlAggregator::new(sources);
    let request = ScrapeRequest::new().keyword("rust").location("서울");
    let result = aggregator.crawl_all(&request, &[]).await;

    assert!(result.errors.is_empty(), "{:?}", result.errors);
    assert_eq!(result.per_site_counts["localboard"], 4);
    assert_eq!(result.duplicate_count, 1);
    assert_eq!(result.jobs.len(), 3);

    let alpha = &result.jobs[0];
    assert_eq!(alpha.id, "10001");
    assert_eq!(alpha.salary, Salary::new(4000, 5000));
    assert_eq!(alpha.salary_source, SalarySource::Listed);
    let beta = &result.jobs[1];
    assert_eq!(beta.salary_source, SalarySource::SiteDefault);
    assert_eq!(beta.experience.map(|e| (e.min, e.max)), Some((0, 0)));
    let gamma = &result.jobs[2];
    assert_eq!(gamma.salary_source, SalarySource::SiteDefault);
    assert_eq!(gamma.experience.map(|e| (e.min, e.max)), Some((5, 15)));

    let report = result.report.unwrap();
    assert_eq!(report.total, 3);
    assert_eq!(report.invalid, 0);
    assert_eq!(report.success_rate, 100.0);

    // 缓存未命中时学习到的模式已写入文件后端
    let pattern = store.load("127.0.0.1").await.unwrap().unwrap();
    assert_eq!(pattern.detail_template(), "/jobs/view?no={id}");
    for job in &result.jobs {
        assert!(pattern.matches(&job.source_url), "{}", job.source_url);
    }

    let checker = LinkChecker::new(Arc::new(ReqwestLinkProbe::new().unwrap()));
    let liveness = checker
        .validate_links_live(
            &result.jobs,
            &LivenessOptions {
                concurrency: 2,
                politeness_delay: Duration::from_millis(10),
                ..LivenessOptions::default()
            },
        )
        .await;
    assert_eq!(liveness.batches, 2);
    assert_eq!(liveness.valid, 2);
    assert_eq!(liveness.dead_links.len(), 1);
    assert_eq!(liveness.dead_links[0].job_id, "10003");
}

#[tokio::test]
async fn test_unreachable_site_is_isolated() {
    let server = start_board().await;
    let dir = tempfile::tempdir().unwrap();

    let fetcher = Arc::new(HttpFetcher::new().unwrap());
    let store = Arc::new(PatternStore::new(Arc::new(FilePatternBackend::new(dir.path()))));
    let learner = Arc::new(PatternLearner::new(fetcher.clone(), Arc::new(NoopInference)));

    let healthy = SiteCrawler::new(
        Arc::new(LocalBoard::new(&server)),
        fetcher.clone(),
        store.clone(),
        learner.clone(),
    );

    // 已关闭的服务器：学习阶段的抓取失败，只影响该站点
    let dead_server = MockServer::start().await;
    let dead_board = Arc::new(LocalBoard::new(&dead_server));
    drop(dead_server);
    let broken = SiteCrawler::new(
        Arc::new(BrokenBoard(dead_board)),
        fetcher.clone(),
        store.clone(),
        learner,
    );

    let sources: Vec<Arc<dyn JobSource>> = vec![Arc::new(broken), Arc::new(healthy)];
    let result = CrawlAggregator::new(sources)
        .crawl_all(&ScrapeRequest::new(), &[])
        .await;

    assert_eq!(result.jobs.len(), 3);
    assert_eq!(result.per_site_counts["brokenboard"], 0);
    assert!(result.errors.contains_key("brokenboard"));
}

/// 使用不同站点标识和域名的包装，避免与正常站点共用缓存键
struct BrokenBoard(Arc<LocalBoard>);

impl SiteAdapter for BrokenBoard {
    fn id(&self) -> &'static str {
        "brokenboard"
    }
    fn domain(&self) -> &'static str {
        "broken.invalid"
    }
    fn base_url(&self) -> &'static str {
        self.0.base_url()
    }
    fn build_search_url(&self, request: &ScrapeRequest) -> String {
        self.0.build_search_url(request)
    }
    fn selectors(&self) -> ListingSelectors {
        self.0.selectors()
    }
    fn extract_id(&self, url: &Url) -> Option<String> {
        self.0.extract_id(url)
    }
    fn default_salary(&self) -> Salary {
        self.0.default_salary()
    }
}
