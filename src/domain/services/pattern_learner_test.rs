// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::*;
use crate::domain::models::site_pattern::matches_pattern;
use crate::domain::services::pattern_inference::{InferenceError, NoopInference};
use crate::engines::traits::FetchedPage;
use async_trait::async_trait;

struct StaticFetcher {
    html: String,
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn navigate(&self, url: &str, _options: &NavigateOptions) -> Result<FetchedPage, FetchError> {
        Ok(FetchedPage {
            url: url.to_string(),
            status: 200,
            html: self.html.clone(),
            selector_found: true,
        })
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

struct TimeoutFetcher;

#[async_trait]
impl PageFetcher for TimeoutFetcher {
    async fn navigate(&self, _url: &str, options: &NavigateOptions) -> Result<FetchedPage, FetchError> {
        Err(FetchError::Timeout(options.timeout))
    }

    fn name(&self) -> &'static str {
        "timeout"
    }
}

struct FixedInference(Result<InferredPattern, ()>);

#[async_trait]
impl PatternInference for FixedInference {
    async fn infer(&self, _sample_urls: &[String]) -> Result<InferredPattern, InferenceError> {
        self.0
            .clone()
            .map_err(|_| InferenceError::Malformed("not json".to_string()))
    }
}

fn listing_html() -> String {
    let mut items = String::new();
    for id in [49123456, 49123457, 49200001, 50000012] {
        items.push_str(&format!(
            r#"<div class="item_recruit">
                <h2 class="job_tit"><a href="/zf_user/jobs/relay/view?view_type=search&rec_idx={id}&t_ref=search">백엔드 개발자 {id}</a></h2>
                <strong class="corp_name"><a href="/zf_user/company-info/view?csn=1234567890">회사</a></strong>
            </div>"#
        ));
    }
    format!(
        r#"<html><body>
            <a href="/zf_user/recruit/list">채용 전체</a>
            <a href="https://ads.example.com/jobs/99999">광고</a>
            {items}
        </body></html>"#
    )
}

const SEED: &str = "https://www.saramin.co.kr/zf_user/search/recruit?searchword=rust&loc_mcd=101000";

fn learner(inference: Arc<dyn PatternInference>) -> PatternLearner {
    PatternLearner::new(Arc::new(StaticFetcher { html: listing_html() }), inference)
}

#[tokio::test]
async fn test_learned_pattern_matches_training_urls() {
    let pattern = learner(Arc::new(NoopInference))
        .learn(SEED, &LearnOptions::default())
        .await
        .unwrap();

    assert_eq!(pattern.domain, "saramin.co.kr");
    assert_eq!(pattern.detail_template(), "/zf_user/jobs/relay/view?rec_idx={id}");
    assert_eq!(pattern.detail_template().matches("{id}").count(), 1);
    assert!(!pattern.sample_urls.is_empty());
    for sample in &pattern.sample_urls {
        assert!(matches_pattern(&pattern, sample), "{sample} should match");
    }
    // 公司链接去重后只剩 1 条，职位模板占多数
    assert!(pattern.confidence >= 0.5);
    assert_eq!(pattern.selectors.list_container, ".item_recruit");
    assert_eq!(pattern.field_params.get("keyword").map(String::as_str), Some("searchword"));
}

#[tokio::test]
async fn test_learn_fetch_timeout_is_fatal() {
    let learner = PatternLearner::new(Arc::new(TimeoutFetcher), Arc::new(NoopInference));
    let err = learner.learn(SEED, &LearnOptions::default()).await.unwrap_err();
    assert!(matches!(err, PatternError::Fetch(FetchError::Timeout(_))));
}

#[tokio::test]
async fn test_learn_without_job_links() {
    let fetcher = StaticFetcher {
        html: r#"<html><body><a href="/about">About</a><a href="/news/20250101">뉴스</a></body></html>"#.to_string(),
    };
    let learner = PatternLearner::new(Arc::new(fetcher), Arc::new(NoopInference));
    let err = learner.learn(SEED, &LearnOptions::default()).await.unwrap_err();
    assert!(matches!(err, PatternError::NoCandidateLinks(_)));
}

#[tokio::test]
async fn test_inference_failure_keeps_majority() {
    let pattern = learner(Arc::new(FixedInference(Err(()))))
        .learn(SEED, &LearnOptions::default())
        .await
        .unwrap();
    assert_eq!(pattern.detail_template(), "/zf_user/jobs/relay/view?rec_idx={id}");
}

#[tokio::test]
async fn test_inference_rejected_when_it_misses_samples() {
    let inferred = InferredPattern {
        pattern: "/zf_user/jobs/view/{id}".to_string(),
        confidence: 0.99,
    };
    let pattern = learner(Arc::new(FixedInference(Ok(inferred))))
        .learn(SEED, &LearnOptions::default())
        .await
        .unwrap();
    assert_eq!(pattern.detail_template(), "/zf_user/jobs/relay/view?rec_idx={id}");
}

#[tokio::test]
async fn test_inference_adopted_when_valid_and_more_confident() {
    let inferred = InferredPattern {
        pattern: "https://www.saramin.co.kr/zf_user/jobs/relay/view?rec_idx={id}".to_string(),
        confidence: 0.99,
    };
    let pattern = learner(Arc::new(FixedInference(Ok(inferred))))
        .learn(SEED, &LearnOptions::default())
        .await
        .unwrap();
    assert!((pattern.confidence - 0.99).abs() < 1e-9);
    assert_eq!(pattern.detail_template(), "/zf_user/jobs/relay/view?rec_idx={id}");
}

#[test]
fn test_strip_origin() {
    assert_eq!(strip_origin("https://x.com/wd/{id}"), "/wd/{id}");
    assert_eq!(strip_origin("wd/{id}"), "/wd/{id}");
    assert_eq!(strip_origin("/wd/{id}"), "/wd/{id}");
}

#[tokio::test]
async fn test_links_on_sibling_subdomains_are_ignored() {
    let mut html = String::from("<html><body>");
    for id in [51000001, 51000002, 51000003] {
        html.push_str(&format!(
            r#"<a href="https://www.saramin.co.kr/zf_user/jobs/relay/view?rec_idx={id}">사람인 공고</a>"#
        ));
    }
    for id in [40123, 40124] {
        html.push_str(&format!(r#"<a href="/position/{id}">백엔드 포지션</a>"#));
    }
    html.push_str("</body></html>");

    let learner = PatternLearner::new(Arc::new(StaticFetcher { html }), Arc::new(NoopInference));
    let pattern = learner
        .learn("https://jumpit.saramin.co.kr/positions?keyword=rust", &LearnOptions::default())
        .await
        .unwrap();

    assert_eq!(pattern.domain, "jumpit.saramin.co.kr");
    assert_eq!(pattern.detail_template(), "/position/{id}");
    assert_eq!(pattern.sample_urls.len(), 2);
    assert!(!pattern.matches("https://www.saramin.co.kr/position/40123"));
}

#[tokio::test]
async fn test_detail_domain_selects_links_and_cache_key() {
    let mut html = String::from("<html><body>");
    for id in [7000001, 7000002, 7000003] {
        html.push_str(&format!(
            r#"<a href="https://job.incruit.com/jobdb_info/jobpost.asp?job={id}">채용공고</a>"#
        ));
    }
    html.push_str("</body></html>");
    let seed = "https://search.incruit.com/list/search.asp?col=job&kw=rust";

    let learner = PatternLearner::new(Arc::new(StaticFetcher { html }), Arc::new(NoopInference));
    let err = learner.learn(seed, &LearnOptions::default()).await.unwrap_err();
    assert!(matches!(err, PatternError::NoCandidateLinks(_)));

    let options = LearnOptions {
        detail_domain: Some("job.incruit.com".to_string()),
        ..LearnOptions::default()
    };
    let pattern = learner.learn(seed, &options).await.unwrap();
    assert_eq!(pattern.domain, "job.incruit.com");
    assert_eq!(pattern.detail_template(), "/jobdb_info/jobpost.asp?job={id}");
    assert!(pattern.matches("https://job.incruit.com/jobdb_info/jobpost.asp?job=7000001"));
}
