// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{TimeZone, Utc};
use jobcrawlrs::domain::models::job::SalarySource;
use jobcrawlrs::domain::models::raw_listing::RawListing;
use jobcrawlrs::domain::models::scrape_request::ScrapeRequest;
use jobcrawlrs::domain::sites::adapter::ParseContext;
use jobcrawlrs::infrastructure::sites::factory::{SiteAdapterFactory, SITE_IDS};
use scraper::Selector;
use url::Url;

fn full_request() -> ScrapeRequest {
    ScrapeRequest::new()
        .keyword("백엔드 개발자")
        .location("서울")
        .experience(Some(2), Some(5))
        .salary(Some(4000), None)
        .employment_type("정규직")
        .limit(20)
}

#[test]
fn test_search_urls_stay_on_site_host() {
    for adapter in SiteAdapterFactory::all() {
        let base = Url::parse(adapter.base_url()).unwrap();
        for request in [ScrapeRequest::new(), full_request()] {
            let url = Url::parse(&adapter.build_search_url(&request)).unwrap();
            assert_eq!(url.host_str(), base.host_str(), "{}", adapter.id());
            assert_eq!(url.scheme(), "https");
        }
    }
}

#[test]
fn test_keyword_is_encoded_in_every_search_url() {
    for adapter in SiteAdapterFactory::all() {
        let url = Url::parse(&adapter.build_search_url(&full_request())).unwrap();
        assert!(
            url.query_pairs().any(|(_, v)| v == "백엔드 개발자"),
            "{} dropped the keyword: {}",
            adapter.id(),
            url
        );
    }
}

#[test]
fn test_unknown_location_is_omitted() {
    for adapter in SiteAdapterFactory::all() {
        let plain = adapter.build_search_url(&ScrapeRequest::new().keyword("rust"));
        let unknown = adapter.build_search_url(&ScrapeRequest::new().keyword("rust").location("아틀란티스"));
        assert_eq!(plain, unknown, "{}", adapter.id());
    }
}

#[test]
fn test_default_selectors_compile() {
    for adapter in SiteAdapterFactory::all() {
        let s = adapter.selectors();
        let optional = [
            &s.location,
            &s.experience,
            &s.education,
            &s.employment_type,
            &s.salary,
            &s.deadline,
            &s.posted,
            &s.description,
            &s.industry,
            &s.skills,
        ];
        for selector in [&s.container, &s.link, &s.title, &s.company]
            .into_iter()
            .chain(optional.into_iter().flatten())
        {
            assert!(
                Selector::parse(selector).is_ok(),
                "{}: invalid selector {}",
                adapter.id(),
                selector
            );
        }
    }
}

#[test]
fn test_factory_knows_every_site() {
    for id in SITE_IDS {
        let adapter = SiteAdapterFactory::create(id).unwrap();
        assert_eq!(adapter.id(), *id);
        let salary = adapter.default_salary();
        assert!(salary.min > 0 && salary.min <= salary.max);
    }
    assert!(SiteAdapterFactory::create("indeed").is_none());
}

#[test]
fn test_unrecognized_detail_url_gets_synthesized_id() {
    let now = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
    for adapter in SiteAdapterFactory::all() {
        let raw = RawListing {
            title: Some("서버 개발자".to_string()),
            company: Some("테스트".to_string()),
            href: Some("/company/intro".to_string()),
            ..RawListing::default()
        };
        let ctx = ParseContext {
            now,
            index: 3,
            base_url: Url::parse(adapter.base_url()).unwrap(),
        };

        let job = adapter.normalize(&raw, &ctx).unwrap().unwrap();
        assert_eq!(
            job.id,
            format!("{}-{}-3", adapter.id(), now.timestamp_millis())
        );
        assert_eq!(job.source, adapter.id());
        assert_eq!(job.salary, adapter.default_salary());
        assert_eq!(job.salary_source, SalarySource::SiteDefault);
    }
}
