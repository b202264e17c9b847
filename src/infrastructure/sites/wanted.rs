// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use url::form_urlencoded::Serializer;
use url::Url;

use crate::domain::models::job::Salary;
use crate::domain::models::scrape_request::ScrapeRequest;
use crate::domain::services::normalizer::parse_salary;
use crate::domain::sites::adapter::{lookup_code, ListingSelectors, SiteAdapter};
use crate::utils::url_utils::numeric_segment_after;

const LIST_URL: &str = "https://www.wanted.co.kr/wdlist";

const LOCATIONS: &[(&str, &str)] = &[
    ("서울", "seoul.all"),
    ("경기", "gyeonggi.all"),
    ("인천", "incheon.all"),
    ("부산", "busan.all"),
    ("대구", "daegu.all"),
    ("대전", "daejeon.all"),
    ("광주", "gwangju.all"),
    ("울산", "ulsan.all"),
    ("세종", "sejong.all"),
    ("강원", "gangwon.all"),
    ("충북", "chungbuk.all"),
    ("충남", "chungnam.all"),
    ("전북", "jeonbuk.all"),
    ("전남", "jeonnam.all"),
    ("경북", "gyeongbuk.all"),
    ("경남", "gyeongnam.all"),
    ("제주", "jeju.all"),
];

/// 원티드 (wanted.co.kr)
///
/// 列表卡片不展示薪资，卡片上的金额是合格奖励金（보상금），不能当作薪资
pub struct Wanted;

impl SiteAdapter for Wanted {
    fn id(&self) -> &'static str {
        "wanted"
    }

    fn domain(&self) -> &'static str {
        "wanted.co.kr"
    }

    fn base_url(&self) -> &'static str {
        "https://www.wanted.co.kr"
    }

    fn build_search_url(&self, request: &ScrapeRequest) -> String {
        let mut query = Serializer::new(String::new());
        query.append_pair("country", "kr");
        query.append_pair("job_sort", "job.latest_order");
        if let Some(keyword) = &request.keyword {
            query.append_pair("query", keyword);
        }
        match request.location.as_deref().and_then(|l| lookup_code(LOCATIONS, l)) {
            Some(code) => query.append_pair("locations", code),
            None => query.append_pair("locations", "all"),
        };
        match &request.experience {
            Some(experience) => {
                query.append_pair("years", &experience.min.unwrap_or(0).to_string());
                if let Some(max) = experience.max {
                    query.append_pair("years", &max.to_string());
                }
            }
            None => {
                query.append_pair("years", "-1");
            }
        }
        query.append_pair("limit", &request.limit.clamp(1, 100).to_string());

        format!("{}?{}", LIST_URL, query.finish())
    }

    fn selectors(&self) -> ListingSelectors {
        let mut s = ListingSelectors::new(
            "[data-cy=\"job-card\"]",
            "a[href*=\"/wd/\"]",
            "[class*=\"JobCard_title\"]",
            "[class*=\"JobCard_companyName\"]",
        );
        s.location = Some("[class*=\"JobCard_location\"]".to_string());
        s.salary = Some("[class*=\"JobCard_reward\"]".to_string());
        s.experience = Some("[class*=\"JobCard_experience\"]".to_string());
        s
    }

    fn extract_id(&self, url: &Url) -> Option<String> {
        numeric_segment_after(url, "wd")
    }

    fn default_salary(&self) -> Salary {
        Salary::new(3500, 6000)
    }

    fn parse_salary(&self, text: &str) -> Option<Salary> {
        if text.contains("보상") {
            return None;
        }
        parse_salary(text)
    }
}
