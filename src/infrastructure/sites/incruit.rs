// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use url::form_urlencoded::Serializer;
use url::Url;

use crate::domain::models::job::Salary;
use crate::domain::models::scrape_request::ScrapeRequest;
use crate::domain::sites::adapter::{lookup_code, ListingSelectors, SiteAdapter};
use crate::utils::url_utils::numeric_query_param;

const SEARCH_URL: &str = "https://search.incruit.com/list/search.asp";

const LOCATIONS: &[(&str, &str)] = &[
    ("서울", "11"),
    ("부산", "21"),
    ("대구", "22"),
    ("인천", "23"),
    ("광주", "24"),
    ("대전", "25"),
    ("울산", "26"),
    ("세종", "27"),
    ("경기", "31"),
    ("강원", "32"),
    ("충북", "33"),
    ("충남", "34"),
    ("전북", "35"),
    ("전남", "36"),
    ("경북", "37"),
    ("경남", "38"),
    ("제주", "39"),
];

const EMPLOYMENT_TYPES: &[(&str, &str)] = &[
    ("정규직", "1"),
    ("계약직", "2"),
    ("인턴", "3"),
    ("파견", "4"),
    ("아르바이트", "5"),
    ("프리랜서", "6"),
];

/// 인크루트 (incruit.com)
///
/// 搜索页在 `search.incruit.com`，详情页在 `job.incruit.com/jobdb_info/jobpost.asp?job=...`；
/// 模式按详情页域名缓存
pub struct Incruit;

impl SiteAdapter for Incruit {
    fn id(&self) -> &'static str {
        "incruit"
    }

    fn domain(&self) -> &'static str {
        "job.incruit.com"
    }

    fn base_url(&self) -> &'static str {
        "https://search.incruit.com"
    }

    fn build_search_url(&self, request: &ScrapeRequest) -> String {
        let mut query = Serializer::new(String::new());
        query.append_pair("col", "job");
        if let Some(keyword) = &request.keyword {
            query.append_pair("kw", keyword);
        }
        if let Some(code) = request.location.as_deref().and_then(|l| lookup_code(LOCATIONS, l)) {
            query.append_pair("rgn1", code);
        }
        if let Some(experience) = &request.experience {
            // cr: 1 신입, 2 경력
            if request.wants_entry_level() {
                query.append_pair("cr", "1");
            } else {
                query.append_pair("cr", "2");
                if let Some(min) = experience.min {
                    query.append_pair("crmin", &min.to_string());
                }
                if let Some(max) = experience.max {
                    query.append_pair("crmax", &max.to_string());
                }
            }
        }
        if let Some(code) = request
            .employment_type
            .as_deref()
            .and_then(|t| lookup_code(EMPLOYMENT_TYPES, t))
        {
            query.append_pair("emp", code);
        }
        if let Some(min) = request.salary.and_then(|s| s.min) {
            query.append_pair("sal", &min.to_string());
        }
        query.append_pair("listsize", &request.limit.clamp(1, 100).to_string());

        format!("{}?{}", SEARCH_URL, query.finish())
    }

    fn selectors(&self) -> ListingSelectors {
        let mut s = ListingSelectors::new(
            "ul.c_row",
            ".cell_mid .cl_top a[href]",
            ".cell_mid .cl_top a",
            ".cell_first .cpname",
        );
        s.experience = Some(".cell_mid .cl_md span:nth-child(1)".to_string());
        s.education = Some(".cell_mid .cl_md span:nth-child(2)".to_string());
        s.location = Some(".cell_mid .cl_md span:nth-child(3)".to_string());
        s.employment_type = Some(".cell_mid .cl_md span:nth-child(4)".to_string());
        s.salary = Some(".cell_mid .cl_md span:nth-child(5)".to_string());
        s.deadline = Some(".cell_last .cl_btm span:nth-child(1)".to_string());
        s.posted = Some(".cell_last .cl_btm span:nth-child(2)".to_string());
        s.skills = Some(".cell_mid .cl_btm span".to_string());
        s
    }

    fn extract_id(&self, url: &Url) -> Option<String> {
        numeric_query_param(url, "job")
    }

    fn default_salary(&self) -> Salary {
        Salary::new(2600, 3800)
    }
}
