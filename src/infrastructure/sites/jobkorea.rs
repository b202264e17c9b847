// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use url::form_urlencoded::Serializer;
use url::Url;

use crate::domain::models::job::Salary;
use crate::domain::models::scrape_request::ScrapeRequest;
use crate::domain::sites::adapter::{lookup_code, ListingSelectors, SiteAdapter};
use crate::utils::url_utils::{numeric_query_param, numeric_segment_after};

const SEARCH_URL: &str = "https://www.jobkorea.co.kr/Search/";

const LOCATIONS: &[(&str, &str)] = &[
    ("서울", "I000"),
    ("경기", "B000"),
    ("인천", "K000"),
    ("대전", "G000"),
    ("세종", "1000"),
    ("충남", "O000"),
    ("충북", "P000"),
    ("광주", "E000"),
    ("전남", "L000"),
    ("전북", "M000"),
    ("대구", "F000"),
    ("경북", "D000"),
    ("부산", "H000"),
    ("울산", "J000"),
    ("경남", "C000"),
    ("강원", "A000"),
    ("제주", "N000"),
];

const EMPLOYMENT_TYPES: &[(&str, &str)] = &[
    ("정규직", "1"),
    ("계약직", "2"),
    ("인턴", "3"),
    ("파견", "4"),
    ("도급", "5"),
    ("프리랜서", "6"),
    ("아르바이트", "7"),
];

/// 잡코리아 (jobkorea.co.kr)
///
/// 详情页形如 `/Recruit/GI_Read/45678901?Oem_Code=C1`
pub struct JobKorea;

impl SiteAdapter for JobKorea {
    fn id(&self) -> &'static str {
        "jobkorea"
    }

    fn domain(&self) -> &'static str {
        "jobkorea.co.kr"
    }

    fn base_url(&self) -> &'static str {
        "https://www.jobkorea.co.kr"
    }

    fn build_search_url(&self, request: &ScrapeRequest) -> String {
        let mut query = Serializer::new(String::new());
        if let Some(keyword) = &request.keyword {
            query.append_pair("stext", keyword);
        }
        if let Some(code) = request.location.as_deref().and_then(|l| lookup_code(LOCATIONS, l)) {
            query.append_pair("local", code);
        }
        if let Some(experience) = &request.experience {
            // careerType: 1 신입, 2 경력
            if request.wants_entry_level() {
                query.append_pair("careerType", "1");
            } else {
                query.append_pair("careerType", "2");
                if let Some(min) = experience.min {
                    query.append_pair("careerMin", &min.to_string());
                }
                if let Some(max) = experience.max {
                    query.append_pair("careerMax", &max.to_string());
                }
            }
        }
        if let Some(code) = request
            .employment_type
            .as_deref()
            .and_then(|t| lookup_code(EMPLOYMENT_TYPES, t))
        {
            query.append_pair("jobtype", code);
        }
        if let Some(min) = request.salary.and_then(|s| s.min) {
            query.append_pair("payMin", &min.to_string());
        }
        query.append_pair("tabType", "recruit");

        format!("{}?{}", SEARCH_URL, query.finish())
    }

    fn selectors(&self) -> ListingSelectors {
        let mut s = ListingSelectors::new(
            ".list-default .list-post",
            ".post-list-info a.title",
            ".post-list-info a.title",
            ".post-list-corp a.name",
        );
        s.location = Some(".option .loc".to_string());
        s.experience = Some(".option .exp".to_string());
        s.education = Some(".option .edu".to_string());
        s.employment_type = Some(".option span:nth-child(4)".to_string());
        s.deadline = Some(".option .date".to_string());
        s.posted = Some(".option .time".to_string());
        s.skills = Some(".etc".to_string());
        s
    }

    fn extract_id(&self, url: &Url) -> Option<String> {
        numeric_segment_after(url, "GI_Read").or_else(|| numeric_query_param(url, "GI_No"))
    }

    fn default_salary(&self) -> Salary {
        Salary::new(2800, 4000)
    }
}
