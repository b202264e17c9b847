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

const SEARCH_URL: &str = "https://www.saramin.co.kr/zf_user/search/recruit";

/// 地区名 -> `loc_mcd`
const LOCATIONS: &[(&str, &str)] = &[
    ("서울", "101000"),
    ("경기", "102000"),
    ("광주", "103000"),
    ("대구", "104000"),
    ("대전", "105000"),
    ("부산", "106000"),
    ("울산", "107000"),
    ("인천", "108000"),
    ("강원", "109000"),
    ("경남", "110000"),
    ("경북", "111000"),
    ("전남", "112000"),
    ("전북", "113000"),
    ("충북", "114000"),
    ("충남", "115000"),
    ("제주", "116000"),
    ("세종", "118000"),
];

/// 雇佣形态 -> `job_type`
const EMPLOYMENT_TYPES: &[(&str, &str)] = &[
    ("정규직", "1"),
    ("계약직", "2"),
    ("병역특례", "3"),
    ("인턴", "4"),
    ("아르바이트", "5"),
    ("파견", "6"),
    ("프리랜서", "10"),
];

/// 年薪下限（万韩元）-> `sal_min`
const SALARY_FLOORS: &[(i64, &str)] = &[
    (2600, "9"),
    (2800, "10"),
    (3000, "11"),
    (3200, "12"),
    (3400, "13"),
    (3600, "14"),
    (3800, "15"),
    (4000, "16"),
    (5000, "17"),
    (6000, "18"),
    (7000, "19"),
];

/// 不超过 `min` 的最高薪资档位
pub(crate) fn floor_code(table: &[(i64, &'static str)], min: i64) -> Option<&'static str> {
    table
        .iter()
        .rev()
        .find(|(floor, _)| *floor <= min)
        .map(|(_, code)| *code)
}

/// 사람인 (saramin.co.kr)
///
/// 详情页形如 `/zf_user/jobs/relay/view?view_type=search&rec_idx=49123456`
pub struct Saramin;

impl SiteAdapter for Saramin {
    fn id(&self) -> &'static str {
        "saramin"
    }

    fn domain(&self) -> &'static str {
        "saramin.co.kr"
    }

    fn base_url(&self) -> &'static str {
        "https://www.saramin.co.kr"
    }

    fn build_search_url(&self, request: &ScrapeRequest) -> String {
        let mut query = Serializer::new(String::new());
        if let Some(keyword) = &request.keyword {
            query.append_pair("searchword", keyword);
        }
        if let Some(code) = request.location.as_deref().and_then(|l| lookup_code(LOCATIONS, l)) {
            query.append_pair("loc_mcd", code);
        }
        if let Some(experience) = &request.experience {
            if request.wants_entry_level() {
                query.append_pair("exp_cd", "1");
            } else {
                query.append_pair("exp_cd", "2");
                if let Some(min) = experience.min {
                    query.append_pair("exp_min", &min.to_string());
                }
                if let Some(max) = experience.max {
                    query.append_pair("exp_max", &max.to_string());
                }
            }
        }
        if let Some(code) = request
            .employment_type
            .as_deref()
            .and_then(|t| lookup_code(EMPLOYMENT_TYPES, t))
        {
            query.append_pair("job_type", code);
        }
        if let Some(code) = request
            .salary
            .and_then(|s| s.min)
            .and_then(|min| floor_code(SALARY_FLOORS, min))
        {
            query.append_pair("sal_min", code);
        }
        query.append_pair("recruitPageCount", &request.limit.clamp(1, 100).to_string());

        format!("{}?{}", SEARCH_URL, query.finish())
    }

    fn selectors(&self) -> ListingSelectors {
        let mut s = ListingSelectors::new(
            ".item_recruit",
            ".job_tit a[href]",
            ".job_tit a",
            ".corp_name a",
        );
        s.location = Some(".job_condition span:nth-child(1)".to_string());
        s.experience = Some(".job_condition span:nth-child(2)".to_string());
        s.education = Some(".job_condition span:nth-child(3)".to_string());
        s.employment_type = Some(".job_condition span:nth-child(4)".to_string());
        s.salary = Some(".job_condition .salary".to_string());
        s.deadline = Some(".job_date .date".to_string());
        s.posted = Some(".job_day".to_string());
        s.industry = Some(".job_sector b".to_string());
        s.skills = Some(".job_sector a".to_string());
        s
    }

    fn extract_id(&self, url: &Url) -> Option<String> {
        numeric_query_param(url, "rec_idx")
    }

    fn default_salary(&self) -> Salary {
        Salary::new(3000, 4500)
    }
}
