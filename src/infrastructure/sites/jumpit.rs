// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use url::form_urlencoded::Serializer;
use url::Url;

use crate::domain::models::job::Salary;
use crate::domain::models::scrape_request::ScrapeRequest;
use crate::domain::sites::adapter::{lookup_code, ListingSelectors, SiteAdapter};
use crate::utils::url_utils::numeric_segment_after;

const POSITIONS_URL: &str = "https://jumpit.saramin.co.kr/positions";

const LOCATIONS: &[(&str, &str)] = &[
    ("서울", "101000"),
    ("경기", "102000"),
    ("인천", "108000"),
    ("부산", "106000"),
    ("대구", "104000"),
    ("대전", "105000"),
    ("광주", "103000"),
    ("울산", "107000"),
    ("세종", "118000"),
    ("강원", "109000"),
    ("경남", "110000"),
    ("경북", "111000"),
    ("전남", "112000"),
    ("전북", "113000"),
    ("충북", "114000"),
    ("충남", "115000"),
    ("제주", "116000"),
];

/// 점핏 (jumpit.saramin.co.kr)
///
/// 开发者职位站点，整张卡片就是指向 `/position/{id}` 的链接
pub struct Jumpit;

impl SiteAdapter for Jumpit {
    fn id(&self) -> &'static str {
        "jumpit"
    }

    fn domain(&self) -> &'static str {
        "jumpit.saramin.co.kr"
    }

    fn base_url(&self) -> &'static str {
        "https://jumpit.saramin.co.kr"
    }

    fn build_search_url(&self, request: &ScrapeRequest) -> String {
        let mut query = Serializer::new(String::new());
        if let Some(keyword) = &request.keyword {
            query.append_pair("keyword", keyword);
        }
        if let Some(code) = request.location.as_deref().and_then(|l| lookup_code(LOCATIONS, l)) {
            query.append_pair("locationTag", code);
        }
        if let Some(experience) = &request.experience {
            // career 是单一年限，取下限
            query.append_pair("career", &experience.min.unwrap_or(0).to_string());
        }
        query.append_pair("sort", "rsp_rate");

        format!("{}?{}", POSITIONS_URL, query.finish())
    }

    fn selectors(&self) -> ListingSelectors {
        let mut s = ListingSelectors::new(
            "a[href^=\"/position/\"]",
            "a[href^=\"/position/\"]",
            "h2",
            "[class*=\"company\"]",
        );
        s.location = Some("ul.position_info li:nth-child(1)".to_string());
        s.experience = Some("ul.position_info li:nth-child(2)".to_string());
        s.skills = Some("ul.skill_tags li".to_string());
        s.deadline = Some("[class*=\"deadline\"]".to_string());
        s
    }

    fn extract_id(&self, url: &Url) -> Option<String> {
        numeric_segment_after(url, "position")
    }

    fn default_salary(&self) -> Salary {
        Salary::new(3500, 5500)
    }
}
