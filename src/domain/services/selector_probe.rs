// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use scraper::{ElementRef, Html, Selector};

use crate::domain::models::site_pattern::SelectorSet;

const LIST_CONTAINER_CANDIDATES: &[&str] = &[
    ".item_recruit",
    ".list-post",
    ".list_item",
    ".c_row",
    ".job-card",
    "[class*='JobCard']",
    "[class*='job-item']",
    "[class*='position']",
    "ul.list > li",
    "article",
    "tbody > tr",
];

const LINK_CANDIDATES: &[&str] = &[
    "a[href*='view']",
    "a[href*='GI_Read']",
    "a[href*='recruit']",
    "a[href*='position']",
    "a[href*='job']",
    "a[href*='/wd/']",
];

const TITLE_CANDIDATES: &[&str] = &[
    ".job_tit",
    ".job_title",
    ".title",
    ".tit",
    "[class*='title']",
    "h2",
    "h3",
    "strong",
];

const COMPANY_CANDIDATES: &[&str] = &[
    ".corp_name",
    ".company_name",
    ".company",
    ".name",
    ".cpname",
    "[class*='company']",
    "[class*='corp']",
];

const LOCATION_CANDIDATES: &[&str] = &[
    ".job_condition span",
    ".location",
    ".loc",
    ".long",
    "[class*='location']",
    "[class*='address']",
    "[class*='region']",
];

/// 探测列表页的字段选择器
///
/// 每个类别按候选顺序尝试，第一个命中的即为结果；全部落空时使用
/// [`SelectorSet::default`] 中的通用选择器，因此探测本身不会失败。
/// 标题、公司、地点在第一个列表项内部探测，找不到列表项时在整个文档中探测
pub fn detect_selectors(html: &str) -> SelectorSet {
    let document = Html::parse_document(html);
    let fallback = SelectorSet::default();
    let root = document.root_element();

    let list_container = first_match(root, LIST_CONTAINER_CANDIDATES);
    let scope = list_container
        .map(|(_, element)| element)
        .unwrap_or(root);

    let pick = |candidates: &[&str], default: &str| {
        first_match(scope, candidates)
            .map(|(selector, _)| selector.to_string())
            .unwrap_or_else(|| default.to_string())
    };

    SelectorSet {
        link: pick(LINK_CANDIDATES, &fallback.link),
        title: pick(TITLE_CANDIDATES, &fallback.title),
        company: pick(COMPANY_CANDIDATES, &fallback.company),
        location: pick(LOCATION_CANDIDATES, &fallback.location),
        list_container: list_container
            .map(|(selector, _)| selector.to_string())
            .unwrap_or(fallback.list_container),
    }
}

/// 返回第一个在 `scope` 中有命中的候选选择器及其首个元素
fn first_match<'a, 'b>(
    scope: ElementRef<'a>,
    candidates: &[&'b str],
) -> Option<(&'b str, ElementRef<'a>)> {
    candidates.iter().find_map(|candidate| {
        let selector = Selector::parse(candidate).ok()?;
        let element = scope.select(&selector).next()?;
        Some((*candidate, element))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_selectors_known_markup() {
        let html = r#"
            <div class="content">
                <div class="item_recruit">
                    <div class="area_job">
                        <h2 class="job_tit"><a href="/zf_user/jobs/relay/view?rec_idx=49123456">백엔드 개발자</a></h2>
                        <div class="job_condition"><span>서울 강남구</span><span>경력 3년↑</span></div>
                    </div>
                    <div class="area_corp"><strong class="corp_name"><a href="/c/1">테스트컴퍼니</a></strong></div>
                </div>
            </div>
        "#;
        let selectors = detect_selectors(html);
        assert_eq!(selectors.list_container, ".item_recruit");
        assert_eq!(selectors.link, "a[href*='view']");
        assert_eq!(selectors.title, ".job_tit");
        assert_eq!(selectors.company, ".corp_name");
        assert_eq!(selectors.location, ".job_condition span");
    }

    #[test]
    fn test_detect_selectors_falls_back_to_generic() {
        let selectors = detect_selectors("<html><body><p>nothing here</p></body></html>");
        assert_eq!(selectors, SelectorSet::default());
    }
}
