// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use scraper::{ElementRef, Html, Selector};
use tracing::warn;

use crate::domain::models::raw_listing::RawListing;
use crate::domain::sites::adapter::ListingSelectors;
use crate::utils::text::clean_text;

/// 编译后的列表页选择器
struct Compiled {
    link: Option<Selector>,
    title: Option<Selector>,
    company: Option<Selector>,
    location: Option<Selector>,
    experience: Option<Selector>,
    education: Option<Selector>,
    employment_type: Option<Selector>,
    salary: Option<Selector>,
    deadline: Option<Selector>,
    posted: Option<Selector>,
    description: Option<Selector>,
    industry: Option<Selector>,
    skills: Option<Selector>,
}

fn compile(selector: Option<&str>) -> Option<Selector> {
    let selector = selector?;
    match Selector::parse(selector) {
        Ok(s) => Some(s),
        Err(e) => {
            warn!("Ignoring invalid selector '{}': {:?}", selector, e);
            None
        }
    }
}

impl Compiled {
    fn new(s: &ListingSelectors) -> Self {
        Self {
            link: compile(Some(&s.link)),
            title: compile(Some(&s.title)),
            company: compile(Some(&s.company)),
            location: compile(s.location.as_deref()),
            experience: compile(s.experience.as_deref()),
            education: compile(s.education.as_deref()),
            employment_type: compile(s.employment_type.as_deref()),
            salary: compile(s.salary.as_deref()),
            deadline: compile(s.deadline.as_deref()),
            posted: compile(s.posted.as_deref()),
            description: compile(s.description.as_deref()),
            industry: compile(s.industry.as_deref()),
            skills: compile(s.skills.as_deref()),
        }
    }
}

/// 选择器在元素内第一个命中的文本
fn first_text(element: ElementRef<'_>, selector: Option<&Selector>) -> Option<String> {
    let found = element.select(selector?).next()?;
    let text = clean_text(&found.text().collect::<Vec<_>>().join(" "));
    (!text.is_empty()).then_some(text)
}

/// 记录中的详情链接：链接选择器命中的元素，或记录根元素本身就是链接
fn link_href(element: ElementRef<'_>, selector: Option<&Selector>) -> Option<String> {
    let from_child = selector.and_then(|sel| {
        element
            .select(sel)
            .find_map(|a| a.value().attr("href").map(str::to_string))
    });
    from_child.or_else(|| element.value().attr("href").map(str::to_string))
}

/// 按选择器从列表页提取原始记录，最多 `limit` 条
///
/// 容器选择器无效或没有命中时返回空列表，空列表是合法结果
pub fn extract_raw_listings(html: &str, selectors: &ListingSelectors, limit: usize) -> Vec<RawListing> {
    let Some(container) = compile(Some(&selectors.container)) else {
        return Vec::new();
    };
    let compiled = Compiled::new(selectors);
    let document = Html::parse_document(html);

    document
        .select(&container)
        .take(limit)
        .map(|element| {
            let link_text = compiled
                .link
                .as_ref()
                .and_then(|sel| element.select(sel).next())
                .map(|a| clean_text(&a.text().collect::<Vec<_>>().join(" ")))
                .filter(|t| !t.is_empty());

            RawListing {
                title: first_text(element, compiled.title.as_ref()).or(link_text),
                company: first_text(element, compiled.company.as_ref()),
                href: link_href(element, compiled.link.as_ref()),
                location: first_text(element, compiled.location.as_ref()),
                experience: first_text(element, compiled.experience.as_ref()),
                education: first_text(element, compiled.education.as_ref()),
                employment_type: first_text(element, compiled.employment_type.as_ref()),
                salary: first_text(element, compiled.salary.as_ref()),
                deadline: first_text(element, compiled.deadline.as_ref()),
                posted: first_text(element, compiled.posted.as_ref()),
                description: first_text(element, compiled.description.as_ref()),
                industry: first_text(element, compiled.industry.as_ref()),
                skills: compiled
                    .skills
                    .as_ref()
                    .map(|sel| {
                        element
                            .select(sel)
                            .map(|s| clean_text(&s.text().collect::<Vec<_>>().join(" ")))
                            .filter(|s| !s.is_empty())
                            .collect()
                    })
                    .unwrap_or_default(),
            }
        })
        .collect()
}

/// 列表页中是否至少有一条记录
pub fn has_listings(html: &str, selectors: &ListingSelectors) -> bool {
    !extract_raw_listings(html, selectors, 1).is_empty()
}
