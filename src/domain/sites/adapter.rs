// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use thiserror::Error;
use url::Url;

use crate::domain::models::job::{Job, Salary, SalarySource};
use crate::domain::models::raw_listing::RawListing;
use crate::domain::models::scrape_request::ScrapeRequest;
use crate::domain::models::site_pattern::SelectorSet;
use crate::domain::services::normalizer::{
    detect_work_type, parse_deadline, parse_experience, parse_posted_at, parse_salary,
};
use crate::utils::text::{clean_text, non_empty, slugify};
use crate::utils::url_utils::resolve_url;

/// 单条记录解析错误
///
/// 只影响当前记录，爬虫记录日志后跳过
#[derive(Error, Debug)]
pub enum ParseError {
    /// 缺少必需字段
    #[error("Missing field: {0}")]
    MissingField(&'static str),
    /// 详情链接无法解析
    #[error("Invalid detail URL '{href}': {reason}")]
    InvalidUrl { href: String, reason: String },
    /// 其他解析错误
    #[error("{0}")]
    Other(String),
}

/// 列表页选择器
///
/// `container` 匹配每条记录的根元素，其余选择器在根元素内部查找；
/// 可选字段为 None 时不提取
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingSelectors {
    pub container: String,
    pub link: String,
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub experience: Option<String>,
    pub education: Option<String>,
    pub employment_type: Option<String>,
    pub salary: Option<String>,
    pub deadline: Option<String>,
    pub posted: Option<String>,
    pub description: Option<String>,
    pub industry: Option<String>,
    pub skills: Option<String>,
}

impl ListingSelectors {
    pub fn new(
        container: impl Into<String>,
        link: impl Into<String>,
        title: impl Into<String>,
        company: impl Into<String>,
    ) -> Self {
        Self {
            container: container.into(),
            link: link.into(),
            title: title.into(),
            company: company.into(),
            location: None,
            experience: None,
            education: None,
            employment_type: None,
            salary: None,
            deadline: None,
            posted: None,
            description: None,
            industry: None,
            skills: None,
        }
    }
}

impl From<&SelectorSet> for ListingSelectors {
    fn from(set: &SelectorSet) -> Self {
        let mut selectors = Self::new(&set.list_container, &set.link, &set.title, &set.company);
        selectors.location = Some(set.location.clone());
        selectors
    }
}

/// 单条记录的解析上下文
#[derive(Debug, Clone)]
pub struct ParseContext {
    /// 本次爬取的基准时间
    pub now: DateTime<Utc>,
    /// 记录在列表中的序号，用于合成 id
    pub index: usize,
    /// 解析相对链接的基准 URL
    pub base_url: Url,
}

/// 在查找表中按名称查找站点代码
///
/// 先尝试完全匹配，再尝试包含匹配（例如 "서울 강남구" 命中 "서울"），忽略大小写
pub fn lookup_code(table: &[(&str, &'static str)], name: &str) -> Option<&'static str> {
    let needle = name.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    table
        .iter()
        .find(|(key, _)| key.to_lowercase() == needle)
        .or_else(|| table.iter().find(|(key, _)| needle.contains(&key.to_lowercase())))
        .map(|(_, code)| *code)
}

/// 站点适配器特质
///
/// 每个外部招聘站点一个实现，描述该站点的查询编码、默认选择器、
/// id 规则与薪资规则；通用的规范化流程由默认实现 [`SiteAdapter::normalize`] 提供
pub trait SiteAdapter: Send + Sync {
    /// 站点标识，写入 `Job.source`
    fn id(&self) -> &'static str;

    /// 详情页所在域名，也是模式缓存的键
    fn domain(&self) -> &'static str;

    /// 站点根 URL，用于解析相对链接
    fn base_url(&self) -> &'static str;

    /// 根据爬取请求构造搜索 URL，查找表中没有的字段直接省略
    fn build_search_url(&self, request: &ScrapeRequest) -> String;

    /// 学习模式时使用的页面
    fn seed_url(&self) -> String {
        self.build_search_url(&ScrapeRequest::new().keyword("개발자"))
    }

    /// 站点默认的列表页选择器
    fn selectors(&self) -> ListingSelectors;

    /// 从详情页 URL 中解析记录 id
    fn extract_id(&self, url: &Url) -> Option<String>;

    /// 列表未标注薪资时使用的默认区间（万韩元）
    fn default_salary(&self) -> Salary;

    /// 解析薪资文本
    fn parse_salary(&self, text: &str) -> Option<Salary> {
        parse_salary(text)
    }

    /// 将原始记录规范化为职位
    ///
    /// # 返回值
    ///
    /// * `Ok(Some(Job))` - 规范化成功
    /// * `Ok(None)` - 缺少标题或公司，静默丢弃
    /// * `Err(ParseError)` - 记录无法解析
    fn normalize(&self, raw: &RawListing, ctx: &ParseContext) -> Result<Option<Job>, ParseError> {
        let (Some(title), Some(company)) = (
            non_empty(raw.title.as_deref()),
            non_empty(raw.company.as_deref()),
        ) else {
            return Ok(None);
        };

        let href = non_empty(raw.href.as_deref()).ok_or(ParseError::MissingField("href"))?;
        let source_url = resolve_url(&ctx.base_url, &href).map_err(|e| ParseError::InvalidUrl {
            href: href.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(source_url.scheme(), "http" | "https") {
            return Err(ParseError::InvalidUrl {
                href,
                reason: format!("unsupported scheme {}", source_url.scheme()),
            });
        }

        let id = self
            .extract_id(&source_url)
            .unwrap_or_else(|| format!("{}-{}-{}", self.id(), ctx.now.timestamp_millis(), ctx.index));

        let (salary, salary_source) = match raw.salary.as_deref().and_then(|s| self.parse_salary(s)) {
            Some(salary) => (salary, SalarySource::Listed),
            None => (self.default_salary(), SalarySource::SiteDefault),
        };

        let experience_text = non_empty(raw.experience.as_deref());
        let education = non_empty(raw.education.as_deref());
        let employment_type = non_empty(raw.employment_type.as_deref());

        let requirements = [experience_text.as_ref(), education.as_ref()]
            .into_iter()
            .flatten()
            .cloned()
            .collect();

        Ok(Some(Job {
            id,
            company_id: slugify(&company),
            title,
            company,
            location: non_empty(raw.location.as_deref()).unwrap_or_default(),
            salary,
            salary_source,
            experience: experience_text.as_deref().and_then(parse_experience),
            education,
            work_type: detect_work_type(employment_type.as_deref().unwrap_or_default()),
            employment_type,
            description: non_empty(raw.description.as_deref()).unwrap_or_default(),
            requirements,
            skills: raw
                .skills
                .iter()
                .map(|s| clean_text(s))
                .filter(|s| !s.is_empty())
                .collect(),
            industry: non_empty(raw.industry.as_deref()).unwrap_or_default(),
            deadline: Some(parse_deadline(raw.deadline.as_deref().unwrap_or_default(), ctx.now)),
            posted_at: parse_posted_at(raw.posted.as_deref().unwrap_or_default(), ctx.now),
            source_url: source_url.to_string(),
            source: self.id().to_string(),
        }))
    }
}
