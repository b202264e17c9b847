// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use url::Url;

/// 详情页模板中的 id 占位符
pub const ID_PLACEHOLDER: &str = "{id}";

/// 模板错误
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("template must contain exactly one {{id}} placeholder, found {0}")]
    PlaceholderCount(usize),
    #[error("invalid matcher: {0}")]
    Regex(#[from] regex::Error),
}

/// 字段选择器集合
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SelectorSet {
    pub list_container: String,
    pub link: String,
    pub title: String,
    pub company: String,
    pub location: String,
}

impl Default for SelectorSet {
    /// 通用兜底选择器，任何 HTML 文档都能匹配到内容
    fn default() -> Self {
        Self {
            list_container: "li".to_string(),
            link: "a[href]".to_string(),
            title: "a".to_string(),
            company: "span".to_string(),
            location: "span".to_string(),
        }
    }
}

/// 学习得到的站点模式
///
/// 以域名为键缓存在 PatternStore 中，30 天后视为过期
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SitePattern {
    pub domain: String,
    pub list_template: String,
    detail_template: String,
    #[serde(with = "matcher_serde")]
    matcher: Regex,
    #[serde(default)]
    id_param: Option<String>,
    #[serde(default)]
    pub field_params: BTreeMap<String, String>,
    #[serde(default)]
    pub selectors: SelectorSet,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub sample_urls: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl SitePattern {
    /// 创建新的站点模式，校验模板并编译匹配器
    pub fn new(
        domain: &str,
        list_template: impl Into<String>,
        detail_template: impl Into<String>,
        selectors: SelectorSet,
    ) -> Result<Self, TemplateError> {
        let detail_template = detail_template.into();
        let matcher = compile_template(&detail_template)?;
        let now = Utc::now();
        Ok(Self {
            domain: normalize_domain(domain),
            list_template: list_template.into(),
            id_param: id_param(&detail_template),
            detail_template,
            matcher,
            field_params: BTreeMap::new(),
            selectors,
            confidence: 0.0,
            sample_urls: Vec::new(),
            created_at: now,
            last_updated: now,
        })
    }

    pub fn with_field_params(mut self, field_params: BTreeMap<String, String>) -> Self {
        self.field_params = field_params;
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    pub fn with_samples(mut self, sample_urls: Vec<String>) -> Self {
        self.sample_urls = sample_urls;
        self
    }

    pub fn detail_template(&self) -> &str {
        &self.detail_template
    }

    pub fn matcher(&self) -> &Regex {
        &self.matcher
    }

    pub fn id_param(&self) -> Option<&str> {
        self.id_param.as_deref()
    }

    /// 替换详情页模板，同步重新编译匹配器
    pub fn set_detail_template(&mut self, template: impl Into<String>) -> Result<(), TemplateError> {
        let template = template.into();
        self.matcher = compile_template(&template)?;
        self.id_param = id_param(&template);
        self.detail_template = template;
        Ok(())
    }

    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.last_updated
    }

    /// 判断 URL 是否符合详情页模板
    pub fn matches(&self, url: &str) -> bool {
        matches_pattern(self, url)
    }

    /// 根据 id 生成详情页 URL
    pub fn detail_url(&self, id: &str) -> String {
        format!(
            "https://{}{}",
            self.domain,
            self.detail_template.replacen(ID_PLACEHOLDER, id, 1)
        )
    }
}

/// 判断 URL 是否匹配站点模式
///
/// 主机需与模式域名一致（忽略 `www.` 前缀），路径（及 id 参数）需完全匹配模板
pub fn matches_pattern(pattern: &SitePattern, url: &str) -> bool {
    let parsed = match Url::parse(url) {
        Ok(u) => u,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            match Url::parse(&format!("https://{}", pattern.domain)).and_then(|b| b.join(url)) {
                Ok(u) => u,
                Err(_) => return false,
            }
        }
        Err(_) => return false,
    };

    let Some(host) = parsed.host_str() else {
        return false;
    };
    if !same_domain(host, &pattern.domain) {
        return false;
    }

    pattern
        .matcher
        .is_match(&canonical_target(&parsed, pattern.id_param()))
}

/// 将模板编译为正则：转义元字符，占位符替换为 `\d+`
pub fn compile_template(template: &str) -> Result<Regex, TemplateError> {
    let count = template.matches(ID_PLACEHOLDER).count();
    if count != 1 {
        return Err(TemplateError::PlaceholderCount(count));
    }
    let escaped: Vec<String> = template.split(ID_PLACEHOLDER).map(regex::escape).collect();
    Ok(Regex::new(&format!("^{}$", escaped.join(r"\d+")))?)
}

/// 模板中承载 id 的查询参数名
pub fn id_param(template: &str) -> Option<String> {
    let (_, query) = template.split_once('?')?;
    query.split('&').find_map(|pair| {
        let (name, value) = pair.split_once('=')?;
        (value == ID_PLACEHOLDER).then(|| name.to_string())
    })
}

/// URL 的规范匹配目标：路径，加上 id 参数（如有）
pub fn canonical_target(url: &Url, id_param: Option<&str>) -> String {
    let path = url.path();
    let Some(name) = id_param else {
        return path.to_string();
    };
    match url.query_pairs().find(|(k, _)| k == name) {
        Some((k, v)) => format!("{}?{}={}", path, k, v),
        None => path.to_string(),
    }
}

/// 规范化域名：小写、去掉 `www.` 前缀和末尾的点
pub fn normalize_domain(host: &str) -> String {
    let lower = host.trim().trim_end_matches('.').to_lowercase();
    lower
        .strip_prefix("www.")
        .map(str::to_string)
        .unwrap_or(lower)
}

/// 两个主机规范化后是否为同一域名
pub fn same_domain(a: &str, b: &str) -> bool {
    normalize_domain(a) == normalize_domain(b)
}

mod matcher_serde {
    use regex::Regex;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(matcher: &Regex, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(matcher.as_str())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Regex, D::Error> {
        let source = String::deserialize(deserializer)?;
        Regex::new(&source).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_template_requires_single_placeholder() {
        assert!(matches!(
            compile_template("/jobs/view"),
            Err(TemplateError::PlaceholderCount(0))
        ));
        assert!(matches!(
            compile_template("/c/{id}/jobs/{id}"),
            Err(TemplateError::PlaceholderCount(2))
        ));
        let re = compile_template("/Recruit/GI_Read/{id}").unwrap();
        assert!(re.is_match("/Recruit/GI_Read/45678901"));
        assert!(!re.is_match("/Recruit/GI_Read/abc"));
    }

    #[test]
    fn test_compile_template_escapes_metacharacters() {
        let re = compile_template("/view.asp?job={id}").unwrap();
        assert!(re.is_match("/view.asp?job=123"));
        assert!(!re.is_match("/viewXasp?job=123"));
    }

    #[test]
    fn test_matches_pattern_with_query_id() {
        let pattern = SitePattern::new(
            "www.saramin.co.kr",
            "/zf_user/search/recruit",
            "/zf_user/jobs/relay/view?rec_idx={id}",
            SelectorSet::default(),
        )
        .unwrap();
        assert_eq!(pattern.domain, "saramin.co.kr");
        assert_eq!(pattern.id_param(), Some("rec_idx"));
        assert!(pattern.matches(
            "https://www.saramin.co.kr/zf_user/jobs/relay/view?view_type=search&rec_idx=49123456&t=1"
        ));
        assert!(pattern.matches("/zf_user/jobs/relay/view?rec_idx=1"));
        assert!(!pattern.matches("https://www.jobkorea.co.kr/zf_user/jobs/relay/view?rec_idx=1"));
        assert!(!pattern.matches("https://www.saramin.co.kr/zf_user/jobs/relay/view"));
    }

    #[test]
    fn test_same_domain_ignores_only_www() {
        assert!(same_domain("www.saramin.co.kr", "saramin.co.kr"));
        assert!(same_domain("Job.Incruit.com.", "job.incruit.com"));
        assert!(!same_domain("jumpit.saramin.co.kr", "saramin.co.kr"));
        assert!(!same_domain("search.incruit.com", "job.incruit.com"));
    }

    #[test]
    fn test_matches_pattern_rejects_sibling_subdomain() {
        let pattern = SitePattern::new(
            "jumpit.saramin.co.kr",
            "/positions",
            "/position/{id}",
            SelectorSet::default(),
        )
        .unwrap();
        assert!(pattern.matches("https://jumpit.saramin.co.kr/position/123456"));
        assert!(!pattern.matches("https://www.saramin.co.kr/position/123456"));
        assert!(!pattern.matches("https://saramin.co.kr/position/123456"));
    }

    #[test]
    fn test_pattern_json_keeps_matcher() {
        let pattern = SitePattern::new("wanted.co.kr", "/search", "/wd/{id}", SelectorSet::default())
            .unwrap();
        let json = serde_json::to_string(&pattern).unwrap();
        let restored: SitePattern = serde_json::from_str(&json).unwrap();
        assert!(restored.matches("https://www.wanted.co.kr/wd/123456"));
        assert_eq!(restored.detail_url("42"), "https://wanted.co.kr/wd/42");
    }
}
