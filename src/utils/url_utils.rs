// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use url::{ParseError, Url};

/// 将列表页中的链接（可能是相对路径）解析为绝对 URL，并去掉片段
pub fn resolve_url(base_url: &Url, href: &str) -> Result<Url, ParseError> {
    let mut url = base_url.join(href.trim())?;
    url.set_fragment(None);
    Ok(url)
}

/// 查询参数中名为 `name` 的纯数字值
pub fn numeric_query_param(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, v)| k == name && !v.is_empty() && v.bytes().all(|b| b.is_ascii_digit()))
        .map(|(_, v)| v.into_owned())
}

/// 路径中紧跟在 `marker` 段之后的纯数字段
pub fn numeric_segment_after(url: &Url, marker: &str) -> Option<String> {
    let mut segments = url.path_segments()?;
    segments.by_ref().find(|s| s.eq_ignore_ascii_case(marker))?;
    segments
        .next()
        .filter(|s| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_root_relative_href() {
        let base = Url::parse("https://www.saramin.co.kr/zf_user/search/recruit?searchword=rust").unwrap();
        assert_eq!(
            resolve_url(&base, " /zf_user/jobs/relay/view?rec_idx=1#top ").unwrap().as_str(),
            "https://www.saramin.co.kr/zf_user/jobs/relay/view?rec_idx=1"
        );
    }

    #[test]
    fn test_resolve_protocol_relative_href() {
        let base = Url::parse("https://www.jobkorea.co.kr/Search/").unwrap();
        assert_eq!(
            resolve_url(&base, "//www.jobkorea.co.kr/Recruit/GI_Read/123").unwrap().as_str(),
            "https://www.jobkorea.co.kr/Recruit/GI_Read/123"
        );
    }

    #[test]
    fn test_numeric_query_param() {
        let url = Url::parse("https://x.com/view?view_type=search&rec_idx=49123456").unwrap();
        assert_eq!(numeric_query_param(&url, "rec_idx").as_deref(), Some("49123456"));
        assert_eq!(numeric_query_param(&url, "view_type"), None);
        assert_eq!(numeric_query_param(&url, "missing"), None);
    }

    #[test]
    fn test_numeric_segment_after() {
        let url = Url::parse("https://www.wanted.co.kr/wd/203456?utm=x").unwrap();
        assert_eq!(numeric_segment_after(&url, "wd").as_deref(), Some("203456"));
        let url = Url::parse("https://www.jobkorea.co.kr/Recruit/GI_Read/45678901").unwrap();
        assert_eq!(numeric_segment_after(&url, "gi_read").as_deref(), Some("45678901"));
        let url = Url::parse("https://www.wanted.co.kr/wd/abc").unwrap();
        assert_eq!(numeric_segment_after(&url, "wd"), None);
    }
}
