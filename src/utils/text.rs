// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use deunicode::deunicode;

/// 合并连续空白并去掉首尾空白
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 清理后非空则返回 Some
pub fn non_empty(text: Option<&str>) -> Option<String> {
    text.map(clean_text).filter(|s| !s.is_empty())
}

/// 生成 ASCII slug，用作公司标识
///
/// 非拉丁文字先音译（例如 "카카오" -> "kakao"），
/// 括号中的法人形态标记（(주)、㈜ 等）会被去掉
pub fn slugify(text: &str) -> String {
    let stripped = text
        .replace("(주)", " ")
        .replace("㈜", " ")
        .replace("(유)", " ")
        .replace("주식회사", " ");

    let mut slug = String::with_capacity(stripped.len());
    let mut pending_dash = false;
    for c in deunicode(&stripped).chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}
