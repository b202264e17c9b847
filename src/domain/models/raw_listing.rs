// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 列表页原始记录
///
/// 规范化之前从页面抓取的站点特定文本，字段均可能缺失，
/// 仅在单次页面解析过程中存在
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawListing {
    pub title: Option<String>,
    pub company: Option<String>,
    pub href: Option<String>,
    pub location: Option<String>,
    pub experience: Option<String>,
    pub education: Option<String>,
    pub employment_type: Option<String>,
    pub salary: Option<String>,
    pub deadline: Option<String>,
    pub posted: Option<String>,
    pub description: Option<String>,
    pub industry: Option<String>,
    pub skills: Vec<String>,
}
