// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

pub const DEFAULT_LIMIT: usize = 50;

/// 数值区间过滤条件（两端均可省略）
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RangeFilter {
    pub min: Option<i64>,
    pub max: Option<i64>,
}

impl RangeFilter {
    pub fn new(min: Option<i64>, max: Option<i64>) -> Self {
        Self { min, max }
    }

    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

/// 单次爬取请求
///
/// 每次调用创建，调用结束即丢弃；各站点爬虫只读共享
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeRequest {
    pub keyword: Option<String>,
    pub location: Option<String>,
    /// 薪资区间（万韩元）
    pub salary: Option<RangeFilter>,
    /// 经验区间（年）
    pub experience: Option<RangeFilter>,
    pub employment_type: Option<String>,
    pub industry: Option<String>,
    pub limit: usize,
}

impl Default for ScrapeRequest {
    fn default() -> Self {
        Self {
            keyword: None,
            location: None,
            salary: None,
            experience: None,
            employment_type: None,
            industry: None,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl ScrapeRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn salary(mut self, min: Option<i64>, max: Option<i64>) -> Self {
        let range = RangeFilter::new(min, max);
        self.salary = (!range.is_empty()).then_some(range);
        self
    }

    pub fn experience(mut self, min: Option<i64>, max: Option<i64>) -> Self {
        let range = RangeFilter::new(min, max);
        self.experience = (!range.is_empty()).then_some(range);
        self
    }

    pub fn employment_type(mut self, employment_type: impl Into<String>) -> Self {
        self.employment_type = Some(employment_type.into());
        self
    }

    pub fn industry(mut self, industry: impl Into<String>) -> Self {
        self.industry = Some(industry.into());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// 是否只要求新人（经验 0~0）
    pub fn wants_entry_level(&self) -> bool {
        matches!(
            self.experience,
            Some(RangeFilter {
                min: Some(0) | None,
                max: Some(0)
            })
        )
    }
}
