// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 工作方式
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum WorkType {
    /// 现场办公
    #[default]
    Onsite,
    /// 远程办公
    Remote,
    /// 派遣
    Dispatch,
    /// 无法识别的值（仅在反序列化外部数据时出现）
    #[serde(other)]
    Unknown,
}

impl WorkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkType::Onsite => "onsite",
            WorkType::Remote => "remote",
            WorkType::Dispatch => "dispatch",
            WorkType::Unknown => "unknown",
        }
    }
}

/// 薪资范围，单位为万韩元（만원）
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Salary {
    pub min: i64,
    pub max: i64,
}

impl Salary {
    pub fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    /// 规范化：负值截断为0，min/max 顺序纠正
    pub fn normalized(self) -> Self {
        let min = self.min.max(0);
        let max = self.max.max(0);
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }
}

impl fmt::Display for Salary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}~{}만원", self.min, self.max)
    }
}

/// 薪资来源
///
/// 列表页未标注薪资时会使用站点默认区间，此字段用于区分两者
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SalarySource {
    #[default]
    Listed,
    SiteDefault,
}

/// 经验年限范围
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Experience {
    pub min: i64,
    pub max: i64,
}

impl Experience {
    pub fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    pub fn entry_level() -> Self {
        Self { min: 0, max: 0 }
    }

    pub fn normalized(self) -> Self {
        let min = self.min.max(0);
        let max = self.max.max(0);
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }
}

impl fmt::Display for Experience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.min == 0 && self.max == 0 {
            write!(f, "신입")
        } else {
            write!(f, "{}~{}년", self.min, self.max)
        }
    }
}

/// 规范化后的职位记录
///
/// 由各站点爬虫产出，经校验器处理后交给外部存储
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    pub title: String,
    pub company: String,
    pub company_id: String,
    #[serde(default)]
    pub location: String,
    pub salary: Salary,
    #[serde(default)]
    pub salary_source: SalarySource,
    #[serde(default)]
    pub experience: Option<Experience>,
    #[serde(default)]
    pub education: Option<String>,
    #[serde(default)]
    pub employment_type: Option<String>,
    #[serde(default)]
    pub work_type: WorkType,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
    pub posted_at: DateTime<Utc>,
    pub source_url: String,
    pub source: String,
}

impl Job {
    /// 去重使用的规范键：优先 sourceUrl，其次 id
    pub fn canonical_key(&self) -> &str {
        if self.source_url.trim().is_empty() {
            &self.id
        } else {
            &self.source_url
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_work_type_unknown_from_json() {
        let wt: WorkType = serde_json::from_str("\"hybrid\"").unwrap();
        assert_eq!(wt, WorkType::Unknown);
        let wt: WorkType = serde_json::from_str("\"remote\"").unwrap();
        assert_eq!(wt, WorkType::Remote);
    }

    #[test]
    fn test_salary_normalized_swaps_and_clamps() {
        assert_eq!(Salary::new(5000, 3000).normalized(), Salary::new(3000, 5000));
        assert_eq!(Salary::new(-10, 300).normalized(), Salary::new(0, 300));
    }

    #[test]
    fn test_experience_display() {
        assert_eq!(Experience::entry_level().to_string(), "신입");
        assert_eq!(Experience::new(3, 5).to_string(), "3~5년");
    }
}
