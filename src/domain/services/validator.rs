// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info};
use url::Url;

use crate::domain::models::job::{Job, WorkType};
use crate::domain::models::validation::{
    DedupeOutcome, Severity, ValidationError, ValidationReport, ValidationResult, ValidationWarning,
};

/// 校验阈值
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// 年薪上限超过该值（万韩元）时给出警告，默认 5억
    pub max_plausible_salary: i64,
    /// 经验上限超过该值（年）时给出警告
    pub max_plausible_experience: i64,
    /// 描述短于该长度（字符）时给出警告
    pub min_description_chars: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_plausible_salary: 50_000,
            max_plausible_experience: 50,
            min_description_chars: 20,
        }
    }
}

/// 职位校验器
///
/// 只读取职位数据，不修改；所有发现都以结构化结果返回，不会抛出错误
#[derive(Debug, Clone, Default)]
pub struct JobValidator {
    config: ValidatorConfig,
}

struct Findings {
    errors: Vec<ValidationError>,
    warnings: Vec<ValidationWarning>,
}

impl Findings {
    fn error(&mut self, field: &str, message: impl Into<String>, severity: Severity) {
        self.errors.push(ValidationError {
            field: field.to_string(),
            message: message.into(),
            severity,
        });
    }

    fn warn(&mut self, field: &str, message: impl Into<String>) {
        self.warnings.push(ValidationWarning {
            field: field.to_string(),
            message: message.into(),
        });
    }
}

impl JobValidator {
    pub fn new(config: ValidatorConfig) -> Self {
        Self { config }
    }

    /// 校验单条职位
    pub fn validate_one(&self, job: &Job) -> ValidationResult {
        self.validate_at(job, Utc::now())
    }

    /// 以指定时间为基准校验单条职位（截止日期是否已过依赖 `now`）
    pub fn validate_at(&self, job: &Job, now: DateTime<Utc>) -> ValidationResult {
        let mut f = Findings {
            errors: Vec::new(),
            warnings: Vec::new(),
        };

        for (field, value) in [
            ("id", &job.id),
            ("title", &job.title),
            ("company", &job.company),
            ("source", &job.source),
        ] {
            if value.trim().is_empty() {
                f.error(field, format!("{} is missing", field), Severity::Critical);
            }
        }

        if job.source_url.trim().is_empty() {
            f.error("sourceUrl", "sourceUrl is missing", Severity::Critical);
        } else {
            match Url::parse(&job.source_url) {
                Ok(url) if matches!(url.scheme(), "http" | "https") => {}
                Ok(url) => f.error(
                    "sourceUrl",
                    format!("unsupported scheme: {}", url.scheme()),
                    Severity::Critical,
                ),
                Err(e) => f.error("sourceUrl", format!("invalid URL: {}", e), Severity::Critical),
            }
        }

        if job.work_type == WorkType::Unknown {
            f.error(
                "workType",
                "workType must be one of onsite, remote, dispatch",
                Severity::Critical,
            );
        }

        let salary = job.salary;
        if salary.min < 0 || salary.max < 0 {
            f.error("salary", "salary must not be negative", Severity::Medium);
        }
        if salary.min > salary.max {
            f.error(
                "salary",
                format!("salary.min ({}) is greater than salary.max ({})", salary.min, salary.max),
                Severity::Medium,
            );
        }
        if salary.max > self.config.max_plausible_salary {
            f.warn(
                "salary",
                format!("salary.max {} exceeds {}", salary.max, self.config.max_plausible_salary),
            );
        }

        if let Some(exp) = job.experience {
            if exp.min < 0 || exp.max < 0 {
                f.error("experience", "experience must not be negative", Severity::Medium);
            }
            if exp.min > exp.max {
                f.error(
                    "experience",
                    format!("experience.min ({}) is greater than experience.max ({})", exp.min, exp.max),
                    Severity::Medium,
                );
            }
            if exp.max > self.config.max_plausible_experience {
                f.warn(
                    "experience",
                    format!(
                        "experience.max {} exceeds {} years",
                        exp.max, self.config.max_plausible_experience
                    ),
                );
            }
        }

        if job.location.trim().is_empty() {
            f.warn("location", "location is missing");
        }

        let description_chars = job.description.trim().chars().count();
        if description_chars == 0 {
            f.warn("description", "description is missing");
        } else if description_chars < self.config.min_description_chars {
            f.warn("description", "description is too short");
        }

        match job.deadline {
            None => f.warn("deadline", "deadline is missing"),
            Some(deadline) if deadline < now => f.warn("deadline", "deadline has passed"),
            Some(_) => {}
        }

        let valid = f.errors.is_empty();
        if !valid {
            debug!("Job {} failed validation with {} errors", job.id, f.errors.len());
        }

        ValidationResult {
            job_id: job.id.clone(),
            valid,
            errors: f.errors,
            warnings: f.warnings,
        }
    }

    /// 批量校验，生成汇总报告
    pub fn validate_batch(&self, jobs: &[Job]) -> ValidationReport {
        let now = Utc::now();
        let results: Vec<ValidationResult> = jobs.iter().map(|job| self.validate_at(job, now)).collect();
        build_report(results)
    }
}

/// 由单条结果汇总报告
pub fn build_report(results: Vec<ValidationResult>) -> ValidationReport {
    let total = results.len();
    let valid = results.iter().filter(|r| r.valid).count();
    let with_warnings = results.iter().filter(|r| !r.warnings.is_empty()).count();

    let mut error_histogram: BTreeMap<String, usize> = BTreeMap::new();
    let mut warning_histogram: BTreeMap<String, usize> = BTreeMap::new();
    for result in &results {
        for e in &result.errors {
            *error_histogram.entry(e.field.clone()).or_default() += 1;
        }
        for w in &result.warnings {
            *warning_histogram.entry(w.field.clone()).or_default() += 1;
        }
    }

    let success_rate = if total == 0 {
        0.0
    } else {
        valid as f64 / total as f64 * 100.0
    };

    info!(
        "Validated {} jobs: {} valid, {} invalid, {} with warnings ({:.1}%)",
        total,
        valid,
        total - valid,
        with_warnings,
        success_rate
    );

    ValidationReport {
        total,
        valid,
        invalid: total - valid,
        with_warnings,
        success_rate,
        error_histogram,
        warning_histogram,
        results,
    }
}

/// 按规范键（sourceUrl，其次 id）去重
///
/// 保留首次出现的职位，保持原有顺序
pub fn dedupe(jobs: Vec<Job>) -> DedupeOutcome {
    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(jobs.len());
    let mut duplicate_count = 0;

    for job in jobs {
        if seen.insert(job.canonical_key().to_string()) {
            unique.push(job);
        } else {
            duplicate_count += 1;
        }
    }

    if duplicate_count > 0 {
        debug!("Removed {} duplicate jobs", duplicate_count);
    }

    DedupeOutcome {
        unique,
        duplicate_count,
    }
}

#[cfg(test)]
#[path = "validator_test.rs"]
mod tests;
