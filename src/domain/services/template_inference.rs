// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! URL 模板推断
//!
//! 纯函数：链接分类、结构模板生成、模板排名以及列表页查询参数映射

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use url::Url;

use crate::domain::models::site_pattern::ID_PLACEHOLDER;

/// 判断链接是否与职位相关的关键词（URL 或锚文本中出现即可）
pub const JOB_KEYWORDS: &[&str] = &[
    "job",
    "recruit",
    "career",
    "position",
    "vacanc",
    "opening",
    "detail",
    "view",
    "hiring",
    "employ",
    "/wd/",
    "gi_read",
    "채용",
    "공고",
    "구인",
    "일자리",
    "모집",
    "招聘",
    "职位",
    "求人",
];

/// 列表页查询参数别名表：字段名 -> 常见参数名
const FIELD_PARAM_ALIASES: &[(&str, &[&str])] = &[
    (
        "keyword",
        &["q", "query", "keyword", "keywords", "searchword", "stext", "kw", "search", "searchtext"],
    ),
    ("location", &["loc", "location", "loc_mcd", "local", "region", "area", "locations"]),
    ("experience", &["exp", "experience", "exp_cd", "career", "careertype", "years", "ctype"]),
    ("salary", &["salary", "sal", "pay", "sal_cd", "salary_min"]),
    (
        "employmentType",
        &["job_type", "jobtype", "employment", "emp_type", "employmenttype", "jobtypes"],
    ),
    ("industry", &["industry", "ind_cd", "category", "jobcategory", "occupation"]),
    ("page", &["page", "pg", "p", "page_no", "pageno", "recruitpage"]),
];

static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+").unwrap());

/// 模板候选
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateCandidate {
    /// 含唯一 `{id}` 占位符的路径（可带 id 查询参数）
    pub template: String,
    /// 产生该模板的链接数
    pub count: usize,
    /// count / 职位链接总数
    pub confidence: f64,
    /// 产生该模板的原始链接
    pub samples: Vec<String>,
}

/// 文本中是否存在长度不小于 `min_digits` 的数字串
pub fn has_id_run(text: &str, min_digits: usize) -> bool {
    DIGIT_RUN.find_iter(text).any(|m| m.len() >= min_digits)
}

/// 链接是否像职位详情页
///
/// 需要同时满足：
/// - 词汇信号：URL 或锚文本包含 [`JOB_KEYWORDS`] 之一
/// - 结构信号：路径或查询中存在不少于 `min_digits` 位的数字串
pub fn is_job_like(url: &Url, anchor_text: &str, min_digits: usize) -> bool {
    let target = match url.query() {
        Some(q) => format!("{}?{}", url.path(), q),
        None => url.path().to_string(),
    };
    let lower_target = target.to_lowercase();
    let lower_anchor = anchor_text.to_lowercase();

    let lexical = JOB_KEYWORDS
        .iter()
        .any(|k| lower_target.contains(k) || lower_anchor.contains(k));

    lexical && has_id_run(&target, min_digits)
}

/// 为单个职位链接生成结构模板
///
/// 最后一个足够长的数字串被替换为 `{id}`；查询参数中的 id 优先于路径中的 id，
/// 此时模板只保留该参数，其余查询参数丢弃。返回 (模板, id 参数名)
pub fn structural_template(url: &Url, min_digits: usize) -> Option<(String, Option<String>)> {
    let path = url.path();

    let query_id = url
        .query_pairs()
        .filter(|(_, v)| v.len() >= min_digits && v.bytes().all(|b| b.is_ascii_digit()))
        .last()
        .map(|(k, _)| k.into_owned());

    if let Some(name) = query_id {
        let template = format!("{}?{}={}", path, name, ID_PLACEHOLDER);
        return Some((template, Some(name)));
    }

    let run = DIGIT_RUN
        .find_iter(path)
        .filter(|m| m.len() >= min_digits)
        .last()?;
    let template = format!("{}{}{}", &path[..run.start()], ID_PLACEHOLDER, &path[run.end()..]);
    Some((template, None))
}

/// 对职位链接生成的模板计数并排名
///
/// 置信度的分母是全部职位链接，包括无法生成模板的链接。
/// 按出现次数降序，次数相同时按模板字典序，保证结果稳定
pub fn rank_templates(urls: &[Url], min_digits: usize) -> Vec<TemplateCandidate> {
    let mut tally: HashMap<String, Vec<String>> = HashMap::new();
    let total = urls.len();

    for url in urls {
        if let Some((template, _)) = structural_template(url, min_digits) {
            tally.entry(template).or_default().push(url.to_string());
        }
    }

    let mut ranked: Vec<TemplateCandidate> = tally
        .into_iter()
        .map(|(template, samples)| TemplateCandidate {
            count: samples.len(),
            confidence: samples.len() as f64 / total as f64,
            template,
            samples,
        })
        .collect();

    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.template.cmp(&b.template)));
    ranked
}

/// 根据别名表识别查询参数对应的字段
pub fn field_for_param(param: &str) -> Option<&'static str> {
    let lower = param.to_lowercase();
    FIELD_PARAM_ALIASES
        .iter()
        .find(|(_, aliases)| aliases.contains(&lower.as_str()))
        .map(|(field, _)| *field)
}

/// 从列表页 URL 推导列表模板与字段参数映射
///
/// 识别出的查询参数值替换为 `{字段名}`，未识别的参数原样保留
pub fn derive_field_params(url: &Url) -> (String, BTreeMap<String, String>) {
    let mut field_params = BTreeMap::new();
    let mut parts = Vec::new();

    for (name, value) in url.query_pairs() {
        match field_for_param(&name) {
            Some(field) if !field_params.contains_key(field) => {
                field_params.insert(field.to_string(), name.to_string());
                parts.push(format!("{}={{{}}}", name, field));
            }
            _ => parts.push(format!("{}={}", name, value)),
        }
    }

    let template = if parts.is_empty() {
        url.path().to_string()
    } else {
        format!("{}?{}", url.path(), parts.join("&"))
    };
    (template, field_params)
}
