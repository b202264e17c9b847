// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::engines::traits::DEFAULT_USER_AGENT;

/// 应用程序配置设置
///
/// 加载顺序：内置默认值、`config/default`、`config/{APP_ENVIRONMENT}`、
/// `JOBCRAWL__` 前缀的环境变量
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 页面抓取配置
    pub fetcher: FetcherSettings,
    /// 模式缓存配置
    pub pattern_store: PatternStoreSettings,
    /// 模式学习配置
    pub learner: LearnerSettings,
    /// LLM 配置
    pub llm: LlmSettings,
    /// 爬取配置
    pub crawl: CrawlSettings,
    /// 链接存活检查配置
    pub liveness: LivenessSettings,
    /// 日志与指标配置
    pub telemetry: TelemetrySettings,
}

/// 抓取引擎
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FetcherEngine {
    /// 直接 HTTP 请求
    Http,
    /// 无头浏览器
    Browser,
}

/// 页面抓取配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct FetcherSettings {
    pub engine: FetcherEngine,
    /// 导航超时（毫秒）
    pub timeout_ms: u64,
    pub headless: bool,
    pub user_agent: String,
    /// 等待列表选择器的超时（毫秒）
    pub wait_timeout_ms: u64,
}

impl FetcherSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.wait_timeout_ms)
    }
}

/// 模式缓存后端
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PatternBackendKind {
    File,
    Memory,
    Redis,
}

/// 模式缓存配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct PatternStoreSettings {
    pub backend: PatternBackendKind,
    /// 文件后端目录
    pub path: String,
    /// Redis连接URL
    pub redis_url: String,
    /// Redis 键前缀
    pub key_prefix: String,
    /// 硬过期天数
    pub ttl_days: i64,
    /// 软新鲜度天数
    pub fresh_days: i64,
}

/// 模式学习配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct LearnerSettings {
    /// 视为记录 id 的最短数字串长度
    pub min_id_digits: usize,
    /// 发送给推断服务的最大样本数
    pub max_ai_samples: usize,
}

/// LLM 配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct LlmSettings {
    pub enabled: bool,
    pub api_key: Option<String>,
    pub model: String,
    pub api_base_url: String,
    pub timeout_ms: u64,
}

/// 爬取配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlSettings {
    pub default_limit: usize,
    /// 默认爬取的站点标识
    pub sites: Vec<String>,
    /// 单站点整体超时（毫秒）
    pub site_timeout_ms: u64,
}

/// 链接存活检查配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct LivenessSettings {
    pub concurrency: usize,
    pub timeout_ms: u64,
    pub politeness_delay_ms: u64,
    pub sample_size: Option<usize>,
}

/// 日志与指标配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetrySettings {
    /// 输出 JSON 格式日志
    pub json: bool,
    /// Prometheus 导出器监听地址，为空时不安装
    pub metrics_addr: Option<String>,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 从 `config/` 目录与环境变量加载配置，所有字段都有默认值
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        Self::load(Path::new("config"))
    }

    /// 从指定配置目录加载
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let file = |name: &str| File::with_name(&config_dir.join(name).to_string_lossy()).required(false);

        Self::defaults()?
            .add_source(file("default"))
            .add_source(file(&env))
            .add_source(
                Environment::with_prefix("JOBCRAWL")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("crawl.sites"),
            )
            .build()?
            .try_deserialize()
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            // Fetcher
            .set_default("fetcher.engine", "http")?
            .set_default("fetcher.timeout_ms", 30_000)?
            .set_default("fetcher.headless", true)?
            .set_default("fetcher.user_agent", DEFAULT_USER_AGENT)?
            .set_default("fetcher.wait_timeout_ms", 5_000)?
            // Pattern store
            .set_default("pattern_store.backend", "file")?
            .set_default("pattern_store.path", "./patterns")?
            .set_default("pattern_store.redis_url", "redis://127.0.0.1:6379")?
            .set_default("pattern_store.key_prefix", "jobcrawl:pattern:")?
            .set_default("pattern_store.ttl_days", 30)?
            .set_default("pattern_store.fresh_days", 7)?
            // Learner
            .set_default("learner.min_id_digits", 4)?
            .set_default("learner.max_ai_samples", 10)?
            // LLM
            .set_default("llm.enabled", false)?
            .set_default("llm.model", "gpt-4o-mini")?
            .set_default("llm.api_base_url", "https://api.openai.com/v1")?
            .set_default("llm.timeout_ms", 30_000)?
            // Crawl
            .set_default("crawl.default_limit", 50)?
            .set_default(
                "crawl.sites",
                vec!["saramin", "jobkorea", "incruit", "wanted", "jumpit"],
            )?
            .set_default("crawl.site_timeout_ms", 120_000)?
            // Liveness
            .set_default("liveness.concurrency", 5)?
            .set_default("liveness.timeout_ms", 10_000)?
            .set_default("liveness.politeness_delay_ms", 1_000)?
            // Telemetry
            .set_default("telemetry.json", false)
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
