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

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// 默认的浏览器 User-Agent
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// 页面抓取错误类型
#[derive(Error, Debug)]
pub enum FetchError {
    /// 请求失败
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    /// 非成功状态码
    #[error("Unexpected status {status} for {url}")]
    Status { url: String, status: u16 },
    /// 超时
    #[error("Timed out after {0:?}")]
    Timeout(Duration),
    /// 浏览器错误
    #[error("Browser error: {0}")]
    Browser(String),
    /// URL 不合法
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// 判断错误是否由超时引起
    pub fn is_timeout(&self) -> bool {
        match self {
            FetchError::Timeout(_) => true,
            FetchError::RequestFailed(e) => e.is_timeout(),
            _ => false,
        }
    }
}

/// 页面导航选项
#[derive(Debug, Clone)]
pub struct NavigateOptions {
    /// 导航超时
    pub timeout: Duration,
    /// 是否无头模式（仅浏览器引擎使用）
    pub headless: bool,
    /// User-Agent
    pub user_agent: String,
    /// 需要等待出现的选择器
    pub wait_for: Option<String>,
    /// 等待选择器的超时，超时后照常返回页面
    pub wait_timeout: Duration,
}

impl Default for NavigateOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            headless: true,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            wait_for: None,
            wait_timeout: Duration::from_secs(5),
        }
    }
}

impl NavigateOptions {
    pub fn wait_for(mut self, selector: impl Into<String>) -> Self {
        self.wait_for = Some(selector.into());
        self
    }
}

/// 抓取到的页面
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// 最终 URL（跟随重定向后）
    pub url: String,
    /// HTTP状态码
    pub status: u16,
    /// 页面 HTML
    pub html: String,
    /// `wait_for` 选择器是否出现；未指定选择器时为 true
    pub selector_found: bool,
}

/// 页面抓取特质
///
/// 爬虫与模式学习器通过该接口获取页面，具体实现可以是 HTTP 客户端或无头浏览器
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// 导航到 URL 并返回页面内容
    async fn navigate(&self, url: &str, options: &NavigateOptions) -> Result<FetchedPage, FetchError>;

    /// 引擎名称
    fn name(&self) -> &'static str;
}
