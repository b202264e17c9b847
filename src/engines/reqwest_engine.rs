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

use crate::engines::traits::{FetchError, FetchedPage, NavigateOptions, PageFetcher};
use async_trait::async_trait;
use reqwest::header::{HeaderValue, ACCEPT_LANGUAGE, USER_AGENT};
use scraper::{Html, Selector};
use std::time::Instant;
use tracing::debug;

/// HTTP 抓取引擎
///
/// 基于reqwest实现，不执行 JavaScript；选择器等待通过解析返回的 HTML 判断
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// 创建新的 HTTP 抓取引擎
    ///
    /// # 返回值
    ///
    /// * `Ok(HttpFetcher)` - 抓取引擎实例
    /// * `Err(FetchError)` - 构建客户端失败
    pub fn new() -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self { client })
    }

    /// 使用已有客户端创建抓取引擎
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    /// 执行HTTP抓取
    ///
    /// # 参数
    ///
    /// * `url` - 目标URL
    /// * `options` - 导航选项（超时、User-Agent、等待的选择器）
    ///
    /// # 返回值
    ///
    /// * `Ok(FetchedPage)` - 抓取到的页面
    /// * `Err(FetchError)` - 网络错误、超时或非 2xx 状态码
    async fn navigate(&self, url: &str, options: &NavigateOptions) -> Result<FetchedPage, FetchError> {
        let parsed = url::Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", url, e)))?;

        let user_agent = HeaderValue::from_str(&options.user_agent)
            .unwrap_or_else(|_| HeaderValue::from_static(crate::engines::traits::DEFAULT_USER_AGENT));

        let start = Instant::now();
        let response = self
            .client
            .get(parsed)
            .header(USER_AGENT, user_agent)
            .header(ACCEPT_LANGUAGE, "ko-KR,ko;q=0.9,en-US;q=0.8")
            .timeout(options.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout(options.timeout)
                } else {
                    FetchError::RequestFailed(e)
                }
            })?;

        let status = response.status();
        let final_url = response.url().to_string();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: final_url,
                status: status.as_u16(),
            });
        }

        let html = response.text().await?;
        let selector_found = match &options.wait_for {
            Some(selector) => contains_selector(&html, selector),
            None => true,
        };

        debug!(
            "Fetched {} ({} bytes, {}ms, selector_found={})",
            final_url,
            html.len(),
            start.elapsed().as_millis(),
            selector_found
        );

        Ok(FetchedPage {
            url: final_url,
            status: status.as_u16(),
            html,
            selector_found,
        })
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// HTML 中是否存在匹配选择器的元素；选择器无法解析时视为不存在
pub(crate) fn contains_selector(html: &str, selector: &str) -> bool {
    match Selector::parse(selector) {
        Ok(sel) => Html::parse_document(html).select(&sel).next().is_some(),
        Err(_) => false,
    }
}

#[cfg(test)]
#[path = "reqwest_engine_test.rs"]
mod tests;
