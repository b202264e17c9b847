// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::engines::traits::{FetchError, FetchedPage, NavigateOptions, PageFetcher};
use async_trait::async_trait;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use std::time::{Duration, Instant};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

const SELECTOR_POLL_INTERVAL: Duration = Duration::from_millis(250);

// 无头与有头模式各自共享一个浏览器实例，避免每次请求重新启动 Chrome
static HEADLESS_BROWSER: OnceCell<Browser> = OnceCell::const_new();
static HEADED_BROWSER: OnceCell<Browser> = OnceCell::const_new();

/// 获取（必要时启动）共享浏览器实例
///
/// 设置了 `CHROMIUM_REMOTE_DEBUGGING_URL` 时连接远程浏览器，此时 `headless` 不生效
pub async fn get_browser(headless: bool) -> Result<&'static Browser, FetchError> {
    let cell = if headless {
        &HEADLESS_BROWSER
    } else {
        &HEADED_BROWSER
    };

    cell.get_or_try_init(|| async move {
        let (browser, mut handler) = match std::env::var("CHROMIUM_REMOTE_DEBUGGING_URL") {
            Ok(url) => {
                info!("Connecting to remote Chrome instance at: {}", url);
                Browser::connect(url.as_str())
                    .await
                    .map_err(|e| FetchError::Browser(format!("Failed to connect to remote Chrome: {}", e)))?
            }
            Err(_) => {
                let mut builder = BrowserConfig::builder()
                    .no_sandbox()
                    .arg("--disable-gpu")
                    .arg("--disable-dev-shm-usage");
                if !headless {
                    builder = builder.with_head();
                }
                let config = builder.build().map_err(FetchError::Browser)?;
                Browser::launch(config)
                    .await
                    .map_err(|e| FetchError::Browser(e.to_string()))?
            }
        };

        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        Ok(browser)
    })
    .await
}

/// 浏览器抓取引擎
///
/// 基于chromiumoxide实现，用于需要执行 JavaScript 才能渲染列表的站点
pub struct BrowserFetcher;

impl BrowserFetcher {
    async fn render(page: &Page, url: &str, options: &NavigateOptions) -> Result<FetchedPage, FetchError> {
        page.set_user_agent(options.user_agent.as_str())
            .await
            .map_err(|e| FetchError::Browser(e.to_string()))?;

        page.goto(url)
            .await
            .map_err(|e| FetchError::Browser(format!("Navigation to {} failed: {}", url, e)))?;

        let selector_found = match &options.wait_for {
            Some(selector) => wait_for_selector(page, selector, options.wait_timeout).await,
            None => true,
        };

        let html = page
            .content()
            .await
            .map_err(|e| FetchError::Browser(e.to_string()))?;
        let final_url = page
            .url()
            .await
            .ok()
            .flatten()
            .unwrap_or_else(|| url.to_string());

        Ok(FetchedPage {
            url: final_url,
            status: 200,
            html,
            selector_found,
        })
    }
}

#[async_trait]
impl PageFetcher for BrowserFetcher {
    /// 执行浏览器抓取
    ///
    /// 整个导航受 `options.timeout` 约束；选择器等待超时不是错误，
    /// 只会让 `selector_found` 为 false
    async fn navigate(&self, url: &str, options: &NavigateOptions) -> Result<FetchedPage, FetchError> {
        url::Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", url, e)))?;

        let start = Instant::now();
        let browser = get_browser(options.headless).await?;
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| FetchError::Browser(e.to_string()))?;

        let result = tokio::time::timeout(options.timeout, Self::render(&page, url, options))
            .await
            .map_err(|_| FetchError::Timeout(options.timeout))
            .and_then(|r| r);

        if let Err(e) = page.close().await {
            warn!("Failed to close page for {}: {}", url, e);
        }

        if let Ok(fetched) = &result {
            debug!(
                "Rendered {} ({} bytes, {}ms, selector_found={})",
                fetched.url,
                fetched.html.len(),
                start.elapsed().as_millis(),
                fetched.selector_found
            );
        }
        result
    }

    fn name(&self) -> &'static str {
        "browser"
    }
}

/// 轮询等待选择器出现，超时返回 false
async fn wait_for_selector(page: &Page, selector: &str, wait_timeout: Duration) -> bool {
    let deadline = Instant::now() + wait_timeout;
    loop {
        if page.find_element(selector).await.is_ok() {
            return true;
        }
        if Instant::now() >= deadline {
            debug!("Selector '{}' not found within {:?}", selector, wait_timeout);
            return false;
        }
        tokio::time::sleep(SELECTOR_POLL_INTERVAL).await;
    }
}
