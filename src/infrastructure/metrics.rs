// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::describe_counter;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::{info, warn};

/// 初始化指标系统
///
/// 给定地址时安装 Prometheus 导出器；未安装导出器时各计数器宏为空操作
pub fn init_metrics(listen_addr: Option<&str>) {
    if let Some(addr) = listen_addr {
        match addr.parse::<SocketAddr>() {
            Ok(addr) => match PrometheusBuilder::new().with_http_listener(addr).install() {
                Ok(()) => info!("Metrics exporter listening on {}", addr),
                Err(e) => warn!("Failed to install Prometheus recorder: {}", e),
            },
            Err(e) => warn!("Invalid metrics address '{}': {}", addr, e),
        }
    }

    describe_metrics();
}

/// 注册计数器说明
pub fn describe_metrics() {
    describe_counter!("jobs_crawled_total", "Jobs normalized per site");
    describe_counter!("crawl_failures_total", "Site crawls that failed or timed out");
    describe_counter!(
        "records_skipped_total",
        "Listing entries dropped during normalization, by reason"
    );
    describe_counter!("pattern_cache_hits_total", "Pattern loads served from the store");
    describe_counter!(
        "pattern_cache_misses_total",
        "Pattern loads that found no usable entry"
    );
    describe_counter!("patterns_learned_total", "Site patterns learned");
    describe_counter!("links_checked_total", "Detail links checked for liveness, by result");
}
