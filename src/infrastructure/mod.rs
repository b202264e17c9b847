// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施层模块
///
/// 包含的子模块：
/// - 缓存（cache）：站点模式缓存及其文件、内存、Redis 后端
/// - 推断（inference）：基于 LLM 的详情页模板推断
/// - 存活检查（liveness）：职位详情链接的分批存活检查
/// - 指标（metrics）：计数器说明与 Prometheus 导出器
/// - 站点（sites）：站点适配器、单站点爬虫与多站点编排器
pub mod cache;
pub mod inference;
pub mod liveness;
pub mod metrics;
pub mod sites;
