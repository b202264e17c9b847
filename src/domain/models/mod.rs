// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了系统的核心数据结构，包括：
/// - 职位（job）：规范化后的职位记录
/// - 原始记录（raw_listing）：列表页抓取到的未规范化文本
/// - 爬取请求（scrape_request）：单次爬取的过滤条件
/// - 站点模式（site_pattern）：学习得到的 URL 模板与选择器
/// - 校验（validation）：校验结果、报告与去重结果
pub mod job;
pub mod raw_listing;
pub mod scrape_request;
pub mod site_pattern;
pub mod validation;
