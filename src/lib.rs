// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含职位与站点模式模型、规范化与校验服务、模式学习和站点适配器接口
pub mod domain;

/// 引擎模块
///
/// 实现页面抓取引擎（HTTP 与无头浏览器）
pub mod engines;

/// 基础设施模块
///
/// 提供模式缓存后端、LLM 推断、站点爬虫、链接存活检查与指标
pub mod infrastructure;

/// 工具模块
///
/// 提供通用的工具函数和辅助功能
pub mod utils;
