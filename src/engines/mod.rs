// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 页面抓取引擎
///
/// - HTTP 引擎（reqwest_engine）：普通 GET 请求
/// - 浏览器引擎（playwright_engine）：基于 chromiumoxide 的无头浏览器
pub mod playwright_engine;
pub mod reqwest_engine;
pub mod traits;
