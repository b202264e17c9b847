// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 站点适配层
///
/// - 适配器接口（adapter）：各站点的查询编码、选择器、id 规则与规范化
/// - 列表解析（listing）：按选择器从列表页提取原始记录
pub mod adapter;
pub mod listing;
