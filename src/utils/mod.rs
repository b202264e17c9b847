// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工具模块
///
/// 提供日志初始化、文本清理与 URL 处理等辅助功能
pub mod telemetry;
pub mod text;
pub mod url_utils;
