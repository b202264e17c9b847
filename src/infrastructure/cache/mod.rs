// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 缓存模块
///
/// 站点模式缓存及其存储后端：
/// - 文件目录（file_backend）
/// - 内存（memory_backend）
/// - Redis（redis_client）
pub mod file_backend;
pub mod memory_backend;
pub mod pattern_store;
pub mod redis_client;
