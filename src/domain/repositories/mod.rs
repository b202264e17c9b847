// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库接口模块
///
/// 定义站点模式缓存的存储抽象，具体实现位于基础设施层
pub mod pattern_repository;
