// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含爬取核心的业务逻辑，包括：
/// - 领域模型（models）：职位、站点模式、校验结果等数据结构
/// - 仓库接口（repositories）：模式缓存的存储抽象
/// - 服务（services）：规范化、模板推断、模式学习与校验
/// - 站点（sites）：站点适配器接口与列表页解析
///
/// 领域层不依赖具体的抓取引擎或存储实现。
pub mod models;
pub mod repositories;
pub mod services;
pub mod sites;
