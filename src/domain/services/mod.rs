// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 包含的服务：
/// - 规范化（normalizer）：截止日期、经验、薪资、工作方式等文本解析
/// - 模板推断（template_inference）：职位链接分类与 URL 模板排名
/// - 选择器探测（selector_probe）：按候选顺序探测列表页字段选择器
/// - 模式推断（pattern_inference）：可选的外部推断服务接口
/// - 模式学习（pattern_learner）：组合上述服务生成站点模式
/// - 校验（validator）：结构校验、批量报告与去重
pub mod normalizer;
pub mod pattern_inference;
pub mod pattern_learner;
pub mod selector_probe;
pub mod template_inference;
pub mod validator;
