// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 站点适配器、单站点爬虫与多站点编排器

pub mod aggregator;
pub mod factory;
pub mod incruit;
pub mod jobkorea;
pub mod jumpit;
pub mod saramin;
pub mod site_crawler;
pub mod wanted;
