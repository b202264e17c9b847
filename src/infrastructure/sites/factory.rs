// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;

use crate::domain::sites::adapter::SiteAdapter;
use crate::infrastructure::sites::incruit::Incruit;
use crate::infrastructure::sites::jobkorea::JobKorea;
use crate::infrastructure::sites::jumpit::Jumpit;
use crate::infrastructure::sites::saramin::Saramin;
use crate::infrastructure::sites::wanted::Wanted;

/// 内置站点标识
pub const SITE_IDS: &[&str] = &["saramin", "jobkorea", "incruit", "wanted", "jumpit"];

/// 站点适配器工厂
pub struct SiteAdapterFactory;

impl SiteAdapterFactory {
    /// 按站点标识创建适配器，未知标识返回 None
    pub fn create(site_id: &str) -> Option<Arc<dyn SiteAdapter>> {
        match site_id.trim().to_lowercase().as_str() {
            "saramin" => Some(Arc::new(Saramin)),
            "jobkorea" => Some(Arc::new(JobKorea)),
            "incruit" => Some(Arc::new(Incruit)),
            "wanted" => Some(Arc::new(Wanted)),
            "jumpit" => Some(Arc::new(Jumpit)),
            _ => None,
        }
    }

    /// 创建全部内置适配器
    pub fn all() -> Vec<Arc<dyn SiteAdapter>> {
        SITE_IDS.iter().filter_map(|id| Self::create(id)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::site_pattern::same_domain;

    #[test]
    fn test_create_known_sites() {
        for id in SITE_IDS {
            let adapter = SiteAdapterFactory::create(id).unwrap();
            assert_eq!(adapter.id(), *id);
        }
        assert_eq!(SiteAdapterFactory::create(" Wanted ").unwrap().id(), "wanted");
        assert!(SiteAdapterFactory::create("linkedin").is_none());
    }

    #[test]
    fn test_seed_urls_are_on_their_base_host() {
        for adapter in SiteAdapterFactory::all() {
            let seed = url::Url::parse(&adapter.seed_url()).unwrap();
            let base = url::Url::parse(adapter.base_url()).unwrap();
            assert_eq!(seed.host_str(), base.host_str(), "{}", adapter.id());
        }
    }

    #[test]
    fn test_only_incruit_splits_list_and_detail_domains() {
        for adapter in SiteAdapterFactory::all() {
            let base = url::Url::parse(adapter.base_url()).unwrap();
            let same = same_domain(base.host_str().unwrap(), adapter.domain());
            assert_eq!(same, adapter.id() != "incruit", "{}", adapter.id());
        }
    }
}
