// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use redis::AsyncCommands;
use std::collections::BTreeSet;

use crate::domain::repositories::pattern_repository::{PatternBackend, StoreError};

pub const DEFAULT_KEY_PREFIX: &str = "jobcrawl:pattern:";

/// 每次 SCAN 的建议批量
const SCAN_BATCH: usize = 100;

impl From<redis::RedisError> for StoreError {
    fn from(e: redis::RedisError) -> Self {
        StoreError::Backend(e.to_string())
    }
}

/// Redis后端
///
/// 键为 `<前缀><域名>`，不设置服务端过期时间，过期由 PatternStore 判断
#[derive(Clone)]
pub struct RedisPatternBackend {
    /// Redis客户端
    client: redis::Client,
    key_prefix: String,
}

impl RedisPatternBackend {
    /// 创建新的Redis后端实例
    ///
    /// # 参数
    ///
    /// * `redis_url` - Redis连接URL
    /// * `key_prefix` - 键前缀
    ///
    /// # 返回值
    ///
    /// * `Ok(RedisPatternBackend)` - 后端实例
    /// * `Err(StoreError)` - URL 不合法
    pub fn new(redis_url: &str, key_prefix: impl Into<String>) -> Result<Self, StoreError> {
        let client = redis::Client::open(redis_url)?;
        Ok(Self {
            client,
            key_prefix: key_prefix.into(),
        })
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }

    /// 去掉前缀得到域名；SCAN 可能重复返回同一个键，这里去重并排序
    fn domains_from_keys(&self, keys: impl IntoIterator<Item = String>) -> Vec<String> {
        keys.into_iter()
            .filter_map(|k| k.strip_prefix(&self.key_prefix).map(str::to_string))
            .filter(|d| !d.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

#[async_trait]
impl PatternBackend for RedisPatternBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut con = self.client.get_multiplexed_async_connection().await?;
        let value: Option<String> = con.get(self.full_key(key)).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        let mut con = self.client.get_multiplexed_async_connection().await?;
        con.set::<_, _, ()>(self.full_key(key), value).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut con = self.client.get_multiplexed_async_connection().await?;
        con.del::<_, ()>(self.full_key(key)).await?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<String>, StoreError> {
        let mut con = self.client.get_multiplexed_async_connection().await?;
        let pattern = format!("{}*", self.key_prefix);
        let mut keys = Vec::new();
        let mut cursor: u64 = 0;
        // 用 SCAN 游标分批遍历，避免 KEYS 阻塞服务端
        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut con)
                .await?;
            keys.extend(batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }
        Ok(self.domains_from_keys(keys))
    }
}
