// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::domain::repositories::pattern_repository::{PatternBackend, StoreError};

/// 内存后端，用于测试和一次性运行
#[derive(Default)]
pub struct MemoryPatternBackend {
    data: DashMap<String, String>,
}

impl MemoryPatternBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PatternBackend for MemoryPatternBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.data.get(key).map(|v| v.value().clone()))
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.data.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.data.remove(key);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.data.iter().map(|e| e.key().clone()).collect())
    }
}
