// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::*;
use crate::infrastructure::cache::file_backend::FilePatternBackend;
use crate::infrastructure::cache::memory_backend::MemoryPatternBackend;

fn pattern(domain: &str, age: Duration) -> SitePattern {
    let mut p = SitePattern::new(
        domain,
        "/search?q={keyword}",
        "/wd/{id}",
        SelectorSet::default(),
    )
    .unwrap();
    p.last_updated = Utc::now() - age;
    p.created_at = p.last_updated;
    p
}

fn memory_store() -> PatternStore {
    PatternStore::new(Arc::new(MemoryPatternBackend::new()))
}

#[tokio::test]
async fn test_save_and_load_by_normalized_domain() {
    let store = memory_store();
    store.save(&pattern("www.wanted.co.kr", Duration::zero())).await.unwrap();

    let loaded = store.load("WANTED.co.kr").await.unwrap().unwrap();
    assert_eq!(loaded.domain, "wanted.co.kr");
    assert!(loaded.matches("https://www.wanted.co.kr/wd/12345"));
    assert!(store.load("saramin.co.kr").await.unwrap().is_none());
}

#[tokio::test]
async fn test_save_is_idempotent_upsert() {
    let store = memory_store();
    let p = pattern("wanted.co.kr", Duration::zero());
    store.save(&p).await.unwrap();
    store.save(&p).await.unwrap();
    assert_eq!(store.list_domains().await.unwrap(), vec!["wanted.co.kr"]);
}

#[tokio::test]
async fn test_expiry_boundary() {
    let backend = Arc::new(MemoryPatternBackend::new());
    let store = PatternStore::new(backend.clone());

    store
        .save(&pattern("young.example.com", Duration::days(29) + Duration::hours(23)))
        .await
        .unwrap();
    store
        .save(&pattern("old.example.com", Duration::days(30) + Duration::hours(1)))
        .await
        .unwrap();

    assert!(store.load("young.example.com").await.unwrap().is_some());
    assert!(store.load("old.example.com").await.unwrap().is_none());

    // 过期条目仍留在后端
    assert!(backend.get("old.example.com").await.unwrap().is_some());
    assert_eq!(store.list_domains().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_expiry_is_monotonic_in_time() {
    let store = memory_store();
    let p = pattern("x.example.com", Duration::zero());
    store.save(&p).await.unwrap();

    let at = |days: i64, hours: i64| p.last_updated + Duration::days(days) + Duration::hours(hours);
    assert!(store.load_at("x.example.com", at(29, 23)).await.unwrap().is_some());
    assert!(store.load_at("x.example.com", at(30, 0)).await.unwrap().is_some());
    assert!(store.load_at("x.example.com", at(30, 1)).await.unwrap().is_none());
    assert!(store.load_at("x.example.com", at(45, 0)).await.unwrap().is_none());
}

#[tokio::test]
async fn test_update_merges_and_refreshes_timestamp() {
    let store = memory_store();
    store
        .save(&pattern("wanted.co.kr", Duration::days(10)))
        .await
        .unwrap();
    assert!(!store.is_fresh("wanted.co.kr", DEFAULT_FRESH_DAYS).await.unwrap());

    let updated = store
        .update(
            "wanted.co.kr",
            PatternUpdate {
                detail_template: Some("/wd/{id}/detail".to_string()),
                confidence: Some(0.9),
                ..PatternUpdate::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.detail_template(), "/wd/{id}/detail");
    assert_eq!(updated.list_template, "/search?q={keyword}");
    assert!((updated.confidence - 0.9).abs() < f64::EPSILON);

    let reloaded = store.load("wanted.co.kr").await.unwrap().unwrap();
    assert!(reloaded.matches("https://wanted.co.kr/wd/99999/detail"));
    assert!(store.is_fresh("wanted.co.kr", DEFAULT_FRESH_DAYS).await.unwrap());
}

#[tokio::test]
async fn test_update_missing_or_invalid() {
    let store = memory_store();
    let err = store
        .update("nowhere.example.com", PatternUpdate::default())
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(d) if d == "nowhere.example.com"));

    store.save(&pattern("wanted.co.kr", Duration::zero())).await.unwrap();
    let err = store
        .update(
            "wanted.co.kr",
            PatternUpdate {
                detail_template: Some("/wd/list".to_string()),
                ..PatternUpdate::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidTemplate(_)));
}

#[tokio::test]
async fn test_is_fresh_thresholds() {
    let store = memory_store();
    store.save(&pattern("a.example.com", Duration::days(6))).await.unwrap();
    store.save(&pattern("b.example.com", Duration::days(8))).await.unwrap();

    assert!(store.is_fresh("a.example.com", 7).await.unwrap());
    assert!(!store.is_fresh("b.example.com", 7).await.unwrap());
    assert!(store.is_fresh("b.example.com", 10).await.unwrap());
    assert!(!store.is_fresh("missing.example.com", 7).await.unwrap());
}

#[tokio::test]
async fn test_delete_and_corrupt_entries() {
    let backend = Arc::new(MemoryPatternBackend::new());
    let store = PatternStore::new(backend.clone());
    store.save(&pattern("wanted.co.kr", Duration::zero())).await.unwrap();
    store.delete("www.wanted.co.kr").await.unwrap();
    assert!(store.load("wanted.co.kr").await.unwrap().is_none());

    backend.set("broken.example.com", "{not json".to_string()).await.unwrap();
    assert!(store.load("broken.example.com").await.unwrap().is_none());
}

#[tokio::test]
async fn test_file_backed_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = PatternStore::new(Arc::new(FilePatternBackend::new(dir.path())));
    store.save(&pattern("jumpit.saramin.co.kr", Duration::zero())).await.unwrap();

    let reopened = PatternStore::new(Arc::new(FilePatternBackend::new(dir.path())));
    let loaded = reopened.load("jumpit.saramin.co.kr").await.unwrap().unwrap();
    assert_eq!(loaded.detail_template(), "/wd/{id}");
    assert_eq!(reopened.list_domains().await.unwrap(), vec!["jumpit.saramin.co.kr"]);
}
