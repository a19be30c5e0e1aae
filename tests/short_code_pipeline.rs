mod common;

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Duration, Utc};
use common::{start_codes, store, tiny_settings};
use url_shortcode::application::services::{ShortCodeSettings, UrlService};
use url_shortcode::domain::repositories::UrlRepository;
use url_shortcode::error::{AppError, ShortCodeError};
use url_shortcode::infrastructure::persistence::InMemoryUrlRepository;

#[tokio::test]
async fn test_codes_are_free_at_delivery() {
    let repo = Arc::new(InMemoryUrlRepository::new());
    store(&repo, "aa").await;
    store(&repo, "a2").await;

    let codes = start_codes(repo.clone(), tiny_settings(2, 2, "a", "2"));

    for _ in 0..10 {
        let code = codes.get_code().await.unwrap();
        assert!(code.as_str() == "2a" || code.as_str() == "22");
    }

    codes.shutdown().await;
}

#[tokio::test]
async fn test_soft_deleted_code_is_never_reissued() {
    let repo = Arc::new(InMemoryUrlRepository::new());
    store(&repo, "a").await;
    assert!(repo.soft_delete("a"));

    let codes = start_codes(repo.clone(), tiny_settings(1, 1, "a", "2"));

    for _ in 0..5 {
        assert_eq!(codes.get_code().await.unwrap().as_str(), "2");
    }

    codes.shutdown().await;
}

#[tokio::test]
async fn test_full_code_space_reports_exhaustion() {
    let repo = Arc::new(InMemoryUrlRepository::new());
    store(&repo, "a").await;
    store(&repo, "2").await;

    let mut settings = tiny_settings(1, 1, "a", "2");
    settings.max_cycles = 5;
    let codes = start_codes(repo.clone(), settings);

    let err = codes.get_code().await.unwrap_err();
    assert_eq!(err, ShortCodeError::CodeSpaceExhausted { cycles: 5 });

    // The producer keeps running and reports again.
    let err = codes.get_code().await.unwrap_err();
    assert_eq!(err, ShortCodeError::CodeSpaceExhausted { cycles: 5 });
    assert!(codes.is_running());

    codes.shutdown().await;
    assert!(!codes.is_running());
}

#[tokio::test]
async fn test_longer_codes_used_once_shorter_are_taken() {
    let repo = Arc::new(InMemoryUrlRepository::new());
    store(&repo, "a").await;
    store(&repo, "2").await;

    let codes = start_codes(repo.clone(), tiny_settings(1, 3, "a", "2"));

    let code = codes.get_code().await.unwrap();
    assert_eq!(code.len(), 2);

    codes.shutdown().await;
}

#[tokio::test]
async fn test_shorten_fills_code_space_then_fails() {
    let repo = Arc::new(InMemoryUrlRepository::new());
    let mut settings = tiny_settings(2, 2, "a", "2");
    settings.max_cycles = 200;
    let codes = start_codes(repo.clone(), settings);
    let service = UrlService::new(repo.clone(), codes.clone());

    let mut ids = HashSet::new();
    for _ in 0..4 {
        let url = service
            .shorten("https://example.com", 7, None)
            .await
            .unwrap();
        ids.insert(url.id);
    }

    assert_eq!(ids.len(), 4);
    assert_eq!(repo.len(), 4);

    let err = service
        .shorten("https://example.com", 7, None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::Internal { .. } | AppError::Conflict { .. }
    ));
    assert_eq!(repo.len(), 4);

    codes.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_shorten_stores_distinct_codes() {
    let repo = Arc::new(InMemoryUrlRepository::new());
    let codes = start_codes(repo.clone(), ShortCodeSettings::default());
    let service = Arc::new(UrlService::new(repo.clone(), codes.clone()));

    let mut handles = Vec::new();
    for user_id in 0..20 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            service
                .shorten("https://example.com/page", user_id, None)
                .await
                .unwrap()
                .id
        }));
    }

    let mut ids = HashSet::new();
    for handle in handles {
        ids.insert(handle.await.unwrap());
    }

    assert_eq!(ids.len(), 20);
    assert_eq!(repo.len(), 20);

    codes.shutdown().await;
}

#[tokio::test]
async fn test_shorten_then_resolve() {
    let repo = Arc::new(InMemoryUrlRepository::new());
    let codes = start_codes(repo.clone(), ShortCodeSettings::default());
    let service = UrlService::new(repo.clone(), codes.clone());

    let url = service
        .shorten("  https://example.com/a  ", 3, None)
        .await
        .unwrap();
    assert_eq!(url.destination, "https://example.com/a");

    let resolved = service.resolve(&url.id).await.unwrap();
    assert_eq!(resolved, url);

    assert!(repo.soft_delete(&url.id));
    assert!(service.resolve(&url.id).await.unwrap_err().is_not_found());

    let expired = service
        .shorten(
            "https://example.com/b",
            3,
            Some(Utc::now() - Duration::minutes(5)),
        )
        .await
        .unwrap();
    assert!(service.resolve(&expired.id).await.unwrap_err().is_not_found());

    // Still occupied as far as storage is concerned.
    assert!(repo.get_url_by_id(&url.id).await.is_ok());

    codes.shutdown().await;
}
