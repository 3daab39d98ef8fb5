use std::net::IpAddr;
use std::sync::Arc;
use warden_dns_application::ports::ReputationRepository;
use warden_dns_domain::{BlockOutcome, DeleteOutcome, SortField, UnblockOutcome};
use warden_dns_infrastructure::database::create_pool;
use warden_dns_infrastructure::repositories::SqliteReputationRepository;

// A single connection keeps the in-memory database shared across all
// pool checkouts.
async fn create_test_repo() -> SqliteReputationRepository {
    let pool = create_pool("sqlite::memory:", 1).await.unwrap();
    SqliteReputationRepository::new(pool, "test-listener")
}

fn ip(s: &str) -> IpAddr {
    s.parse().unwrap()
}

#[tokio::test]
async fn test_first_observation_creates_record() {
    let repo = create_test_repo().await;

    let blocked = repo.record_and_check(ip("192.0.2.1")).await.unwrap();
    assert!(!blocked);

    let record = repo.get(ip("192.0.2.1")).await.unwrap().unwrap();
    assert_eq!(record.hit_count, 1);
    assert!(!record.blocked);
    assert!(record.memo.is_none());
    assert_eq!(record.server.as_deref(), Some("test-listener"));
    assert!(record.last_seen.is_some());
}

#[tokio::test]
async fn test_observations_increment_hit_count() {
    let repo = create_test_repo().await;

    for _ in 0..3 {
        repo.record_and_check(ip("192.0.2.2")).await.unwrap();
    }

    let record = repo.get(ip("192.0.2.2")).await.unwrap().unwrap();
    assert_eq!(record.hit_count, 3);
}

#[tokio::test]
async fn test_block_then_check_reports_blocked() {
    let repo = create_test_repo().await;

    let outcome = repo
        .block(ip("192.0.2.3"), Some("scanning".to_string()))
        .await
        .unwrap();
    assert_eq!(outcome, BlockOutcome::Blocked);

    assert!(repo.record_and_check(ip("192.0.2.3")).await.unwrap());
    // The refused packet still counted as an observation.
    let record = repo.get(ip("192.0.2.3")).await.unwrap().unwrap();
    assert_eq!(record.hit_count, 2);
}

#[tokio::test]
async fn test_reblock_is_noop_and_reports_original_reason() {
    let repo = create_test_repo().await;

    repo.block(ip("192.0.2.4"), Some("first".to_string()))
        .await
        .unwrap();
    let outcome = repo
        .block(ip("192.0.2.4"), Some("second".to_string()))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        BlockOutcome::AlreadyBlocked {
            reason: Some("first".to_string())
        }
    );

    let record = repo.get(ip("192.0.2.4")).await.unwrap().unwrap();
    assert_eq!(record.memo.as_deref(), Some("first"));
}

#[tokio::test]
async fn test_block_without_reason_stores_no_memo() {
    let repo = create_test_repo().await;

    repo.block(ip("192.0.2.5"), None).await.unwrap();

    let record = repo.get(ip("192.0.2.5")).await.unwrap().unwrap();
    assert!(record.blocked);
    assert!(record.memo.is_none());
}

#[tokio::test]
async fn test_block_keeps_existing_hit_count() {
    let repo = create_test_repo().await;

    for _ in 0..4 {
        repo.record_and_check(ip("192.0.2.6")).await.unwrap();
    }
    repo.block(ip("192.0.2.6"), Some("abuse".to_string()))
        .await
        .unwrap();

    let record = repo.get(ip("192.0.2.6")).await.unwrap().unwrap();
    assert!(record.blocked);
    assert_eq!(record.hit_count, 4);
}

#[tokio::test]
async fn test_fresh_block_starts_hit_count_at_one() {
    let repo = create_test_repo().await;

    repo.block(ip("192.0.2.7"), None).await.unwrap();

    let record = repo.get(ip("192.0.2.7")).await.unwrap().unwrap();
    assert_eq!(record.hit_count, 1);
}

#[tokio::test]
async fn test_unblock_clears_memo() {
    let repo = create_test_repo().await;

    repo.block(ip("192.0.2.8"), Some("flood".to_string()))
        .await
        .unwrap();
    let outcome = repo.unblock(ip("192.0.2.8")).await.unwrap();

    assert_eq!(
        outcome,
        UnblockOutcome::Unblocked {
            previous_reason: Some("flood".to_string())
        }
    );

    let record = repo.get(ip("192.0.2.8")).await.unwrap().unwrap();
    assert!(!record.blocked);
    assert!(record.memo.is_none());
    assert!(!repo.record_and_check(ip("192.0.2.8")).await.unwrap());
}

#[tokio::test]
async fn test_unblock_of_unblocked_source_is_noop() {
    let repo = create_test_repo().await;

    // Unknown IP.
    assert_eq!(
        repo.unblock(ip("192.0.2.9")).await.unwrap(),
        UnblockOutcome::NotBlocked
    );

    // Known but never blocked.
    repo.record_and_check(ip("192.0.2.9")).await.unwrap();
    assert_eq!(
        repo.unblock(ip("192.0.2.9")).await.unwrap(),
        UnblockOutcome::NotBlocked
    );
}

#[tokio::test]
async fn test_delete_removes_record() {
    let repo = create_test_repo().await;

    assert_eq!(
        repo.delete(ip("192.0.2.10")).await.unwrap(),
        DeleteOutcome::NotFound
    );

    repo.block(ip("192.0.2.10"), Some("gone".to_string()))
        .await
        .unwrap();
    assert_eq!(
        repo.delete(ip("192.0.2.10")).await.unwrap(),
        DeleteOutcome::Deleted {
            memo: Some("gone".to_string())
        }
    );

    assert!(repo.get(ip("192.0.2.10")).await.unwrap().is_none());
}

#[tokio::test]
async fn test_list_recent_orders_and_limits() {
    let repo = create_test_repo().await;

    for (addr, hits) in [("192.0.2.11", 1), ("192.0.2.12", 3), ("192.0.2.13", 2)] {
        for _ in 0..hits {
            repo.record_and_check(ip(addr)).await.unwrap();
        }
    }

    let by_hits = repo.list_recent(SortField::HitCount, 2).await.unwrap();
    assert_eq!(by_hits.len(), 2);
    assert_eq!(by_hits[0].ip, ip("192.0.2.12"));
    assert_eq!(by_hits[1].ip, ip("192.0.2.13"));

    let by_id = repo.list_recent(SortField::Id, 10).await.unwrap();
    assert_eq!(by_id.len(), 3);
    assert_eq!(by_id[0].ip, ip("192.0.2.13"));
    assert_eq!(by_id[2].ip, ip("192.0.2.11"));
}

#[tokio::test]
async fn test_get_unknown_ip_is_none() {
    let repo = create_test_repo().await;
    assert!(repo.get(ip("198.51.100.1")).await.unwrap().is_none());
}

#[tokio::test]
async fn test_concurrent_block_unblock_settles_consistently() {
    let repo = Arc::new(create_test_repo().await);
    let target = ip("203.0.113.1");

    let mut handles = Vec::new();
    for i in 0..20 {
        let repo = repo.clone();
        handles.push(tokio::spawn(async move {
            if i % 2 == 0 {
                repo.block(target, Some("concurrent".to_string()))
                    .await
                    .unwrap();
            } else {
                repo.unblock(target).await.unwrap();
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    // Whatever interleaving won, the record reflects a full block or a full
    // unblock, never a partial update.
    let record = repo.get(target).await.unwrap().unwrap();
    if record.blocked {
        assert_eq!(record.memo.as_deref(), Some("concurrent"));
    } else {
        assert!(record.memo.is_none());
    }
}
