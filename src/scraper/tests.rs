use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use tracing_test::traced_test;

use super::testing::MemoryLauncher;
use super::SessionPool;

#[tokio::test]
#[traced_test]
async fn pool_caps_live_sessions() {
    let launcher = MemoryLauncher::default();
    let pool = SessionPool::new(Arc::new(launcher.clone()), 1);

    let first = pool.acquire().await.unwrap();
    assert_eq!(pool.available(), 0);

    let waiting = tokio::time::timeout(Duration::from_millis(50), pool.acquire()).await;
    assert!(waiting.is_err(), "second session acquired while the first was held");
    assert_eq!(launcher.launched.load(Ordering::SeqCst), 1);

    first.release().await;

    let second = tokio::time::timeout(Duration::from_secs(1), pool.acquire())
        .await
        .expect("slot freed after release")
        .unwrap();
    assert_eq!(pool.available(), 0);
    second.release().await;

    assert_eq!(pool.available(), 1);
    assert_eq!(launcher.closed(), 2);
}

#[tokio::test]
#[traced_test]
async fn dropped_guard_frees_its_slot() {
    let pool = SessionPool::new(Arc::new(MemoryLauncher::default()), 1);

    drop(pool.acquire().await.unwrap());

    assert_eq!(pool.available(), 1);
    assert!(logs_contain("dropped without release"));
}
