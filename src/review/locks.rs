//! 按投稿 ID 的互斥锁
//!
//! 同一投稿上的写操作串行执行；锁条目在没有持有者后自动回收。

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

#[derive(Default)]
pub struct SubmissionLocks {
    entries: Mutex<HashMap<String, Weak<AsyncMutex<()>>>>,
}

/// 持有期间独占对应投稿
pub type SubmissionGuard = OwnedMutexGuard<()>;

impl SubmissionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取投稿锁，等待其他持有者释放
    pub async fn acquire(&self, submission_id: &str) -> SubmissionGuard {
        let lock = self.lock_for(submission_id);
        lock.lock_owned().await
    }

    /// 同时获取多个投稿的锁
    ///
    /// 按 ID 排序后依次获取，多个持有者之间不会互相等待成环
    pub async fn acquire_all(&self, submission_ids: &[String]) -> Vec<SubmissionGuard> {
        let mut ids: Vec<&str> = submission_ids.iter().map(String::as_str).collect();
        ids.sort_unstable();
        ids.dedup();

        let mut guards = Vec::with_capacity(ids.len());
        for id in ids {
            guards.push(self.acquire(id).await);
        }
        guards
    }

    /// 当前仍被引用的锁数量
    pub fn active(&self) -> usize {
        let mut entries = self.entries.lock();
        entries.retain(|_, weak| weak.strong_count() > 0);
        entries.len()
    }

    fn lock_for(&self, submission_id: &str) -> Arc<AsyncMutex<()>> {
        let mut entries = self.entries.lock();
        entries.retain(|_, weak| weak.strong_count() > 0);

        if let Some(existing) = entries.get(submission_id).and_then(Weak::upgrade) {
            return existing;
        }

        let lock = Arc::new(AsyncMutex::new(()));
        entries.insert(submission_id.to_string(), Arc::downgrade(&lock));
        lock
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn same_submission_is_serialized() {
        let locks = Arc::new(SubmissionLocks::new());
        let guard = locks.acquire("sub_a").await;

        let contender = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire("sub_a").await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
    }

    #[tokio::test]
    async fn different_submissions_do_not_block_each_other() {
        let locks = SubmissionLocks::new();
        let _a = locks.acquire("sub_a").await;
        let _b = tokio::time::timeout(Duration::from_millis(50), locks.acquire("sub_b"))
            .await
            .expect("independent submission should not wait");
    }

    #[tokio::test]
    async fn acquire_all_waits_for_every_listed_submission() {
        let locks = Arc::new(SubmissionLocks::new());
        let original = locks.acquire("sub_original").await;

        let contender = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let ids = vec!["sub_revision".to_string(), "sub_original".to_string()];
                let guards = locks.acquire_all(&ids).await;
                guards.len()
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(original);
        assert_eq!(contender.await.unwrap(), 2);
    }

    #[tokio::test]
    async fn acquire_all_ignores_duplicate_ids() {
        let locks = SubmissionLocks::new();
        let ids = vec!["sub_a".to_string(), "sub_a".to_string()];
        let guards = tokio::time::timeout(Duration::from_millis(50), locks.acquire_all(&ids))
            .await
            .expect("duplicate ids should not deadlock");
        assert_eq!(guards.len(), 1);
    }

    #[tokio::test]
    async fn released_entries_are_reclaimed() {
        let locks = SubmissionLocks::new();
        {
            let _guard = locks.acquire("sub_a").await;
            assert_eq!(locks.active(), 1);
        }
        assert_eq!(locks.active(), 0);
    }
}
