//! Per-wallet lock registry.
//!
//! Every balance read-modify-write runs while holding the async mutex for each
//! wallet it touches. Wallets are never deleted, so slots are never evicted.
//! Multi-wallet acquisition always goes in ascending id order.

use crate::errors::{Error, Result};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Holds the locks of one operation; dropping it releases them.
#[derive(Debug)]
pub struct WalletGuard {
    _guards: Vec<OwnedMutexGuard<()>>,
}

/// Registry of one async mutex per wallet id.
#[derive(Clone, Debug)]
pub struct WalletLocks {
    slots: Arc<DashMap<i64, Arc<Mutex<()>>>>,
    timeout: Duration,
}

impl WalletLocks {
    /// Creates an empty registry whose acquisitions give up after `timeout`.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            slots: Arc::new(DashMap::new()),
            timeout,
        }
    }

    /// Locks every wallet in `wallet_ids`, lowest id first.
    ///
    /// Duplicate ids are locked once.
    pub async fn acquire(&self, wallet_ids: &[i64]) -> Result<WalletGuard> {
        let mut ids = wallet_ids.to_vec();
        ids.sort_unstable();
        ids.dedup();

        let mut guards = Vec::with_capacity(ids.len());
        for wallet_id in ids {
            guards.push(self.lock_one(wallet_id).await?);
        }
        Ok(WalletGuard { _guards: guards })
    }

    async fn lock_one(&self, wallet_id: i64) -> Result<OwnedMutexGuard<()>> {
        // The map shard guard is released at the end of this statement, before awaiting.
        let slot = Arc::clone(self.slots.entry(wallet_id).or_default().value());

        tokio::time::timeout(self.timeout, slot.lock_owned())
            .await
            .map_err(|_| Error::LockTimeout {
                wallet_id,
                waited: self.timeout,
            })
    }
}

impl Default for WalletLocks {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}
