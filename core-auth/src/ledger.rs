//! One-shot guard for authorization codes.
//!
//! An authorization code may be exchanged at most once. Re-renders and page
//! reloads can run the callback handler again with the same URL, so every
//! code is claimed here before any network call. Claims are persisted through
//! the host's [`SettingsStore`], so they survive a reset of the in-memory
//! view state.
//!
//! Only the SHA-256 digest of a code is stored, with the time of the claim.
//! Claims older than the retention window are pruned on the next claim; the
//! provider has long since expired those codes.

use bridge_traits::error::Result;
use bridge_traits::storage::SettingsStore;
use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::debug;

const KEY_PREFIX: &str = "auth.consumed_code.";
const DEFAULT_RETENTION_HOURS: i64 = 24;

#[derive(Clone)]
pub struct ConsumedCodeLedger {
    store: Arc<dyn SettingsStore>,
    retention: Duration,
}

impl ConsumedCodeLedger {
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self {
            store,
            retention: Duration::hours(DEFAULT_RETENTION_HOURS),
        }
    }

    /// How long a claim is kept before it may be pruned.
    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }

    fn key_for(code: &str) -> String {
        format!("{}{:x}", KEY_PREFIX, Sha256::digest(code.as_bytes()))
    }

    /// Claim `code` for exchange.
    ///
    /// Returns `true` for the first caller only.
    pub async fn claim(&self, code: &str) -> Result<bool> {
        let now = Utc::now();
        let pruned = self.prune_before(now - self.retention).await?;
        let claimed = self
            .store
            .insert_if_absent(&Self::key_for(code), &now.to_rfc3339())
            .await?;
        debug!(claimed, pruned, "Authorization code claim");
        Ok(claimed)
    }

    /// Remove claims recorded before `cutoff`. Unreadable timestamps count
    /// as expired.
    async fn prune_before(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let keys = self.store.list_keys().await?;
        let mut removed = 0;
        for key in keys.iter().filter(|key| key.starts_with(KEY_PREFIX)) {
            let expired = match self.store.get_string(key).await? {
                Some(claimed_at) => DateTime::parse_from_rfc3339(&claimed_at)
                    .map(|at| at.with_timezone(&Utc) < cutoff)
                    .unwrap_or(true),
                None => false,
            };
            if expired {
                self.store.delete(key).await?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    pub async fn is_consumed(&self, code: &str) -> Result<bool> {
        self.store.has_key(&Self::key_for(code)).await
    }

    /// Forget every claimed code.
    pub async fn clear(&self) -> Result<usize> {
        let keys = self.store.list_keys().await?;
        let mut removed = 0;
        for key in keys.iter().filter(|key| key.starts_with(KEY_PREFIX)) {
            self.store.delete(key).await?;
            removed += 1;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_desktop::SqliteSettingsStore;

    async fn ledger() -> (ConsumedCodeLedger, Arc<SqliteSettingsStore>) {
        let store = Arc::new(SqliteSettingsStore::in_memory().await.unwrap());
        (ConsumedCodeLedger::new(store.clone()), store)
    }

    #[tokio::test]
    async fn test_claim_is_one_shot() {
        let (ledger, _) = ledger().await;

        assert!(!ledger.is_consumed("ABC123").await.unwrap());
        assert!(ledger.claim("ABC123").await.unwrap());
        assert!(!ledger.claim("ABC123").await.unwrap());
        assert!(ledger.is_consumed("ABC123").await.unwrap());
        assert!(ledger.claim("OTHER").await.unwrap());
    }

    #[tokio::test]
    async fn test_code_is_not_stored_in_clear() {
        let (ledger, store) = ledger().await;
        ledger.claim("ABC123").await.unwrap();

        let keys = store.list_keys().await.unwrap();
        assert_eq!(keys.len(), 1);
        assert!(!keys[0].contains("ABC123"));
        assert_eq!(keys[0].len(), KEY_PREFIX.len() + 64);
    }

    #[tokio::test]
    async fn test_claim_prunes_expired_entries() {
        let (ledger, store) = ledger().await;
        let stale_key = ConsumedCodeLedger::key_for("STALE");
        store
            .set_string(&stale_key, "2020-01-01T00:00:00+00:00")
            .await
            .unwrap();
        store
            .set_string(&ConsumedCodeLedger::key_for("GARBLED"), "not a date")
            .await
            .unwrap();
        ledger.claim("RECENT").await.unwrap();

        assert!(ledger.claim("FRESH").await.unwrap());

        let keys = store.list_keys().await.unwrap();
        assert_eq!(keys.len(), 2);
        assert!(!store.has_key(&stale_key).await.unwrap());
        assert!(ledger.is_consumed("RECENT").await.unwrap());
        assert!(ledger.is_consumed("FRESH").await.unwrap());
    }

    #[tokio::test]
    async fn test_retention_window_is_configurable() {
        let (ledger, _) = ledger().await;
        let ledger = ledger.with_retention(Duration::zero());

        assert!(ledger.claim("A").await.unwrap());
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        // The earlier claim is past a zero window and gets pruned first.
        assert!(ledger.claim("A").await.unwrap());
    }

    #[tokio::test]
    async fn test_clear_only_removes_ledger_keys() {
        let (ledger, store) = ledger().await;
        store.set_string("locale", "pt-BR").await.unwrap();
        ledger.claim("a").await.unwrap();
        ledger.claim("b").await.unwrap();

        assert_eq!(ledger.clear().await.unwrap(), 2);
        assert!(store.has_key("locale").await.unwrap());
        assert!(ledger.claim("a").await.unwrap());
    }
}
