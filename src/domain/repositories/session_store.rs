use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::value_objects::session::CacheSessionEntry;

/// Fast lookup cache for per-attempt session data, keyed by `ref_id` with a
/// TTL independent of the ledger.
#[automock]
#[async_trait]
pub trait SessionStore {
    async fn put(&self, entry: &CacheSessionEntry) -> Result<()>;

    async fn get(&self, ref_id: &str) -> Result<Option<CacheSessionEntry>>;

    async fn exists(&self, ref_id: &str) -> Result<bool>;

    async fn attach_transaction_id(&self, ref_id: &str, transaction_id: &str) -> Result<()>;

    /// Atomic delete returning whether the key was present. Exactly one of
    /// any set of racing callers observes `true` and may apply the terminal
    /// transition; the rest must short-circuit.
    async fn claim(&self, ref_id: &str) -> Result<bool>;

    /// Puts a claimed entry back after a failed ledger commit so a later
    /// retry can still resolve the attempt.
    async fn restore(&self, entry: &CacheSessionEntry) -> Result<()>;
}
