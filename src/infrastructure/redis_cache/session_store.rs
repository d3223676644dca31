use anyhow::Result;
use async_trait::async_trait;
use redis::{AsyncCommands, aio::ConnectionManager};

use crate::domain::{
    repositories::session_store::SessionStore, value_objects::session::CacheSessionEntry,
};

pub struct RedisSessionStore {
    conn: ConnectionManager,
    ttl_seconds: u64,
}

impl RedisSessionStore {
    pub fn new(conn: ConnectionManager, ttl_seconds: u64) -> Self {
        Self { conn, ttl_seconds }
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn put(&self, entry: &CacheSessionEntry) -> Result<()> {
        let mut conn = self.conn.clone();
        let payload = serde_json::to_string(entry)?;
        let _: () = conn
            .set_ex(&entry.ref_id, payload, self.ttl_seconds)
            .await?;
        Ok(())
    }

    async fn get(&self, ref_id: &str) -> Result<Option<CacheSessionEntry>> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(ref_id).await?;
        match raw {
            Some(payload) => Ok(Some(serde_json::from_str(&payload)?)),
            None => Ok(None),
        }
    }

    async fn exists(&self, ref_id: &str) -> Result<bool> {
        let mut conn = self.conn.clone();
        let present: bool = conn.exists(ref_id).await?;
        Ok(present)
    }

    async fn attach_transaction_id(&self, ref_id: &str, transaction_id: &str) -> Result<()> {
        let mut entry = match self.get(ref_id).await? {
            Some(entry) => entry,
            None => return Ok(()),
        };
        entry.transaction_id = Some(transaction_id.to_string());
        self.put(&entry).await
    }

    async fn claim(&self, ref_id: &str) -> Result<bool> {
        let mut conn = self.conn.clone();
        // DEL is atomic: exactly one racing caller sees the key removed.
        let removed: i64 = conn.del(ref_id).await?;
        Ok(removed > 0)
    }

    async fn restore(&self, entry: &CacheSessionEntry) -> Result<()> {
        self.put(entry).await
    }
}
