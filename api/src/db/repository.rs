use std::path::Path;

use chrono::Utc;
use sqlx::{Row, SqlitePool};

use super::{init_database, init_memory_database, session::SessionKey};

/// Key-value store for the session slots.
#[derive(Clone)]
pub struct OrbitDb {
  pool: SqlitePool,
}

impl OrbitDb {
  pub async fn open(db_path: &Path) -> anyhow::Result<Self> {
    Ok(OrbitDb {
      pool: init_database(db_path).await?,
    })
  }

  pub async fn in_memory() -> anyhow::Result<Self> {
    Ok(OrbitDb {
      pool: init_memory_database().await?,
    })
  }

  pub async fn get(&self, key: SessionKey) -> anyhow::Result<Option<String>> {
    let row = sqlx::query("SELECT value FROM session WHERE key = ?")
      .bind(key.as_str())
      .fetch_optional(&self.pool)
      .await?;
    Ok(row.map(|r| r.get::<String, _>("value")))
  }

  pub async fn set(&self, key: SessionKey, value: &str) -> anyhow::Result<()> {
    let now = Utc::now().to_rfc3339();
    let mut transaction = self.pool.begin().await?;
    sqlx::query(
      r#"
            INSERT INTO session (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
    )
    .bind(key.as_str())
    .bind(value)
    .bind(now)
    .execute(&mut *transaction)
    .await?;
    transaction.commit().await?;
    log::debug!("session slot {} written", key.as_str());
    Ok(())
  }

  pub async fn remove(&self, key: SessionKey) -> anyhow::Result<()> {
    sqlx::query("DELETE FROM session WHERE key = ?1")
      .bind(key.as_str())
      .execute(&self.pool)
      .await?;
    Ok(())
  }

  pub async fn close(&self) {
    self.pool.close().await;
  }
}
