use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Pool, Row, Sqlite, ValueRef};
use std::str::FromStr;

use crate::core::admin::{AdminError, LegacyPrefix, LegacyStore, Profile};

/// The previous bot version's SQLite file, opened read-only for one migration.
pub struct SqliteLegacyStore {
    pool: Pool<Sqlite>,
}

impl SqliteLegacyStore {
    pub async fn open(database_url: &str) -> Result<Self, AdminError> {
        let conn_str = if database_url.starts_with("sqlite:") {
            database_url.to_string()
        } else {
            format!("sqlite://{}", database_url)
        };
        let options = SqliteConnectOptions::from_str(&conn_str)
            .map_err(legacy)?
            .read_only(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(legacy)?;
        Ok(Self { pool })
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}

fn legacy(err: sqlx::Error) -> AdminError {
    AdminError::Legacy(err.to_string())
}

/// Guild ids were written both as text and as integers over the years.
fn text_or_integer(row: &SqliteRow, index: usize) -> Result<String, AdminError> {
    let raw = row.try_get_raw(index).map_err(legacy)?;
    if raw.is_null() {
        return Ok(String::new());
    }
    match row.try_get::<String, _>(index) {
        Ok(text) => Ok(text),
        Err(_) => row
            .try_get::<i64, _>(index)
            .map(|id| id.to_string())
            .map_err(legacy),
    }
}

#[async_trait]
impl LegacyStore for SqliteLegacyStore {
    async fn profiles(&self) -> Result<Vec<Profile>, AdminError> {
        let rows = sqlx::query("SELECT * FROM profiles")
            .fetch_all(&self.pool)
            .await
            .map_err(legacy)?;

        rows.iter()
            .map(|row| {
                Ok(Profile {
                    id: row.try_get(0).map_err(legacy)?,
                    platform: row.try_get(1).map_err(legacy)?,
                    name: row.try_get(2).map_err(legacy)?,
                })
            })
            .collect()
    }

    async fn prefixes(&self) -> Result<Vec<LegacyPrefix>, AdminError> {
        let rows = sqlx::query("SELECT * FROM prefixes")
            .fetch_all(&self.pool)
            .await
            .map_err(legacy)?;

        rows.iter()
            .map(|row| {
                Ok(LegacyPrefix {
                    guild_id: text_or_integer(row, 0)?,
                    prefix: row.try_get(1).map_err(legacy)?,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seed(path: &std::path::Path) {
        let url = format!("sqlite://{}?mode=rwc", path.display());
        let pool = SqlitePoolOptions::new().connect(&url).await.unwrap();
        for statement in [
            "CREATE TABLE profiles (id INTEGER, platform TEXT, name TEXT)",
            "CREATE TABLE prefixes (guild_id, prefix TEXT)",
            "INSERT INTO profiles VALUES (1, 'pc', 'Someone#1234')",
            "INSERT INTO prefixes VALUES ('550', '!')",
            "INSERT INTO prefixes VALUES (660, 'ow!')",
        ] {
            sqlx::query(statement).execute(&pool).await.unwrap();
        }
        pool.close().await;
    }

    #[tokio::test]
    async fn test_reads_legacy_tables() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.sqlite");
        seed(&path).await;

        let store = SqliteLegacyStore::open(path.to_str().unwrap()).await.unwrap();
        assert_eq!(
            store.profiles().await.unwrap(),
            vec![Profile {
                id: 1,
                platform: "pc".into(),
                name: "Someone#1234".into()
            }]
        );
        assert_eq!(
            store.prefixes().await.unwrap(),
            vec![
                LegacyPrefix {
                    guild_id: "550".into(),
                    prefix: "!".into()
                },
                LegacyPrefix {
                    guild_id: "660".into(),
                    prefix: "ow!".into()
                },
            ]
        );
        store.close().await;
    }

    #[tokio::test]
    async fn test_missing_file_is_a_legacy_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.sqlite");
        let err = SqliteLegacyStore::open(path.to_str().unwrap())
            .await
            .err()
            .unwrap();
        assert_eq!(err.kind(), "LegacyDatabaseError");
    }
}
