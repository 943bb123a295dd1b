use std::path::Path;

use async_trait::async_trait;
use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Pool, Row, Sqlite, TypeInfo, ValueRef};

use crate::core::admin::{
    AdminError, BotStore, CommandRow, Profile, QueryResult, QueryValue, ServerUsage,
};

impl From<sqlx::Error> for AdminError {
    fn from(err: sqlx::Error) -> Self {
        AdminError::Database(err.to_string())
    }
}

/// Connects to a SQLite database, creating the file when it does not exist.
pub async fn connect(database_url: &str) -> anyhow::Result<Pool<Sqlite>> {
    let path_str = database_url.trim_start_matches("sqlite://");
    if !database_url.contains(":memory:") && !Path::new(path_str).exists() {
        if let Some(parent) = Path::new(path_str).parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::File::create(path_str)?;
    }

    let conn_str = if database_url.starts_with("sqlite:") {
        database_url.to_string()
    } else {
        format!("sqlite://{}", database_url)
    };

    Ok(SqlitePoolOptions::new().connect(&conn_str).await?)
}

/// The primary database: `command`, `server` and `profile`.
pub struct SqliteBotStore {
    pool: Pool<Sqlite>,
}

impl SqliteBotStore {
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let store = Self {
            pool: connect(database_url).await?,
        };
        store.migrate().await?;
        Ok(store)
    }

    /// Creates the three tables if they are missing. Existing data is never touched.
    async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS command (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT UNIQUE NOT NULL,
                used INTEGER NOT NULL DEFAULT 0
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS server (
                id INTEGER PRIMARY KEY,
                prefix TEXT NOT NULL DEFAULT '-',
                commands_runned INTEGER NOT NULL DEFAULT 0
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS profile (
                id INTEGER PRIMARY KEY,
                platform TEXT NOT NULL,
                name TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn count(&self, sql: &str) -> Result<i64, AdminError> {
        let count: i64 = sqlx::query_scalar(sql).fetch_one(&self.pool).await?;
        Ok(count)
    }
}

/// Reads one cell by its runtime storage class.
fn read_value(row: &SqliteRow, index: usize) -> Result<QueryValue, AdminError> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(QueryValue::Null);
    }
    let type_name = raw.type_info().name().to_string();
    let value = match type_name.as_str() {
        "INTEGER" | "BOOLEAN" | "INT8" => QueryValue::Integer(row.try_get(index)?),
        "REAL" => QueryValue::Real(row.try_get(index)?),
        "BLOB" => QueryValue::Blob(row.try_get(index)?),
        _ => QueryValue::Text(row.try_get(index)?),
    };
    Ok(value)
}

#[async_trait]
impl BotStore for SqliteBotStore {
    async fn count_profiles(&self) -> Result<i64, AdminError> {
        self.count("SELECT COUNT(*) FROM profile").await
    }

    async fn count_custom_prefixes(&self, default_prefix: &str) -> Result<i64, AdminError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM server WHERE prefix <> ?")
            .bind(default_prefix)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn count_servers(&self) -> Result<i64, AdminError> {
        self.count("SELECT COUNT(*) FROM server").await
    }

    async fn total_commands(&self) -> Result<i64, AdminError> {
        self.count("SELECT COALESCE(SUM(used), 0) FROM command").await
    }

    async fn list_commands(&self) -> Result<Vec<CommandRow>, AdminError> {
        let rows = sqlx::query("SELECT id, name, used FROM command ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| CommandRow {
                id: row.get("id"),
                name: row.get("name"),
                used: row.get("used"),
            })
            .collect())
    }

    async fn command_exists(&self, name: &str) -> Result<bool, AdminError> {
        let row = sqlx::query("SELECT id FROM command WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    async fn insert_command(&self, name: &str) -> Result<(), AdminError> {
        sqlx::query("INSERT INTO command (name) VALUES (?)")
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn rename_command(&self, id: i64, name: &str) -> Result<u64, AdminError> {
        let result = sqlx::query("UPDATE command SET name = ? WHERE id = ?")
            .bind(name)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_command(&self, id: i64) -> Result<u64, AdminError> {
        let result = sqlx::query("DELETE FROM command WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn increment_command(&self, name: &str) -> Result<(), AdminError> {
        sqlx::query(
            r#"
            INSERT INTO command (name, used) VALUES (?, 1)
            ON CONFLICT(name) DO UPDATE SET used = used + 1
            "#,
        )
        .bind(name)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn server_exists(&self, id: u64) -> Result<bool, AdminError> {
        let row = sqlx::query("SELECT id FROM server WHERE id = ?")
            .bind(id as i64)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    async fn insert_server(&self, id: u64, prefix: &str) -> Result<(), AdminError> {
        sqlx::query("INSERT INTO server (id, prefix) VALUES (?, ?)")
            .bind(id as i64)
            .bind(prefix)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn server_prefix(&self, id: u64) -> Result<Option<String>, AdminError> {
        let prefix: Option<String> = sqlx::query_scalar("SELECT prefix FROM server WHERE id = ?")
            .bind(id as i64)
            .fetch_optional(&self.pool)
            .await?;
        Ok(prefix)
    }

    async fn update_prefix(&self, id: u64, prefix: &str) -> Result<u64, AdminError> {
        let result = sqlx::query("UPDATE server SET prefix = ? WHERE id = ?")
            .bind(prefix)
            .bind(id as i64)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn increment_server(&self, id: u64, default_prefix: &str) -> Result<(), AdminError> {
        sqlx::query(
            r#"
            INSERT INTO server (id, prefix, commands_runned) VALUES (?, ?, 1)
            ON CONFLICT(id) DO UPDATE SET commands_runned = commands_runned + 1
            "#,
        )
        .bind(id as i64)
        .bind(default_prefix)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn top_servers(&self, limit: i64) -> Result<Vec<ServerUsage>, AdminError> {
        let rows = sqlx::query(
            "SELECT id, commands_runned FROM server ORDER BY commands_runned DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| ServerUsage {
                id: row.get::<i64, _>("id") as u64,
                commands_runned: row.get("commands_runned"),
            })
            .collect())
    }

    async fn insert_profile(&self, profile: &Profile) -> Result<(), AdminError> {
        sqlx::query("INSERT INTO profile (id, platform, name) VALUES (?, ?, ?)")
            .bind(profile.id)
            .bind(&profile.platform)
            .bind(&profile.name)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn query(&self, sql: &str) -> Result<QueryResult, AdminError> {
        let rows = sqlx::query(sql).fetch_all(&self.pool).await?;

        let columns: Vec<String> = rows
            .first()
            .map(|row| {
                row.columns()
                    .iter()
                    .map(|column| column.name().to_string())
                    .collect()
            })
            .unwrap_or_default();

        let mut values = Vec::with_capacity(rows.len());
        for row in &rows {
            let cells = (0..row.len())
                .map(|index| read_value(row, index))
                .collect::<Result<Vec<_>, _>>()?;
            values.push(cells);
        }

        Ok(QueryResult {
            columns,
            rows: values,
        })
    }

    async fn execute(&self, sql: &str) -> Result<u64, AdminError> {
        let result = sqlx::query(sql).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn store() -> (SqliteBotStore, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("overbot.db");
        let store = SqliteBotStore::new(path.to_str().unwrap()).await.unwrap();
        (store, dir)
    }

    #[tokio::test]
    async fn test_migrate_is_idempotent() {
        let (store, _dir) = store().await;
        store.migrate().await.unwrap();
        assert_eq!(store.count_servers().await.unwrap(), 0);
        assert_eq!(store.total_commands().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_command_table_round() {
        let (store, _dir) = store().await;
        store.insert_command("ping").await.unwrap();
        assert!(store.command_exists("ping").await.unwrap());
        assert!(store.insert_command("ping").await.is_err());

        store.increment_command("ping").await.unwrap();
        store.increment_command("about").await.unwrap();
        assert_eq!(store.total_commands().await.unwrap(), 2);

        assert_eq!(store.rename_command(1, "pong").await.unwrap(), 1);
        assert_eq!(store.rename_command(99, "x").await.unwrap(), 0);
        assert_eq!(store.delete_command(2).await.unwrap(), 1);

        let rows = store.list_commands().await.unwrap();
        assert_eq!(
            rows,
            vec![CommandRow {
                id: 1,
                name: "pong".into(),
                used: 1
            }]
        );
    }

    #[tokio::test]
    async fn test_server_usage_and_prefixes() {
        let (store, _dir) = store().await;
        let big_id = 700_000_000_000_000_001_u64;
        store.insert_server(big_id, "-").await.unwrap();
        store.increment_server(big_id, "-").await.unwrap();
        store.increment_server(5, "-").await.unwrap();
        store.increment_server(5, "-").await.unwrap();

        let top = store.top_servers(5).await.unwrap();
        assert_eq!(top[0], ServerUsage { id: 5, commands_runned: 2 });
        assert_eq!(top[1], ServerUsage { id: big_id, commands_runned: 1 });

        assert_eq!(store.update_prefix(5, "!").await.unwrap(), 1);
        assert_eq!(store.server_prefix(5).await.unwrap().as_deref(), Some("!"));
        assert_eq!(store.server_prefix(6).await.unwrap(), None);
        assert_eq!(store.count_custom_prefixes("-").await.unwrap(), 1);
        assert!(store.server_exists(big_id).await.unwrap());
    }

    #[tokio::test]
    async fn test_raw_query_reads_every_storage_class() {
        let (store, _dir) = store().await;
        store
            .insert_profile(&Profile {
                id: 1,
                platform: "pc".into(),
                name: "Someone#1234".into(),
            })
            .await
            .unwrap();

        let result = store
            .query("SELECT id, name, 1.5 AS ratio, NULL AS missing FROM profile")
            .await
            .unwrap();
        assert_eq!(result.columns, vec!["id", "name", "ratio", "missing"]);
        assert_eq!(
            result.rows,
            vec![vec![
                QueryValue::Integer(1),
                QueryValue::Text("Someone#1234".into()),
                QueryValue::Real(1.5),
                QueryValue::Null,
            ]]
        );

        let empty = store.query("SELECT * FROM server").await.unwrap();
        assert!(empty.is_empty());

        assert!(store.query("SELEC nonsense").await.is_err());
        assert_eq!(
            store.execute("UPDATE profile SET platform = 'psn'").await.unwrap(),
            1
        );
    }
}
