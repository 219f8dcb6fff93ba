//! MySQL-backed implementations of the two pipeline collaborators.

use async_trait::async_trait;
use lvgen_core::{GenError, GenResult, MenuRecord, MenuStore, RawColumn, SchemaStore, TableInfo};
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use std::time::Duration;

/// Open a small pool; the CLI issues a handful of sequential queries.
pub async fn connect(url: &str, timeout: Duration) -> GenResult<MySqlPool> {
    MySqlPoolOptions::new()
        .max_connections(2)
        .acquire_timeout(timeout)
        .connect(url)
        .await
        .map_err(|e| GenError::schema(None, format!("cannot connect: {}", e)))
}

// ============================================================================
// Schema store
// ============================================================================

#[derive(sqlx::FromRow)]
struct TableRow {
    name: String,
    comment: String,
}

#[derive(sqlx::FromRow)]
struct ColumnRow {
    name: String,
    raw_type: String,
    comment: String,
    is_nullable: String,
    key_flag: String,
    extra: String,
}

impl From<ColumnRow> for RawColumn {
    fn from(row: ColumnRow) -> Self {
        RawColumn {
            name: row.name,
            raw_type: row.raw_type,
            comment: row.comment,
            nullable: row.is_nullable.eq_ignore_ascii_case("YES"),
            key_flag: row.key_flag,
            extra: row.extra,
        }
    }
}

/// Reads `information_schema`.
#[derive(Debug, Clone)]
pub struct MySqlSchemaStore {
    pool: MySqlPool,
}

impl MySqlSchemaStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SchemaStore for MySqlSchemaStore {
    async fn tables(&self, database: &str) -> GenResult<Vec<TableInfo>> {
        let rows: Vec<TableRow> = sqlx::query_as(
            "SELECT CAST(TABLE_NAME AS CHAR) AS name, \
                    CAST(COALESCE(TABLE_COMMENT, '') AS CHAR) AS comment \
             FROM information_schema.TABLES \
             WHERE TABLE_SCHEMA = ? AND TABLE_TYPE = 'BASE TABLE' \
             ORDER BY TABLE_NAME",
        )
        .bind(database)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| GenError::schema(None, e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|row| TableInfo::new(row.name, row.comment))
            .collect())
    }

    async fn columns(&self, database: &str, table: &str) -> GenResult<Vec<RawColumn>> {
        let rows: Vec<ColumnRow> = sqlx::query_as(
            "SELECT CAST(COLUMN_NAME AS CHAR) AS name, \
                    CAST(DATA_TYPE AS CHAR) AS raw_type, \
                    CAST(COALESCE(COLUMN_COMMENT, '') AS CHAR) AS comment, \
                    CAST(IS_NULLABLE AS CHAR) AS is_nullable, \
                    CAST(COLUMN_KEY AS CHAR) AS key_flag, \
                    CAST(EXTRA AS CHAR) AS extra \
             FROM information_schema.COLUMNS \
             WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ? \
             ORDER BY ORDINAL_POSITION",
        )
        .bind(database)
        .bind(table)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| GenError::schema(Some(table), e.to_string()))?;

        Ok(rows.into_iter().map(RawColumn::from).collect())
    }
}

// ============================================================================
// Menu store
// ============================================================================

/// Writes to the admin panel's `lv_menus` table.
#[derive(Debug, Clone)]
pub struct MySqlMenuStore {
    pool: MySqlPool,
}

impl MySqlMenuStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MenuStore for MySqlMenuStore {
    async fn create(&self, record: &MenuRecord) -> GenResult<u64> {
        let result = sqlx::query(
            "INSERT INTO lv_menus \
                (created_at, updated_at, parent_id, title, path, name, component, icon, \
                 sort, type, permission, hidden, keep_alive) \
             VALUES (NOW(3), NOW(3), ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(record.parent_id)
        .bind(&record.title)
        .bind(&record.path)
        .bind(&record.name)
        .bind(&record.component)
        .bind(&record.icon)
        .bind(record.sort)
        .bind(record.kind.code())
        .bind(&record.permission)
        .bind(record.hidden)
        .bind(record.keep_alive)
        .execute(&self.pool)
        .await
        .map_err(|e| GenError::menu(e.to_string()))?;

        Ok(result.last_insert_id())
    }

    // Hard delete; only compensation calls this.
    async fn delete(&self, id: u64) -> GenResult<()> {
        sqlx::query("DELETE FROM lv_menus WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| GenError::menu(e.to_string()))?;
        Ok(())
    }
}
