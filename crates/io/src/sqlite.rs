//! SQLite-backed table storage.

use std::path::Path;

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

use notegrid_engine::CellStyle;

use crate::error::RepositoryError;
use crate::record::{StoredCell, StoredColumn, TableData};
use crate::repository::{RepoResult, TableRepository};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS tables (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    row_count INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS columns (
    table_id INTEGER NOT NULL,
    col_index INTEGER NOT NULL,
    name TEXT NOT NULL,
    width REAL NOT NULL,
    col_type TEXT NOT NULL DEFAULT 'TEXT',
    sort TEXT NOT NULL DEFAULT 'unsorted',
    visible INTEGER NOT NULL DEFAULT 1,
    PRIMARY KEY (table_id, col_index)
);

CREATE TABLE IF NOT EXISTS cells (
    table_id INTEGER NOT NULL,
    row_index INTEGER NOT NULL,
    col_index INTEGER NOT NULL,
    content TEXT NOT NULL DEFAULT '',
    style TEXT,                          -- JSON, NULL = default style
    PRIMARY KEY (table_id, row_index, col_index)
);

CREATE TABLE IF NOT EXISTS row_heights (
    table_id INTEGER NOT NULL,
    row_index INTEGER NOT NULL,
    height REAL NOT NULL,                -- at scale 1.0
    PRIMARY KEY (table_id, row_index)
);
"#;

pub struct SqliteRepository {
    conn: Mutex<Connection>,
}

impl SqliteRepository {
    pub fn open(path: &Path) -> RepoResult<Self> {
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> RepoResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> RepoResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn: Mutex::new(conn) })
    }
}

/// Serde unit-variant name, e.g. `CellType::Number` -> "NUMBER".
fn enum_text<T: Serialize>(value: &T) -> RepoResult<String> {
    Ok(serde_json::to_value(value)?.as_str().map(str::to_string).unwrap_or_default())
}

fn enum_from_text<T: DeserializeOwned + Default>(text: &str) -> T {
    serde_json::from_value(serde_json::Value::String(text.to_string())).unwrap_or_default()
}

fn style_text(style: &CellStyle) -> RepoResult<Option<String>> {
    if style.is_default() {
        Ok(None)
    } else {
        Ok(Some(serde_json::to_string(style)?))
    }
}

fn style_from_text(text: Option<String>) -> CellStyle {
    text.and_then(|s| serde_json::from_str(&s).ok()).unwrap_or_default()
}

/// Grow the stored row count to cover `row`; errors if the table is gone.
fn touch_row(conn: &Connection, table_id: i64, row: usize) -> RepoResult<()> {
    let updated = conn.execute(
        "UPDATE tables SET row_count = MAX(row_count, ?2) WHERE id = ?1",
        params![table_id, row as i64 + 1],
    )?;
    if updated == 0 {
        return Err(RepositoryError::TableNotFound(table_id));
    }
    Ok(())
}

fn write_table(conn: &Connection, table_id: i64, data: &TableData) -> RepoResult<()> {
    conn.execute(
        "UPDATE tables SET row_count = ?2 WHERE id = ?1",
        params![table_id, data.row_count as i64],
    )?;
    for table in ["columns", "cells", "row_heights"] {
        conn.execute(&format!("DELETE FROM {table} WHERE table_id = ?1"), params![table_id])?;
    }

    let mut stmt = conn.prepare(
        "INSERT INTO columns (table_id, col_index, name, width, col_type, sort, visible)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )?;
    for c in &data.columns {
        stmt.execute(params![
            table_id,
            c.index as i64,
            c.name,
            c.width as f64,
            enum_text(&c.column_type)?,
            enum_text(&c.sort)?,
            c.visible as i32,
        ])?;
    }

    let mut stmt = conn.prepare(
        "INSERT INTO cells (table_id, row_index, col_index, content, style)
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    for c in &data.cells {
        stmt.execute(params![
            table_id,
            c.row as i64,
            c.col as i64,
            c.content,
            style_text(&c.style)?,
        ])?;
    }

    let mut stmt = conn.prepare(
        "INSERT INTO row_heights (table_id, row_index, height) VALUES (?1, ?2, ?3)",
    )?;
    for (row, height) in &data.row_heights {
        stmt.execute(params![table_id, *row as i64, *height as f64])?;
    }
    Ok(())
}

impl TableRepository for SqliteRepository {
    fn insert_table(&self, name: &str, data: &TableData) -> RepoResult<i64> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        tx.execute("INSERT INTO tables (name) VALUES (?1)", params![name])?;
        let id = tx.last_insert_rowid();
        write_table(&tx, id, data)?;
        tx.commit()?;
        Ok(id)
    }

    fn table_name_exists(&self, name: &str) -> RepoResult<bool> {
        let conn = self.conn.lock();
        let found = conn
            .query_row("SELECT 1 FROM tables WHERE name = ?1", params![name], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }

    fn table_names(&self) -> RepoResult<Vec<(i64, String)>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT id, name FROM tables ORDER BY id")?;
        let names = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    fn load_table(&self, table_id: i64) -> RepoResult<TableData> {
        let conn = self.conn.lock();
        let row_count: i64 = conn
            .query_row("SELECT row_count FROM tables WHERE id = ?1", params![table_id], |row| {
                row.get(0)
            })
            .optional()?
            .ok_or(RepositoryError::TableNotFound(table_id))?;

        let mut stmt = conn.prepare(
            "SELECT col_index, name, width, col_type, sort, visible FROM columns
             WHERE table_id = ?1 ORDER BY col_index",
        )?;
        let columns = stmt
            .query_map(params![table_id], |row| {
                let col_type: String = row.get(3)?;
                let sort: String = row.get(4)?;
                Ok(StoredColumn {
                    index: row.get::<_, i64>(0)?.max(0) as usize,
                    name: row.get(1)?,
                    width: row.get::<_, f64>(2)? as f32,
                    column_type: enum_from_text(&col_type),
                    sort: enum_from_text(&sort),
                    visible: row.get::<_, i32>(5)? != 0,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut stmt = conn.prepare(
            "SELECT row_index, col_index, content, style FROM cells
             WHERE table_id = ?1 ORDER BY row_index, col_index",
        )?;
        let cells = stmt
            .query_map(params![table_id], |row| {
                Ok(StoredCell {
                    row: row.get::<_, i64>(0)?.max(0) as usize,
                    col: row.get::<_, i64>(1)?.max(0) as usize,
                    content: row.get(2)?,
                    style: style_from_text(row.get(3)?),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut stmt = conn.prepare(
            "SELECT row_index, height FROM row_heights WHERE table_id = ?1 ORDER BY row_index",
        )?;
        let row_heights = stmt
            .query_map(params![table_id], |row| {
                Ok((row.get::<_, i64>(0)?.max(0) as usize, row.get::<_, f64>(1)? as f32))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(TableData { columns, cells, row_count: row_count.max(0) as usize, row_heights })
    }

    fn save_table(&self, table_id: i64, data: &TableData) -> RepoResult<()> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let exists = tx
            .query_row("SELECT 1 FROM tables WHERE id = ?1", params![table_id], |_| Ok(()))
            .optional()?;
        if exists.is_none() {
            return Err(RepositoryError::TableNotFound(table_id));
        }
        write_table(&tx, table_id, data)?;
        tx.commit()?;
        Ok(())
    }

    fn delete_table(&self, table_id: i64) -> RepoResult<()> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let deleted = tx.execute("DELETE FROM tables WHERE id = ?1", params![table_id])?;
        if deleted == 0 {
            return Err(RepositoryError::TableNotFound(table_id));
        }
        for table in ["columns", "cells", "row_heights"] {
            tx.execute(&format!("DELETE FROM {table} WHERE table_id = ?1"), params![table_id])?;
        }
        tx.commit()?;
        Ok(())
    }

    fn upsert_cell_content(&self, table_id: i64, row: usize, col: usize, content: &str) -> RepoResult<()> {
        let conn = self.conn.lock();
        touch_row(&conn, table_id, row)?;
        conn.execute(
            "INSERT INTO cells (table_id, row_index, col_index, content) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (table_id, row_index, col_index) DO UPDATE SET content = excluded.content",
            params![table_id, row as i64, col as i64, content],
        )?;
        Ok(())
    }

    fn upsert_cell_style(&self, table_id: i64, row: usize, col: usize, style: &CellStyle) -> RepoResult<()> {
        let conn = self.conn.lock();
        touch_row(&conn, table_id, row)?;
        conn.execute(
            "INSERT INTO cells (table_id, row_index, col_index, style) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (table_id, row_index, col_index) DO UPDATE SET style = excluded.style",
            params![table_id, row as i64, col as i64, style_text(style)?],
        )?;
        Ok(())
    }

    fn set_row_height(&self, table_id: i64, row: usize, height: f32) -> RepoResult<()> {
        let conn = self.conn.lock();
        touch_row(&conn, table_id, row)?;
        conn.execute(
            "INSERT OR REPLACE INTO row_heights (table_id, row_index, height) VALUES (?1, ?2, ?3)",
            params![table_id, row as i64, height as f64],
        )?;
        Ok(())
    }

    fn row_height(&self, table_id: i64, row: usize) -> RepoResult<Option<f32>> {
        let conn = self.conn.lock();
        let height: Option<f64> = conn
            .query_row(
                "SELECT height FROM row_heights WHERE table_id = ?1 AND row_index = ?2",
                params![table_id, row as i64],
                |r| r.get(0),
            )
            .optional()?;
        Ok(height.map(|h| h as f32))
    }

    fn update_column(&self, table_id: i64, column: &StoredColumn) -> RepoResult<()> {
        let conn = self.conn.lock();
        let exists = conn
            .query_row("SELECT 1 FROM tables WHERE id = ?1", params![table_id], |_| Ok(()))
            .optional()?;
        if exists.is_none() {
            return Err(RepositoryError::TableNotFound(table_id));
        }
        conn.execute(
            "INSERT OR REPLACE INTO columns (table_id, col_index, name, width, col_type, sort, visible)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                table_id,
                column.index as i64,
                column.name,
                column.width as f64,
                enum_text(&column.column_type)?,
                enum_text(&column.sort)?,
                column.visible as i32,
            ],
        )?;
        Ok(())
    }
}
