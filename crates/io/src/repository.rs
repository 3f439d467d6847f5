//! Storage seam for tables.

use notegrid_engine::CellStyle;

use crate::error::RepositoryError;
use crate::record::{StoredCell, StoredColumn, TableData};

pub type RepoResult<T> = Result<T, RepositoryError>;

/// Durable table storage. Positions are data rows and catalog columns.
///
/// Implementations are shared between the UI thread and background
/// workers, so every method takes `&self`.
pub trait TableRepository: Send + Sync {
    /// Store a new table under an already validated name.
    fn insert_table(&self, name: &str, data: &TableData) -> RepoResult<i64>;

    fn table_name_exists(&self, name: &str) -> RepoResult<bool>;

    fn table_names(&self) -> RepoResult<Vec<(i64, String)>>;

    fn load_table(&self, table_id: i64) -> RepoResult<TableData>;

    /// Replace everything stored for the table.
    fn save_table(&self, table_id: i64, data: &TableData) -> RepoResult<()>;

    fn delete_table(&self, table_id: i64) -> RepoResult<()>;

    /// Set one cell's content, keeping its style.
    fn upsert_cell_content(&self, table_id: i64, row: usize, col: usize, content: &str)
        -> RepoResult<()>;

    /// Set one cell's style, keeping its content.
    fn upsert_cell_style(&self, table_id: i64, row: usize, col: usize, style: &CellStyle)
        -> RepoResult<()>;

    fn set_row_height(&self, table_id: i64, row: usize, height: f32) -> RepoResult<()>;

    /// Stored height at scale 1.0, `None` if the row was never resized.
    fn row_height(&self, table_id: i64, row: usize) -> RepoResult<Option<f32>> {
        let data = self.load_table(table_id)?;
        Ok(data.row_heights.iter().find(|(r, _)| *r == row).map(|(_, h)| *h))
    }

    fn all_cells(&self, table_id: i64) -> RepoResult<Vec<StoredCell>> {
        Ok(self.load_table(table_id)?.cells)
    }

    fn update_column(&self, table_id: i64, column: &StoredColumn) -> RepoResult<()>;
}

/// Trimmed name, or why it can't be used.
pub fn validate_table_name(name: &str, repo: &dyn TableRepository) -> RepoResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(RepositoryError::EmptyName);
    }
    if repo.table_name_exists(name)? {
        return Err(RepositoryError::DuplicateName(name.to_string()));
    }
    Ok(name.to_string())
}

/// Validate the name and store the table.
pub fn create_table(repo: &dyn TableRepository, name: &str, data: &TableData) -> RepoResult<i64> {
    let name = validate_table_name(name, repo)?;
    let id = repo.insert_table(&name, data)?;
    log::info!("created table {id} '{name}'");
    Ok(id)
}
