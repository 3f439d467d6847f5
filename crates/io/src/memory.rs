//! In-process repository, used for tests and scratch tables.

use std::collections::BTreeMap;

use parking_lot::Mutex;

use notegrid_engine::CellStyle;

use crate::error::RepositoryError;
use crate::record::{StoredCell, StoredColumn, TableData};
use crate::repository::{RepoResult, TableRepository};

#[derive(Debug, Default)]
struct Tables {
    next_id: i64,
    tables: BTreeMap<i64, (String, TableData)>,
}

#[derive(Debug, Default)]
pub struct MemoryRepository {
    inner: Mutex<Tables>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_table<T>(
        &self,
        table_id: i64,
        f: impl FnOnce(&mut TableData) -> T,
    ) -> RepoResult<T> {
        let mut inner = self.inner.lock();
        let (_, data) = inner
            .tables
            .get_mut(&table_id)
            .ok_or(RepositoryError::TableNotFound(table_id))?;
        Ok(f(data))
    }
}

fn cell_slot<'a>(data: &'a mut TableData, row: usize, col: usize) -> &'a mut StoredCell {
    let pos = match data.cells.binary_search_by_key(&(row, col), |c| (c.row, c.col)) {
        Ok(pos) => pos,
        Err(pos) => {
            data.cells.insert(
                pos,
                StoredCell { row, col, content: String::new(), style: CellStyle::default() },
            );
            pos
        }
    };
    data.row_count = data.row_count.max(row + 1);
    &mut data.cells[pos]
}

impl TableRepository for MemoryRepository {
    fn insert_table(&self, name: &str, data: &TableData) -> RepoResult<i64> {
        let mut inner = self.inner.lock();
        inner.next_id += 1;
        let id = inner.next_id;
        let mut data = data.clone();
        data.cells.sort_by_key(|c| (c.row, c.col));
        inner.tables.insert(id, (name.to_string(), data));
        Ok(id)
    }

    fn table_name_exists(&self, name: &str) -> RepoResult<bool> {
        Ok(self.inner.lock().tables.values().any(|(n, _)| n == name))
    }

    fn table_names(&self) -> RepoResult<Vec<(i64, String)>> {
        Ok(self.inner.lock().tables.iter().map(|(id, (n, _))| (*id, n.clone())).collect())
    }

    fn load_table(&self, table_id: i64) -> RepoResult<TableData> {
        self.with_table(table_id, |data| data.clone())
    }

    fn save_table(&self, table_id: i64, data: &TableData) -> RepoResult<()> {
        let mut data = data.clone();
        data.cells.sort_by_key(|c| (c.row, c.col));
        self.with_table(table_id, |slot| *slot = data)
    }

    fn delete_table(&self, table_id: i64) -> RepoResult<()> {
        self.inner
            .lock()
            .tables
            .remove(&table_id)
            .map(|_| ())
            .ok_or(RepositoryError::TableNotFound(table_id))
    }

    fn upsert_cell_content(&self, table_id: i64, row: usize, col: usize, content: &str) -> RepoResult<()> {
        self.with_table(table_id, |data| {
            cell_slot(data, row, col).content = content.to_string();
        })
    }

    fn upsert_cell_style(&self, table_id: i64, row: usize, col: usize, style: &CellStyle) -> RepoResult<()> {
        self.with_table(table_id, |data| {
            cell_slot(data, row, col).style = style.clone();
        })
    }

    fn set_row_height(&self, table_id: i64, row: usize, height: f32) -> RepoResult<()> {
        self.with_table(table_id, |data| {
            match data.row_heights.iter_mut().find(|(r, _)| *r == row) {
                Some(entry) => entry.1 = height,
                None => {
                    data.row_heights.push((row, height));
                    data.row_heights.sort_by_key(|(r, _)| *r);
                }
            }
        })
    }

    fn update_column(&self, table_id: i64, column: &StoredColumn) -> RepoResult<()> {
        self.with_table(table_id, |data| {
            match data.columns.iter_mut().find(|c| c.index == column.index) {
                Some(slot) => *slot = column.clone(),
                None => data.columns.push(column.clone()),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{create_table, validate_table_name};
    use notegrid_config::Settings;

    #[test]
    fn test_name_validation() {
        let repo = MemoryRepository::new();
        let data = TableData::blank(2, 2, &Settings::default());
        assert_eq!(create_table(&repo, "  ", &data), Err(RepositoryError::EmptyName));
        let id = create_table(&repo, " Groceries ", &data).unwrap();
        assert_eq!(repo.table_names().unwrap(), vec![(id, "Groceries".to_string())]);
        assert_eq!(
            validate_table_name("Groceries", &repo),
            Err(RepositoryError::DuplicateName("Groceries".into()))
        );
    }

    #[test]
    fn test_cell_upserts() {
        let repo = MemoryRepository::new();
        let id = repo.insert_table("t", &TableData::default()).unwrap();
        repo.upsert_cell_content(id, 2, 1, "hi").unwrap();
        let bold = CellStyle { bold: true, ..CellStyle::default() };
        repo.upsert_cell_style(id, 2, 1, &bold).unwrap();
        repo.upsert_cell_content(id, 0, 0, "first").unwrap();

        let data = repo.load_table(id).unwrap();
        assert_eq!(data.row_count, 3);
        assert_eq!(data.cells[0].content, "first");
        assert_eq!(data.cells[1].content, "hi");
        assert!(data.cells[1].style.bold);

        repo.set_row_height(id, 1, 52.0).unwrap();
        assert_eq!(repo.row_height(id, 1).unwrap(), Some(52.0));
        assert_eq!(repo.row_height(id, 2).unwrap(), None);
        assert_eq!(repo.all_cells(id).unwrap().len(), 2);
    }

    #[test]
    fn test_missing_table() {
        let repo = MemoryRepository::new();
        assert_eq!(repo.load_table(9), Err(RepositoryError::TableNotFound(9)));
        assert_eq!(repo.set_row_height(9, 0, 10.0), Err(RepositoryError::TableNotFound(9)));
        assert_eq!(repo.delete_table(9), Err(RepositoryError::TableNotFound(9)));
    }
}
