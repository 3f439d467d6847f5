// End-to-end: edit a table through a session, reopen it from SQLite.

use std::sync::Arc;
use std::time::{Duration, Instant};

use notegrid_config::Settings;
use notegrid_core::SortDirection;
use notegrid_engine::CellStyle;
use notegrid_io::*;

#[test]
fn reopened_table_matches_session() {
    let settings = Settings::default();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.db");

    let repo: Arc<dyn TableRepository> = Arc::new(SqliteRepository::open(&path).unwrap());
    let id = create_table(repo.as_ref(), "Expenses", &TableData::blank(3, 3, &settings)).unwrap();

    let mut session = TableSession::open(Arc::clone(&repo), id, &settings).unwrap();
    session.update_cell(0, 0, "rent");
    session.update_cell(0, 1, "$1,200");
    session.update_cell(1, 0, "coffee");
    session.update_cell(1, 1, "4.50");
    session.update_cell(2, 0, "books");
    session.update_cell(2, 1, "35");
    session.update_cell_style(0, 1, CellStyle { bold: true, ..CellStyle::default() });
    session.rename_column(1, "Amount");
    session.sort_by_column(1, SortDirection::Descending);
    let t0 = Instant::now();
    session.resize_row(0, 90.0, 1.5, t0);
    session.tick(t0 + Duration::from_secs(1));
    let before = session.close();
    drop(repo);

    let repo: Arc<dyn TableRepository> = Arc::new(SqliteRepository::open(&path).unwrap());
    let model = load_table(repo, id).wait().unwrap().into_model(&settings);

    let column: Vec<&str> = (0..3).filter_map(|r| model.content(r, 0)).collect();
    assert_eq!(column, vec!["rent", "books", "coffee"]);
    assert_eq!(model.column(1).map(|c| c.name.as_str()), Some("Amount"));
    assert_eq!(model.style(0, 1).map(|s| s.bold), Some(true));
    assert_eq!(model.row_height(0), 60.0);
    assert_eq!(model.row_heights(), before.row_heights());
}

#[test]
fn duplicate_names_rejected() {
    let repo = SqliteRepository::open_in_memory().unwrap();
    let data = TableData::blank(1, 1, &Settings::default());
    create_table(&repo, "Todo", &data).unwrap();
    assert_eq!(
        create_table(&repo, " Todo ", &data),
        Err(RepositoryError::DuplicateName("Todo".into()))
    );
}
