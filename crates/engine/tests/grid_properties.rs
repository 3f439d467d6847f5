// Property-based tests for the grid model.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use std::collections::BTreeSet;

use notegrid_config::Settings;
use notegrid_core::{SortDirection, StableId};
use notegrid_engine::*;
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

/// Arbitrary cell: numbers, currency, percentages, text, blanks.
fn arb_content() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => r"-?[0-9]{1,5}(\.[0-9]{1,2})?",
        1 => r"\$[0-9]{1,3}(,[0-9]{3})?",
        1 => r"[0-9]{1,2}%",
        3 => r"[a-zA-Z]{1,8}",
        2 => Just(String::new()),
    ]
}

/// A table of 1..12 rows x 1..5 columns.
fn arb_table() -> impl Strategy<Value = Vec<Vec<String>>> {
    (1usize..5).prop_flat_map(|cols| {
        proptest::collection::vec(proptest::collection::vec(arb_content(), cols), 1..12)
    })
}

fn build(table: &[Vec<String>]) -> GridModel {
    let cols = table[0].len();
    let cells = table.iter().enumerate().flat_map(|(r, row)| {
        row.iter().enumerate().map(move |(c, v)| (r, c, CellData::text(v.clone())))
    });
    let columns = ColumnCatalog::with_defaults(cols, 120.0).iter().cloned().collect();
    GridModel::from_parts(columns, table.len(), cells, &Settings::default())
}

fn identities(model: &mut GridModel) -> Vec<StableId> {
    let projection = model.projection();
    projection.frozen.iter().chain(&projection.scrollable).map(|c| c.stable_id).collect()
}

#[derive(Debug, Clone)]
enum Op {
    Edit(usize, usize, String),
    InsertRow(usize),
    DeleteRow(usize),
    InsertCol(usize),
    DeleteCol(usize),
    Sort(usize, SortDirection),
    Filter(usize, String),
}

fn arb_op() -> impl Strategy<Value = Op> {
    let direction = prop_oneof![
        Just(SortDirection::Ascending),
        Just(SortDirection::Descending),
        Just(SortDirection::Unsorted),
    ];
    prop_oneof![
        (0usize..14, 0usize..6, arb_content()).prop_map(|(r, c, v)| Op::Edit(r, c, v)),
        (0usize..14).prop_map(Op::InsertRow),
        (0usize..14).prop_map(Op::DeleteRow),
        (0usize..6).prop_map(Op::InsertCol),
        (0usize..6).prop_map(Op::DeleteCol),
        (0usize..6, direction).prop_map(|(c, d)| Op::Sort(c, d)),
        (0usize..6, arb_content()).prop_map(|(c, v)| Op::Filter(c, v)),
    ]
}

fn apply(model: &mut GridModel, op: &Op) -> bool {
    match op {
        Op::Edit(r, c, v) => model.update_cell(*r, *c, v.clone()),
        Op::InsertRow(p) => model.insert_row(*p),
        Op::DeleteRow(p) => model.delete_row_at(*p),
        Op::InsertCol(p) => model.insert_column_at(*p),
        Op::DeleteCol(p) => model.delete_column_at(*p),
        Op::Sort(c, d) => model.sort_by_column(*c, *d),
        Op::Filter(c, v) => {
            let selected: BTreeSet<String> = [v.clone()].into_iter().collect();
            model.filter_by_values(*c, &selected)
        }
    }
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn sort_then_unsorted_restores_order_and_ids(table in arb_table(), col in 0usize..5) {
        let mut model = build(&table);
        let col = col % model.col_count();
        let before = model.derive_projection();
        let ids = identities(&mut model);

        model.sort_by_column(col, SortDirection::Ascending);
        model.sort_by_column(col, SortDirection::Descending);
        model.sort_by_column(col, SortDirection::Unsorted);

        prop_assert_eq!(model.derive_projection(), before);
        prop_assert_eq!(identities(&mut model), ids);
    }

    #[test]
    fn sort_is_idempotent(table in arb_table(), col in 0usize..5, desc in any::<bool>()) {
        let mut model = build(&table);
        let col = col % model.col_count();
        let direction = if desc { SortDirection::Descending } else { SortDirection::Ascending };

        model.sort_by_column(col, direction);
        let once = model.derive_projection();
        model.sort_by_column(col, direction);
        prop_assert_eq!(model.derive_projection(), once);
    }

    #[test]
    fn sorted_column_is_ranked(table in arb_table(), col in 0usize..5, desc in any::<bool>()) {
        let mut model = build(&table);
        let col = col % model.col_count();
        let direction = if desc { SortDirection::Descending } else { SortDirection::Ascending };
        model.sort_by_column(col, direction);

        let values: Vec<String> = model.projection().column(col).into_iter().map(String::from).collect();
        for pair in values.windows(2) {
            prop_assert_ne!(
                compare_contents(&pair[0], &pair[1], direction),
                std::cmp::Ordering::Greater,
                "{:?} before {:?}", pair[0], pair[1]
            );
        }
        // Blanks only at the tail
        if let Some(first_blank) = values.iter().position(|v| v.trim().is_empty()) {
            prop_assert!(values[first_blank..].iter().all(|v| v.trim().is_empty()));
        }
    }

    #[test]
    fn full_value_selection_equals_no_filter(table in arb_table(), col in 0usize..5) {
        let mut model = build(&table);
        let col = col % model.col_count();
        let unfiltered = model.derive_projection();

        let all = model.distinct_values(col);
        model.filter_by_values(col, &all);
        prop_assert_eq!(model.derive_projection(), unfiltered);
        prop_assert!(model.column(col).unwrap().filter.is_none());
    }

    #[test]
    fn filter_rows_all_match(table in arb_table(), col in 0usize..5, pick in 0usize..12) {
        let mut model = build(&table);
        let col = col % model.col_count();
        let values: Vec<String> = model.distinct_values(col).into_iter().collect();
        let chosen = values[pick % values.len()].clone();
        let selected: BTreeSet<String> = [chosen.clone()].into_iter().collect();

        model.filter_by_values(col, &selected);
        let expected = table.iter().filter(|row| row[col] == chosen).count();
        prop_assert_eq!(model.row_count(), expected);
        let projection = model.projection();
        prop_assert_eq!(projection.row_count, expected);
        for (i, cell) in projection.frozen.iter().enumerate() {
            prop_assert_eq!(cell.row, i);
        }
    }

    #[test]
    fn insert_then_delete_restores(table in arb_table(), pos in 0usize..13) {
        let mut model = build(&table);
        let pos = pos % (model.row_count() + 1);
        let before = model.derive_projection();

        prop_assert!(model.insert_row(pos));
        prop_assert_eq!(model.row_count(), table.len() + 1);
        prop_assert!(model.delete_row_at(pos));
        prop_assert_eq!(model.derive_projection(), before);
    }

    #[test]
    fn undo_everything_restores_initial(table in arb_table(), ops in proptest::collection::vec(arb_op(), 1..20)) {
        let mut model = build(&table);
        let initial = model.derive_projection();

        for op in &ops {
            apply(&mut model, op);
            // Invariants hold after every operation
            prop_assert_eq!(model.store().col_count(), model.col_count());
            prop_assert_eq!(model.row_order().row_count(), model.total_row_count());
            prop_assert!(model.total_row_count() >= 1);
            prop_assert!(model.col_count() >= 1);
        }
        let after_ops = model.derive_projection();

        while model.undo() {}
        prop_assert_eq!(model.derive_projection(), initial);

        while model.redo() {}
        prop_assert_eq!(model.derive_projection(), after_ops);
    }
}
