// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::codec;
use crate::model::{CellValue, Row, SortDirection, SortDirective, Table};

// Display projection: substring filter, then a stable sort by the
// directive's column. The table is never mutated.
pub fn view<'a>(table: &'a Table, search: &str, sort: &SortDirective) -> Vec<&'a Row> {
    let query = search.trim().to_lowercase();
    let mut rows: Vec<&Row> = table
        .rows
        .iter()
        .filter(|row| query.is_empty() || row_matches(table, row, &query))
        .collect();

    if let Some(column_id) = &sort.column_id
        && let Some(column) = table.column(column_id)
    {
        let fallback = CellValue::empty();
        rows.sort_by(|left, right| {
            let a = left.cells.get(column_id).unwrap_or(&fallback);
            let b = right.cells.get(column_id).unwrap_or(&fallback);
            let ordering = codec::compare(a, b, column.column_type);
            match sort.dir {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });
    }

    rows
}

fn row_matches(table: &Table, row: &Row, query: &str) -> bool {
    table.columns.iter().any(|column| {
        row.cells
            .get(&column.id)
            .is_some_and(|value| codec::matches(value, column.column_type, query))
    })
}
