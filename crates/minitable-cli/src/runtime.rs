// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use minitable_app::{
    CellValue, Column, ColumnType, Row, RowId, State, Table, TableId, Theme, parse_column_type,
};
use minitable_store::{StateStore, export_file_name};
use std::fs;
use std::path::PathBuf;
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Tables,
    Use { table: String },
    AddTable { name: String },
    RenameTable { name: String },
    DeleteTable { table: String },
    Columns,
    AddColumn { name: String, column_type: String, options: Vec<String> },
    RenameColumn { column: String, name: String },
    RemoveColumn { column: String },
    ChangeColumnType { column: String, column_type: String, options: Vec<String> },
    AddRow { at: Option<usize> },
    RemoveRow { row: String },
    DuplicateRow { row: String },
    SetCell { row: String, column: String, value: String },
    Rows { query: String },
    Sort { column: String },
    Export { path: Option<PathBuf> },
    Import { path: PathBuf },
    Theme { action: Option<String> },
}

pub fn parse_command(args: &[String]) -> Result<Command> {
    let Some((name, rest)) = args.split_first() else {
        bail!("missing command; run with --help to see supported commands");
    };

    match name.as_str() {
        "tables" => Ok(Command::Tables),
        "use" => match rest {
            [table] => Ok(Command::Use {
                table: table.clone(),
            }),
            _ => bail!("usage: use <table>"),
        },
        "add-table" => match rest {
            [name] => Ok(Command::AddTable { name: name.clone() }),
            _ => bail!("usage: add-table <name>"),
        },
        "rename-table" => match rest {
            [name] => Ok(Command::RenameTable { name: name.clone() }),
            _ => bail!("usage: rename-table <name>"),
        },
        "delete-table" => match rest {
            [table] => Ok(Command::DeleteTable {
                table: table.clone(),
            }),
            _ => bail!("usage: delete-table <table>"),
        },
        "columns" => Ok(Command::Columns),
        "add-column" => match rest {
            [name, column_type, options @ ..] => Ok(Command::AddColumn {
                name: name.clone(),
                column_type: column_type.clone(),
                options: options.to_vec(),
            }),
            _ => bail!("usage: add-column <name> <type> [option ...]"),
        },
        "rename-column" => match rest {
            [column, name] => Ok(Command::RenameColumn {
                column: column.clone(),
                name: name.clone(),
            }),
            _ => bail!("usage: rename-column <column> <name>"),
        },
        "remove-column" => match rest {
            [column] => Ok(Command::RemoveColumn {
                column: column.clone(),
            }),
            _ => bail!("usage: remove-column <column>"),
        },
        "change-column-type" => match rest {
            [column, column_type, options @ ..] => Ok(Command::ChangeColumnType {
                column: column.clone(),
                column_type: column_type.clone(),
                options: options.to_vec(),
            }),
            _ => bail!("usage: change-column-type <column> <type> [option ...]"),
        },
        "add-row" => match rest {
            [] => Ok(Command::AddRow { at: None }),
            [flag, position] if flag == "--at" => {
                let position: usize = position
                    .parse()
                    .with_context(|| format!("invalid row position {position:?}"))?;
                if position == 0 {
                    bail!("row positions are 1-based");
                }
                Ok(Command::AddRow {
                    at: Some(position - 1),
                })
            }
            _ => bail!("usage: add-row [--at <position>]"),
        },
        "remove-row" => match rest {
            [row] => Ok(Command::RemoveRow { row: row.clone() }),
            _ => bail!("usage: remove-row <row>"),
        },
        "duplicate-row" => match rest {
            [row] => Ok(Command::DuplicateRow { row: row.clone() }),
            _ => bail!("usage: duplicate-row <row>"),
        },
        "set-cell" => match rest {
            [row, column, value] => Ok(Command::SetCell {
                row: row.clone(),
                column: column.clone(),
                value: value.clone(),
            }),
            _ => bail!("usage: set-cell <row> <column> <value>"),
        },
        "rows" => Ok(Command::Rows {
            query: rest.join(" "),
        }),
        "sort" => match rest {
            [column] => Ok(Command::Sort {
                column: column.clone(),
            }),
            _ => bail!("usage: sort <column>"),
        },
        "export" => match rest {
            [] => Ok(Command::Export { path: None }),
            [path] => Ok(Command::Export {
                path: Some(PathBuf::from(path)),
            }),
            _ => bail!("usage: export [path]"),
        },
        "import" => match rest {
            [path] => Ok(Command::Import {
                path: PathBuf::from(path),
            }),
            _ => bail!("usage: import <path>"),
        },
        "theme" => match rest {
            [] => Ok(Command::Theme { action: None }),
            [action] => Ok(Command::Theme {
                action: Some(action.clone()),
            }),
            _ => bail!("usage: theme [light|dark|toggle]"),
        },
        unknown => {
            bail!("unknown command {unknown:?}; run with --help to see supported commands")
        }
    }
}

pub fn execute(store: &mut StateStore, command: Command) -> Result<String> {
    match command {
        Command::Tables => Ok(render_tables(store.state())),
        Command::Use { table } => {
            let table_id = resolve_table(store.state(), &table)?;
            store.select_table(&table_id)?;
            Ok(format!("switched to table {table_id}"))
        }
        Command::AddTable { name } => {
            let table_id = store.add_table(&name)?;
            Ok(format!("created table {table_id}"))
        }
        Command::RenameTable { name } => {
            store.rename_table(&name)?;
            Ok(format!("renamed table to {:?}", store.active_table().name))
        }
        Command::DeleteTable { table } => {
            let table_id = resolve_table(store.state(), &table)?;
            store.delete_table(&table_id)?;
            Ok(format!("deleted table {table_id}"))
        }
        Command::Columns => Ok(render_columns(store.active_table())),
        Command::AddColumn {
            name,
            column_type,
            options,
        } => {
            let column_type = parse_column_type(&column_type)?;
            let options = if options.is_empty() {
                None
            } else {
                Some(options)
            };
            let column_id = store.add_column(&name, column_type, options)?;
            Ok(format!("added column {column_id}"))
        }
        Command::RenameColumn { column, name } => {
            let column_id = resolve_column(store.active_table(), &column)?.id.clone();
            store.rename_column(&column_id, &name)?;
            Ok(format!("renamed column {column_id}"))
        }
        Command::RemoveColumn { column } => {
            let column_id = resolve_column(store.active_table(), &column)?.id.clone();
            store.remove_column(&column_id)?;
            Ok(format!("removed column {column_id}"))
        }
        Command::ChangeColumnType {
            column,
            column_type,
            options,
        } => {
            let column_id = resolve_column(store.active_table(), &column)?.id.clone();
            let column_type = parse_column_type(&column_type)?;
            let options = if options.is_empty() {
                None
            } else {
                Some(options)
            };
            store.change_column_type(&column_id, column_type, options)?;
            Ok(format!(
                "column {column_id} is now {}",
                column_type.as_str()
            ))
        }
        Command::AddRow { at } => {
            let row_id = store.add_row(at)?;
            Ok(format!("added row {row_id}"))
        }
        Command::RemoveRow { row } => {
            let row_id = resolve_row(store.active_table(), &row)?;
            store.remove_row(&row_id)?;
            Ok(format!("removed row {row_id}"))
        }
        Command::DuplicateRow { row } => {
            let row_id = resolve_row(store.active_table(), &row)?;
            let copy_id = store.duplicate_row(&row_id)?;
            Ok(format!("duplicated row {row_id} as {copy_id}"))
        }
        Command::SetCell { row, column, value } => {
            let table = store.active_table();
            let column = resolve_column(table, &column)?;
            let column_id = column.id.clone();
            let column_type = column.column_type;
            let row_id = resolve_row(table, &row)?;
            let raw = if column_type == ColumnType::Checkbox {
                CellValue::Bool(parse_checkbox_input(&value)?)
            } else {
                CellValue::from(value)
            };
            store.set_cell(&row_id, &column_id, raw)?;
            Ok(format!("updated {column_id} in {row_id}"))
        }
        Command::Rows { query } => {
            let rows = store.view(&query);
            Ok(render_rows(store.active_table(), &rows))
        }
        Command::Sort { column } => {
            let column_id = resolve_column(store.active_table(), &column)?.id.clone();
            store.sort_by(&column_id)?;
            let table = store.active_table();
            let name = table
                .column(&column_id)
                .map(|column| column.name.clone())
                .unwrap_or_default();
            Ok(format!("sorted by {:?} {}", name, table.sort.dir.as_str()))
        }
        Command::Export { path } => {
            let target = path.unwrap_or_else(|| {
                PathBuf::from(export_file_name(OffsetDateTime::now_utc().date()))
            });
            let snapshot = store.export_snapshot()?;
            fs::write(&target, snapshot)
                .with_context(|| format!("write export file {}", target.display()))?;
            Ok(format!(
                "exported {} tables to {}",
                store.state().tables.len(),
                target.display()
            ))
        }
        Command::Import { path } => {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("read import file {}", path.display()))?;
            store.import_snapshot(&raw)?;
            Ok(format!("imported {} tables", store.state().tables.len()))
        }
        Command::Theme { action } => match action.as_deref() {
            None => Ok(store.theme().as_str().to_owned()),
            Some("toggle") => {
                let next = store.toggle_theme()?;
                Ok(format!("theme set to {}", next.as_str()))
            }
            Some(value) => {
                let theme = Theme::parse(value)
                    .ok_or_else(|| anyhow!("unknown theme {value:?}; use light, dark or toggle"))?;
                store.set_theme(theme)?;
                Ok(format!("theme set to {}", theme.as_str()))
            }
        },
    }
}

fn resolve_table(state: &State, spec: &str) -> Result<TableId> {
    if let Some(table) = state.tables.iter().find(|table| table.id.as_str() == spec) {
        return Ok(table.id.clone());
    }
    let mut named = state
        .tables
        .iter()
        .filter(|table| table.name.eq_ignore_ascii_case(spec));
    match (named.next(), named.next()) {
        (Some(table), None) => Ok(table.id.clone()),
        (Some(_), Some(_)) => bail!("table name {spec:?} is ambiguous; use the table id"),
        (None, _) => bail!("no table with id or name {spec:?}"),
    }
}

fn resolve_column<'a>(table: &'a Table, spec: &str) -> Result<&'a Column> {
    if let Some(column) = table
        .columns
        .iter()
        .find(|column| column.id.as_str() == spec)
    {
        return Ok(column);
    }
    let mut named = table
        .columns
        .iter()
        .filter(|column| column.name.eq_ignore_ascii_case(spec));
    match (named.next(), named.next()) {
        (Some(column), None) => Ok(column),
        (Some(_), Some(_)) => bail!("column name {spec:?} is ambiguous; use the column id"),
        (None, _) => bail!("no column with id or name {spec:?} in table {:?}", table.name),
    }
}

// rows resolve by id or by 1-based position in storage order
fn resolve_row(table: &Table, spec: &str) -> Result<RowId> {
    if let Some(row) = table.rows.iter().find(|row| row.id.as_str() == spec) {
        return Ok(row.id.clone());
    }
    if let Ok(position) = spec.parse::<usize>()
        && position >= 1
        && position <= table.rows.len()
    {
        return Ok(table.rows[position - 1].id.clone());
    }
    bail!("no row with id or position {spec:?} in table {:?}", table.name)
}

fn parse_checkbox_input(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Ok(true),
        "" | "0" | "false" | "off" | "no" => Ok(false),
        other => bail!("cannot read {other:?} as a checkbox value; use true or false"),
    }
}

fn render_tables(state: &State) -> String {
    state
        .tables
        .iter()
        .map(|table| {
            let marker = if table.id == state.active_table_id {
                "*"
            } else {
                " "
            };
            format!(
                "{marker} {}  {}  ({} rows)",
                table.id,
                table.name,
                table.rows.len()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_columns(table: &Table) -> String {
    table
        .columns
        .iter()
        .map(|column| {
            let mut line = format!(
                "{}  {}  [{}]",
                column.id,
                column.name,
                column.column_type.label()
            );
            if let Some(options) = &column.options {
                line.push_str(&format!("  ({})", options.join(", ")));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_rows(table: &Table, rows: &[&Row]) -> String {
    let header = table
        .columns
        .iter()
        .map(|column| column.name.clone())
        .collect::<Vec<_>>()
        .join(" | ");
    let mut lines = vec![format!("#  id  {header}")];
    for (index, row) in rows.iter().enumerate() {
        let cells = table
            .columns
            .iter()
            .map(|column| {
                row.cells
                    .get(&column.id)
                    .map(CellValue::display)
                    .unwrap_or_default()
            })
            .collect::<Vec<_>>()
            .join(" | ");
        lines.push(format!("{}  {}  {cells}", index + 1, row.id));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::{Command, execute, parse_command};
    use anyhow::Result;
    use minitable_store::{KvStore, STATE_KEY, StateStore};
    use minitable_testkit::demo_state;
    use std::path::PathBuf;

    fn args(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|part| (*part).to_owned()).collect()
    }

    fn memory_store() -> Result<StateStore> {
        Ok(StateStore::open(KvStore::open_memory()?))
    }

    fn demo_store() -> Result<StateStore> {
        let kv = KvStore::open_memory()?;
        kv.put(STATE_KEY, &serde_json::to_string(&demo_state(9, 4))?)?;
        Ok(StateStore::open(kv))
    }

    #[test]
    fn parse_command_covers_structural_edits() -> Result<()> {
        assert_eq!(parse_command(&args(&["tables"]))?, Command::Tables);
        assert_eq!(
            parse_command(&args(&["add-table", "Sprint"]))?,
            Command::AddTable {
                name: "Sprint".to_owned()
            }
        );
        assert_eq!(
            parse_command(&args(&["add-column", "Status", "select", "New", "Done"]))?,
            Command::AddColumn {
                name: "Status".to_owned(),
                column_type: "select".to_owned(),
                options: vec!["New".to_owned(), "Done".to_owned()],
            }
        );
        assert_eq!(
            parse_command(&args(&["add-row", "--at", "2"]))?,
            Command::AddRow { at: Some(1) }
        );
        assert_eq!(
            parse_command(&args(&["set-cell", "1", "Name", "Task A"]))?,
            Command::SetCell {
                row: "1".to_owned(),
                column: "Name".to_owned(),
                value: "Task A".to_owned(),
            }
        );
        assert_eq!(
            parse_command(&args(&["rows", "task", "a"]))?,
            Command::Rows {
                query: "task a".to_owned()
            }
        );
        assert_eq!(
            parse_command(&args(&["export"]))?,
            Command::Export { path: None }
        );
        assert_eq!(
            parse_command(&args(&["import", "backup.json"]))?,
            Command::Import {
                path: PathBuf::from("backup.json")
            }
        );
        Ok(())
    }

    #[test]
    fn parse_command_rejects_bad_usage() {
        for bad in [
            vec!["use"],
            vec!["add-column", "Status"],
            vec!["add-row", "--at", "zero"],
            vec!["add-row", "--at", "0"],
            vec!["set-cell", "1", "Name"],
            vec!["wat"],
        ] {
            assert!(
                parse_command(&args(&bad)).is_err(),
                "expected failure for {bad:?}"
            );
        }
        assert!(parse_command(&[]).is_err());
    }

    #[test]
    fn task_scenario_round_trip() -> Result<()> {
        let mut store = memory_store()?;

        execute(&mut store, parse_command(&args(&["add-row"]))?)?;
        execute(
            &mut store,
            parse_command(&args(&["set-cell", "1", "Name", "Task A"]))?,
        )?;
        execute(&mut store, parse_command(&args(&["add-row"]))?)?;
        execute(
            &mut store,
            parse_command(&args(&["set-cell", "2", "Name", "Task B"]))?,
        )?;

        let output = execute(&mut store, parse_command(&args(&["rows", "task", "a"]))?)?;
        assert!(output.contains("Task A"));
        assert!(!output.contains("Task B"));
        Ok(())
    }

    #[test]
    fn columns_can_be_addressed_by_name() -> Result<()> {
        let mut store = memory_store()?;
        execute(
            &mut store,
            parse_command(&args(&["add-column", "Done", "checkbox"]))?,
        )?;
        execute(&mut store, parse_command(&args(&["add-row"]))?)?;
        execute(
            &mut store,
            parse_command(&args(&["set-cell", "1", "done", "yes"]))?,
        )?;

        let table = store.active_table();
        let done = &table.columns[1];
        assert_eq!(
            table.rows[0].cells[&done.id],
            minitable_app::CellValue::Bool(true)
        );
        Ok(())
    }

    #[test]
    fn set_cell_rejects_unreadable_checkbox_values() -> Result<()> {
        let mut store = memory_store()?;
        execute(
            &mut store,
            parse_command(&args(&["add-column", "Done", "checkbox"]))?,
        )?;
        execute(&mut store, parse_command(&args(&["add-row"]))?)?;

        let err = execute(
            &mut store,
            parse_command(&args(&["set-cell", "1", "Done", "maybe"]))?,
        )
        .expect_err("unreadable checkbox value should fail");
        assert!(err.to_string().contains("checkbox"));
        Ok(())
    }

    #[test]
    fn table_lifecycle_via_commands() -> Result<()> {
        let mut store = memory_store()?;

        execute(&mut store, parse_command(&args(&["add-table", "Sprint"]))?)?;
        assert_eq!(store.active_table().name, "Sprint");

        let listing = execute(&mut store, parse_command(&args(&["tables"]))?)?;
        assert!(listing.contains("My Table"));
        assert!(listing.contains("Sprint"));

        execute(&mut store, parse_command(&args(&["use", "my table"]))?)?;
        assert_eq!(store.active_table().name, "My Table");

        execute(
            &mut store,
            parse_command(&args(&["delete-table", "Sprint"]))?,
        )?;
        assert_eq!(store.state().tables.len(), 1);

        let err = execute(
            &mut store,
            parse_command(&args(&["delete-table", "My Table"]))?,
        )
        .expect_err("sole table must survive");
        assert!(err.to_string().contains("last table"));
        Ok(())
    }

    #[test]
    fn sort_command_toggles_direction() -> Result<()> {
        let mut store = demo_store()?;

        let first = execute(&mut store, parse_command(&args(&["sort", "Points"]))?)?;
        assert!(first.contains("asc"));
        let second = execute(&mut store, parse_command(&args(&["sort", "Points"]))?)?;
        assert!(second.contains("desc"));
        Ok(())
    }

    #[test]
    fn export_then_import_round_trips_through_files() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let export_path = temp.path().join("snapshot.json");

        let mut source = demo_store()?;
        let expected = source.state().clone();
        execute(
            &mut source,
            Command::Export {
                path: Some(export_path.clone()),
            },
        )?;

        let raw = std::fs::read_to_string(&export_path)?;
        let parsed: serde_json::Value = serde_json::from_str(&raw)?;
        assert!(parsed.get("activeTableId").is_some());

        let mut target = memory_store()?;
        let output = execute(
            &mut target,
            Command::Import {
                path: export_path.clone(),
            },
        )?;
        assert_eq!(output, "imported 2 tables");
        assert_eq!(target.state(), &expected);
        Ok(())
    }

    #[test]
    fn theme_command_reports_and_toggles() -> Result<()> {
        let mut store = memory_store()?;
        assert_eq!(
            execute(&mut store, parse_command(&args(&["theme"]))?)?,
            "light"
        );
        execute(&mut store, parse_command(&args(&["theme", "dark"]))?)?;
        assert_eq!(
            execute(&mut store, parse_command(&args(&["theme"]))?)?,
            "dark"
        );
        let toggled = execute(&mut store, parse_command(&args(&["theme", "toggle"]))?)?;
        assert!(toggled.contains("light"));

        let err = execute(&mut store, parse_command(&args(&["theme", "sepia"]))?)
            .expect_err("unknown theme should fail");
        assert!(err.to_string().contains("unknown theme"));
        Ok(())
    }

    #[test]
    fn duplicate_row_lands_after_source() -> Result<()> {
        let mut store = demo_store()?;
        let original_first = store.active_table().rows[0].id.clone();
        let before = store.active_table().rows.len();

        execute(&mut store, parse_command(&args(&["duplicate-row", "1"]))?)?;

        let table = store.active_table();
        assert_eq!(table.rows.len(), before + 1);
        assert_eq!(table.rows[0].id, original_first);
        assert_ne!(table.rows[1].id, original_first);

        let source_cells: Vec<String> = table
            .columns
            .iter()
            .map(|column| table.rows[0].cells[&column.id].display())
            .collect();
        let copy_cells: Vec<String> = table
            .columns
            .iter()
            .map(|column| table.rows[1].cells[&column.id].display())
            .collect();
        assert_eq!(source_cells, copy_cells);
        Ok(())
    }
}
