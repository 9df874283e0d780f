// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeSet;

use crate::codec;
use crate::ids::{ColumnId, RowId, TableId};
use crate::model::{CellValue, Column, ColumnType, SortDirection, State, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelError {
    EmptyName,
    UnknownColumnType,
    UnknownTable,
    UnknownColumn,
    UnknownRow,
    LastTable,
    MalformedSnapshot,
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => f.write_str("name must not be empty"),
            Self::UnknownColumnType => {
                f.write_str("unknown column type; expected text, number, date, checkbox or select")
            }
            Self::UnknownTable => f.write_str("table not found"),
            Self::UnknownColumn => f.write_str("column not found"),
            Self::UnknownRow => f.write_str("row not found"),
            Self::LastTable => f.write_str("the last table cannot be deleted"),
            Self::MalformedSnapshot => f.write_str("snapshot has no tables"),
        }
    }
}

impl std::error::Error for ModelError {}

pub type ModelResult<T> = std::result::Result<T, ModelError>;

pub fn parse_column_type(raw: &str) -> ModelResult<ColumnType> {
    ColumnType::parse(raw.trim().to_lowercase().as_str()).ok_or(ModelError::UnknownColumnType)
}

fn trimmed_name(name: &str) -> ModelResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ModelError::EmptyName);
    }
    Ok(trimmed.to_owned())
}

impl Table {
    pub fn add_column(
        &mut self,
        name: &str,
        column_type: ColumnType,
        options: Option<Vec<String>>,
    ) -> ModelResult<ColumnId> {
        let name = trimmed_name(name)?;
        let column = Column::create(name, column_type, options);
        let column_id = column.id.clone();
        for row in &mut self.rows {
            row.cells
                .insert(column_id.clone(), codec::default_value(column_type));
        }
        self.columns.push(column);
        Ok(column_id)
    }

    pub fn remove_column(&mut self, column_id: &ColumnId) -> ModelResult<()> {
        if self.column(column_id).is_none() {
            return Err(ModelError::UnknownColumn);
        }
        self.columns.retain(|column| &column.id != column_id);
        for row in &mut self.rows {
            row.cells.remove(column_id);
        }
        if self.sort.column_id.as_ref() == Some(column_id) {
            self.sort.column_id = None;
        }
        Ok(())
    }

    pub fn rename(&mut self, name: &str) -> ModelResult<()> {
        self.name = trimmed_name(name)?;
        Ok(())
    }

    pub fn rename_column(&mut self, column_id: &ColumnId, name: &str) -> ModelResult<()> {
        let name = trimmed_name(name)?;
        let column = self
            .column_mut(column_id)
            .ok_or(ModelError::UnknownColumn)?;
        column.name = name;
        Ok(())
    }

    // Cell values are left as stored; they re-coerce on the next edit.
    pub fn change_column_type(
        &mut self,
        column_id: &ColumnId,
        new_type: ColumnType,
        new_options: Option<Vec<String>>,
    ) -> ModelResult<()> {
        let column = self
            .column_mut(column_id)
            .ok_or(ModelError::UnknownColumn)?;
        let options = if new_type == ColumnType::Select {
            Some(new_options.unwrap_or_else(|| column.options.clone().unwrap_or_default()))
        } else {
            None
        };
        column.column_type = new_type;
        column.options = options;
        Ok(())
    }

    pub fn add_row(&mut self, at_index: Option<usize>) -> RowId {
        let row = self.blank_row();
        let row_id = row.id.clone();
        let index = at_index.unwrap_or(self.rows.len()).min(self.rows.len());
        self.rows.insert(index, row);
        row_id
    }

    pub fn remove_row(&mut self, row_id: &RowId) -> ModelResult<()> {
        let index = self
            .rows
            .iter()
            .position(|row| &row.id == row_id)
            .ok_or(ModelError::UnknownRow)?;
        self.rows.remove(index);
        Ok(())
    }

    pub fn duplicate_row(&mut self, row_id: &RowId) -> ModelResult<RowId> {
        let index = self
            .rows
            .iter()
            .position(|row| &row.id == row_id)
            .ok_or(ModelError::UnknownRow)?;
        let mut copy = self.rows[index].clone();
        copy.id = RowId::generate();
        let copy_id = copy.id.clone();
        self.rows.insert(index + 1, copy);
        Ok(copy_id)
    }

    pub fn set_cell(
        &mut self,
        row_id: &RowId,
        column_id: &ColumnId,
        raw: CellValue,
    ) -> ModelResult<()> {
        let column_type = self
            .column(column_id)
            .ok_or(ModelError::UnknownColumn)?
            .column_type;
        let row = self
            .rows
            .iter_mut()
            .find(|row| &row.id == row_id)
            .ok_or(ModelError::UnknownRow)?;
        row.cells
            .insert(column_id.clone(), codec::coerce(raw, column_type));
        Ok(())
    }

    // Repeat on the sorted column flips direction; anything else starts ascending.
    pub fn sort_by(&mut self, column_id: &ColumnId) -> ModelResult<()> {
        if self.column(column_id).is_none() {
            return Err(ModelError::UnknownColumn);
        }
        if self.sort.column_id.as_ref() == Some(column_id) {
            self.sort.dir = self.sort.dir.toggled();
        } else {
            self.sort.column_id = Some(column_id.clone());
            self.sort.dir = SortDirection::Asc;
        }
        Ok(())
    }
}

impl State {
    pub fn add_table(&mut self, name: &str) -> ModelResult<TableId> {
        let name = trimmed_name(name)?;
        let table = Table::create(name);
        let table_id = table.id.clone();
        self.tables.push(table);
        self.active_table_id = table_id.clone();
        Ok(table_id)
    }

    pub fn select_table(&mut self, table_id: &TableId) -> ModelResult<()> {
        if self.table(table_id).is_none() {
            return Err(ModelError::UnknownTable);
        }
        self.active_table_id = table_id.clone();
        Ok(())
    }

    pub fn delete_table(&mut self, table_id: &TableId) -> ModelResult<()> {
        let index = self
            .tables
            .iter()
            .position(|table| &table.id == table_id)
            .ok_or(ModelError::UnknownTable)?;
        if self.tables.len() == 1 {
            return Err(ModelError::LastTable);
        }
        self.tables.remove(index);
        if &self.active_table_id == table_id {
            self.active_table_id = self.tables[0].id.clone();
        }
        Ok(())
    }

    pub fn rename_table(&mut self, table_id: &TableId, name: &str) -> ModelResult<()> {
        let name = trimmed_name(name)?;
        let table = self.table_mut(table_id).ok_or(ModelError::UnknownTable)?;
        table.name = name;
        Ok(())
    }

    // Repairs a decoded snapshot: cell keys must match the column set,
    // the active id must resolve, the sort must reference a live column.
    pub fn normalize(&mut self) {
        for table in &mut self.tables {
            let column_ids: BTreeSet<ColumnId> =
                table.columns.iter().map(|column| column.id.clone()).collect();
            for row in &mut table.rows {
                row.cells.retain(|column_id, _| column_ids.contains(column_id));
                for column in &table.columns {
                    row.cells
                        .entry(column.id.clone())
                        .or_insert_with(|| codec::default_value(column.column_type));
                }
            }
            if table
                .sort
                .column_id
                .as_ref()
                .is_some_and(|column_id| !column_ids.contains(column_id))
            {
                table.sort.column_id = None;
            }
        }
        if self.table(&self.active_table_id).is_none() {
            self.active_table_id = self.tables[0].id.clone();
        }
    }
}
