// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::codec;
use crate::ids::*;

pub const DEFAULT_COLUMN_NAME: &str = "Name";
pub const DEFAULT_TABLE_NAME: &str = "My Table";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Text,
    Number,
    Date,
    Checkbox,
    Select,
}

impl ColumnType {
    pub const ALL: [Self; 5] = [
        Self::Text,
        Self::Number,
        Self::Date,
        Self::Checkbox,
        Self::Select,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Date => "date",
            Self::Checkbox => "checkbox",
            Self::Select => "select",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "text" => Some(Self::Text),
            "number" => Some(Self::Number),
            "date" => Some(Self::Date),
            "checkbox" => Some(Self::Checkbox),
            "select" => Some(Self::Select),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Number => "num",
            Self::Date => "date",
            Self::Checkbox => "chk",
            Self::Select => "list",
        }
    }
}

// A cell is raw JSON on the wire: bool, number, or string. The owning
// column's declared type decides how the value is read, and Text("")
// doubles as the unset sentinel for number and date cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    pub fn empty() -> Self {
        Self::Text(String::new())
    }

    pub fn display(&self) -> String {
        match self {
            Self::Bool(true) => "true".to_owned(),
            Self::Bool(false) => "false".to_owned(),
            Self::Number(value) => value.to_string(),
            Self::Text(value) => value.clone(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

impl Column {
    // options are select-only vocabulary; any other type drops them
    pub fn create(
        name: impl Into<String>,
        column_type: ColumnType,
        options: Option<Vec<String>>,
    ) -> Self {
        let options = if column_type == ColumnType::Select {
            Some(options.unwrap_or_default())
        } else {
            None
        };
        Self {
            id: ColumnId::generate(),
            name: name.into(),
            column_type,
            options,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub id: RowId,
    pub cells: BTreeMap<ColumnId, CellValue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub const fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortDirective {
    pub column_id: Option<ColumnId>,
    pub dir: SortDirection,
}

impl Default for SortDirective {
    fn default() -> Self {
        Self {
            column_id: None,
            dir: SortDirection::Asc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub id: TableId,
    pub name: String,
    pub columns: Vec<Column>,
    pub rows: Vec<Row>,
    #[serde(default)]
    pub sort: SortDirective,
}

impl Table {
    pub fn create(name: impl Into<String>) -> Self {
        Self {
            id: TableId::generate(),
            name: name.into(),
            columns: vec![Column::create(DEFAULT_COLUMN_NAME, ColumnType::Text, None)],
            rows: Vec::new(),
            sort: SortDirective::default(),
        }
    }

    pub fn column(&self, column_id: &ColumnId) -> Option<&Column> {
        self.columns.iter().find(|column| &column.id == column_id)
    }

    pub fn column_mut(&mut self, column_id: &ColumnId) -> Option<&mut Column> {
        self.columns
            .iter_mut()
            .find(|column| &column.id == column_id)
    }

    pub fn row(&self, row_id: &RowId) -> Option<&Row> {
        self.rows.iter().find(|row| &row.id == row_id)
    }

    pub fn blank_row(&self) -> Row {
        let cells = self
            .columns
            .iter()
            .map(|column| (column.id.clone(), codec::default_value(column.column_type)))
            .collect();
        Row {
            id: RowId::generate(),
            cells,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct State {
    pub active_table_id: TableId,
    pub tables: Vec<Table>,
}

impl State {
    pub fn bootstrap() -> Self {
        let table = Table::create(DEFAULT_TABLE_NAME);
        Self {
            active_table_id: table.id.clone(),
            tables: vec![table],
        }
    }

    pub fn table(&self, table_id: &TableId) -> Option<&Table> {
        self.tables.iter().find(|table| &table.id == table_id)
    }

    pub fn table_mut(&mut self, table_id: &TableId) -> Option<&mut Table> {
        self.tables.iter_mut().find(|table| &table.id == table_id)
    }

    // tables is never empty; a dangling active id falls back to the first table
    pub fn active_table(&self) -> &Table {
        self.tables
            .iter()
            .find(|table| table.id == self.active_table_id)
            .unwrap_or(&self.tables[0])
    }

    pub fn active_table_mut(&mut self) -> &mut Table {
        let index = self
            .tables
            .iter()
            .position(|table| table.id == self.active_table_id)
            .unwrap_or(0);
        &mut self.tables[index]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}
