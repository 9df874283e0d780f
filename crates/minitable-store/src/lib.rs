// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use minitable_app::{
    CellValue, ColumnId, ColumnType, ModelError, Row, RowId, State, Table, TableId, Theme,
};
use rusqlite::{Connection, OptionalExtension, params};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use time::Date;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;

pub const APP_NAME: &str = "minitable";
pub const STATE_KEY: &str = "minitable_state_v1";
pub const THEME_KEY: &str = "minitable_theme";

// The string key-value collaborator, backed by a single SQLite table.
pub struct KvStore {
    conn: Connection,
}

impl KvStore {
    pub fn open(path: &Path) -> Result<Self> {
        let printable = path.to_string_lossy().to_string();
        validate_db_path(&printable)?;
        let conn = Connection::open(path)
            .with_context(|| format!("open database at {}", path.display()))?;
        configure_connection(&conn)?;
        let store = Self { conn };
        store.bootstrap()?;
        Ok(store)
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory database")?;
        configure_connection(&conn)?;
        let store = Self { conn };
        store.bootstrap()?;
        Ok(store)
    }

    fn bootstrap(&self) -> Result<()> {
        self.conn
            .execute_batch(include_str!("sql/schema.sql"))
            .context("create schema")
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .with_context(|| format!("read key {key}"))
    }

    pub fn put(&self, key: &str, value: &str) -> Result<()> {
        let now = now_rfc3339()?;
        self.conn
            .execute(
                "
                INSERT INTO kv_entries (key, value, updated_at)
                VALUES (?, ?, ?)
                ON CONFLICT(key) DO UPDATE SET
                  value = excluded.value,
                  updated_at = excluded.updated_at
                ",
                params![key, value, now],
            )
            .with_context(|| format!("upsert key {key}"))?;
        Ok(())
    }
}

// Owns the single in-memory State; every successful mutation writes it
// through to the collaborator.
pub struct StateStore {
    kv: KvStore,
    state: State,
}

impl StateStore {
    // Loading never errors: an absent key, unreadable payload, or a
    // snapshot without tables silently becomes a fresh default state.
    pub fn open(kv: KvStore) -> Self {
        let state = load_state(&kv);
        Self { kv, state }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn active_table(&self) -> &Table {
        self.state.active_table()
    }

    // Unconditional full-state overwrite; last writer wins. A failure
    // here leaves the in-memory state intact and usable.
    pub fn save(&self) -> Result<()> {
        let raw = serde_json::to_string(&self.state).context("serialize state")?;
        self.kv.put(STATE_KEY, &raw).context("write application state")
    }

    pub fn export_snapshot(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.state).context("serialize state snapshot")
    }

    // Wholesale replacement, not a merge. The incoming text must carry
    // a non-empty tables list or the current state stays untouched.
    pub fn import_snapshot(&mut self, raw: &str) -> Result<()> {
        let state = decode_state(raw)?;
        self.state = state;
        self.save()
    }

    pub fn theme(&self) -> Theme {
        match self.kv.get(THEME_KEY) {
            Ok(Some(raw)) => Theme::parse(&raw).unwrap_or(Theme::Light),
            _ => Theme::Light,
        }
    }

    pub fn set_theme(&self, theme: Theme) -> Result<()> {
        self.kv
            .put(THEME_KEY, theme.as_str())
            .context("write theme preference")
    }

    pub fn toggle_theme(&self) -> Result<Theme> {
        let next = self.theme().toggled();
        self.set_theme(next)?;
        Ok(next)
    }

    pub fn add_table(&mut self, name: &str) -> Result<TableId> {
        let table_id = self.state.add_table(name)?;
        self.save()?;
        Ok(table_id)
    }

    pub fn select_table(&mut self, table_id: &TableId) -> Result<()> {
        self.state.select_table(table_id)?;
        self.save()
    }

    pub fn delete_table(&mut self, table_id: &TableId) -> Result<()> {
        self.state.delete_table(table_id)?;
        self.save()
    }

    pub fn rename_table(&mut self, name: &str) -> Result<()> {
        let table_id = self.state.active_table().id.clone();
        self.state.rename_table(&table_id, name)?;
        self.save()
    }

    pub fn add_column(
        &mut self,
        name: &str,
        column_type: ColumnType,
        options: Option<Vec<String>>,
    ) -> Result<ColumnId> {
        let column_id = self
            .state
            .active_table_mut()
            .add_column(name, column_type, options)?;
        self.save()?;
        Ok(column_id)
    }

    pub fn remove_column(&mut self, column_id: &ColumnId) -> Result<()> {
        self.state.active_table_mut().remove_column(column_id)?;
        self.save()
    }

    pub fn rename_column(&mut self, column_id: &ColumnId, name: &str) -> Result<()> {
        self.state
            .active_table_mut()
            .rename_column(column_id, name)?;
        self.save()
    }

    pub fn change_column_type(
        &mut self,
        column_id: &ColumnId,
        new_type: ColumnType,
        new_options: Option<Vec<String>>,
    ) -> Result<()> {
        self.state
            .active_table_mut()
            .change_column_type(column_id, new_type, new_options)?;
        self.save()
    }

    pub fn add_row(&mut self, at_index: Option<usize>) -> Result<RowId> {
        let row_id = self.state.active_table_mut().add_row(at_index);
        self.save()?;
        Ok(row_id)
    }

    pub fn remove_row(&mut self, row_id: &RowId) -> Result<()> {
        self.state.active_table_mut().remove_row(row_id)?;
        self.save()
    }

    pub fn duplicate_row(&mut self, row_id: &RowId) -> Result<RowId> {
        let copy_id = self.state.active_table_mut().duplicate_row(row_id)?;
        self.save()?;
        Ok(copy_id)
    }

    pub fn set_cell(&mut self, row_id: &RowId, column_id: &ColumnId, raw: CellValue) -> Result<()> {
        self.state
            .active_table_mut()
            .set_cell(row_id, column_id, raw)?;
        self.save()
    }

    pub fn sort_by(&mut self, column_id: &ColumnId) -> Result<()> {
        self.state.active_table_mut().sort_by(column_id)?;
        self.save()
    }

    pub fn view(&self, search: &str) -> Vec<&Row> {
        let table = self.active_table();
        minitable_app::view(table, search, &table.sort)
    }
}

pub fn export_file_name(date: Date) -> String {
    let stamp = date
        .format(&format_description!("[year]-[month]-[day]"))
        .expect("date format is valid");
    format!("minitable-{stamp}.json")
}

pub fn default_db_path() -> Result<PathBuf> {
    if let Some(override_path) = env::var_os("MINITABLE_DB_PATH") {
        return Ok(PathBuf::from(override_path));
    }

    let data_root = dirs::data_local_dir().ok_or_else(|| {
        anyhow!("cannot resolve data directory; set MINITABLE_DB_PATH to a writable database path")
    })?;

    let app_dir = data_root.join(APP_NAME);
    fs::create_dir_all(&app_dir)
        .with_context(|| format!("create data directory {}", app_dir.display()))?;
    Ok(app_dir.join("minitable.db"))
}

pub fn validate_db_path(path: &str) -> Result<()> {
    if path.is_empty() {
        bail!("database path must not be empty");
    }
    if path == ":memory:" {
        return Ok(());
    }

    if let Some(index) = path.find("://")
        && index > 0
    {
        let scheme = &path[..index];
        if scheme.chars().all(char::is_alphabetic) {
            bail!(
                "database path {path:?} looks like a URI ({scheme}://); pass a filesystem path instead"
            );
        }
    }

    if path.starts_with("file:") {
        bail!("database path {path:?} uses file: URI syntax; pass a plain filesystem path");
    }

    if path.contains('?') {
        bail!(
            "database path {path:?} contains '?'; remove query parameters and use a plain file path"
        );
    }

    Ok(())
}

fn load_state(kv: &KvStore) -> State {
    match kv.get(STATE_KEY) {
        Ok(Some(raw)) => decode_state(&raw).unwrap_or_else(|_| State::bootstrap()),
        _ => State::bootstrap(),
    }
}

fn decode_state(raw: &str) -> std::result::Result<State, ModelError> {
    let mut state: State =
        serde_json::from_str(raw).map_err(|_| ModelError::MalformedSnapshot)?;
    if state.tables.is_empty() {
        return Err(ModelError::MalformedSnapshot);
    }
    state.normalize();
    Ok(state)
}

fn configure_connection(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = 5000;
        ",
    )
    .context("configure sqlite pragmas")
}

fn now_rfc3339() -> Result<String> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .context("format current timestamp")
}

#[cfg(test)]
mod tests {
    use super::{decode_state, export_file_name, validate_db_path};
    use minitable_app::ModelError;
    use time::{Date, Month};

    #[test]
    fn export_file_name_embeds_the_date() {
        let date = Date::from_calendar_date(2026, Month::August, 5).expect("valid date");
        assert_eq!(export_file_name(date), "minitable-2026-08-05.json");

        let padded = Date::from_calendar_date(2026, Month::January, 9).expect("valid date");
        assert_eq!(export_file_name(padded), "minitable-2026-01-09.json");
    }

    #[test]
    fn validate_db_path_rejects_uri_forms() {
        assert!(validate_db_path("file:test.db").is_err());
        assert!(validate_db_path("https://example.com/db.sqlite").is_err());
        assert!(validate_db_path("db.sqlite?mode=ro").is_err());
        assert!(validate_db_path("").is_err());
        assert!(validate_db_path(":memory:").is_ok());
        assert!(validate_db_path("/tmp/minitable.db").is_ok());
    }

    #[test]
    fn decode_state_rejects_payloads_without_tables() {
        for raw in ["", "not json", "{}", r#"{"activeTableId":"t","tables":[]}"#] {
            let err = decode_state(raw).expect_err("payload should be rejected");
            assert_eq!(err, ModelError::MalformedSnapshot, "raw={raw:?}");
        }
    }

    #[test]
    fn decode_state_accepts_the_canonical_shape() {
        let raw = r#"
        {
          "activeTableId": "tbl_1",
          "tables": [
            {
              "id": "tbl_1",
              "name": "Tasks",
              "columns": [
                { "id": "c1", "name": "Name", "type": "text" },
                { "id": "c2", "name": "Done", "type": "checkbox" }
              ],
              "rows": [
                { "id": "r1", "cells": { "c1": "Example task", "c2": false } }
              ],
              "sort": { "columnId": null, "dir": "asc" }
            }
          ]
        }
        "#;
        let state = decode_state(raw).expect("canonical shape decodes");
        assert_eq!(state.active_table_id.as_str(), "tbl_1");
        assert_eq!(state.tables[0].rows[0].id.as_str(), "r1");
    }
}
