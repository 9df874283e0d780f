// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

// Deterministic sample states for store and CLI tests. Ids stay random
// even under a fixed seed, so tests compare content, not ids.

use minitable_app::{CellValue, ColumnType, State, Table};

const TASK_TITLES: [&str; 12] = [
    "Write release notes",
    "Fix login redirect",
    "Update dependency pins",
    "Review onboarding copy",
    "Archive stale branches",
    "Plan sprint retro",
    "Refresh API docs",
    "Triage open reports",
    "Tune query cache",
    "Draft migration guide",
    "Clean up feature flags",
    "Verify backup restore",
];

const STATUS_OPTIONS: [&str; 3] = ["New", "In Progress", "Done"];

const CONTACT_FIRST_NAMES: [&str; 8] = [
    "Avery", "Jordan", "Taylor", "Riley", "Morgan", "Casey", "Quinn", "Rowan",
];
const CONTACT_LAST_NAMES: [&str; 8] = [
    "Walker", "Martin", "Hill", "Evans", "Lopez", "Gray", "Ward", "Reed",
];
const CONTACT_DOMAINS: [&str; 4] = [
    "example-home.com",
    "repairs.local",
    "service-group.net",
    "hometeam.io",
];

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

#[derive(Debug, Clone)]
pub struct TableFaker {
    rng: DeterministicRng,
}

impl TableFaker {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: DeterministicRng::new(if seed == 0 { 1 } else { seed }),
        }
    }

    fn pick<'a>(&mut self, pool: &[&'a str]) -> &'a str {
        pool[self.rng.int_n(pool.len())]
    }

    fn iso_date(&mut self) -> String {
        let month = self.rng.int_n(12) + 1;
        let day = self.rng.int_n(28) + 1;
        format!("2026-{month:02}-{day:02}")
    }

    pub fn task_table(&mut self, rows: usize) -> Table {
        let mut table = Table::create("Tasks");
        let name = table.columns[0].id.clone();
        let status = table
            .add_column(
                "Status",
                ColumnType::Select,
                Some(STATUS_OPTIONS.iter().map(|s| (*s).to_owned()).collect()),
            )
            .expect("add status column");
        let due = table
            .add_column("Due", ColumnType::Date, None)
            .expect("add due column");
        let done = table
            .add_column("Done", ColumnType::Checkbox, None)
            .expect("add done column");
        let points = table
            .add_column("Points", ColumnType::Number, None)
            .expect("add points column");

        for index in 0..rows {
            let row_id = table.add_row(None);
            let title = TASK_TITLES[index % TASK_TITLES.len()];
            table
                .set_cell(&row_id, &name, CellValue::from(title))
                .expect("set name");
            let picked = self.pick(&STATUS_OPTIONS);
            table
                .set_cell(&row_id, &status, CellValue::from(picked))
                .expect("set status");
            let date = self.iso_date();
            table
                .set_cell(&row_id, &due, CellValue::from(date))
                .expect("set due");
            table
                .set_cell(&row_id, &done, CellValue::Bool(picked == "Done"))
                .expect("set done");
            table
                .set_cell(
                    &row_id,
                    &points,
                    CellValue::Number((self.rng.int_n(13) + 1) as f64),
                )
                .expect("set points");
        }
        table
    }

    pub fn contact_table(&mut self, rows: usize) -> Table {
        let mut table = Table::create("Contacts");
        let name = table.columns[0].id.clone();
        let email = table
            .add_column("Email", ColumnType::Text, None)
            .expect("add email column");
        let signed_up = table
            .add_column("Signed Up", ColumnType::Date, None)
            .expect("add signed-up column");
        let active = table
            .add_column("Active", ColumnType::Checkbox, None)
            .expect("add active column");

        for _ in 0..rows {
            let row_id = table.add_row(None);
            let first = self.pick(&CONTACT_FIRST_NAMES);
            let last = self.pick(&CONTACT_LAST_NAMES);
            let domain = self.pick(&CONTACT_DOMAINS);
            table
                .set_cell(&row_id, &name, CellValue::from(format!("{first} {last}")))
                .expect("set name");
            table
                .set_cell(
                    &row_id,
                    &email,
                    CellValue::from(format!(
                        "{}.{}@{domain}",
                        first.to_ascii_lowercase(),
                        last.to_ascii_lowercase()
                    )),
                )
                .expect("set email");
            let date = self.iso_date();
            table
                .set_cell(&row_id, &signed_up, CellValue::from(date))
                .expect("set signed up");
            let is_active = self.rng.bool();
            table
                .set_cell(&row_id, &active, CellValue::Bool(is_active))
                .expect("set active");
        }
        table
    }
}

// two populated tables with the task table active
pub fn demo_state(seed: u64, rows: usize) -> State {
    let mut faker = TableFaker::new(seed);
    let tasks = faker.task_table(rows);
    let contacts = faker.contact_table(rows);
    State {
        active_table_id: tasks.id.clone(),
        tables: vec![tasks, contacts],
    }
}

// empty single-column tables by name; the first one is active
pub fn state_with_tables(names: &[&str]) -> State {
    assert!(!names.is_empty(), "at least one table is required");
    let tables: Vec<Table> = names.iter().map(|name| Table::create(*name)).collect();
    State {
        active_table_id: tables[0].id.clone(),
        tables,
    }
}

#[cfg(test)]
mod tests {
    use super::{TableFaker, demo_state, state_with_tables};
    use minitable_app::ColumnType;

    #[test]
    fn task_table_rows_cover_every_column() {
        let table = TableFaker::new(7).task_table(6);
        assert_eq!(table.columns.len(), 5);
        assert_eq!(table.rows.len(), 6);
        for row in &table.rows {
            assert_eq!(row.cells.len(), table.columns.len());
        }
    }

    #[test]
    fn same_seed_produces_same_content() {
        // ids are random per table, so compare cell content in declared
        // column order instead of the whole structure
        fn content(table: &minitable_app::Table) -> Vec<Vec<String>> {
            table
                .rows
                .iter()
                .map(|row| {
                    table
                        .columns
                        .iter()
                        .map(|column| row.cells[&column.id].display())
                        .collect()
                })
                .collect()
        }

        let first = TableFaker::new(42).task_table(5);
        let second = TableFaker::new(42).task_table(5);
        assert_eq!(content(&first), content(&second));
    }

    #[test]
    fn demo_state_activates_the_task_table() {
        let state = demo_state(3, 4);
        assert_eq!(state.tables.len(), 2);
        assert_eq!(state.active_table_id, state.tables[0].id);
        assert_eq!(state.active_table().name, "Tasks");
        assert_eq!(
            state.tables[0].columns[1].column_type,
            ColumnType::Select
        );
    }

    #[test]
    fn state_with_tables_names_and_activates_first() {
        let state = state_with_tables(&["Sprint", "Backlog"]);
        assert_eq!(state.tables.len(), 2);
        assert_eq!(state.tables[0].name, "Sprint");
        assert_eq!(state.tables[1].name, "Backlog");
        assert_eq!(state.active_table_id, state.tables[0].id);
    }
}
