// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::cmp::Ordering;
use unicode_normalization::UnicodeNormalization;

use crate::model::{CellValue, ColumnType};

pub fn default_value(column_type: ColumnType) -> CellValue {
    match column_type {
        ColumnType::Checkbox => CellValue::Bool(false),
        _ => CellValue::empty(),
    }
}

// Never fails: input a cell cannot represent degrades to the unset sentinel.
pub fn coerce(raw: CellValue, column_type: ColumnType) -> CellValue {
    match column_type {
        ColumnType::Number => match raw {
            CellValue::Number(value) if value.is_finite() => CellValue::Number(value),
            CellValue::Text(value) => parse_number(&value)
                .map(CellValue::Number)
                .unwrap_or_else(CellValue::empty),
            _ => CellValue::empty(),
        },
        ColumnType::Checkbox => CellValue::Bool(truthy(&raw)),
        ColumnType::Text | ColumnType::Date | ColumnType::Select => {
            CellValue::Text(raw.display())
        }
    }
}

pub fn compare(a: &CellValue, b: &CellValue, column_type: ColumnType) -> Ordering {
    match column_type {
        ColumnType::Number => match (numeric_key(a), numeric_key(b)) {
            (None, None) => Ordering::Equal,
            // unset/unparsable orders before any parsed number
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(left), Some(right)) => left.partial_cmp(&right).unwrap_or(Ordering::Equal),
        },
        ColumnType::Checkbox => truthy(a).cmp(&truthy(b)),
        // raw ISO strings order correctly byte-wise; empty sorts lowest
        ColumnType::Date => a.display().cmp(&b.display()),
        ColumnType::Text | ColumnType::Select => fold(&a.display()).cmp(&fold(&b.display())),
    }
}

pub fn matches(value: &CellValue, column_type: ColumnType, lowercased_query: &str) -> bool {
    let rendered = match column_type {
        ColumnType::Checkbox => {
            if truthy(value) { "true" } else { "false" }.to_owned()
        }
        _ => value.display(),
    };
    rendered.to_lowercase().contains(lowercased_query)
}

fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|value| value.is_finite())
}

fn numeric_key(value: &CellValue) -> Option<f64> {
    match value {
        CellValue::Number(value) if value.is_finite() => Some(*value),
        CellValue::Text(value) => parse_number(value),
        _ => None,
    }
}

fn truthy(value: &CellValue) -> bool {
    match value {
        CellValue::Bool(value) => *value,
        CellValue::Number(value) => *value != 0.0,
        CellValue::Text(value) => !value.is_empty(),
    }
}

// case- and diacritic-insensitive comparison key
fn fold(value: &str) -> String {
    value
        .nfd()
        .filter(|ch| !unicode_normalization::char::is_combining_mark(*ch))
        .collect::<String>()
        .to_lowercase()
}
