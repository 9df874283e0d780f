// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_SUFFIX_LEN: usize = 7;

macro_rules! entity_id {
    ($name:ident, $prefix:literal) => {
        #[derive(
            Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn generate() -> Self {
                Self(random_id($prefix))
            }

            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }
    };
}

entity_id!(TableId, "tbl");
entity_id!(ColumnId, "col");
entity_id!(RowId, "row");

// Ids only need to be unique within one process; 36^7 suffixes is plenty.
fn random_id(prefix: &str) -> String {
    let mut rng = rand::rng();
    let mut id = String::with_capacity(prefix.len() + 1 + ID_SUFFIX_LEN);
    id.push_str(prefix);
    id.push('_');
    for _ in 0..ID_SUFFIX_LEN {
        id.push(ID_ALPHABET[rng.random_range(0..ID_ALPHABET.len())] as char);
    }
    id
}
