// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod codec;
pub mod ids;
pub mod model;
pub mod mutate;
pub mod query;

pub use ids::*;
pub use model::*;
pub use mutate::{ModelError, ModelResult, parse_column_type};
pub use query::view;
