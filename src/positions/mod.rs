//! Per-source avatar position tables.

pub(crate) mod table;
