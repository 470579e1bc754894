//! Column definitions for DDL statements.
//!
//! A [`ColumnSchemaBuilder`] describes a column with an abstract
//! [`ColumnType`] and renders it for a dialect, which maps the abstract type
//! to its physical type.

mod column;

pub use column::{
    big_integer, big_pk, binary, boolean, character, date, datetime, decimal, double, float, integer,
    json, money, pk, small_integer, string, text, time, timestamp, ColumnLength,
    ColumnSchemaBuilder, ColumnType, DEFAULT_FORMAT,
};
