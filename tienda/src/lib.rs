//! # tienda
//!
//! Tienda treats your Rust structs as the source of truth for database tables.
//! Derive [`Model`](macros::Model) on a struct to declare its columns, constraints
//! and secondary indexes, then hand the schema to `tienda-compile` to create or
//! sync the table, and validate records against it before every write.

extern crate self as tienda;

pub use tienda_macros as macros;

pub mod database;
pub mod prelude;
pub mod schema;
pub mod validation;
mod value;
