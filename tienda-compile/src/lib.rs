//! # tienda-compile
//!
//! Turns [`tienda`] table schemas into PostgreSQL DDL, and syncs a live
//! database with them.

pub mod database;
pub mod error;
pub mod sql;
