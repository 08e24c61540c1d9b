//! # productos
//!
//! The `Producto` table: its model, its schema registration, and the
//! repositories that store it.

pub mod producto;
pub mod repository;
pub mod schema;

pub use producto::Producto;
