use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tienda::prelude::*;

/// A product for sale.
///
/// `id` stays `None` until a repository stores the record.
#[derive(Model, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[tienda(index = ("idx_producto_nombre", nombre))]
pub struct Producto {
    #[tienda(primary_key, identity)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[tienda(max_len = 100, db_index)]
    pub nombre: String,
    #[tienda(max_digits = 5, decimal_places = 2)]
    pub precio: Decimal,
    #[tienda(default = true)]
    #[serde(default = "disponible_por_defecto")]
    pub disponible: bool,
}

fn disponible_por_defecto() -> bool {
    true
}

impl Producto {
    /// Builds an unsaved, available product.
    pub fn new(nombre: impl Into<String>, precio: Decimal) -> Self {
        Producto {
            id: None,
            nombre: nombre.into(),
            precio,
            disponible: disponible_por_defecto(),
        }
    }

    pub fn with_disponible(mut self, disponible: bool) -> Self {
        self.disponible = disponible;
        self
    }
}

impl fmt::Display for Producto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.nombre)
    }
}
