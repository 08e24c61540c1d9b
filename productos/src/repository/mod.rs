//! Storage for [`Producto`] records.
//!
//! Every repository validates a record against `Producto`'s declared schema
//! before writing it, so constraint violations surface as
//! [`RepositoryError::Validation`] whichever engine sits underneath.

use async_trait::async_trait;
use tienda::validation::ValidationError;

use crate::producto::Producto;

mod memory;
mod postgres;

pub use memory::InMemoryProductoRepository;
pub use postgres::PgProductoRepository;

#[derive(thiserror::Error, Debug)]
pub enum RepositoryError {
    #[error("invalid producto: {0}")]
    Validation(#[from] ValidationError),
    #[error("producto has no id; insert it first")]
    MissingId,
    #[error("producto {0} does not exist")]
    NotFound(i64),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait ProductoRepository: Send + Sync {
    /// Stores a new record and returns it with its assigned id.
    ///
    /// Any id already set on `producto` is ignored.
    async fn insert(&self, producto: Producto) -> Result<Producto, RepositoryError>;

    async fn get(&self, id: i64) -> Result<Option<Producto>, RepositoryError>;

    /// Records whose name is exactly `nombre`, oldest first.
    async fn find_by_nombre(&self, nombre: &str) -> Result<Vec<Producto>, RepositoryError>;

    async fn list(&self) -> Result<Vec<Producto>, RepositoryError>;

    async fn update(&self, producto: &Producto) -> Result<(), RepositoryError>;

    /// Returns `false` when there was nothing to delete.
    async fn delete(&self, id: i64) -> Result<bool, RepositoryError>;
}

pub(crate) fn validate(producto: &Producto) -> Result<(), RepositoryError> {
    use tienda::database::DatabaseModel;

    producto.validate().map_err(|err| {
        log::warn!("rejected producto {:?}: {}", producto.nombre, err);
        RepositoryError::Validation(err)
    })
}
