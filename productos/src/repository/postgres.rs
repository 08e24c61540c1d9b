use async_trait::async_trait;
use log::debug;
use sqlx::PgPool;

use super::{validate, ProductoRepository, RepositoryError};
use crate::producto::Producto;

const INSERT_QUERY: &str = "
INSERT INTO producto (nombre, precio, disponible)
VALUES ($1, $2, $3)
RETURNING id, nombre, precio, disponible;
";

const GET_QUERY: &str = "
SELECT id, nombre, precio, disponible
FROM producto
WHERE id = $1;
";

const FIND_BY_NOMBRE_QUERY: &str = "
SELECT id, nombre, precio, disponible
FROM producto
WHERE nombre = $1
ORDER BY id;
";

const LIST_QUERY: &str = "
SELECT id, nombre, precio, disponible
FROM producto
ORDER BY id;
";

const UPDATE_QUERY: &str = "
UPDATE producto
SET nombre = $2, precio = $3, disponible = $4
WHERE id = $1;
";

const DELETE_QUERY: &str = "DELETE FROM producto WHERE id = $1;";

/// Stores records in the `producto` table created by `tienda-compile`.
#[derive(Clone, Debug)]
pub struct PgProductoRepository {
    pool: PgPool,
}

impl PgProductoRepository {
    pub fn new(pool: PgPool) -> Self {
        PgProductoRepository { pool }
    }

    pub async fn connect(uri: &str) -> Result<Self, RepositoryError> {
        Ok(PgProductoRepository::new(PgPool::connect(uri).await?))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ProductoRepository for PgProductoRepository {
    async fn insert(&self, producto: Producto) -> Result<Producto, RepositoryError> {
        // numeric(5, 2) would round extra decimal places instead of failing
        validate(&producto)?;

        let inserted: Producto = sqlx::query_as(INSERT_QUERY)
            .bind(&producto.nombre)
            .bind(producto.precio)
            .bind(producto.disponible)
            .fetch_one(&self.pool)
            .await?;
        debug!("inserted producto {:?}", inserted.id);

        Ok(inserted)
    }

    async fn get(&self, id: i64) -> Result<Option<Producto>, RepositoryError> {
        Ok(sqlx::query_as(GET_QUERY)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_by_nombre(&self, nombre: &str) -> Result<Vec<Producto>, RepositoryError> {
        Ok(sqlx::query_as(FIND_BY_NOMBRE_QUERY)
            .bind(nombre)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn list(&self) -> Result<Vec<Producto>, RepositoryError> {
        Ok(sqlx::query_as(LIST_QUERY).fetch_all(&self.pool).await?)
    }

    async fn update(&self, producto: &Producto) -> Result<(), RepositoryError> {
        let id = producto.id.ok_or(RepositoryError::MissingId)?;
        validate(producto)?;

        let result = sqlx::query(UPDATE_QUERY)
            .bind(id)
            .bind(&producto.nombre)
            .bind(producto.precio)
            .bind(producto.disponible)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(id));
        }
        debug!("updated producto {}", id);

        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool, RepositoryError> {
        let result = sqlx::query(DELETE_QUERY)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
