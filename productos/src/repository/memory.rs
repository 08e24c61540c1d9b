use std::collections::{BTreeMap, BTreeSet, HashMap};

use async_trait::async_trait;
use log::debug;
use tokio::sync::RwLock;

use super::{validate, ProductoRepository, RepositoryError};
use crate::producto::Producto;

/// Keeps records in process memory, with a name index kept next to the rows.
#[derive(Debug, Default)]
pub struct InMemoryProductoRepository {
    state: RwLock<State>,
}

#[derive(Debug, Default)]
struct State {
    last_id: i64,
    rows: BTreeMap<i64, Producto>,
    by_nombre: HashMap<String, BTreeSet<i64>>,
}

impl State {
    fn index(&mut self, id: i64, nombre: &str) {
        self.by_nombre.entry(nombre.to_string()).or_default().insert(id);
    }

    fn unindex(&mut self, id: i64, nombre: &str) {
        if let Some(ids) = self.by_nombre.get_mut(nombre) {
            ids.remove(&id);
            if ids.is_empty() {
                self.by_nombre.remove(nombre);
            }
        }
    }
}

impl InMemoryProductoRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductoRepository for InMemoryProductoRepository {
    async fn insert(&self, mut producto: Producto) -> Result<Producto, RepositoryError> {
        validate(&producto)?;

        let mut state = self.state.write().await;
        state.last_id += 1;
        let id = state.last_id;
        producto.id = Some(id);

        state.index(id, &producto.nombre);
        state.rows.insert(id, producto.clone());
        debug!("inserted producto {}", id);

        Ok(producto)
    }

    async fn get(&self, id: i64) -> Result<Option<Producto>, RepositoryError> {
        Ok(self.state.read().await.rows.get(&id).cloned())
    }

    async fn find_by_nombre(&self, nombre: &str) -> Result<Vec<Producto>, RepositoryError> {
        let state = self.state.read().await;
        let ids = match state.by_nombre.get(nombre) {
            Some(ids) => ids,
            None => return Ok(Vec::new()),
        };

        Ok(ids
            .iter()
            .filter_map(|id| state.rows.get(id))
            .cloned()
            .collect())
    }

    async fn list(&self) -> Result<Vec<Producto>, RepositoryError> {
        Ok(self.state.read().await.rows.values().cloned().collect())
    }

    async fn update(&self, producto: &Producto) -> Result<(), RepositoryError> {
        let id = producto.id.ok_or(RepositoryError::MissingId)?;
        validate(producto)?;

        let mut state = self.state.write().await;
        let previous_nombre = match state.rows.get(&id) {
            Some(previous) => previous.nombre.clone(),
            None => return Err(RepositoryError::NotFound(id)),
        };

        state.unindex(id, &previous_nombre);
        state.index(id, &producto.nombre);
        state.rows.insert(id, producto.clone());
        debug!("updated producto {}", id);

        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool, RepositoryError> {
        let mut state = self.state.write().await;
        match state.rows.remove(&id) {
            Some(previous) => {
                state.unindex(id, &previous.nombre);
                debug!("deleted producto {}", id);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod test {
    use std::str::FromStr;

    use rust_decimal::Decimal;

    use super::*;

    fn precio(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[tokio::test]
    async fn insert_and_reload() {
        let repo = InMemoryProductoRepository::new();
        let inserted = repo
            .insert(Producto::new("Manzana", precio("999.99")))
            .await
            .unwrap();
        assert_eq!(inserted.id, Some(1));

        let reloaded = repo.get(1).await.unwrap().unwrap();
        assert_eq!(reloaded, inserted);
        assert_eq!(reloaded.nombre, "Manzana");
        assert_eq!(reloaded.precio, precio("999.99"));
        assert!(reloaded.disponible);
        assert_eq!(reloaded.to_string(), "Manzana");
    }

    #[tokio::test]
    async fn find_by_nombre_uses_exact_match() {
        let repo = InMemoryProductoRepository::new();
        let manzana = repo.insert(Producto::new("Manzana", precio("1.00"))).await.unwrap();
        repo.insert(Producto::new("Manzana verde", precio("1.50"))).await.unwrap();
        let otra = repo
            .insert(Producto::new("Manzana", precio("1.10")).with_disponible(false))
            .await
            .unwrap();

        assert_eq!(repo.find_by_nombre("Manzana").await.unwrap(), vec![manzana, otra]);
        assert!(repo.find_by_nombre("manzana").await.unwrap().is_empty());
        assert_eq!(repo.list().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn rejects_invalid_records() {
        let repo = InMemoryProductoRepository::new();

        let err = repo
            .insert(Producto::new("Manzana", precio("9.999")))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Validation(_)));

        let err = repo
            .insert(Producto::new("x".repeat(101), precio("1.00")))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Validation(_)));

        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_moves_index_entry() {
        let repo = InMemoryProductoRepository::new();
        let mut producto = repo.insert(Producto::new("Pera", precio("2.00"))).await.unwrap();

        producto.nombre = "Pera limonera".to_string();
        producto.precio = precio("2.25");
        repo.update(&producto).await.unwrap();

        assert!(repo.find_by_nombre("Pera").await.unwrap().is_empty());
        assert_eq!(repo.find_by_nombre("Pera limonera").await.unwrap(), vec![producto.clone()]);

        producto.precio = precio("2.255");
        assert!(matches!(
            repo.update(&producto).await,
            Err(RepositoryError::Validation(_))
        ));
        assert_eq!(repo.get(1).await.unwrap().unwrap().precio, precio("2.25"));
    }

    #[tokio::test]
    async fn update_requires_existing_row() {
        let repo = InMemoryProductoRepository::new();
        let mut producto = Producto::new("Kiwi", precio("0.80"));
        assert!(matches!(
            repo.update(&producto).await,
            Err(RepositoryError::MissingId)
        ));

        producto.id = Some(7);
        assert!(matches!(
            repo.update(&producto).await,
            Err(RepositoryError::NotFound(7))
        ));
        assert!(repo.get(7).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_clears_index() {
        let repo = InMemoryProductoRepository::new();
        let producto = repo.insert(Producto::new("Uva", precio("3.40"))).await.unwrap();
        let id = producto.id.unwrap();

        assert!(repo.delete(id).await.unwrap());
        assert!(!repo.delete(id).await.unwrap());
        assert!(repo.find_by_nombre("Uva").await.unwrap().is_empty());
        assert!(repo.get(id).await.unwrap().is_none());
    }
}
