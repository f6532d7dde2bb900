//! Bean list service

use shared::{validate_bean_name, BeanList};

use crate::error::{AppError, AppResult};
use crate::storage::{KeyValueStore, BEANS_KEY};

/// Maintains the sorted, deduplicated list of bean names
#[derive(Clone)]
pub struct BeanService {
    store: KeyValueStore,
}

impl BeanService {
    pub fn new(store: KeyValueStore) -> Self {
        Self { store }
    }

    /// Current bean list, seeded with the defaults when nothing is stored
    pub async fn list(&self) -> AppResult<BeanList> {
        let stored: Option<BeanList> = self.store.get(BEANS_KEY).await?;

        match stored {
            Some(list) if !list.is_empty() => Ok(list.normalized()),
            _ => {
                let defaults = BeanList::with_defaults();
                self.store.set(BEANS_KEY, &defaults).await?;
                tracing::info!("Seeded bean list with {} default beans", defaults.len());
                Ok(defaults)
            }
        }
    }

    /// Add a bean from the bean manager
    pub async fn add(&self, name: &str) -> AppResult<String> {
        validate_bean_name(name).map_err(|m| AppError::validation("bean_name", m))?;

        let name = name.trim().to_string();
        let mut list = self.list().await?;
        if !list.insert(name.clone()) {
            return Err(AppError::DuplicateEntry(format!(
                "Bean '{}' already exists",
                name
            )));
        }

        self.store.set(BEANS_KEY, &list).await?;
        tracing::info!("Added bean '{}'", name);
        Ok(name)
    }

    /// Remove a bean. Roasts and blends that use it keep their name.
    pub async fn remove(&self, name: &str) -> AppResult<()> {
        let mut list = self.list().await?;
        if !list.remove(name) {
            return Err(AppError::NotFound(format!("Bean '{}'", name.trim())));
        }

        self.store.set(BEANS_KEY, &list).await?;
        tracing::info!("Removed bean '{}'", name.trim());
        Ok(())
    }

    /// Register a bean used by a saved roast or blend.
    ///
    /// Returns true when the name was new.
    pub async fn ensure(&self, name: &str) -> AppResult<bool> {
        Ok(self.merge([name]).await? > 0)
    }

    /// Merge many names into the list, returning how many were new
    pub async fn merge<I, S>(&self, names: I) -> AppResult<usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = self.list().await?;
        let added = names
            .into_iter()
            .filter(|name| validate_bean_name(name.as_ref()).is_ok())
            .filter(|name| list.insert(name.as_ref().to_string()))
            .count();

        if added > 0 {
            self.store.set(BEANS_KEY, &list).await?;
            tracing::info!("Added {} new bean(s) to the list", added);
        }
        Ok(added)
    }
}
