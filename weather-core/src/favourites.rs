//! Favourite cities: an insertion-ordered set of names.

use anyhow::{Context, Result};
use parking_lot::Mutex;
use std::{fs, path::PathBuf};

use crate::config::Config;

pub trait FavouritesStore {
    fn list(&self) -> Result<Vec<String>>;

    /// Adds `city` unless it is already present.
    fn add(&self, city: &str) -> Result<()>;

    fn remove(&self, city: &str) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryFavourites {
    cities: Mutex<Vec<String>>,
}

impl MemoryFavourites {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FavouritesStore for MemoryFavourites {
    fn list(&self) -> Result<Vec<String>> {
        Ok(self.cities.lock().clone())
    }

    fn add(&self, city: &str) -> Result<()> {
        let mut cities = self.cities.lock();
        if !cities.iter().any(|c| c == city) {
            cities.push(city.to_string());
        }
        Ok(())
    }

    fn remove(&self, city: &str) -> Result<()> {
        self.cities.lock().retain(|c| c != city);
        Ok(())
    }
}

/// Favourites kept as a JSON array on disk.
#[derive(Debug, Clone)]
pub struct FileFavourites {
    path: PathBuf,
}

impl FileFavourites {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// `<data_dir>/favourites.json` for this application.
    pub fn open_default() -> Result<Self> {
        let dirs = Config::project_dirs()?;
        Ok(Self::new(dirs.data_dir().join("favourites.json")))
    }

    fn read(&self) -> Result<Vec<String>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read favourites: {}", self.path.display()))?;

        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse favourites: {}", self.path.display()))
    }

    fn write(&self, cities: &[String]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create favourites directory: {}", parent.display())
            })?;
        }

        let json = serde_json::to_string_pretty(cities).context("Failed to serialize favourites")?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write favourites: {}", self.path.display()))
    }
}

impl FavouritesStore for FileFavourites {
    fn list(&self) -> Result<Vec<String>> {
        self.read()
    }

    fn add(&self, city: &str) -> Result<()> {
        let mut cities = self.read()?;
        if cities.iter().any(|c| c == city) {
            return Ok(());
        }
        cities.push(city.to_string());
        self.write(&cities)
    }

    fn remove(&self, city: &str) -> Result<()> {
        let mut cities = self.read()?;
        let before = cities.len();
        cities.retain(|c| c != city);
        if cities.len() == before {
            return Ok(());
        }
        self.write(&cities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(store: &dyn FavouritesStore) {
        store.add("Paris").unwrap();
        store.add("Oslo").unwrap();
        store.add("Paris").unwrap();
        assert_eq!(store.list().unwrap(), vec!["Paris", "Oslo"]);

        store.remove("Paris").unwrap();
        store.remove("Lima").unwrap();
        assert_eq!(store.list().unwrap(), vec!["Oslo"]);
    }

    #[test]
    fn memory_store_is_ordered_and_idempotent() {
        exercise(&MemoryFavourites::new());
    }

    #[test]
    fn file_store_is_ordered_and_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileFavourites::new(dir.path().join("data").join("favourites.json"));
        assert!(store.list().unwrap().is_empty());
        exercise(&store);

        let reopened = FileFavourites::new(dir.path().join("data").join("favourites.json"));
        assert_eq!(reopened.list().unwrap(), vec!["Oslo"]);
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("favourites.json");
        fs::write(&path, "not json").unwrap();

        let err = FileFavourites::new(path).list().unwrap_err();
        assert!(err.to_string().contains("Failed to parse favourites"));
    }
}
