use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meal {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("meal name must not be empty")]
    EmptyName,
    #[error("meal description must not be empty")]
    EmptyDescription,
    #[error("failed to write meal store: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode meal store: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Repository for the shared-meal list, persisted as a single JSON array
/// (append order = display order) in one file.
pub struct MealStore {
    path: PathBuf,
    // Appends are a read-modify-write of the whole slot; serialize them.
    write_lock: Mutex<()>,
}

impl MealStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current meal sequence, oldest first. A missing, unreadable or
    /// non-conforming slot reads as empty; this never fails.
    pub async fn list(&self) -> Vec<Meal> {
        self.read_slot().await
    }

    /// Appends to the end of the stored sequence. Both fields are trimmed
    /// before the empty check and stored trimmed; an empty field rejects
    /// the meal without touching the slot.
    pub async fn append(&self, meal: &Meal) -> Result<(), StoreError> {
        let name = meal.name.trim();
        let description = meal.description.trim();
        if name.is_empty() {
            return Err(StoreError::EmptyName);
        }
        if description.is_empty() {
            return Err(StoreError::EmptyDescription);
        }

        let _guard = self.write_lock.lock().await;
        let mut meals = self.read_slot().await;
        meals.push(Meal {
            name: name.to_string(),
            description: description.to_string(),
        });
        let encoded = serde_json::to_string(&meals)?;
        tokio::fs::write(&self.path, encoded).await?;
        Ok(())
    }

    async fn read_slot(&self) -> Vec<Meal> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Vec::new(),
            Err(err) => {
                warn!("Could not read meal store {}: {}", self.path.display(), err);
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(meals) => meals,
            Err(err) => {
                warn!(
                    "Ignoring malformed meal store {}: {}",
                    self.path.display(),
                    err
                );
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> MealStore {
        MealStore::new(dir.path().join("sharedMeals.json"))
    }

    fn meal(name: &str, description: &str) -> Meal {
        Meal {
            name: name.to_string(),
            description: description.to_string(),
        }
    }

    mod list_tests {
        use super::*;

        #[tokio::test]
        async fn test_missing_slot_reads_empty() {
            let dir = tempfile::tempdir().unwrap();
            let store = store_in(&dir);

            assert!(store.list().await.is_empty());
        }

        #[tokio::test]
        async fn test_malformed_slot_reads_empty() {
            let dir = tempfile::tempdir().unwrap();
            let store = store_in(&dir);
            std::fs::write(store.path(), "not json at all {{{").unwrap();

            assert!(store.list().await.is_empty());
        }

        #[tokio::test]
        async fn test_wrong_shape_slot_reads_empty() {
            let dir = tempfile::tempdir().unwrap();
            let store = store_in(&dir);
            // Valid JSON, but an object instead of the expected array
            std::fs::write(store.path(), r#"{"name":"Pasta"}"#).unwrap();

            assert!(store.list().await.is_empty());
        }

        #[tokio::test]
        async fn test_unknown_fields_are_tolerated() {
            let dir = tempfile::tempdir().unwrap();
            let store = store_in(&dir);
            std::fs::write(
                store.path(),
                r#"[{"name":"Pasta","description":"Tomato","rating":5}]"#,
            )
            .unwrap();

            let meals = store.list().await;
            assert_eq!(meals.len(), 1);
            assert_eq!(meals[0].name, "Pasta");
        }

        #[tokio::test]
        async fn test_list_returns_insertion_order() {
            let dir = tempfile::tempdir().unwrap();
            let store = store_in(&dir);

            store.append(&meal("First", "one")).await.unwrap();
            store.append(&meal("Second", "two")).await.unwrap();
            store.append(&meal("Third", "three")).await.unwrap();

            let names: Vec<_> = store.list().await.into_iter().map(|m| m.name).collect();
            assert_eq!(names, vec!["First", "Second", "Third"]);
        }
    }

    mod append_tests {
        use super::*;

        #[tokio::test]
        async fn test_append_grows_sequence_by_one() {
            let dir = tempfile::tempdir().unwrap();
            let store = store_in(&dir);

            store.append(&meal("Pasta", "Simple tomato pasta")).await.unwrap();
            assert_eq!(store.list().await.len(), 1);

            store.append(&meal("Soup", "Lentil soup")).await.unwrap();
            let meals = store.list().await;
            assert_eq!(meals.len(), 2);
            assert_eq!(meals[0], meal("Pasta", "Simple tomato pasta"));
            assert_eq!(meals[1], meal("Soup", "Lentil soup"));
        }

        #[tokio::test]
        async fn test_append_trims_whitespace() {
            let dir = tempfile::tempdir().unwrap();
            let store = store_in(&dir);

            store
                .append(&meal("  Pasta  ", "\tSimple tomato pasta\n"))
                .await
                .unwrap();

            let meals = store.list().await;
            assert_eq!(meals[0], meal("Pasta", "Simple tomato pasta"));
        }

        #[tokio::test]
        async fn test_append_rejects_empty_name() {
            let dir = tempfile::tempdir().unwrap();
            let store = store_in(&dir);

            let result = store.append(&meal("", "Tasty")).await;

            assert!(matches!(result, Err(StoreError::EmptyName)));
            assert!(store.list().await.is_empty());
            assert!(!store.path().exists());
        }

        #[tokio::test]
        async fn test_append_rejects_empty_description() {
            let dir = tempfile::tempdir().unwrap();
            let store = store_in(&dir);

            let result = store.append(&meal("Pasta", "")).await;

            assert!(matches!(result, Err(StoreError::EmptyDescription)));
            assert!(store.list().await.is_empty());
        }

        #[tokio::test]
        async fn test_append_rejects_whitespace_only_fields() {
            let dir = tempfile::tempdir().unwrap();
            let store = store_in(&dir);

            assert!(store.append(&meal("   ", "Tasty")).await.is_err());
            assert!(store.append(&meal("Pasta", " \t\n")).await.is_err());
            assert!(store.list().await.is_empty());
        }

        #[tokio::test]
        async fn test_rejection_leaves_slot_unchanged() {
            let dir = tempfile::tempdir().unwrap();
            let store = store_in(&dir);

            store.append(&meal("Pasta", "Simple tomato pasta")).await.unwrap();
            let before = std::fs::read_to_string(store.path()).unwrap();

            store.append(&meal("", "")).await.unwrap_err();

            let after = std::fs::read_to_string(store.path()).unwrap();
            assert_eq!(before, after);
        }

        #[tokio::test]
        async fn test_duplicate_meals_are_permitted() {
            let dir = tempfile::tempdir().unwrap();
            let store = store_in(&dir);

            store.append(&meal("Pasta", "Simple tomato pasta")).await.unwrap();
            store.append(&meal("Pasta", "Simple tomato pasta")).await.unwrap();

            assert_eq!(store.list().await.len(), 2);
        }

        #[tokio::test]
        async fn test_concurrent_appends_all_recorded() {
            let dir = tempfile::tempdir().unwrap();
            let store = store_in(&dir);

            let meal_a = meal("A", "first");
            let meal_b = meal("B", "second");
            let meal_c = meal("C", "third");
            let (a, b, c) = tokio::join!(
                store.append(&meal_a),
                store.append(&meal_b),
                store.append(&meal_c),
            );
            a.unwrap();
            b.unwrap();
            c.unwrap();

            assert_eq!(store.list().await.len(), 3);
        }
    }

    mod persistence_tests {
        use super::*;

        #[tokio::test]
        async fn test_slot_survives_reopen() {
            let dir = tempfile::tempdir().unwrap();

            {
                let store = store_in(&dir);
                store.append(&meal("Pasta", "Simple tomato pasta")).await.unwrap();
            }

            let reopened = store_in(&dir);
            let meals = reopened.list().await;
            assert_eq!(meals.len(), 1);
            assert_eq!(meals[0].name, "Pasta");
        }

        #[tokio::test]
        async fn test_slot_format_is_a_plain_json_array() {
            let dir = tempfile::tempdir().unwrap();
            let store = store_in(&dir);

            store.append(&meal("Pasta", "Simple tomato pasta")).await.unwrap();

            let raw = std::fs::read_to_string(store.path()).unwrap();
            assert_eq!(
                raw,
                r#"[{"name":"Pasta","description":"Simple tomato pasta"}]"#
            );
        }
    }
}
