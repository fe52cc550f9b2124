//! Seed the document store with fixture collections.
//!
//! The fixture file is a YAML mapping from collection name to its
//! contents, in the same shape the store holds them:
//!
//! ```yaml
//! users:
//!   -NqA1:
//!     name: Dana
//!     email: dana@example.com
//! faqs:
//!   hardware:
//!     - question: Do you fix laptops?
//!       answer: Yes.
//! ```

use std::path::Path;

use serde_json::Value;
use thiserror::Error;
use tracing::info;

use taskmaster_admin::config::FirebaseConfig;
use taskmaster_admin::db::{DocumentStore, Entity, StoreError};
use taskmaster_admin::firebase::RealtimeDatabase;
use taskmaster_admin::models::{Account, Banner, Booking, Company, Message, User};
use taskmaster_admin::services::faqs::FAQ_ROOT;

/// Collections a fixture file may name.
const KNOWN_COLLECTIONS: [&str; 7] = [
    User::COLLECTION,
    Company::COLLECTION,
    Booking::COLLECTION,
    Message::COLLECTION,
    Banner::COLLECTION,
    Account::COLLECTION,
    FAQ_ROOT,
];

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    /// Fixture file is not a mapping of collection names.
    #[error("Fixture file must be a mapping of collection names")]
    NotAMapping,

    /// Fixture names a collection the admin does not manage.
    #[error("Unknown collection: {0}. Valid collections: {valid}", valid = KNOWN_COLLECTIONS.join(", "))]
    UnknownCollection(String),

    /// Merge mode needs keyed records.
    #[error("Collection {0} must be a mapping of keys to records (use --replace to overwrite)")]
    NotKeyed(String),

    /// Store write failed.
    #[error("Failed to write {collection}: {source}")]
    Store {
        collection: String,
        #[source]
        source: StoreError,
    },
}

/// What a seed run wrote.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    /// Collections written, in file order.
    pub collections: Vec<String>,
    /// Top-level records written across all collections.
    pub records: usize,
}

/// Seed from a YAML file using the configured realtime database.
///
/// # Errors
///
/// Returns an error if environment variables are missing, the file cannot
/// be read or parsed, or a write fails.
pub async fn fixtures(file_path: &str, replace: bool) -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading fixtures from file");

    // Parse before connecting
    let content = tokio::fs::read_to_string(path).await?;
    let fixtures: Value = serde_yaml::from_str(&content)?;

    let config = FirebaseConfig::from_env()?;
    let store = RealtimeDatabase::new(&config)?;
    info!(database = %config.database_url, replace, "Starting seeding process");

    let summary = seed(&store, &fixtures, replace).await?;

    info!("Seeding complete!");
    info!("  Collections written: {}", summary.collections.join(", "));
    info!("  Records written: {}", summary.records);

    Ok(())
}

/// Write every collection in `fixtures` to `store`.
///
/// With `replace`, each collection node is overwritten wholesale; otherwise
/// the records are merged, replacing only the keys the fixture names.
/// Collection names are validated before anything is written.
///
/// # Errors
///
/// Returns `SeedError` on an invalid fixture or a failed write.
pub async fn seed(
    store: &dyn DocumentStore,
    fixtures: &Value,
    replace: bool,
) -> Result<SeedSummary, SeedError> {
    let collections = fixtures.as_object().ok_or(SeedError::NotAMapping)?;

    for (name, records) in collections {
        if !KNOWN_COLLECTIONS.contains(&name.as_str()) {
            return Err(SeedError::UnknownCollection(name.clone()));
        }
        if !replace && !records.is_object() {
            return Err(SeedError::NotKeyed(name.clone()));
        }
    }

    let mut summary = SeedSummary::default();
    for (name, records) in collections {
        let written = if replace {
            store.set(name, records).await
        } else {
            store.update(name, records).await
        };
        written.map_err(|source| SeedError::Store {
            collection: name.clone(),
            source,
        })?;

        let count = match records {
            Value::Object(map) => map.len(),
            Value::Array(items) => items.len(),
            Value::Null => 0,
            _ => 1,
        };
        info!(collection = %name, records = count, "Collection written");
        summary.collections.push(name.clone());
        summary.records += count;
    }

    Ok(summary)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use taskmaster_admin::fake::FakeDocumentStore;

    fn fixture(yaml: &str) -> Value {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[tokio::test]
    async fn test_seed_merges_into_existing_collection() {
        let store = FakeDocumentStore::with_root(json!({
            "users": { "u1": { "name": "Old" }, "u2": { "name": "Kept" } }
        }));
        let fixtures = fixture("users:\n  u1:\n    name: New\n  u3:\n    name: Added\n");

        let summary = seed(&store, &fixtures, false).await.unwrap();

        assert_eq!(summary.collections, vec!["users".to_string()]);
        assert_eq!(summary.records, 2);
        assert_eq!(
            store.snapshot("users").unwrap(),
            json!({
                "u1": { "name": "New" },
                "u2": { "name": "Kept" },
                "u3": { "name": "Added" }
            })
        );
    }

    #[tokio::test]
    async fn test_seed_replace_overwrites_collection() {
        let store = FakeDocumentStore::with_root(json!({
            "users": { "u1": { "name": "Old" }, "u2": { "name": "Gone" } }
        }));
        let fixtures = fixture("users:\n  u9:\n    name: Only\n");

        seed(&store, &fixtures, true).await.unwrap();

        assert_eq!(
            store.snapshot("users").unwrap(),
            json!({ "u9": { "name": "Only" } })
        );
    }

    #[tokio::test]
    async fn test_seed_faq_lists_with_replace() {
        let store = FakeDocumentStore::new();
        let fixtures = fixture(
            "faqs:\n  hardware:\n    - question: Q1\n      answer: A1\n    - question: Q2\n      answer: A2\n",
        );

        let summary = seed(&store, &fixtures, true).await.unwrap();

        assert_eq!(summary.records, 1);
        assert_eq!(
            store.snapshot("faqs/hardware/1").unwrap(),
            json!({ "question": "Q2", "answer": "A2" })
        );
    }

    #[tokio::test]
    async fn test_seed_rejects_unknown_collection_before_writing() {
        let store = FakeDocumentStore::new();
        let fixtures = fixture("users:\n  u1:\n    name: A\norders:\n  o1: {}\n");

        let result = seed(&store, &fixtures, false).await;

        assert!(matches!(result, Err(SeedError::UnknownCollection(name)) if name == "orders"));
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn test_seed_merge_requires_keyed_records() {
        let store = FakeDocumentStore::new();
        let fixtures = fixture("messages:\n  - message: hi\n");

        let result = seed(&store, &fixtures, false).await;

        assert!(matches!(result, Err(SeedError::NotKeyed(_))));
    }

    #[tokio::test]
    async fn test_seed_rejects_non_mapping() {
        let store = FakeDocumentStore::new();
        let result = seed(&store, &json!(["users"]), true).await;
        assert!(matches!(result, Err(SeedError::NotAMapping)));
    }

    #[tokio::test]
    async fn test_seed_reports_store_failure() {
        let store = FakeDocumentStore::new();
        store.fail_writes(true);
        let fixtures = fixture("banners:\n  b1:\n    title: Sale\n");

        let result = seed(&store, &fixtures, false).await;

        assert!(
            matches!(result, Err(SeedError::Store { collection, .. }) if collection == "banners")
        );
    }
}
