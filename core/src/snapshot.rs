#![deny(missing_docs)]

//! # Snapshot Publishing
//!
//! Publishes the resolved routes of a project as a versioned location
//! document. A new version is stored only when the document's SHA-256 hash
//! differs from the latest stored one.

use crate::error::{AppError, AppResult};
use crate::resolver::RouteTable;
use crate::store::{LocationSnapshot, SnapshotStore, StoreRecord, DEFAULT_VERSION, NOT_DELETED};
use chrono::Utc;
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};
use tracing::info;
use uuid::Uuid;

/// What [`publish_snapshot`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotOutcome {
    /// A new snapshot was stored.
    Published {
        /// Version of the new snapshot.
        version: String,
        /// Its document hash.
        hash: String,
    },
    /// The latest snapshot already has this content.
    Unchanged {
        /// Version of the latest snapshot.
        version: String,
        /// Shared document hash.
        hash: String,
    },
}

/// Swagger-like document describing the routes of `table`.
pub fn location_document(table: &RouteTable) -> Value {
    let mut paths = Map::new();
    for (path, entry) in table.iter() {
        let mut verbs = Map::new();
        for (method, operation) in entry.operations.iter() {
            verbs.insert(
                method.as_str().to_lowercase(),
                json!({
                    "operationId": format!("{}.{}", entry.module, operation.function),
                    "parameters": operation.parameters,
                }),
            );
        }
        paths.insert(path.clone(), Value::Object(verbs));
    }
    json!({
        "basePath": table.base_path.clone().unwrap_or_default(),
        "paths": paths,
    })
}

/// Lower-case hex SHA-256 of the compact JSON form of `document`.
pub fn document_hash(document: &Value) -> String {
    let digest = Sha256::digest(document.to_string().as_bytes());
    format!("{:x}", digest)
}

/// Version following `current`: `1.0` -> `1.1`, `1.9` -> `1.10`.
pub fn next_version(current: &str) -> AppResult<String> {
    let invalid = || AppError::Store(format!("invalid snapshot version '{}'", current));
    let (major, minor) = current.split_once('.').ok_or_else(invalid)?;
    let major: u64 = major.parse().map_err(|_| invalid())?;
    let minor: u64 = minor.parse().map_err(|_| invalid())?;
    Ok(format!("{}.{}", major, minor + 1))
}

/// Stores a new snapshot of `table` for the project registered at `host`
/// unless the latest snapshot is identical.
///
/// # Errors
///
/// `Store` when no live project is registered for `host`, or when the store
/// fails.
pub fn publish_snapshot(
    store: &mut dyn SnapshotStore,
    host: &str,
    table: &RouteTable,
) -> AppResult<SnapshotOutcome> {
    let project = store
        .find_project_by_host(host)?
        .ok_or_else(|| AppError::Store(format!("no project registered for host '{}'", host)))?;

    let document = location_document(table);
    let hash = document_hash(&document);

    let latest = store.find_latest_location_version(project.id)?;
    let version = match &latest {
        Some(prev) if prev.hash == hash => {
            info!("{}: snapshot {} is up to date", host, prev.version);
            return Ok(SnapshotOutcome::Unchanged {
                version: prev.version.clone(),
                hash,
            });
        }
        Some(prev) => next_version(&prev.version)?,
        None => DEFAULT_VERSION.to_string(),
    };

    let now = Utc::now();
    let record = StoreRecord::Location(LocationSnapshot {
        id: Uuid::new_v4(),
        project_id: project.id,
        version: version.clone(),
        hash: hash.clone(),
        location: document,
        is_deleted: NOT_DELETED,
        created_at: now,
        updated_at: now,
    });
    let collection = record.collection();
    store.insert(vec![record])?;
    info!("{}: published {} version {}", host, collection, version);

    Ok(SnapshotOutcome::Published { version, hash })
}
