#![deny(missing_docs)]

//! # Snapshot Store
//!
//! Persistence for projects and their published route-location snapshots.
//! Two collections: `center_project` and `swagger_location`. Records are
//! soft-deleted (`is_deleted = 1`) and lookups ignore deleted records.

use crate::error::{AppError, AppResult};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Collection of [`Project`] records.
pub const PROJECT_COLLECTION: &str = "center_project";
/// Collection of [`LocationSnapshot`] records.
pub const LOCATION_COLLECTION: &str = "swagger_location";

/// `is_deleted` value of live records.
pub const NOT_DELETED: u8 = 0;
/// `is_deleted` value of removed records.
pub const DELETED: u8 = 1;

/// Version given to the first snapshot of a project.
pub const DEFAULT_VERSION: &str = "1.0";

/// A registered service, identified by its host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Record id.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Host the service answers on.
    pub host: String,
    /// [`NOT_DELETED`] or [`DELETED`].
    pub is_deleted: u8,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// A live project created now.
    pub fn new(name: impl Into<String>, host: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            host: host.into(),
            is_deleted: NOT_DELETED,
            created_at: now,
            updated_at: now,
        }
    }
}

/// One published version of a project's route locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationSnapshot {
    /// Record id.
    pub id: Uuid,
    /// Owning [`Project`].
    pub project_id: Uuid,
    /// `major.minor`.
    pub version: String,
    /// Hex SHA-256 of `location`.
    pub hash: String,
    /// The published document.
    pub location: serde_json::Value,
    /// [`NOT_DELETED`] or [`DELETED`].
    pub is_deleted: u8,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

/// Anything that can be inserted into a store.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreRecord {
    /// A `center_project` record.
    Project(Project),
    /// A `swagger_location` record.
    Location(LocationSnapshot),
}

impl StoreRecord {
    /// Collection the record belongs to.
    pub fn collection(&self) -> &'static str {
        match self {
            StoreRecord::Project(_) => PROJECT_COLLECTION,
            StoreRecord::Location(_) => LOCATION_COLLECTION,
        }
    }
}

/// Compares `major.minor` versions numerically; unparsable parts sort first.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let parts = |v: &str| -> Vec<u64> {
        v.split('.').map(|p| p.trim().parse().unwrap_or(0)).collect()
    };
    parts(a).cmp(&parts(b))
}

/// Project and snapshot persistence.
pub trait SnapshotStore {
    /// The live project registered for `host`.
    fn find_project_by_host(&self, host: &str) -> AppResult<Option<Project>>;

    /// The live snapshot of `project_id` with the highest version.
    fn find_latest_location_version(&self, project_id: Uuid)
        -> AppResult<Option<LocationSnapshot>>;

    /// Appends records to their collections.
    fn insert(&mut self, records: Vec<StoreRecord>) -> AppResult<()>;
}

fn latest<'a, I>(locations: I, project_id: Uuid) -> Option<&'a LocationSnapshot>
where
    I: IntoIterator<Item = &'a LocationSnapshot>,
{
    locations
        .into_iter()
        .filter(|l| l.project_id == project_id && l.is_deleted == NOT_DELETED)
        .max_by(|a, b| compare_versions(&a.version, &b.version))
}

fn by_host<'a, I>(projects: I, host: &str) -> Option<&'a Project>
where
    I: IntoIterator<Item = &'a Project>,
{
    projects
        .into_iter()
        .find(|p| p.host == host && p.is_deleted == NOT_DELETED)
}

/// In-process store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    /// `center_project` records.
    pub projects: Vec<Project>,
    /// `swagger_location` records.
    pub locations: Vec<LocationSnapshot>,
}

impl SnapshotStore for MemoryStore {
    fn find_project_by_host(&self, host: &str) -> AppResult<Option<Project>> {
        Ok(by_host(&self.projects, host).cloned())
    }

    fn find_latest_location_version(
        &self,
        project_id: Uuid,
    ) -> AppResult<Option<LocationSnapshot>> {
        Ok(latest(&self.locations, project_id).cloned())
    }

    fn insert(&mut self, records: Vec<StoreRecord>) -> AppResult<()> {
        for record in records {
            match record {
                StoreRecord::Project(p) => self.projects.push(p),
                StoreRecord::Location(l) => self.locations.push(l),
            }
        }
        Ok(())
    }
}

/// Store keeping each collection as a JSON array in `<dir>/<collection>.json`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Store rooted at `dir`; created on first insert.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn file(&self, collection: &str) -> PathBuf {
        self.dir.join(format!("{}.json", collection))
    }

    fn read<T: DeserializeOwned>(&self, collection: &str) -> AppResult<Vec<T>> {
        let path = self.file(collection);
        if !path.is_file() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&path)?;
        serde_json::from_str(&content).map_err(|e| store_error(&path, e))
    }

    fn write<T: Serialize>(&self, collection: &str, records: &[T]) -> AppResult<()> {
        let path = self.file(collection);
        fs::create_dir_all(&self.dir)?;
        let content = serde_json::to_string_pretty(records).map_err(|e| store_error(&path, e))?;
        fs::write(&path, content)?;
        Ok(())
    }
}

fn store_error(path: &Path, e: serde_json::Error) -> AppError {
    AppError::Store(format!("'{}': {}", path.display(), e))
}

impl SnapshotStore for JsonFileStore {
    fn find_project_by_host(&self, host: &str) -> AppResult<Option<Project>> {
        let projects: Vec<Project> = self.read(PROJECT_COLLECTION)?;
        Ok(by_host(&projects, host).cloned())
    }

    fn find_latest_location_version(
        &self,
        project_id: Uuid,
    ) -> AppResult<Option<LocationSnapshot>> {
        let locations: Vec<LocationSnapshot> = self.read(LOCATION_COLLECTION)?;
        Ok(latest(&locations, project_id).cloned())
    }

    fn insert(&mut self, records: Vec<StoreRecord>) -> AppResult<()> {
        let mut projects: Vec<Project> = self.read(PROJECT_COLLECTION)?;
        let mut locations: Vec<LocationSnapshot> = self.read(LOCATION_COLLECTION)?;
        let (mut new_projects, mut new_locations) = (false, false);

        for record in records {
            match record {
                StoreRecord::Project(p) => {
                    projects.push(p);
                    new_projects = true;
                }
                StoreRecord::Location(l) => {
                    locations.push(l);
                    new_locations = true;
                }
            }
        }

        if new_projects {
            self.write(PROJECT_COLLECTION, &projects)?;
        }
        if new_locations {
            self.write(LOCATION_COLLECTION, &locations)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn snapshot(project_id: Uuid, version: &str, is_deleted: u8) -> LocationSnapshot {
        let now = Utc::now();
        LocationSnapshot {
            id: Uuid::new_v4(),
            project_id,
            version: version.into(),
            hash: String::new(),
            location: serde_json::json!({}),
            is_deleted,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_compare_versions() {
        assert_eq!(compare_versions("1.10", "1.9"), Ordering::Greater);
        assert_eq!(compare_versions("1.0", "1.0"), Ordering::Equal);
        assert_eq!(compare_versions("2.0", "1.99"), Ordering::Greater);
    }

    #[test]
    fn test_memory_store_lookups_skip_deleted() {
        let mut store = MemoryStore::default();
        let mut gone = Project::new("old", "api.local");
        gone.is_deleted = DELETED;
        let live = Project::new("shop", "api.local");
        let id = live.id;

        store
            .insert(vec![
                StoreRecord::Project(gone),
                StoreRecord::Project(live),
                StoreRecord::Location(snapshot(id, "1.9", NOT_DELETED)),
                StoreRecord::Location(snapshot(id, "1.10", NOT_DELETED)),
                StoreRecord::Location(snapshot(id, "1.11", DELETED)),
            ])
            .unwrap();

        assert_eq!(store.find_project_by_host("api.local").unwrap().unwrap().name, "shop");
        assert!(store.find_project_by_host("other").unwrap().is_none());
        assert_eq!(
            store.find_latest_location_version(id).unwrap().unwrap().version,
            "1.10"
        );
        assert!(store.find_latest_location_version(Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn test_json_file_store_persists() {
        let dir = tempdir().unwrap();
        let project = Project::new("shop", "shop.local");
        let id = project.id;

        let mut store = JsonFileStore::new(dir.path().join("db"));
        assert!(store.find_project_by_host("shop.local").unwrap().is_none());
        store.insert(vec![StoreRecord::Project(project)]).unwrap();
        store
            .insert(vec![StoreRecord::Location(snapshot(id, DEFAULT_VERSION, NOT_DELETED))])
            .unwrap();

        let reopened = JsonFileStore::new(dir.path().join("db"));
        assert_eq!(reopened.find_project_by_host("shop.local").unwrap().unwrap().id, id);
        assert_eq!(
            reopened.find_latest_location_version(id).unwrap().unwrap().version,
            DEFAULT_VERSION
        );
        assert!(dir.path().join("db/center_project.json").is_file());
        assert!(dir.path().join("db/swagger_location.json").is_file());
    }

    #[test]
    fn test_corrupt_collection_is_store_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("center_project.json"), "{not json").unwrap();
        let store = JsonFileStore::new(dir.path());
        let err = store.find_project_by_host("x").unwrap_err();
        assert!(matches!(err, AppError::Store(_)));
    }
}
