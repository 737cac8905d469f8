use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use indexmap::IndexMap;
use log::{debug, info, warn};

use crate::error::{Result, RunboardError};
use crate::models::{RepoPath, RepositoryRecord};

/// Persistent list of tracked repositories, keyed by slug.
///
/// Implementations keep insertion order: `list` returns records in the order
/// they were added.
pub trait RepositoryStore: Send + Sync {
    fn list(&self) -> Result<Vec<RepositoryRecord>>;

    /// Adds a record. Fails with `Duplicate` if the slug is already present.
    fn add(&self, record: RepositoryRecord) -> Result<()>;

    /// Removes a record. Fails with `NotFound` if the slug is unknown.
    fn remove(&self, slug: &str) -> Result<()>;
}

type Records = IndexMap<String, RepositoryRecord>;

fn lock(records: &Mutex<Records>) -> MutexGuard<'_, Records> {
    records.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn validate(record: &RepositoryRecord) -> Result<()> {
    RepoPath::parse(&record.slug)?;
    if record.display_name.trim().is_empty() {
        return Err(RunboardError::Validation(
            "Display name must not be empty".into(),
        ));
    }
    Ok(())
}

fn insert(records: &mut Records, record: RepositoryRecord) -> Result<()> {
    validate(&record)?;
    if records.contains_key(&record.slug) {
        return Err(RunboardError::Duplicate(record.slug));
    }
    records.insert(record.slug.clone(), record);
    Ok(())
}

fn take(records: &mut Records, slug: &str) -> Result<RepositoryRecord> {
    records
        .shift_remove(slug)
        .ok_or_else(|| RunboardError::NotFound(slug.to_string()))
}

/// Registry held only in memory.
#[derive(Default)]
pub struct MemoryRegistry {
    records: Mutex<Records>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RepositoryStore for MemoryRegistry {
    fn list(&self) -> Result<Vec<RepositoryRecord>> {
        Ok(lock(&self.records).values().cloned().collect())
    }

    fn add(&self, record: RepositoryRecord) -> Result<()> {
        insert(&mut lock(&self.records), record)
    }

    fn remove(&self, slug: &str) -> Result<()> {
        take(&mut lock(&self.records), slug).map(|_| ())
    }
}

/// Registry persisted as a JSON array of records.
///
/// The whole file is loaded on open and rewritten on every mutation through a
/// temporary file and a rename, so a crash mid-write leaves the previous
/// version intact.
pub struct JsonFileRegistry {
    path: PathBuf,
    records: Mutex<Records>,
}

impl JsonFileRegistry {
    /// Opens the registry at `path`, creating parent directories as needed.
    ///
    /// A missing file is an empty registry. A file that cannot be parsed, or
    /// that holds an invalid record or the same slug twice, is an error rather
    /// than being silently repaired.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let records = if path.exists() {
            let contents = fs::read_to_string(path)?;
            let list: Vec<RepositoryRecord> = if contents.trim().is_empty() {
                Vec::new()
            } else {
                serde_json::from_str(&contents)?
            };
            let mut records = IndexMap::with_capacity(list.len());
            for record in list {
                insert(&mut records, record).inspect_err(|e| {
                    warn!("Rejecting registry {}: {e}", path.display());
                })?;
            }
            debug!("Loaded {} repositories from {}", records.len(), path.display());
            records
        } else {
            info!("No registry at {}, starting empty", path.display());
            IndexMap::new()
        };

        Ok(Self {
            path: path.to_path_buf(),
            records: Mutex::new(records),
        })
    }

    /// Platform data location: `<data_dir>/runboard/repositories.json`.
    pub fn default_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| RunboardError::Config("No data directory found".into()))?;
        Ok(data_dir.join("runboard").join("repositories.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, records: &Records) -> Result<()> {
        let list: Vec<&RepositoryRecord> = records.values().collect();
        let contents = serde_json::to_string_pretty(&list)?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, contents)?;
        fs::rename(&tmp, &self.path)?;

        debug!("Saved {} repositories to {}", list.len(), self.path.display());
        Ok(())
    }
}

impl RepositoryStore for JsonFileRegistry {
    fn list(&self) -> Result<Vec<RepositoryRecord>> {
        Ok(lock(&self.records).values().cloned().collect())
    }

    fn add(&self, record: RepositoryRecord) -> Result<()> {
        let mut records = lock(&self.records);
        let slug = record.slug.clone();
        insert(&mut records, record)?;

        if let Err(e) = self.persist(&records) {
            records.shift_remove(&slug);
            return Err(e);
        }
        Ok(())
    }

    fn remove(&self, slug: &str) -> Result<()> {
        let mut records = lock(&self.records);
        let index = records
            .get_index_of(slug)
            .ok_or_else(|| RunboardError::NotFound(slug.to_string()))?;
        let removed = take(&mut records, slug)?;

        if let Err(e) = self.persist(&records) {
            records.shift_insert(index, removed.slug.clone(), removed);
            return Err(e);
        }
        Ok(())
    }
}
