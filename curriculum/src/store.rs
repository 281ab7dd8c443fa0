//! Course store.
//!
//! Saved curricula are an ordered collection addressed by position, plus the
//! recent-activity log. Every stored course carries a `version` drawn from a
//! store-wide counter, so a version identifies one write of one course.
//! [`CourseStore::replace_at`] only succeeds when the caller's version is
//! still current, which turns concurrent read-modify-write cycles into a
//! detectable [`StoreError::VersionConflict`] instead of a lost update.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::activity::{ActivityLog, ActivityRecord};
use crate::types::Curriculum;

/// Error types for store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Persisted data could not be parsed
    #[error("Saved data is corrupt: {0}")]
    Corrupt(String),

    /// Underlying I/O failed
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No course at this position
    #[error("No saved course at index {index} (store has {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// Course changed since it was read
    #[error("Course at index {index} was modified concurrently (expected version {expected}, found {actual})")]
    VersionConflict {
        index: usize,
        expected: u64,
        actual: u64,
    },
}

/// A saved curriculum with its write version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredCourse {
    pub course: Curriculum,
    pub version: u64,
}

/// Where an appended course landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavedSlot {
    /// Position in the collection right after the append
    pub index: usize,
    pub version: u64,
}

/// Ordered collection of saved curricula plus an activity log.
#[async_trait]
pub trait CourseStore: Send + Sync {
    /// Read every saved course, in order.
    async fn load(&self) -> Result<Vec<StoredCourse>, StoreError>;

    /// Read one course.
    async fn get(&self, index: usize) -> Result<StoredCourse, StoreError>;

    /// Append a course at the end of the collection.
    async fn append_one(&self, course: Curriculum) -> Result<SavedSlot, StoreError>;

    /// Replace the course at `index` if its version is still `expected_version`.
    async fn replace_at(
        &self,
        index: usize,
        expected_version: u64,
        course: Curriculum,
    ) -> Result<StoredCourse, StoreError>;

    /// Remove and return the course at `index`. Later courses shift down.
    async fn remove_at(&self, index: usize) -> Result<Curriculum, StoreError>;

    /// Add an activity record.
    async fn record_activity(&self, record: ActivityRecord) -> Result<(), StoreError>;

    /// Most recent activity, newest first.
    async fn recent_activities(&self, limit: usize) -> Result<Vec<ActivityRecord>, StoreError>;
}

/// Load saved courses, treating unreadable data as "no saved data".
pub async fn load_or_empty(store: &dyn CourseStore) -> Vec<StoredCourse> {
    match store.load().await {
        Ok(courses) => courses,
        Err(e) => {
            warn!(error = %e, "Failed to load saved courses, treating as empty");
            Vec::new()
        }
    }
}

/// Full persisted state, shared by both store implementations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreData {
    #[serde(default)]
    saved_courses: Vec<StoredCourse>,
    #[serde(default)]
    recent_activities: ActivityLog,
    #[serde(default)]
    revision: u64,
}

impl StoreData {
    fn next_version(&mut self) -> u64 {
        self.revision += 1;
        self.revision
    }

    fn get(&self, index: usize) -> Result<StoredCourse, StoreError> {
        self.saved_courses
            .get(index)
            .cloned()
            .ok_or(StoreError::IndexOutOfRange {
                index,
                len: self.saved_courses.len(),
            })
    }

    fn append(&mut self, course: Curriculum) -> SavedSlot {
        let slot = SavedSlot {
            index: self.saved_courses.len(),
            version: self.next_version(),
        };
        self.saved_courses.push(StoredCourse {
            course,
            version: slot.version,
        });
        slot
    }

    fn replace(
        &mut self,
        index: usize,
        expected_version: u64,
        course: Curriculum,
    ) -> Result<StoredCourse, StoreError> {
        let len = self.saved_courses.len();
        let actual = self
            .saved_courses
            .get(index)
            .map(|s| s.version)
            .ok_or(StoreError::IndexOutOfRange { index, len })?;

        if actual != expected_version {
            return Err(StoreError::VersionConflict {
                index,
                expected: expected_version,
                actual,
            });
        }

        let stored = StoredCourse {
            course,
            version: self.next_version(),
        };
        self.saved_courses[index] = stored.clone();
        Ok(stored)
    }

    fn remove(&mut self, index: usize) -> Result<Curriculum, StoreError> {
        if index >= self.saved_courses.len() {
            return Err(StoreError::IndexOutOfRange {
                index,
                len: self.saved_courses.len(),
            });
        }
        Ok(self.saved_courses.remove(index).course)
    }
}

/// In-process store.
#[derive(Debug, Default)]
pub struct MemoryCourseStore {
    data: RwLock<StoreData>,
}

impl MemoryCourseStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CourseStore for MemoryCourseStore {
    async fn load(&self) -> Result<Vec<StoredCourse>, StoreError> {
        Ok(self.data.read().await.saved_courses.clone())
    }

    async fn get(&self, index: usize) -> Result<StoredCourse, StoreError> {
        self.data.read().await.get(index)
    }

    async fn append_one(&self, course: Curriculum) -> Result<SavedSlot, StoreError> {
        Ok(self.data.write().await.append(course))
    }

    async fn replace_at(
        &self,
        index: usize,
        expected_version: u64,
        course: Curriculum,
    ) -> Result<StoredCourse, StoreError> {
        self.data
            .write()
            .await
            .replace(index, expected_version, course)
    }

    async fn remove_at(&self, index: usize) -> Result<Curriculum, StoreError> {
        self.data.write().await.remove(index)
    }

    async fn record_activity(&self, record: ActivityRecord) -> Result<(), StoreError> {
        self.data.write().await.recent_activities.push(record);
        Ok(())
    }

    async fn recent_activities(&self, limit: usize) -> Result<Vec<ActivityRecord>, StoreError> {
        Ok(self.data.read().await.recent_activities.recent(limit))
    }
}

/// Store persisted as a single JSON document.
///
/// Writes go to a sibling temp file that is renamed over the original.
/// All operations on one instance are serialized by an internal lock.
#[derive(Debug)]
pub struct FileCourseStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileCourseStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    async fn read(&self) -> Result<StoreData, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(StoreData::default())
            }
            Err(e) => return Err(e.into()),
        };

        let mut data: StoreData =
            serde_json::from_slice(&bytes).map_err(|e| StoreError::Corrupt(e.to_string()))?;
        data.recent_activities.truncate();
        Ok(data)
    }

    async fn write(&self, data: &StoreData) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(data)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        debug!(path = %self.path.display(), courses = data.saved_courses.len(), "Store written");
        Ok(())
    }

    /// Read, apply `f`, write back, all under the lock.
    async fn modify<T: Send>(
        &self,
        f: impl FnOnce(&mut StoreData) -> Result<T, StoreError> + Send,
    ) -> Result<T, StoreError> {
        let _guard = self.lock.lock().await;
        let mut data = self.read().await?;
        let result = f(&mut data)?;
        self.write(&data).await?;
        Ok(result)
    }
}

#[async_trait]
impl CourseStore for FileCourseStore {
    async fn load(&self) -> Result<Vec<StoredCourse>, StoreError> {
        let _guard = self.lock.lock().await;
        Ok(self.read().await?.saved_courses)
    }

    async fn get(&self, index: usize) -> Result<StoredCourse, StoreError> {
        let _guard = self.lock.lock().await;
        self.read().await?.get(index)
    }

    async fn append_one(&self, course: Curriculum) -> Result<SavedSlot, StoreError> {
        self.modify(|data| Ok(data.append(course))).await
    }

    async fn replace_at(
        &self,
        index: usize,
        expected_version: u64,
        course: Curriculum,
    ) -> Result<StoredCourse, StoreError> {
        self.modify(|data| data.replace(index, expected_version, course))
            .await
    }

    async fn remove_at(&self, index: usize) -> Result<Curriculum, StoreError> {
        self.modify(|data| data.remove(index)).await
    }

    async fn record_activity(&self, record: ActivityRecord) -> Result<(), StoreError> {
        self.modify(|data| {
            data.recent_activities.push(record);
            Ok(())
        })
        .await
    }

    async fn recent_activities(&self, limit: usize) -> Result<Vec<ActivityRecord>, StoreError> {
        let _guard = self.lock.lock().await;
        Ok(self.read().await?.recent_activities.recent(limit))
    }
}
