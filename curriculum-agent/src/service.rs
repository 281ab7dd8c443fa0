//! CourseService - main entry point for generating and tracking courses.
//!
//! This service wires the generation orchestrator to a course store and
//! keeps the activity log up to date.

use std::sync::Arc;

use curriculum::progress::{self, compute_progress};
use curriculum::store::load_or_empty;
use curriculum::{
    share, ActivityKind, ActivityRecord, CourseStore, Curriculum, Progress, ProgressError,
    SavedSlot, ShareDecodeError, StoreError, StoredCourse, ValidationError,
};
use tracing::{debug, info, warn};

use crate::orchestrator::{CurriculumOrchestrator, GenerationOutcome, GenerationRequest};

/// Retries after a concurrent write beat a progress update.
pub const MAX_WRITE_RETRIES: usize = 3;

/// Error types for the service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Topic or phase rejected before generation
    #[error("Invalid request: {0}")]
    Validation(#[from] ValidationError),

    /// Store read or write failed
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Toggle target does not exist
    #[error("Progress error: {0}")]
    Progress(#[from] ProgressError),

    /// Share payload could not be opened
    #[error("Share link is invalid: {0}")]
    ShareDecode(#[from] ShareDecodeError),

    /// Course could not be serialized for sharing
    #[error("Could not encode course: {0}")]
    ShareEncode(#[from] serde_json::Error),
}

/// Generation, saved courses and progress behind one API.
pub struct CourseService {
    orchestrator: CurriculumOrchestrator,
    store: Arc<dyn CourseStore>,
}

impl CourseService {
    pub fn new(orchestrator: CurriculumOrchestrator, store: Arc<dyn CourseStore>) -> Self {
        Self {
            orchestrator,
            store,
        }
    }

    pub fn orchestrator(&self) -> &CurriculumOrchestrator {
        &self.orchestrator
    }

    /// Generate a curriculum for a topic and phase label.
    ///
    /// Only validation fails hard. Backend trouble comes back as a
    /// degraded outcome carrying a placeholder curriculum.
    pub async fn generate(
        &self,
        topic: &str,
        phase_label: &str,
    ) -> Result<GenerationOutcome, ServiceError> {
        let request = GenerationRequest::new(topic, phase_label)?;
        let outcome = self.orchestrator.generate(&request).await;

        self.record(ActivityKind::Generate, &outcome.curriculum.title)
            .await;

        Ok(outcome)
    }

    /// Append a curriculum to the saved collection and report where it landed.
    pub async fn save(&self, course: Curriculum) -> Result<SavedSlot, ServiceError> {
        let title = course.title.clone();
        let slot = self.store.append_one(course).await?;

        info!(title = %title, index = slot.index, version = slot.version, "Course saved");
        self.record(ActivityKind::Save, &title).await;

        Ok(slot)
    }

    /// Saved courses in save order. Unreadable data yields an empty list.
    pub async fn courses(&self) -> Vec<StoredCourse> {
        load_or_empty(self.store.as_ref()).await
    }

    pub async fn course(&self, index: usize) -> Result<StoredCourse, ServiceError> {
        Ok(self.store.get(index).await?)
    }

    pub async fn progress(&self, index: usize) -> Result<Progress, ServiceError> {
        let stored = self.store.get(index).await?;
        Ok(compute_progress(&stored.course))
    }

    /// Delete a saved course. Later courses shift down by one.
    pub async fn remove(&self, index: usize) -> Result<Curriculum, ServiceError> {
        let removed = self.store.remove_at(index).await?;
        info!(index, title = %removed.title, "Course removed");
        Ok(removed)
    }

    /// Toggle a lesson, cascading to its micro-lessons.
    pub async fn toggle_lesson(
        &self,
        index: usize,
        lesson: usize,
    ) -> Result<Progress, ServiceError> {
        self.update_course(index, |course| progress::toggle_lesson(course, lesson))
            .await
    }

    /// Toggle one micro-lesson.
    pub async fn toggle_micro_lesson(
        &self,
        index: usize,
        lesson: usize,
        micro: usize,
    ) -> Result<Progress, ServiceError> {
        self.update_course(index, |course| {
            progress::toggle_micro_lesson(course, lesson, micro)
        })
        .await
    }

    /// Share payload for a saved course.
    pub async fn share(&self, index: usize) -> Result<String, ServiceError> {
        let stored = self.store.get(index).await?;
        Ok(share::encode(&stored.course)?)
    }

    /// Decode a share payload into an independent curriculum.
    pub fn open_shared(&self, payload: &str) -> Result<Curriculum, ServiceError> {
        share::decode(payload).map_err(|e| {
            warn!(error = %e, "Rejected share payload");
            ServiceError::ShareDecode(e)
        })
    }

    /// Most recent activity, newest first.
    pub async fn recent_activity(&self, limit: usize) -> Result<Vec<ActivityRecord>, ServiceError> {
        Ok(self.store.recent_activities(limit).await?)
    }

    /// Read, transform and compare-and-swap a saved course.
    async fn update_course<F>(&self, index: usize, update: F) -> Result<Progress, ServiceError>
    where
        F: Fn(&Curriculum) -> Result<Curriculum, ProgressError> + Send + Sync,
    {
        let mut retries = 0;

        loop {
            let stored = self.store.get(index).await?;
            let updated = update(&stored.course)?;
            let progress = compute_progress(&updated);

            match self.store.replace_at(index, stored.version, updated).await {
                Ok(_) => return Ok(progress),
                Err(StoreError::VersionConflict { .. }) if retries < MAX_WRITE_RETRIES => {
                    retries += 1;
                    debug!(index, retries, "Course changed underneath update, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn record(&self, kind: ActivityKind, title: &str) {
        if let Err(e) = self
            .store
            .record_activity(ActivityRecord::new(kind, title))
            .await
        {
            warn!(error = %e, "Failed to record activity");
        }
    }
}
