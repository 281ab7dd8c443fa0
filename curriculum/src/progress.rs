//! Completion tracking over a curriculum.
//!
//! Every operation here is a pure transformation: it takes a curriculum by
//! reference and returns a new value. Only `completed` fields ever change;
//! lesson and micro-lesson order is untouched. Persisting the result is the
//! caller's job (see `CourseStore::replace_at`).

use serde::{Deserialize, Serialize};

use crate::types::*;

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Toggle target was not found.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProgressError {
    #[error("Lesson index {index} out of range (curriculum has {len} lessons)")]
    LessonOutOfRange { index: usize, len: usize },

    #[error("Micro-lesson index {index} out of range (lesson {lesson} has {len} micro-lessons)")]
    MicroLessonOutOfRange {
        lesson: usize,
        index: usize,
        len: usize,
    },

    /// Lesson is itself a leaf
    #[error("Lesson {lesson} has no micro-lessons")]
    NoMicroLessons { lesson: usize },
}

/// Aggregate completion of a curriculum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    /// 0.0 - 100.0
    pub percent: f64,
    pub completed_leaves: usize,
    pub total_leaves: usize,
}

impl Progress {
    pub fn is_complete(&self) -> bool {
        self.total_leaves > 0 && self.completed_leaves == self.total_leaves
    }
}

/// Count completed leaves. Zero leaves is 0%, not a division by zero.
pub fn compute_progress(course: &Curriculum) -> Progress {
    let total_leaves = course.leaf_count();
    let completed_leaves = course.completed_leaf_count();

    let percent = if total_leaves == 0 {
        0.0
    } else {
        completed_leaves as f64 / total_leaves as f64 * 100.0
    };

    Progress {
        percent,
        completed_leaves,
        total_leaves,
    }
}

/// Flip one micro-lesson. The parent lesson's flag is left alone.
pub fn toggle_micro_lesson(
    course: &Curriculum,
    lesson_index: usize,
    micro_index: usize,
) -> Result<Curriculum, ProgressError> {
    let lesson = lesson_at(course, lesson_index)?;
    if lesson.is_leaf() {
        return Err(ProgressError::NoMicroLessons {
            lesson: lesson_index,
        });
    }
    let len = lesson.micro_lessons.as_ref().map_or(0, Vec::len);
    if micro_index >= len {
        return Err(ProgressError::MicroLessonOutOfRange {
            lesson: lesson_index,
            index: micro_index,
            len,
        });
    }

    let mut updated = course.clone();
    if let Some(micro) = updated.lessons[lesson_index]
        .micro_lessons
        .as_mut()
        .and_then(|m| m.get_mut(micro_index))
    {
        micro.completed = !micro.completed;
    }

    Ok(updated)
}

/// Flip a lesson and cascade the new value to its micro-lessons.
pub fn toggle_lesson(course: &Curriculum, lesson_index: usize) -> Result<Curriculum, ProgressError> {
    let completed = !lesson_at(course, lesson_index)?.completed;
    set_lesson_completed(course, lesson_index, completed)
}

/// Set a lesson's flag explicitly, cascading it down.
pub fn set_lesson_completed(
    course: &Curriculum,
    lesson_index: usize,
    completed: bool,
) -> Result<Curriculum, ProgressError> {
    lesson_at(course, lesson_index)?;

    let mut updated = course.clone();
    let lesson = &mut updated.lessons[lesson_index];
    lesson.completed = completed;
    cascade_from_lesson(lesson);

    Ok(updated)
}

/// Push a lesson's flag down to every leaf beneath it.
///
/// This is the only place a parent writes its children. Children never
/// write their parent.
pub fn cascade_from_lesson(lesson: &mut Lesson) {
    let completed = lesson.completed;
    for micro in lesson.micro_lessons.iter_mut().flatten() {
        micro.completed = completed;
    }
}

fn lesson_at(course: &Curriculum, index: usize) -> Result<&Lesson, ProgressError> {
    course
        .lessons
        .get(index)
        .ok_or(ProgressError::LessonOutOfRange {
            index,
            len: course.lessons.len(),
        })
}
