//! Curriculum model and progress tracking.
//!
//! This crate holds everything about a curriculum that does not need a
//! text-generation backend:
//!
//! - **Types**: [`Curriculum`], [`Lesson`], [`MicroLesson`], [`ResourceLink`]
//! - **Phases**: the [`Phase`] lookup table that parameterizes generation
//! - **Contracts**: [`CurriculumContract`] and the stage contracts used to
//!   constrain and validate generated objects
//! - **Progress**: pure toggle/progress operations over a curriculum
//! - **Store**: the [`CourseStore`] trait with in-memory and file implementations
//! - **Share**: lossless text encoding of a single curriculum
//!
//! # Example
//!
//! ```ignore
//! use curriculum::{progress, CurriculumContract};
//!
//! CurriculumContract::default().validate_tagged(&course)?;
//! let course = progress::toggle_lesson(&course, 0)?;
//! let report = progress::compute_progress(&course);
//! println!("{:.0}% of {} leaves", report.percent, report.total_leaves);
//! ```

pub mod activity;
pub mod contract;
pub mod phase;
pub mod progress;
pub mod share;
pub mod store;
pub mod types;

// Re-export main types
pub use activity::{ActivityKind, ActivityLog, ActivityRecord, MAX_ACTIVITIES};
pub use contract::{
    ContractBounds, ContractViolation, CurriculumContract, LessonPlan, LessonPlanContract,
    LessonPlanOutput, OutputContract, SummaryContract, SummaryOutput,
};
pub use phase::{target_count_for, Phase, ValidationError};
pub use progress::{Progress, ProgressError};
pub use share::ShareDecodeError;
pub use store::{
    CourseStore, FileCourseStore, MemoryCourseStore, SavedSlot, StoreError, StoredCourse,
};
pub use types::*;
