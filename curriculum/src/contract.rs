//! Schema contracts for generated objects.
//!
//! A contract does two jobs: it describes the JSON shape requested from the
//! generation backend ([`OutputContract::json_schema`]) and it checks what
//! comes back ([`OutputContract::validate`]). Contracts are plain values and
//! are never mutated after construction.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::types::*;

/// A generated object broke its contract.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{path}: {reason}")]
pub struct ContractViolation {
    /// Location of the offending field, e.g. `lessons[1].microLessons[0].title`
    pub path: String,
    /// What was wrong with it
    pub reason: String,
}

impl ContractViolation {
    pub fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Shape shared by every output contract.
pub trait OutputContract: Send + Sync {
    /// Type the backend's JSON answer is parsed into
    type Output: DeserializeOwned + Send;

    /// Name used for the structured-output request and in logs.
    fn name(&self) -> &'static str;

    /// JSON Schema sent to the backend.
    fn json_schema(&self) -> Value;

    /// Check a parsed answer.
    fn validate(&self, output: &Self::Output) -> Result<(), ContractViolation>;
}

/// Numeric bounds on generated item counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractBounds {
    pub max_lessons: usize,
    pub min_micro_lessons: usize,
    pub max_micro_lessons: usize,
    pub min_free_resources: usize,
    pub max_free_resources: usize,
    pub max_paid_resources: usize,
}

impl Default for ContractBounds {
    fn default() -> Self {
        Self {
            max_lessons: 20,
            min_micro_lessons: 2,
            max_micro_lessons: 5,
            min_free_resources: 1,
            max_free_resources: 2,
            max_paid_resources: 1,
        }
    }
}

/// Contract for a complete curriculum of a given shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurriculumContract {
    pub version: SchemaVersion,
    pub bounds: ContractBounds,
}

impl Default for CurriculumContract {
    fn default() -> Self {
        Self::new(SchemaVersion::NestedWithResources)
    }
}

impl CurriculumContract {
    pub fn new(version: SchemaVersion) -> Self {
        Self {
            version,
            bounds: ContractBounds::default(),
        }
    }

    pub fn with_bounds(mut self, bounds: ContractBounds) -> Self {
        self.bounds = bounds;
        self
    }

    /// Check the `schemaVersion` tag as well as the shape.
    pub fn validate_tagged(&self, course: &Curriculum) -> Result<(), ContractViolation> {
        if course.schema_version != self.version {
            return Err(ContractViolation::new(
                "schemaVersion",
                format!(
                    "expected {}, found {}",
                    self.version.as_str(),
                    course.schema_version.as_str()
                ),
            ));
        }
        OutputContract::validate(self, course)
    }

    fn validate_lesson(&self, path: &str, lesson: &Lesson) -> Result<(), ContractViolation> {
        require_text(&format!("{path}.title"), &lesson.title)?;
        if let Some(description) = &lesson.description {
            require_text(&format!("{path}.description"), description)?;
        }

        let micro_lessons = lesson.micro_lessons.as_deref().unwrap_or_default();

        if !self.version.has_micro_lessons() {
            if !micro_lessons.is_empty() {
                return Err(ContractViolation::new(
                    format!("{path}.microLessons"),
                    "flat curriculum must not contain micro-lessons",
                ));
            }
            return Ok(());
        }

        require_count(
            &format!("{path}.microLessons"),
            micro_lessons.len(),
            self.bounds.min_micro_lessons,
            self.bounds.max_micro_lessons,
        )?;

        for (i, micro) in micro_lessons.iter().enumerate() {
            self.validate_micro_lesson(&format!("{path}.microLessons[{i}]"), micro)?;
        }

        Ok(())
    }

    fn validate_micro_lesson(
        &self,
        path: &str,
        micro: &MicroLesson,
    ) -> Result<(), ContractViolation> {
        require_text(&format!("{path}.title"), &micro.title)?;
        require_text(&format!("{path}.description"), &micro.description)?;

        let resources = match (&micro.resources, self.version.has_resources()) {
            (Some(resources), _) => resources,
            (None, true) => {
                return Err(ContractViolation::new(
                    format!("{path}.resources"),
                    "required field is missing",
                ))
            }
            (None, false) => return Ok(()),
        };

        if self.version.has_resources() {
            require_count(
                &format!("{path}.resources.free"),
                resources.free_count(),
                self.bounds.min_free_resources,
                self.bounds.max_free_resources,
            )?;
            require_count(
                &format!("{path}.resources.paid"),
                resources.paid_count(),
                0,
                self.bounds.max_paid_resources,
            )?;
        }

        for (i, link) in resources.free.iter().flatten().enumerate() {
            validate_link(&format!("{path}.resources.free[{i}]"), link)?;
        }
        for (i, link) in resources.paid.iter().flatten().enumerate() {
            validate_link(&format!("{path}.resources.paid[{i}]"), link)?;
        }

        Ok(())
    }

    fn lesson_schema(&self) -> Value {
        let mut properties = json!({
            "title": { "type": "string", "minLength": 1 },
            "description": { "type": "string", "minLength": 1 },
        });
        let mut required = vec!["title", "description"];

        if self.version.has_micro_lessons() {
            properties["microLessons"] = json!({
                "type": "array",
                "minItems": self.bounds.min_micro_lessons,
                "maxItems": self.bounds.max_micro_lessons,
                "items": self.micro_lesson_schema(),
            });
            required.push("microLessons");
        }

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    fn micro_lesson_schema(&self) -> Value {
        let mut properties = json!({
            "title": { "type": "string", "minLength": 1 },
            "description": { "type": "string", "minLength": 1 },
        });
        let mut required = vec!["title", "description"];

        if self.version.has_resources() {
            properties["resources"] = json!({
                "type": "object",
                "properties": {
                    "free": {
                        "type": "array",
                        "minItems": self.bounds.min_free_resources,
                        "maxItems": self.bounds.max_free_resources,
                        "items": link_schema(),
                    },
                    "paid": {
                        "type": "array",
                        "maxItems": self.bounds.max_paid_resources,
                        "items": link_schema(),
                    },
                },
                "required": ["free"],
            });
            required.push("resources");
        }

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

impl OutputContract for CurriculumContract {
    type Output = Curriculum;

    fn name(&self) -> &'static str {
        "curriculum"
    }

    fn json_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "title": { "type": "string", "minLength": 1 },
                "summary": { "type": "string", "minLength": 1 },
                "isProjectBased": { "type": "boolean" },
                "lessons": {
                    "type": "array",
                    "minItems": 1,
                    "maxItems": self.bounds.max_lessons,
                    "items": self.lesson_schema(),
                },
                "finalNote": { "type": "string", "minLength": 1 },
            },
            "required": ["title", "summary", "isProjectBased", "lessons", "finalNote"],
        })
    }

    /// Shape check only. Generated JSON does not carry the `schemaVersion`
    /// tag; use [`CurriculumContract::validate_tagged`] once it is stamped.
    fn validate(&self, course: &Curriculum) -> Result<(), ContractViolation> {
        require_text("title", &course.title)?;
        require_text("summary", &course.summary)?;
        require_text("finalNote", &course.final_note)?;
        require_count("lessons", course.lessons.len(), 1, self.bounds.max_lessons)?;

        for (i, lesson) in course.lessons.iter().enumerate() {
            self.validate_lesson(&format!("lessons[{i}]"), lesson)?;
        }

        Ok(())
    }
}

/// One planned lesson from the first stage of two-stage generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonPlan {
    pub title: String,
    pub description: String,
}

/// Output of the lesson-planning stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonPlanOutput {
    pub title: String,
    pub lessons: Vec<LessonPlan>,
    pub final_note: String,
}

/// Contract for the lesson-planning stage.
///
/// An empty lesson list passes this contract; rejecting it is the
/// orchestrator's decision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LessonPlanContract {
    pub bounds: ContractBounds,
}

impl OutputContract for LessonPlanContract {
    type Output = LessonPlanOutput;

    fn name(&self) -> &'static str {
        "lesson_plans"
    }

    fn json_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "title": { "type": "string", "minLength": 1 },
                "lessons": {
                    "type": "array",
                    "maxItems": self.bounds.max_lessons,
                    "items": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string", "minLength": 1 },
                            "description": { "type": "string", "minLength": 1 },
                        },
                        "required": ["title", "description"],
                    },
                },
                "finalNote": { "type": "string", "minLength": 1 },
            },
            "required": ["title", "lessons", "finalNote"],
        })
    }

    fn validate(&self, output: &LessonPlanOutput) -> Result<(), ContractViolation> {
        require_text("title", &output.title)?;
        require_text("finalNote", &output.final_note)?;
        require_count("lessons", output.lessons.len(), 0, self.bounds.max_lessons)?;

        for (i, plan) in output.lessons.iter().enumerate() {
            require_text(&format!("lessons[{i}].title"), &plan.title)?;
            require_text(&format!("lessons[{i}].description"), &plan.description)?;
        }

        Ok(())
    }
}

/// Output of the summary stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryOutput {
    pub summary: String,
}

/// Contract for the summary stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SummaryContract;

impl OutputContract for SummaryContract {
    type Output = SummaryOutput;

    fn name(&self) -> &'static str {
        "course_summary"
    }

    fn json_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "summary": { "type": "string", "minLength": 1 },
            },
            "required": ["summary"],
        })
    }

    fn validate(&self, output: &SummaryOutput) -> Result<(), ContractViolation> {
        require_text("summary", &output.summary)
    }
}

fn link_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "title": { "type": "string", "minLength": 1 },
            "url": { "type": "string", "format": "uri" },
            "platform": { "type": "string", "minLength": 1 },
        },
        "required": ["title", "url", "platform"],
    })
}

fn require_text(path: &str, value: &str) -> Result<(), ContractViolation> {
    if value.trim().is_empty() {
        return Err(ContractViolation::new(path, "must not be empty"));
    }
    Ok(())
}

fn require_count(path: &str, count: usize, min: usize, max: usize) -> Result<(), ContractViolation> {
    if count < min || count > max {
        return Err(ContractViolation::new(
            path,
            format!("expected {min}..={max} items, found {count}"),
        ));
    }
    Ok(())
}

fn validate_link(path: &str, link: &ResourceLink) -> Result<(), ContractViolation> {
    require_text(&format!("{path}.title"), &link.title)?;
    require_text(&format!("{path}.platform"), &link.platform)?;

    let parsed = url::Url::parse(&link.url)
        .map_err(|e| ContractViolation::new(format!("{path}.url"), format!("invalid URL: {e}")))?;

    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(ContractViolation::new(
            format!("{path}.url"),
            "must be an absolute http(s) URL",
        ));
    }

    Ok(())
}
