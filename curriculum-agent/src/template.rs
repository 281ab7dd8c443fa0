//! Prompt templates.
//!
//! Each template is identified by a fixed [`TemplateId`] and has one input
//! type. An input checks its own constraints and renders the user prompt;
//! the shared [`SYSTEM_PROMPT`] sets the persona for every template.

use curriculum::{ContractBounds, Phase, SchemaVersion};
use serde::Serialize;

/// System prompt shared by all templates.
pub const SYSTEM_PROMPT: &str = "You are an expert programming instructor and curriculum designer. \
Content must be beginner-friendly where the phase calls for it, technically accurate and in clear language. \
Each lesson builds logically on the previous one. \
Respond with a single JSON object that matches the requested schema exactly. \
Do not add commentary before or after the JSON.";

/// Fixed template identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateId {
    /// One call returns the whole nested curriculum
    FullCurriculum,
    /// Stage one of two-stage generation: lesson titles and descriptions
    LessonPlans,
    /// Stage two: a course summary from the lesson titles
    CourseSummary,
}

impl TemplateId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FullCurriculum => "full_curriculum",
            Self::LessonPlans => "lesson_plans",
            Self::CourseSummary => "course_summary",
        }
    }
}

/// Input to a prompt template.
pub trait PromptTemplate: Send + Sync {
    /// Template this input belongs to.
    fn template_id(&self) -> TemplateId;

    /// Check the input contract before any backend call.
    fn validate(&self) -> Result<(), String>;

    /// Render the user prompt.
    fn render(&self) -> String;
}

/// Input for [`TemplateId::FullCurriculum`].
#[derive(Debug, Clone, Serialize)]
pub struct CurriculumInput {
    pub topic: String,
    pub phase: Phase,
    pub target_count: u32,
    pub schema_version: SchemaVersion,
    pub bounds: ContractBounds,
}

impl CurriculumInput {
    pub fn new(topic: impl Into<String>, phase: Phase, schema_version: SchemaVersion) -> Self {
        Self {
            topic: topic.into(),
            phase,
            target_count: phase.target_count(),
            schema_version,
            bounds: ContractBounds::default(),
        }
    }
}

impl PromptTemplate for CurriculumInput {
    fn template_id(&self) -> TemplateId {
        TemplateId::FullCurriculum
    }

    fn validate(&self) -> Result<(), String> {
        require_topic(&self.topic)?;
        if self.target_count == 0 {
            return Err("target_count must be positive".to_string());
        }
        Ok(())
    }

    fn render(&self) -> String {
        let mut prompt = String::new();

        prompt.push_str("# CURRICULUM REQUEST\n\n");
        prompt.push_str(&format!("**Topic**: {}\n", self.topic));
        prompt.push_str(&format!("**Phase**: {}\n\n", self.phase.label()));

        prompt.push_str("## Lessons\n\n");
        prompt.push_str(&format!(
            "Plan about {} lessons for the '{}' phase. Use your judgment on the exact number \
             needed to cover the material for someone at this level.\n",
            self.target_count,
            self.phase.label()
        ));
        if self.phase.is_project_based() {
            prompt.push_str(
                "This phase is project-based: every lesson is a hands-on project that applies \
                 earlier concepts.\n",
            );
        } else {
            prompt.push_str("This phase is concept-based: every lesson teaches one core concept.\n");
        }

        if self.schema_version.has_micro_lessons() {
            prompt.push_str(&format!(
                "\nBreak each lesson into {} to {} micro-lessons, each with a title and a short \
                 description.\n",
                self.bounds.min_micro_lessons, self.bounds.max_micro_lessons
            ));
        }

        if self.schema_version.has_resources() {
            prompt.push_str(&format!(
                "For every micro-lesson list {} to {} free resources and at most {} paid \
                 resource. Each resource has a title, an absolute https URL to a real page and \
                 the platform that hosts it.\n",
                self.bounds.min_free_resources,
                self.bounds.max_free_resources,
                self.bounds.max_paid_resources
            ));
        }

        prompt.push_str("\n## Required Fields\n\n");
        prompt.push_str("- `title`: a compelling course title\n");
        prompt.push_str("- `summary`: a concise summary of what the course covers\n");
        prompt.push_str(&format!(
            "- `isProjectBased`: {}\n",
            self.phase.is_project_based()
        ));
        prompt.push_str("- `lessons`: the ordered lessons\n");
        prompt.push_str("- `finalNote`: a closing note reviewing the key concepts\n");

        prompt
    }
}

/// Input for [`TemplateId::LessonPlans`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonPlanInput {
    pub topic: String,
    pub phase: Phase,
    pub lesson_count: u32,
    #[serde(skip)]
    pub max_lessons: usize,
}

impl LessonPlanInput {
    pub fn new(topic: impl Into<String>, phase: Phase) -> Self {
        Self {
            topic: topic.into(),
            phase,
            lesson_count: phase.target_count(),
            max_lessons: ContractBounds::default().max_lessons,
        }
    }
}

impl PromptTemplate for LessonPlanInput {
    fn template_id(&self) -> TemplateId {
        TemplateId::LessonPlans
    }

    fn validate(&self) -> Result<(), String> {
        require_topic(&self.topic)?;
        if self.lesson_count == 0 || self.lesson_count as usize > self.max_lessons {
            return Err(format!(
                "lesson_count must be between 1 and {}, got {}",
                self.max_lessons, self.lesson_count
            ));
        }
        Ok(())
    }

    fn render(&self) -> String {
        let mut prompt = String::new();

        prompt.push_str("# LESSON PLAN REQUEST\n\n");
        prompt.push_str(&format!("**Topic**: {}\n", self.topic));
        prompt.push_str(&format!("**Phase**: {}\n\n", self.phase.label()));
        prompt.push_str(&format!(
            "Generate about {} lesson plans for this course, using your judgment on the exact \
             number. Each lesson plan has a `title` and a short `description`.\n",
            self.lesson_count
        ));
        prompt.push_str(
            "Also provide a course `title` and a `finalNote` that reviews the key concepts.\n",
        );

        prompt
    }
}

/// Input for [`TemplateId::CourseSummary`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryInput {
    pub course_title: String,
    /// Lesson titles, verbatim from the planning stage
    pub lessons: Vec<String>,
}

impl PromptTemplate for SummaryInput {
    fn template_id(&self) -> TemplateId {
        TemplateId::CourseSummary
    }

    fn validate(&self) -> Result<(), String> {
        if self.course_title.trim().is_empty() {
            return Err("course_title must not be empty".to_string());
        }
        if self.lessons.is_empty() {
            return Err("at least one lesson title is required".to_string());
        }
        Ok(())
    }

    fn render(&self) -> String {
        let mut prompt = String::new();

        prompt.push_str("# COURSE SUMMARY REQUEST\n\n");
        prompt.push_str(
            "Given the title and lessons of a course, write a concise `summary` that captures \
             the main focus and learning objectives of the course.\n\n",
        );
        prompt.push_str(&format!("Course Title: {}\n", self.course_title));
        prompt.push_str("Lessons:\n");
        for lesson in &self.lessons {
            prompt.push_str(&format!("- {}\n", lesson));
        }

        prompt
    }
}

fn require_topic(topic: &str) -> Result<(), String> {
    if topic.trim().is_empty() {
        return Err("topic must not be empty".to_string());
    }
    Ok(())
}
