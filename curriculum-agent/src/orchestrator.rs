//! Generation orchestrator - turns a validated request into a curriculum.
//!
//! Two shapes are supported:
//!
//! ```text
//! SingleCall:  Idle -> Requesting(Curriculum) -> Validating -> Done
//! TwoStage:    Idle -> Requesting(LessonPlans) -> Requesting(Summary) -> Validating -> Done
//! ```
//!
//! Any failure along the way moves to `Fallback`, which always produces a
//! placeholder curriculum, before reaching `Done`. The caller therefore
//! always gets something to render; the outcome status says whether it is
//! the real thing.

use std::sync::Arc;
use std::time::Duration;

use curriculum::phase::validate_topic;
use curriculum::{
    ContractBounds, Curriculum, CurriculumContract, Lesson, LessonPlanContract, Phase,
    SchemaVersion, SummaryContract, ValidationError,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

#[cfg(feature = "typescript")]
use ts_rs::TS;

use crate::backend::traits::LlmBackend;
use crate::fallback::FallbackSynthesizer;
use crate::invoker::{GenerationError, InvokeOptions, PromptInvoker};
use crate::template::{CurriculumInput, LessonPlanInput, SummaryInput};

/// How many backend calls a generation takes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrchestrationShape {
    /// One call returns the whole curriculum
    #[default]
    SingleCall,
    /// Lesson plans first, then a summary built from their titles
    TwoStage,
}

/// Configuration for the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    pub shape: OrchestrationShape,
    /// Shape requested in single-call mode. Two-stage output is always flat.
    pub schema_version: SchemaVersion,
    /// Per-call timeout (ms)
    pub timeout_ms: u64,
    pub max_tokens: u32,
    pub temperature: f32,
    pub bounds: ContractBounds,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            shape: OrchestrationShape::SingleCall,
            schema_version: SchemaVersion::NestedWithResources,
            timeout_ms: 60_000,
            max_tokens: 8192,
            temperature: 0.7,
            bounds: ContractBounds::default(),
        }
    }
}

impl OrchestratorConfig {
    fn invoke_options(&self) -> InvokeOptions {
        InvokeOptions {
            timeout: Duration::from_millis(self.timeout_ms),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }
}

/// Entry point for building a [`ValidatedRequest`].
pub struct GenerationRequest;

impl GenerationRequest {
    /// Validate a raw topic and phase label.
    pub fn new(topic: &str, phase_label: &str) -> Result<ValidatedRequest, ValidationError> {
        let phase = phase_label.parse::<Phase>()?;
        Self::for_phase(topic, phase)
    }

    /// Validate a raw topic for an already-known phase.
    pub fn for_phase(topic: &str, phase: Phase) -> Result<ValidatedRequest, ValidationError> {
        Ok(ValidatedRequest {
            request_id: Uuid::new_v4().to_string(),
            topic: validate_topic(topic)?,
            phase,
        })
    }
}

/// A request that passed validation. Only [`GenerationRequest`] builds these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedRequest {
    request_id: String,
    topic: String,
    phase: Phase,
}

impl ValidatedRequest {
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Trimmed topic
    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }
}

/// Backend call currently in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Curriculum,
    LessonPlans,
    Summary,
}

/// Orchestrator state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case", tag = "state", content = "stage")]
pub enum GenerationState {
    Idle,
    Requesting(Stage),
    Validating,
    Fallback,
    Done,
}

/// Whether the curriculum came from the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum GenerationStatus {
    Generated,
    /// Placeholder content; `reason` says what went wrong
    Degraded { reason: String },
}

/// Result of one generation.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct GenerationOutcome {
    pub request_id: String,
    pub curriculum: Curriculum,
    pub status: GenerationStatus,
    /// Every state entered, in order
    pub transitions: Vec<GenerationState>,
}

impl GenerationOutcome {
    pub fn is_degraded(&self) -> bool {
        matches!(self.status, GenerationStatus::Degraded { .. })
    }
}

/// Records state transitions for one request.
struct Run<'a> {
    request_id: &'a str,
    transitions: Vec<GenerationState>,
}

impl<'a> Run<'a> {
    fn new(request_id: &'a str) -> Self {
        let mut run = Self {
            request_id,
            transitions: Vec::new(),
        };
        run.enter(GenerationState::Idle);
        run
    }

    fn enter(&mut self, state: GenerationState) {
        debug!(request_id = self.request_id, state = ?state, "Generation state");
        self.transitions.push(state);
    }
}

/// Drives the backend through one of the generation shapes.
pub struct CurriculumOrchestrator {
    invoker: PromptInvoker,
    config: OrchestratorConfig,
}

impl CurriculumOrchestrator {
    pub fn new(backend: Arc<dyn LlmBackend>) -> Self {
        Self::with_config(backend, OrchestratorConfig::default())
    }

    pub fn with_config(backend: Arc<dyn LlmBackend>, config: OrchestratorConfig) -> Self {
        let invoker = PromptInvoker::new(backend).with_options(config.invoke_options());
        Self { invoker, config }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Generate a curriculum. Never fails: errors degrade to a placeholder.
    pub async fn generate(&self, request: &ValidatedRequest) -> GenerationOutcome {
        let mut run = Run::new(&request.request_id);

        info!(
            request_id = %request.request_id,
            topic = %request.topic,
            phase = request.phase.slug(),
            shape = ?self.config.shape,
            backend = self.invoker.backend_id(),
            "Generating curriculum"
        );

        let generated = match self.config.shape {
            OrchestrationShape::SingleCall => self.single_call(request, &mut run).await,
            OrchestrationShape::TwoStage => self.two_stage(request, &mut run).await,
        };

        let checked = generated.and_then(|course| {
            run.enter(GenerationState::Validating);
            self.finalize(request, course)
        });

        let (curriculum, status) = match checked {
            Ok(course) => {
                info!(
                    request_id = %request.request_id,
                    title = %course.title,
                    lessons = course.lessons.len(),
                    "Curriculum generated"
                );
                (course, GenerationStatus::Generated)
            }
            Err(e) => {
                run.enter(GenerationState::Fallback);
                warn!(
                    request_id = %request.request_id,
                    error = %e,
                    "Generation failed, using placeholder curriculum"
                );
                (
                    FallbackSynthesizer::synthesize(&request.topic, request.phase),
                    GenerationStatus::Degraded {
                        reason: e.to_string(),
                    },
                )
            }
        };

        run.enter(GenerationState::Done);

        GenerationOutcome {
            request_id: request.request_id.clone(),
            curriculum,
            status,
            transitions: run.transitions,
        }
    }

    async fn single_call(
        &self,
        request: &ValidatedRequest,
        run: &mut Run<'_>,
    ) -> Result<Curriculum, GenerationError> {
        let mut input = CurriculumInput::new(
            request.topic.clone(),
            request.phase,
            self.config.schema_version,
        );
        input.bounds = self.config.bounds;

        run.enter(GenerationState::Requesting(Stage::Curriculum));
        self.invoker.invoke(&input, &self.contract()).await
    }

    async fn two_stage(
        &self,
        request: &ValidatedRequest,
        run: &mut Run<'_>,
    ) -> Result<Curriculum, GenerationError> {
        let mut plan_input = LessonPlanInput::new(request.topic.clone(), request.phase);
        plan_input.max_lessons = self.config.bounds.max_lessons;

        run.enter(GenerationState::Requesting(Stage::LessonPlans));
        let plan = self
            .invoker
            .invoke(
                &plan_input,
                &LessonPlanContract {
                    bounds: self.config.bounds,
                },
            )
            .await?;

        if plan.lessons.is_empty() {
            return Err(GenerationError::EmptyLessonPlan);
        }

        let summary_input = SummaryInput {
            course_title: plan.title.clone(),
            lessons: plan.lessons.iter().map(|l| l.title.clone()).collect(),
        };

        run.enter(GenerationState::Requesting(Stage::Summary));
        let summary = self.invoker.invoke(&summary_input, &SummaryContract).await?;

        Ok(Curriculum {
            schema_version: SchemaVersion::Flat,
            title: plan.title,
            summary: summary.summary,
            is_project_based: request.phase.is_project_based(),
            lessons: plan
                .lessons
                .into_iter()
                .map(|l| Lesson::new(l.title).with_description(l.description))
                .collect(),
            final_note: plan.final_note,
        })
    }

    /// Stamp request-derived fields and check the finished curriculum.
    fn finalize(
        &self,
        request: &ValidatedRequest,
        mut course: Curriculum,
    ) -> Result<Curriculum, GenerationError> {
        let version = match self.config.shape {
            OrchestrationShape::SingleCall => self.config.schema_version,
            OrchestrationShape::TwoStage => SchemaVersion::Flat,
        };

        course.schema_version = version;
        course.is_project_based = request.phase.is_project_based();
        clear_completion(&mut course);

        let contract = CurriculumContract::new(version).with_bounds(self.config.bounds);
        contract
            .validate_tagged(&course)
            .map_err(|violation| GenerationError::Contract {
                contract: "curriculum",
                violation,
            })?;

        Ok(course)
    }

    fn contract(&self) -> CurriculumContract {
        CurriculumContract::new(self.config.schema_version).with_bounds(self.config.bounds)
    }
}

/// A fresh curriculum starts with nothing completed.
fn clear_completion(course: &mut Curriculum) {
    for lesson in &mut course.lessons {
        lesson.completed = false;
        for micro in lesson.micro_lessons.iter_mut().flatten() {
            micro.completed = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockBackend;
    use crate::fallback::FALLBACK_NOTE;
    use serde_json::json;

    fn nested_course_json(is_project_based: bool) -> String {
        let micro = json!({
            "title": "Borrowing",
            "description": "Shared and mutable references",
            "resources": {
                "free": [{
                    "title": "The Book",
                    "url": "https://doc.rust-lang.org/book/",
                    "platform": "rust-lang.org"
                }]
            }
        });

        json!({
            "title": "Rust Fundamentals",
            "summary": "Learn the basics of Rust.",
            "isProjectBased": is_project_based,
            "lessons": [{
                "title": "Ownership",
                "description": "Who owns what",
                "microLessons": [micro.clone(), micro],
                "completed": true
            }],
            "finalNote": "Keep practicing."
        })
        .to_string()
    }

    fn plan_json(lessons: &[&str]) -> String {
        let lessons: Vec<_> = lessons
            .iter()
            .map(|t| json!({ "title": t, "description": format!("About {t}") }))
            .collect();

        json!({
            "title": "Rust Projects",
            "lessons": lessons,
            "finalNote": "Ship it."
        })
        .to_string()
    }

    fn two_stage(backend: Arc<MockBackend>) -> CurriculumOrchestrator {
        CurriculumOrchestrator::with_config(
            backend,
            OrchestratorConfig {
                shape: OrchestrationShape::TwoStage,
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_request_validation() {
        let request = GenerationRequest::new("  Rust  ", "Core Projects").unwrap();
        assert_eq!(request.topic(), "Rust");
        assert_eq!(request.phase(), Phase::CoreProjects);
        assert!(!request.request_id().is_empty());

        assert!(matches!(
            GenerationRequest::new("ab", "fundamentals"),
            Err(ValidationError::TopicTooShort { .. })
        ));
        assert!(matches!(
            GenerationRequest::new("Rust", "expert"),
            Err(ValidationError::UnknownPhase(_))
        ));
    }

    #[tokio::test]
    async fn test_single_call_success() {
        let backend = Arc::new(MockBackend::default().with_response(nested_course_json(false)));
        let orchestrator = CurriculumOrchestrator::new(backend.clone());
        let request = GenerationRequest::new("Rust", "fundamentals").unwrap();

        let outcome = orchestrator.generate(&request).await;

        assert_eq!(outcome.status, GenerationStatus::Generated);
        assert_eq!(outcome.curriculum.title, "Rust Fundamentals");
        assert_eq!(
            outcome.curriculum.schema_version,
            SchemaVersion::NestedWithResources
        );
        assert!(!outcome.curriculum.lessons[0].completed);
        assert_eq!(backend.call_count(), 1);
        assert_eq!(
            outcome.transitions,
            vec![
                GenerationState::Idle,
                GenerationState::Requesting(Stage::Curriculum),
                GenerationState::Validating,
                GenerationState::Done,
            ]
        );
    }

    #[tokio::test]
    async fn test_project_flag_comes_from_phase() {
        // Content claims project-based; the phase says otherwise.
        let backend = Arc::new(MockBackend::default().with_response(nested_course_json(true)));
        let orchestrator = CurriculumOrchestrator::new(backend);

        let request = GenerationRequest::new("Rust", "advanced").unwrap();
        let outcome = orchestrator.generate(&request).await;
        assert!(!outcome.curriculum.is_project_based);

        let backend = Arc::new(MockBackend::default().with_response(nested_course_json(false)));
        let orchestrator = CurriculumOrchestrator::new(backend);

        let request = GenerationRequest::new("Rust", "real_world").unwrap();
        let outcome = orchestrator.generate(&request).await;
        assert!(outcome.curriculum.is_project_based);
    }

    #[tokio::test]
    async fn test_backend_error_degrades() {
        let backend = Arc::new(MockBackend::default().then_fail("connection refused"));
        let orchestrator = CurriculumOrchestrator::new(backend);
        let request = GenerationRequest::new("Rust", "core").unwrap();

        let outcome = orchestrator.generate(&request).await;

        assert!(outcome.is_degraded());
        assert!(outcome.curriculum.summary.contains(FALLBACK_NOTE));
        assert!(outcome.curriculum.is_project_based);
        assert_eq!(
            outcome.transitions,
            vec![
                GenerationState::Idle,
                GenerationState::Requesting(Stage::Curriculum),
                GenerationState::Fallback,
                GenerationState::Done,
            ]
        );
        match outcome.status {
            GenerationStatus::Degraded { reason } => assert!(reason.contains("connection refused")),
            other => panic!("expected degraded, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_contract_violation_degrades() {
        // Nested shape requested, but the lesson has no micro-lessons.
        let flat = json!({
            "title": "Rust",
            "summary": "Basics",
            "isProjectBased": false,
            "lessons": [{ "title": "Ownership", "description": "Who owns what" }],
            "finalNote": "Done"
        });
        let backend = Arc::new(MockBackend::default().with_response(flat.to_string()));
        let orchestrator = CurriculumOrchestrator::new(backend);
        let request = GenerationRequest::new("Rust", "fundamentals").unwrap();

        let outcome = orchestrator.generate(&request).await;

        assert!(outcome.is_degraded());
        assert!(outcome.transitions.contains(&GenerationState::Fallback));
    }

    #[tokio::test]
    async fn test_too_many_lessons_degrades() {
        let bounds = ContractBounds {
            max_lessons: 2,
            ..Default::default()
        };
        let backend = Arc::new(
            MockBackend::default()
                .then_reply(plan_json(&["One", "Two", "Three"]))
                .then_reply(json!({ "summary": "S" }).to_string()),
        );
        let orchestrator = CurriculumOrchestrator::with_config(
            backend,
            OrchestratorConfig {
                shape: OrchestrationShape::TwoStage,
                bounds,
                ..Default::default()
            },
        );
        let request = GenerationRequest::new("Rust", "fundamentals").unwrap();

        let outcome = orchestrator.generate(&request).await;
        assert!(outcome.is_degraded());
    }

    #[tokio::test]
    async fn test_two_stage_passes_titles_verbatim() {
        let backend = Arc::new(
            MockBackend::default()
                .then_reply(plan_json(&["Ownership & Borrowing", "Traits: the basics"]))
                .then_reply(json!({ "summary": "A hands-on Rust course." }).to_string()),
        );
        let orchestrator = two_stage(backend.clone());
        let request = GenerationRequest::new("Rust", "core").unwrap();

        let outcome = orchestrator.generate(&request).await;

        assert_eq!(outcome.status, GenerationStatus::Generated);
        assert_eq!(backend.call_count(), 2);

        let summary_prompt = backend.requests()[1].last_user_message().unwrap().to_string();
        assert!(summary_prompt.contains("Course Title: Rust Projects"));
        assert!(summary_prompt.contains("- Ownership & Borrowing\n"));
        assert!(summary_prompt.contains("- Traits: the basics\n"));

        let course = outcome.curriculum;
        assert_eq!(course.schema_version, SchemaVersion::Flat);
        assert_eq!(course.summary, "A hands-on Rust course.");
        assert_eq!(
            course.lesson_titles(),
            vec!["Ownership & Borrowing", "Traits: the basics"]
        );
        assert!(course.is_project_based);
        assert_eq!(
            outcome.transitions,
            vec![
                GenerationState::Idle,
                GenerationState::Requesting(Stage::LessonPlans),
                GenerationState::Requesting(Stage::Summary),
                GenerationState::Validating,
                GenerationState::Done,
            ]
        );
    }

    #[tokio::test]
    async fn test_two_stage_empty_plan_skips_summary() {
        let backend = Arc::new(MockBackend::default().then_reply(plan_json(&[])));
        let orchestrator = two_stage(backend.clone());
        let request = GenerationRequest::new("Rust", "fundamentals").unwrap();

        let outcome = orchestrator.generate(&request).await;

        assert!(outcome.is_degraded());
        assert_eq!(backend.call_count(), 1);
        assert!(!outcome
            .transitions
            .contains(&GenerationState::Requesting(Stage::Summary)));
    }

    #[tokio::test]
    async fn test_timeout_degrades() {
        let backend = Arc::new(
            MockBackend::default()
                .with_response(nested_course_json(false))
                .with_delay(Duration::from_millis(200)),
        );
        let orchestrator = CurriculumOrchestrator::with_config(
            backend,
            OrchestratorConfig {
                timeout_ms: 20,
                ..Default::default()
            },
        );
        let request = GenerationRequest::new("Rust", "fundamentals").unwrap();

        let outcome = orchestrator.generate(&request).await;
        assert!(outcome.is_degraded());
    }
}
