//! Curriculum Agent - schema-constrained course generation
//!
//! Provides the generation side of the course generator:
//! - Trait-based LLM backends (OpenAI-compatible HTTP, mock)
//! - Prompt templates with fixed identifiers and input checks
//! - Single-call and two-stage generation with contract validation
//! - Deterministic placeholder courses when generation fails
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │             CourseService               │
//! │  (generate, save, toggle, share)        │
//! └────────────────┬────────────────────────┘
//!                  │
//!      ┌───────────┴───────────┐
//!      ▼                       ▼
//! ┌──────────────────┐   ┌─────────────┐
//! │ Curriculum       │   │ CourseStore │
//! │ Orchestrator     │   │ (memory/    │
//! │  ├ PromptInvoker │   │  file)      │
//! │  └ Fallback      │   │             │
//! └────────┬─────────┘   └─────────────┘
//!          ▼
//!    ┌─────────────┐
//!    │ LlmBackend  │
//!    └─────────────┘
//! ```

pub mod backend;
pub mod fallback;
pub mod invoker;
pub mod orchestrator;
pub mod service;
pub mod template;

// Re-export main types for convenience
pub use backend::traits::{CompletionRequest, CompletionResponse, LlmBackend, LlmError};
pub use backend::{MockBackend, OpenAiBackend};
pub use fallback::FallbackSynthesizer;
pub use invoker::{GenerationError, InvokeOptions, PromptInvoker};
pub use orchestrator::{
    CurriculumOrchestrator, GenerationOutcome, GenerationRequest, GenerationState,
    GenerationStatus, OrchestrationShape, OrchestratorConfig, Stage, ValidatedRequest,
};
pub use service::{CourseService, ServiceError};
pub use template::{PromptTemplate, TemplateId};
