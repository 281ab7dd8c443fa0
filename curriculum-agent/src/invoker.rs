//! Prompt invoker - one structured-generation request per call.
//!
//! The invoker renders a template, sends exactly one completion request with
//! the output contract's JSON Schema attached, and turns the answer into a
//! value that satisfies the contract. It never retries.

use std::sync::Arc;
use std::time::{Duration, Instant};

use curriculum::{ContractViolation, OutputContract};
use tracing::{debug, warn};

use crate::backend::traits::{CompletionRequest, LlmBackend, LlmError};
use crate::template::{PromptTemplate, TemplateId, SYSTEM_PROMPT};

/// Error types for a generation request.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// Template input broke its contract
    #[error("Invalid input for {template:?}: {reason}")]
    InvalidInput { template: TemplateId, reason: String },

    /// Backend call failed
    #[error("Backend error: {0}")]
    Backend(#[from] LlmError),

    /// Backend did not answer in time
    #[error("Backend timed out after {0}ms")]
    Timeout(u64),

    /// Answer was not JSON of the expected shape
    #[error("Could not parse {contract} output: {reason}")]
    Parse {
        contract: &'static str,
        reason: String,
    },

    /// Answer parsed but broke the contract
    #[error("Output violates {contract} contract: {violation}")]
    Contract {
        contract: &'static str,
        violation: ContractViolation,
    },

    /// Planning stage produced no lessons
    #[error("Lesson planning returned no lessons")]
    EmptyLessonPlan,
}

/// Settings for a single backend call.
#[derive(Debug, Clone, Copy)]
pub struct InvokeOptions {
    pub timeout: Duration,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for InvokeOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            max_tokens: 8192,
            temperature: 0.7,
        }
    }
}

/// Issues structured-generation requests against a backend.
pub struct PromptInvoker {
    backend: Arc<dyn LlmBackend>,
    options: InvokeOptions,
}

impl PromptInvoker {
    pub fn new(backend: Arc<dyn LlmBackend>) -> Self {
        Self {
            backend,
            options: InvokeOptions::default(),
        }
    }

    pub fn with_options(mut self, options: InvokeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn backend_id(&self) -> &str {
        self.backend.id()
    }

    /// Run one template against the backend and return contract-valid output.
    pub async fn invoke<I, C>(&self, input: &I, contract: &C) -> Result<C::Output, GenerationError>
    where
        I: PromptTemplate,
        C: OutputContract,
    {
        let template = input.template_id();

        input
            .validate()
            .map_err(|reason| GenerationError::InvalidInput { template, reason })?;

        let max_tokens = self
            .options
            .max_tokens
            .min(self.backend.capabilities().max_output_tokens);

        let request = CompletionRequest::user(input.render())
            .with_system(SYSTEM_PROMPT)
            .with_max_tokens(max_tokens)
            .with_temperature(self.options.temperature)
            .with_json_schema(contract.name(), contract.json_schema());

        let start = Instant::now();
        debug!(
            template = template.as_str(),
            backend = self.backend.id(),
            "Invoking prompt"
        );

        let completion = tokio::time::timeout(self.options.timeout, self.backend.complete(request))
            .await
            .map_err(|_| GenerationError::Timeout(self.options.timeout.as_millis() as u64))??;

        debug!(
            template = template.as_str(),
            duration_ms = start.elapsed().as_millis() as u64,
            completion_tokens = completion.usage.completion_tokens,
            "Prompt completed"
        );

        let output: C::Output = serde_json::from_str(extract_json(&completion.content))
            .map_err(|e| GenerationError::Parse {
                contract: contract.name(),
                reason: e.to_string(),
            })?;

        contract.validate(&output).map_err(|violation| {
            warn!(
                template = template.as_str(),
                violation = %violation,
                "Generated output violates contract"
            );
            GenerationError::Contract {
                contract: contract.name(),
                violation,
            }
        })?;

        Ok(output)
    }
}

/// Strip a Markdown code fence if the model wrapped its JSON in one.
fn extract_json(content: &str) -> &str {
    let trimmed = content.trim();

    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
