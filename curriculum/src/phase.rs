//! Learning phases and request validation.
//!
//! A phase is the only input, besides the topic, that parameterizes
//! generation: it fixes the approximate lesson count and whether the
//! curriculum is project-based.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Minimum topic length after trimming.
pub const MIN_TOPIC_LEN: usize = 3;

/// Maximum topic length after trimming.
pub const MAX_TOPIC_LEN: usize = 200;

/// Caller-supplied input failed basic constraints. Generation is never attempted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Topic is empty or too short
    #[error("Topic must be at least {min} characters long")]
    TopicTooShort { min: usize },

    /// Topic is longer than allowed
    #[error("Topic must be at most {max} characters long")]
    TopicTooLong { max: usize },

    /// Phase label did not match any known phase
    #[error("Unknown phase: {0}")]
    UnknownPhase(String),
}

/// Named stage of learning progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Concept-based introduction
    Fundamentals,
    /// Guided projects on the basics
    #[serde(rename = "core")]
    CoreProjects,
    /// Deeper concepts
    #[serde(rename = "advanced")]
    AdvancedConcepts,
    /// Production-style projects
    #[serde(rename = "real_world")]
    RealWorldProjects,
}

impl Phase {
    /// All phases in progression order.
    pub fn all() -> [Self; 4] {
        [
            Self::Fundamentals,
            Self::CoreProjects,
            Self::AdvancedConcepts,
            Self::RealWorldProjects,
        ]
    }

    /// Short identifier used in forms and on the command line.
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Fundamentals => "fundamentals",
            Self::CoreProjects => "core",
            Self::AdvancedConcepts => "advanced",
            Self::RealWorldProjects => "real_world",
        }
    }

    /// Human-readable label used in prompts.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Fundamentals => "Fundamentals",
            Self::CoreProjects => "Core Projects",
            Self::AdvancedConcepts => "Advanced Concepts",
            Self::RealWorldProjects => "Real World Projects",
        }
    }

    /// Approximate number of top-level lessons to request.
    pub fn target_count(&self) -> u32 {
        match self {
            Self::Fundamentals => 4,
            Self::CoreProjects => 6,
            Self::AdvancedConcepts => 8,
            Self::RealWorldProjects => 10,
        }
    }

    /// Project phases produce project-based curricula.
    pub fn is_project_based(&self) -> bool {
        matches!(self, Self::CoreProjects | Self::RealWorldProjects)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Phase {
    type Err = ValidationError;

    /// Accepts either the slug or the label, ignoring case and separators.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();

        Phase::all()
            .into_iter()
            .find(|phase| {
                let slug: String = phase.slug().chars().filter(|c| *c != '_').collect();
                let label: String = phase
                    .label()
                    .chars()
                    .filter(|c| c.is_ascii_alphanumeric())
                    .map(|c| c.to_ascii_lowercase())
                    .collect();
                normalized == slug || normalized == label
            })
            .ok_or_else(|| ValidationError::UnknownPhase(s.to_string()))
    }
}

/// Lookup table entry point: target lesson count for a phase slug or label.
pub fn target_count_for(label: &str) -> Result<u32, ValidationError> {
    label.parse::<Phase>().map(|p| p.target_count())
}

/// Trim and check a topic.
pub fn validate_topic(topic: &str) -> Result<String, ValidationError> {
    let trimmed = topic.trim();
    let len = trimmed.chars().count();

    if len < MIN_TOPIC_LEN {
        return Err(ValidationError::TopicTooShort { min: MIN_TOPIC_LEN });
    }
    if len > MAX_TOPIC_LEN {
        return Err(ValidationError::TopicTooLong { max: MAX_TOPIC_LEN });
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_counts_increase() {
        let fundamentals = target_count_for("fundamentals").unwrap();
        let core = target_count_for("core").unwrap();
        let advanced = target_count_for("advanced").unwrap();
        let real_world = target_count_for("real_world").unwrap();

        assert!(fundamentals < core);
        assert!(core < advanced);
        assert!(advanced < real_world);
    }

    #[test]
    fn test_parse_slug_and_label() {
        assert_eq!("fundamentals".parse::<Phase>().unwrap(), Phase::Fundamentals);
        assert_eq!("Core Projects".parse::<Phase>().unwrap(), Phase::CoreProjects);
        assert_eq!("ADVANCED".parse::<Phase>().unwrap(), Phase::AdvancedConcepts);
        assert_eq!("real_world".parse::<Phase>().unwrap(), Phase::RealWorldProjects);
        assert_eq!(
            "Real World Projects".parse::<Phase>().unwrap(),
            Phase::RealWorldProjects
        );
    }

    #[test]
    fn test_unknown_phase() {
        let err = "expert".parse::<Phase>().unwrap_err();
        assert_eq!(err, ValidationError::UnknownPhase("expert".to_string()));
    }

    #[test]
    fn test_project_based_phases() {
        assert!(!Phase::Fundamentals.is_project_based());
        assert!(Phase::CoreProjects.is_project_based());
        assert!(!Phase::AdvancedConcepts.is_project_based());
        assert!(Phase::RealWorldProjects.is_project_based());
    }

    #[test]
    fn test_serde_uses_slugs() {
        for phase in Phase::all() {
            let json = serde_json::to_string(&phase).unwrap();
            assert_eq!(json, format!("\"{}\"", phase.slug()));
        }
    }

    #[test]
    fn test_validate_topic() {
        assert_eq!(validate_topic("  Rust  ").unwrap(), "Rust");
        assert_eq!(
            validate_topic("Go"),
            Err(ValidationError::TopicTooShort { min: MIN_TOPIC_LEN })
        );
        assert_eq!(
            validate_topic(&"x".repeat(MAX_TOPIC_LEN + 1)),
            Err(ValidationError::TopicTooLong { max: MAX_TOPIC_LEN })
        );
    }
}
