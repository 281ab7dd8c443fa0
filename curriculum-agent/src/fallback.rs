//! Placeholder curriculum for when generation fails.
//!
//! The output depends only on its inputs and always satisfies the default
//! [`CurriculumContract`], so a consumer can render and track it like any
//! generated curriculum.

use curriculum::{
    Curriculum, Lesson, MicroLesson, Phase, ResourceLink, Resources, SchemaVersion,
};
use url::Url;

/// Note appended to every placeholder text.
pub const FALLBACK_NOTE: &str =
    "AI generation was unavailable, so this placeholder outline was created instead. Try generating again later.";

/// Builds deterministic placeholder curricula.
pub struct FallbackSynthesizer;

impl FallbackSynthesizer {
    /// Placeholder for a topic, with the project flag taken from the phase.
    pub fn synthesize(topic: &str, phase: Phase) -> Curriculum {
        let outline = [
            (
                "Getting Started",
                "Set up your environment and learn what",
                ["Why learn", "Setting up"],
            ),
            (
                "Core Ideas",
                "Work through the central concepts of",
                ["Key terms in", "First exercises with"],
            ),
            (
                "Next Steps",
                "Plan how to keep going with",
                ["Finding resources for", "A first project in"],
            ),
        ];

        let lessons = outline
            .iter()
            .map(|(title, description, micro_titles)| {
                let micro_lessons = micro_titles
                    .iter()
                    .map(|prefix| {
                        let micro_title = format!("{prefix} {topic}");
                        MicroLesson::new(
                            micro_title.clone(),
                            format!("Placeholder micro-lesson. {FALLBACK_NOTE}"),
                        )
                        .with_resources(Resources {
                            free: Some(vec![search_link(&micro_title)]),
                            paid: None,
                        })
                    })
                    .collect();

                Lesson::new(format!("{title}: {topic}"))
                    .with_description(format!("{description} {topic}."))
                    .with_micro_lessons(micro_lessons)
            })
            .collect();

        Curriculum {
            schema_version: SchemaVersion::NestedWithResources,
            title: format!("{topic} ({}) - Placeholder Course", phase.label()),
            summary: format!("A starter outline for learning {topic}. {FALLBACK_NOTE}"),
            is_project_based: phase.is_project_based(),
            lessons,
            final_note: format!(
                "This outline for {topic} is a placeholder. Generate the course again for full content."
            ),
        }
    }

    /// Placeholder for a topic alone, treated as a fundamentals course.
    pub fn for_topic(topic: &str) -> Curriculum {
        Self::synthesize(topic, Phase::Fundamentals)
    }
}

/// A web search link for a query; the query is percent-encoded.
fn search_link(query: &str) -> ResourceLink {
    let url = Url::parse_with_params("https://duckduckgo.com/", &[("q", query)])
        .map(String::from)
        .unwrap_or_else(|_| "https://duckduckgo.com/".to_string());

    ResourceLink::new(format!("Search: {query}"), url, "DuckDuckGo")
}

#[cfg(test)]
mod tests {
    use super::*;
    use curriculum::CurriculumContract;

    #[test]
    fn test_fallback_mentions_topic() {
        let course = FallbackSynthesizer::for_topic("Rust");

        assert!(course.title.contains("Rust"));
        assert!(course.summary.contains(FALLBACK_NOTE));
        assert!(!course.lessons.is_empty());
        assert!(course.lessons.iter().all(|l| l.title.contains("Rust")));
    }

    #[test]
    fn test_fallback_is_contract_valid() {
        for phase in Phase::all() {
            let course = FallbackSynthesizer::synthesize("Data Science & ML", phase);
            CurriculumContract::default().validate_tagged(&course).unwrap();
            assert_eq!(course.is_project_based, phase.is_project_based());
        }
    }

    #[test]
    fn test_fallback_has_resources() {
        let course = FallbackSynthesizer::for_topic("C++ / Qt");
        let micro = &course.lessons[0].micro_lessons.as_ref().unwrap()[0];
        let link = &micro.resources.as_ref().unwrap().free.as_ref().unwrap()[0];

        assert!(link.url.starts_with("https://duckduckgo.com/?q="));
        assert!(!link.url.contains(' '));
    }

    #[test]
    fn test_fallback_is_deterministic() {
        assert_eq!(
            FallbackSynthesizer::for_topic("Go"),
            FallbackSynthesizer::for_topic("Go")
        );
    }
}
