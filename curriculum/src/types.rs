//! Core curriculum types.
//!
//! One wire shape is used everywhere: JSON returned by the generation
//! backend, the persisted store and share payloads all serialize these
//! types in camelCase.
//!
//! With the `typescript` feature enabled, these types can be exported to
//! TypeScript using ts-rs for the web front end.

use serde::{Deserialize, Serialize};

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Shape discriminator for a curriculum.
///
/// Older flows produced flat lesson lists, newer ones nest micro-lessons and
/// resource links. Consumers branch on this tag instead of guessing from content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum SchemaVersion {
    /// Lessons only, every lesson is a leaf
    Flat,
    /// Lessons contain micro-lessons without resources
    #[default]
    Nested,
    /// Micro-lessons carry free/paid resource links
    NestedWithResources,
}

impl SchemaVersion {
    /// Whether lessons of this shape carry micro-lessons.
    pub fn has_micro_lessons(&self) -> bool {
        !matches!(self, Self::Flat)
    }

    /// Whether micro-lessons of this shape carry resources.
    pub fn has_resources(&self) -> bool {
        matches!(self, Self::NestedWithResources)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Flat => "flat",
            Self::Nested => "nested",
            Self::NestedWithResources => "nested_with_resources",
        }
    }
}

/// The top-level generated and saved artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Curriculum {
    /// Shape of this curriculum
    #[serde(default)]
    pub schema_version: SchemaVersion,
    /// Course title
    pub title: String,
    /// Course-level summary
    pub summary: String,
    /// Set once from the phase at generation time
    #[serde(default)]
    pub is_project_based: bool,
    /// Lessons in curriculum order
    pub lessons: Vec<Lesson>,
    /// Closing note shown after the last lesson
    pub final_note: String,
}

impl Curriculum {
    /// Titles of every lesson, in order.
    pub fn lesson_titles(&self) -> Vec<String> {
        self.lessons.iter().map(|l| l.title.clone()).collect()
    }

    /// Number of completable leaves across all lessons.
    pub fn leaf_count(&self) -> usize {
        self.lessons.iter().map(Lesson::leaf_count).sum()
    }

    /// Number of completed leaves across all lessons.
    pub fn completed_leaf_count(&self) -> usize {
        self.lessons.iter().map(Lesson::completed_leaf_count).sum()
    }
}

/// A top-level curriculum item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub micro_lessons: Option<Vec<MicroLesson>>,
    #[serde(default)]
    pub completed: bool,
}

impl Lesson {
    /// Create a leaf lesson.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            micro_lessons: None,
            completed: false,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set micro-lessons.
    pub fn with_micro_lessons(mut self, micro_lessons: Vec<MicroLesson>) -> Self {
        self.micro_lessons = Some(micro_lessons);
        self
    }

    /// A lesson without micro-lessons is itself the completable unit.
    pub fn is_leaf(&self) -> bool {
        self.micro_lessons.as_ref().map_or(true, |m| m.is_empty())
    }

    pub fn leaf_count(&self) -> usize {
        match &self.micro_lessons {
            Some(micro) if !micro.is_empty() => micro.len(),
            _ => 1,
        }
    }

    pub fn completed_leaf_count(&self) -> usize {
        match &self.micro_lessons {
            Some(micro) if !micro.is_empty() => micro.iter().filter(|m| m.completed).count(),
            _ => usize::from(self.completed),
        }
    }
}

/// The smallest completable curriculum unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct MicroLesson {
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<Resources>,
    #[serde(default)]
    pub completed: bool,
}

impl MicroLesson {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            resources: None,
            completed: false,
        }
    }

    /// Attach resources.
    pub fn with_resources(mut self, resources: Resources) -> Self {
        self.resources = Some(resources);
        self
    }
}

/// Learning resources attached to a micro-lesson.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct Resources {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub free: Option<Vec<ResourceLink>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid: Option<Vec<ResourceLink>>,
}

impl Resources {
    pub fn free_count(&self) -> usize {
        self.free.as_ref().map_or(0, Vec::len)
    }

    pub fn paid_count(&self) -> usize {
        self.paid.as_ref().map_or(0, Vec::len)
    }

    /// Free links first, then paid.
    pub fn all(&self) -> impl Iterator<Item = &ResourceLink> {
        self.free
            .iter()
            .flatten()
            .chain(self.paid.iter().flatten())
    }
}

/// A link to an external learning resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct ResourceLink {
    pub title: String,
    /// Absolute URI
    pub url: String,
    /// Hosting platform (e.g. "YouTube", "Coursera")
    pub platform: String,
}

impl ResourceLink {
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        platform: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            platform: platform.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_case_wire_shape() {
        let course = Curriculum {
            schema_version: SchemaVersion::Nested,
            title: "Rust".to_string(),
            summary: "Systems programming".to_string(),
            is_project_based: false,
            lessons: vec![Lesson::new("Ownership")
                .with_micro_lessons(vec![MicroLesson::new("Moves", "Values move")])],
            final_note: "Keep going".to_string(),
        };

        let json = serde_json::to_value(&course).unwrap();
        assert_eq!(json["isProjectBased"], false);
        assert_eq!(json["finalNote"], "Keep going");
        assert_eq!(json["schemaVersion"], "nested");
        assert_eq!(json["lessons"][0]["microLessons"][0]["title"], "Moves");
    }

    #[test]
    fn test_completed_defaults_to_false() {
        let json = r#"{
            "title": "Go",
            "summary": "Concurrency",
            "isProjectBased": true,
            "lessons": [{"title": "Goroutines"}],
            "finalNote": "Done"
        }"#;

        let course: Curriculum = serde_json::from_str(json).unwrap();
        assert_eq!(course.schema_version, SchemaVersion::Nested);
        assert!(!course.lessons[0].completed);
        assert!(course.lessons[0].is_leaf());
    }

    #[test]
    fn test_leaf_counts() {
        let mut micro = MicroLesson::new("a", "a");
        micro.completed = true;
        let nested = Lesson::new("nested")
            .with_micro_lessons(vec![micro, MicroLesson::new("b", "b")]);
        let mut leaf = Lesson::new("leaf");
        leaf.completed = true;
        let empty = Lesson::new("empty").with_micro_lessons(vec![]);

        assert_eq!(nested.leaf_count(), 2);
        assert_eq!(nested.completed_leaf_count(), 1);
        assert_eq!(leaf.leaf_count(), 1);
        assert_eq!(leaf.completed_leaf_count(), 1);
        assert!(empty.is_leaf());
        assert_eq!(empty.leaf_count(), 1);
    }

    #[test]
    fn test_resources_order() {
        let resources = Resources {
            free: Some(vec![ResourceLink::new("Book", "https://a.dev", "Web")]),
            paid: Some(vec![ResourceLink::new("Course", "https://b.dev", "Udemy")]),
        };

        let titles: Vec<_> = resources.all().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Book", "Course"]);
        assert_eq!(resources.free_count(), 1);
        assert_eq!(resources.paid_count(), 1);
    }
}
