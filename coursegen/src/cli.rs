//! coursegen subcommands and their text output

use clap::Subcommand;
use curriculum::progress::compute_progress;
use curriculum::{ActivityRecord, Curriculum, Progress, StoredCourse, MAX_ACTIVITIES};
use curriculum_agent::{CourseService, GenerationOutcome, GenerationStatus};

/// coursegen commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate a curriculum for a topic
    Generate {
        /// What to learn, e.g. "Rust"
        topic: String,
        /// Learning phase (fundamentals, core, advanced, real_world)
        #[arg(short, long, default_value = "fundamentals")]
        phase: String,
        /// Save the result to the course store
        #[arg(long)]
        save: bool,
    },

    /// List saved courses
    List,

    /// Show a saved course with its progress
    Show {
        /// Course index as shown by `list`
        index: usize,
    },

    /// Toggle completion of a lesson, or of one of its micro-lessons
    Toggle {
        /// Course index
        index: usize,
        /// Lesson index within the course
        lesson: usize,
        /// Micro-lesson index within the lesson
        micro: Option<usize>,
    },

    /// Remove a saved course
    Remove {
        /// Course index
        index: usize,
    },

    /// Print a share payload for a saved course
    Share {
        /// Course index
        index: usize,
    },

    /// Decode a share payload and show the course
    Open {
        /// Payload printed by `share`
        payload: String,
        /// Save the shared course
        #[arg(long)]
        save: bool,
    },

    /// Show recent activity
    Activity {
        /// Number of entries to show
        #[arg(short, long, default_value_t = MAX_ACTIVITIES)]
        count: usize,
    },
}

/// Run a command and return what to print.
pub async fn execute_command(
    service: &CourseService,
    command: Commands,
    json: bool,
) -> anyhow::Result<String> {
    match command {
        Commands::Generate { topic, phase, save } => {
            let outcome = service.generate(&topic, &phase).await?;
            let saved = if save {
                Some(service.save(outcome.curriculum.clone()).await?)
            } else {
                None
            };

            if json {
                return Ok(serde_json::to_string_pretty(&outcome)?);
            }
            let mut output = format_outcome(&outcome);
            if let Some(slot) = saved {
                output.push_str(&format!("\nSaved as course [{}]\n", slot.index));
            }
            Ok(output)
        }

        Commands::List => {
            let courses = service.courses().await;
            if json {
                return Ok(serde_json::to_string_pretty(&courses)?);
            }
            Ok(format_courses(&courses))
        }

        Commands::Show { index } => {
            let stored = service.course(index).await?;
            if json {
                return Ok(serde_json::to_string_pretty(&stored.course)?);
            }
            let progress = compute_progress(&stored.course);
            Ok(format_course(&stored.course, Some(&progress)))
        }

        Commands::Toggle {
            index,
            lesson,
            micro,
        } => {
            let progress = match micro {
                Some(micro) => service.toggle_micro_lesson(index, lesson, micro).await?,
                None => service.toggle_lesson(index, lesson).await?,
            };
            if json {
                return Ok(serde_json::to_string_pretty(&progress)?);
            }
            Ok(format!("Progress: {}\n", format_progress(&progress)))
        }

        Commands::Remove { index } => {
            let removed = service.remove(index).await?;
            Ok(format!("Removed \"{}\"\n", removed.title))
        }

        Commands::Share { index } => Ok(format!("{}\n", service.share(index).await?)),

        Commands::Open { payload, save } => {
            let course = service.open_shared(&payload)?;
            let saved = if save {
                Some(service.save(course.clone()).await?)
            } else {
                None
            };

            if json {
                return Ok(serde_json::to_string_pretty(&course)?);
            }
            let mut output = format_course(&course, Some(&compute_progress(&course)));
            if let Some(slot) = saved {
                output.push_str(&format!("\nSaved shared course as [{}]\n", slot.index));
            }
            Ok(output)
        }

        Commands::Activity { count } => {
            let records = service.recent_activity(count).await?;
            if json {
                return Ok(serde_json::to_string_pretty(&records)?);
            }
            Ok(format_activity(&records))
        }
    }
}

fn format_outcome(outcome: &GenerationOutcome) -> String {
    let mut output = String::new();

    if let GenerationStatus::Degraded { reason } = &outcome.status {
        output.push_str(&format!(
            "Generation failed ({reason}); showing a placeholder course.\n\n"
        ));
    }
    output.push_str(&format_course(&outcome.curriculum, None));

    output
}

pub fn format_progress(progress: &Progress) -> String {
    format!(
        "{:.0}% ({}/{})",
        progress.percent, progress.completed_leaves, progress.total_leaves
    )
}

pub fn format_course(course: &Curriculum, progress: Option<&Progress>) -> String {
    let mut output = String::new();

    let kind = if course.is_project_based {
        "project-based"
    } else {
        "concept-based"
    };
    output.push_str(&format!("{}  ({kind})\n", course.title));
    output.push_str(&format!("{}\n", course.summary));
    if let Some(progress) = progress {
        output.push_str(&format!("Progress: {}\n", format_progress(progress)));
    }
    output.push('\n');

    for (i, lesson) in course.lessons.iter().enumerate() {
        output.push_str(&format!(
            "[{i}] {} {}\n",
            checkbox(lesson.completed),
            lesson.title
        ));
        if let Some(description) = &lesson.description {
            output.push_str(&format!("      {description}\n"));
        }

        for (j, micro) in lesson.micro_lessons.iter().flatten().enumerate() {
            output.push_str(&format!(
                "    [{j}] {} {}\n",
                checkbox(micro.completed),
                micro.title
            ));
            if let Some(resources) = &micro.resources {
                for link in resources.free.iter().flatten() {
                    output.push_str(&format!("          free: {} <{}>\n", link.title, link.url));
                }
                for link in resources.paid.iter().flatten() {
                    output.push_str(&format!("          paid: {} <{}>\n", link.title, link.url));
                }
            }
        }
    }

    output.push_str(&format!("\n{}\n", course.final_note));
    output
}

pub fn format_courses(courses: &[StoredCourse]) -> String {
    if courses.is_empty() {
        return "No saved courses\n".to_string();
    }

    courses
        .iter()
        .enumerate()
        .map(|(i, stored)| {
            format!(
                "[{i}] {} - {}\n",
                stored.course.title,
                format_progress(&compute_progress(&stored.course))
            )
        })
        .collect()
}

pub fn format_activity(records: &[ActivityRecord]) -> String {
    if records.is_empty() {
        return "No recent activity\n".to_string();
    }

    records
        .iter()
        .map(|r| {
            format!(
                "{}  {}\n",
                r.timestamp.format("%Y-%m-%d %H:%M"),
                r.describe()
            )
        })
        .collect()
}

fn checkbox(completed: bool) -> &'static str {
    if completed {
        "[x]"
    } else {
        "[ ]"
    }
}
