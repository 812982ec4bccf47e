//! Course catalog fixtures.

use coursemind_core::catalog::{Course, Lesson, MemoryCatalog};

fn lesson(number: u32, title: &str, link: &str, content: &str) -> Lesson {
    Lesson {
        number,
        title: title.to_string(),
        link: Some(link.to_string()),
        content: content.to_string(),
    }
}

/// Two small courses with linked lessons.
pub fn sample_courses() -> Vec<Course> {
    vec![
        Course {
            title: "Building Towards Computer Use with Anthropic".to_string(),
            link: Some("https://example.com/computer-use".to_string()),
            instructor: Some("Colt Steele".to_string()),
            lessons: vec![
                lesson(
                    0,
                    "Introduction",
                    "https://example.com/computer-use/0",
                    "Welcome to the course on building computer use agents.",
                ),
                lesson(
                    1,
                    "Tool Use",
                    "https://example.com/computer-use/1",
                    "Tool use lets the model call functions you define.",
                ),
            ],
        },
        Course {
            title: "Introduction to Machine Learning".to_string(),
            link: Some("https://example.com/ml".to_string()),
            instructor: Some("Dr. Smith".to_string()),
            lessons: vec![
                lesson(
                    1,
                    "Supervised Learning",
                    "https://example.com/ml/1",
                    "Machine learning algorithms learn from labelled examples.",
                ),
                lesson(
                    2,
                    "Neural Networks",
                    "https://example.com/ml/2",
                    "Neural networks are machine learning models built from layers.",
                ),
            ],
        },
    ]
}

/// [`sample_courses`] as an in-memory catalog.
pub fn sample_catalog() -> MemoryCatalog {
    MemoryCatalog::new(sample_courses())
}
