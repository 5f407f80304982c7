//! The `proctor init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("proctor.toml").exists() {
        println!("proctor.toml already exists, skipping.");
    } else {
        std::fs::write("proctor.toml", SAMPLE_CONFIG)?;
        println!("Created proctor.toml");
    }

    std::fs::create_dir_all("banks")?;
    let example_path = std::path::Path::new("banks/example.toml");
    if example_path.exists() {
        println!("banks/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_EXAM)?;
        println!("Created banks/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Add questions to banks/ (one TOML file per topic is fine)");
    println!("  2. Run: proctor validate --file banks/example.toml");
    println!("  3. Run: proctor take --file banks/example.toml");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# proctor configuration

default_exam = "jee_main"
bank_dir = "./banks"
output_dir = "./proctor-results"
history_file = "./proctor-results/history.jsonl"
tick_interval_ms = 1000

# Generate questions with an OpenAI-compatible API (proctor take --generate)
# [generator]
# type = "openai"
# api_key = "${OPENAI_API_KEY}"
# model = "gpt-4.1-mini"
# pool_size = 10

# Post results to a backend instead of the local history file
# [sink]
# type = "http"
# base_url = "http://localhost:5000"
"#;

const EXAMPLE_EXAM: &str = r#"[exam]
name = "Physics Warm-up"
duration_minutes = 5

[exam.marking]
correct = 4.0
wrong_penalty = 1.0

[[exam.sections]]
subject = "physics"
questions = 3

[[questions]]
subject = "physics"
prompt = "What is the SI unit of force?"
options = ["Newton", "Joule", "Watt", "Pascal"]
correct = 0
topic = "Units and Measurement"

[[questions]]
subject = "physics"
prompt = "Which of Newton's laws is expressed by F = ma?"
options = ["First law", "Second law", "Third law", "Law of gravitation"]
correct = 1
topic = "Laws of Motion"

[[questions]]
subject = "physics"
prompt = "A body moving in a circle at constant speed has"
options = ["Zero acceleration", "Constant velocity", "Acceleration towards the centre", "Acceleration along the tangent"]
correct = 2
topic = "Circular Motion"
explanation = "The velocity changes direction, so there is a centripetal acceleration."
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn example_exam_parses_without_warnings() {
        let file =
            proctor_core::parser::parse_exam_str(EXAMPLE_EXAM, "example.toml".as_ref()).unwrap();
        assert_eq!(file.pattern.total_questions(), 3);
        assert!(proctor_core::parser::validate_exam_file(&file).is_empty());
    }

    #[test]
    fn sample_config_parses() {
        let config: proctor_providers::ProctorConfig = toml::from_str(SAMPLE_CONFIG).unwrap();
        assert_eq!(config.default_exam, "jee_main");
        assert!(config.generator.is_none());
    }
}
