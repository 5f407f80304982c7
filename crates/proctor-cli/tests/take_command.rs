//! Drives `proctor take` through stdin with a short exam and a fast clock.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const SHORT_EXAM: &str = r#"
[exam]
name = "Take Test"
duration_secs = DURATION

[[exam.sections]]
subject = "physics"
questions = 2

[[questions]]
subject = "physics"
prompt = "What is the SI unit of force?"
options = ["Newton", "Joule", "Watt", "Pascal"]
correct = 0

[[questions]]
subject = "physics"
prompt = "Which law states F = ma?"
options = ["First law", "Second law", "Third law", "Law of gravitation"]
correct = 1
"#;

struct Workspace {
    dir: TempDir,
    exam: PathBuf,
    config: PathBuf,
}

impl Workspace {
    fn new(duration_secs: u64, tick_interval_ms: u64) -> Self {
        let dir = TempDir::new().unwrap();
        let exam = dir.path().join("exam.toml");
        std::fs::write(
            &exam,
            SHORT_EXAM.replace("DURATION", &duration_secs.to_string()),
        )
        .unwrap();

        let config = dir.path().join("proctor.toml");
        std::fs::write(
            &config,
            format!(
                "bank_dir = '{}'\noutput_dir = '{}'\nhistory_file = '{}'\ntick_interval_ms = {}\n",
                dir.path().join("no-banks").display(),
                dir.path().join("out").display(),
                dir.path().join("history.jsonl").display(),
                tick_interval_ms,
            ),
        )
        .unwrap();

        Self { dir, exam, config }
    }

    fn history(&self) -> PathBuf {
        self.dir.path().join("history.jsonl")
    }

    fn out(&self) -> PathBuf {
        self.dir.path().join("out")
    }

    fn take(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("proctor").unwrap();
        cmd.current_dir(self.dir.path())
            .env_remove("PROCTOR_RESULTS_URL")
            .env_remove("PROCTOR_OPENAI_KEY")
            .arg("take")
            .arg("--config")
            .arg(&self.config);
        cmd
    }
}

fn history_lines(path: &Path) -> Vec<serde_json::Value> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

#[test]
fn submit_records_result_and_report() {
    let ws = Workspace::new(600, 1000);

    ws.take()
        .arg("--file")
        .arg(&ws.exam)
        .write_stdin("a\ns\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Q1: A"))
        .stdout(predicate::str::contains("Submitted."))
        .stdout(predicate::str::contains("4 / 8"));

    let records = history_lines(&ws.history());
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["exam"], "Take Test");
    assert_eq!(records[0]["score"], 4.0);
    assert_eq!(records[0]["percentage"], 50.0);

    let reports: Vec<_> = std::fs::read_dir(ws.out()).unwrap().collect();
    assert_eq!(reports.len(), 1);
}

#[test]
fn navigation_and_wrong_answer() {
    let ws = Workspace::new(600, 1000);

    // Go to Q2, answer it wrong, step back and answer Q1 wrong too.
    ws.take()
        .arg("--file")
        .arg(&ws.exam)
        .arg("--format")
        .arg("none")
        .write_stdin("g 2\nc\np\nb\n?\ns\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Q2: C"))
        .stdout(predicate::str::contains("Q1: B"))
        .stdout(predicate::str::contains("2 answered"));

    let records = history_lines(&ws.history());
    assert_eq!(records[0]["score"], 0.0);
    assert!(!ws.out().exists());
}

#[test]
fn clock_expiry_submits_automatically() {
    let ws = Workspace::new(10, 50);

    ws.take()
        .arg("--file")
        .arg(&ws.exam)
        .arg("--format")
        .arg("none")
        .write_stdin("a\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Input closed"))
        .stdout(predicate::str::contains("Time is up!"));

    let records = history_lines(&ws.history());
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["score"], 4.0);
}

#[test]
fn quitting_records_nothing() {
    let ws = Workspace::new(600, 1000);

    ws.take()
        .arg("--file")
        .arg(&ws.exam)
        .write_stdin("a\nq\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Attempt abandoned."));

    assert!(!ws.history().exists());
    assert!(!ws.out().exists());
}

#[test]
fn catalog_exam_needs_a_bank() {
    let ws = Workspace::new(600, 1000);

    ws.take()
        .arg("--exam")
        .arg("neet")
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no question bank"));
}

#[test]
fn unknown_exam_is_rejected() {
    let ws = Workspace::new(600, 1000);

    ws.take()
        .arg("--exam")
        .arg("gate")
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown exam"));
}
