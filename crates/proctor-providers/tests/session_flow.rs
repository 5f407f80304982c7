//! End-to-end attempts: exam file -> provider -> session -> sink.

use std::sync::Arc;

use proctor_core::engine::{AssessmentEngine, Navigation, Phase};
use proctor_core::parser::parse_exam_str;
use proctor_core::session::{ExamSession, SessionEvent};
use proctor_core::traits::load_paper;
use proctor_providers::mock::{MockQuestionProvider, MockResultSink};
use proctor_providers::{load_history, HttpResultSink, JsonlResultSink, StaticBankProvider};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MINI_EXAM: &str = r#"
[exam]
name = "Mini JEE"
kind = "jee_main"
duration_secs = 5

[[exam.sections]]
subject = "physics"
questions = 2

[[exam.sections]]
subject = "mathematics"
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

[[questions]]
subject = "mathematics"
prompt = "What is the derivative of x^2?"
options = ["x", "2x", "x^2", "2"]
correct = 1
"#;

async fn mini_engine() -> AssessmentEngine {
    let file = parse_exam_str(MINI_EXAM, "mini.toml".as_ref()).unwrap();
    let provider = StaticBankProvider::from_exam_file(&file);
    let paper = load_paper(&provider, &file.pattern).await.unwrap();
    AssessmentEngine::new(paper)
}

#[tokio::test]
async fn provider_bank_is_fetched_once_per_paper() {
    let file = parse_exam_str(MINI_EXAM, "mini.toml".as_ref()).unwrap();
    let provider = MockQuestionProvider::new(file.bank.clone());

    let paper = load_paper(&provider, &file.pattern).await.unwrap();
    assert_eq!(provider.call_count(), 1);
    assert_eq!(paper.total_questions(), 4);

    let sink = Arc::new(MockResultSink::new());
    let mut session = ExamSession::new(AssessmentEngine::new(paper), sink.clone());
    session.start();
    session.select_answer(3, 1);
    session.submit();
    session.flush().await;
    assert_eq!(sink.records()[0].score, 4.0);
}

#[tokio::test]
async fn failing_provider_yields_no_paper() {
    let file = parse_exam_str(MINI_EXAM, "mini.toml".as_ref()).unwrap();
    let provider = MockQuestionProvider::failing();

    let err = load_paper(&provider, &file.pattern).await.unwrap_err();
    assert!(format!("{err:#}").contains("configured to fail"));
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn manual_submission_is_written_to_history() {
    let dir = tempfile::tempdir().unwrap();
    let history = dir.path().join("history.jsonl");
    let sink = Arc::new(JsonlResultSink::new(&history));

    let mut session = ExamSession::new(mini_engine().await, sink).with_exam("jee_main");
    assert!(session.start());

    // Q1 physics correct, Q2 physics wrong, Q3 maths correct, Q4 unanswered.
    session.answer_current(0);
    session.navigate(Navigation::Next);
    session.answer_current(3);
    session.select_answer(3, 1);
    assert!(session.submit());
    assert!(!session.submit());
    session.flush().await;

    let report = session.report().unwrap();
    assert_eq!(report.correct, 2);
    assert_eq!(report.wrong, 1);
    assert_eq!(report.unattempted, 1);
    assert_eq!(report.score, 7.0);

    let records = load_history(&history).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].exam, "jee_main");
    assert_eq!(records[0].score, 7.0);
}

#[tokio::test(start_paused = true)]
async fn timeout_records_exactly_one_result() {
    let sink = Arc::new(MockResultSink::new());
    let mut session = ExamSession::new(mini_engine().await, sink.clone());
    session.start();
    session.select_answer(4, 1);

    let mut ticks = 0;
    let report = loop {
        match session.next_event().await {
            SessionEvent::Tick { .. } => ticks += 1,
            SessionEvent::Expired(report) => break report,
            SessionEvent::Idle => panic!("countdown stopped early"),
        }
    };
    assert_eq!(ticks, 4);
    assert_eq!(report.correct, 1);
    assert_eq!(session.engine().phase(), Phase::Completed);

    assert!(!session.submit());
    session.flush().await;

    assert_eq!(sink.starts(), vec!["Mini JEE".to_string()]);
    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].exam, "Mini JEE");
}

#[tokio::test]
async fn backend_outage_does_not_lose_report() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/jeemain/test-completed"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/results/add"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let sink = Arc::new(HttpResultSink::new(&server.uri()).unwrap());
    let mut session = ExamSession::new(mini_engine().await, sink).with_exam("jee_main");
    session.start();
    session.select_answer(1, 0);
    session.submit();
    session.flush().await;

    assert_eq!(session.report().unwrap().score, 4.0);
    let attempt = session.attempt_report().unwrap();
    assert_eq!(attempt.exam.name, "Mini JEE");
    assert_eq!(attempt.answers.len(), 1);
}
