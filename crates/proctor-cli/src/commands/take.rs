//! The `proctor take` command.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};

use proctor_core::bank::{ExamPaper, QuestionBank};
use proctor_core::catalog::ExamKind;
use proctor_core::engine::{AssessmentEngine, AttemptSnapshot, Navigation, Phase};
use proctor_core::model::option_label;
use proctor_core::parser;
use proctor_core::scoring::ScoreReport;
use proctor_core::session::{AttemptObserver, ExamSession, SessionEvent};
use proctor_core::timer::{format_clock, TimeBand};
use proctor_core::traits::{load_paper, QuestionProvider};
use proctor_providers::config::{load_config_from, ProctorConfig};
use proctor_providers::{create_generator, create_sink, StaticBankProvider};
use proctor_report::html::write_html_report;

use super::score_tables;

pub struct TakeOptions {
    pub exam: Option<String>,
    pub file: Option<PathBuf>,
    pub generate: bool,
    pub minutes: Option<u64>,
    pub output: Option<PathBuf>,
    pub format: String,
    pub config: Option<PathBuf>,
}

/// Console observer: prints the clock on minute boundaries and during the
/// final ten seconds.
struct ConsoleObserver;

impl AttemptObserver for ConsoleObserver {
    fn on_started(&self, snapshot: &AttemptSnapshot) {
        println!(
            "Started: {} questions, {} on the clock. Type ? for help.",
            snapshot.total_questions,
            format_clock(snapshot.remaining_secs)
        );
    }

    fn on_tick(&self, remaining_secs: u64) {
        if remaining_secs % 60 == 0 || remaining_secs <= 10 {
            println!("[{} remaining]", format_clock(remaining_secs));
        }
    }

    fn on_completed(&self, _report: &ScoreReport, timed_out: bool) {
        if timed_out {
            println!("\nTime is up! Your answers have been submitted.");
        } else {
            println!("\nSubmitted.");
        }
    }

    fn on_persist_failed(&self, error: &str) {
        eprintln!("Warning: could not save result: {error}");
    }
}

/// One line of user input.
#[derive(Debug, PartialEq)]
enum Input {
    Answer(usize),
    Next,
    Previous,
    GoTo(u32),
    Submit,
    Quit,
    Status,
    Help,
}

fn parse_input(line: &str) -> Option<Input> {
    let line = line.trim().to_lowercase();
    let mut parts = line.split_whitespace();
    let command = parts.next()?;
    let input = match command {
        "a" | "b" | "c" | "d" => Input::Answer((command.as_bytes()[0] - b'a') as usize),
        "1" | "2" | "3" | "4" => Input::Answer((command.as_bytes()[0] - b'1') as usize),
        "n" | "next" => Input::Next,
        "p" | "prev" => Input::Previous,
        "g" | "goto" => Input::GoTo(parts.next()?.parse().ok()?),
        "s" | "submit" => Input::Submit,
        "q" | "quit" => Input::Quit,
        "?" | "status" => Input::Status,
        "h" | "help" => Input::Help,
        _ => return None,
    };
    Some(input)
}

const HELP: &str = "\
Commands:
  a-d or 1-4   answer the current question
  n / p        next / previous question
  g <number>   go to a question
  ?            show time and progress
  s            submit
  q            abandon the attempt";

pub async fn execute(options: TakeOptions) -> Result<()> {
    let config = load_config_from(options.config.as_deref())?;
    let (mut paper, exam_key) = load_exam_paper(&options, &config).await?;
    if let Some(minutes) = options.minutes {
        anyhow::ensure!(minutes > 0, "--minutes must be at least 1");
        paper.pattern.duration_secs = minutes_to_secs(minutes)?;
    }

    println!(
        "{} | {} questions | {} | +{} / -{} marking",
        paper.pattern.name,
        paper.total_questions(),
        format_clock(paper.pattern.duration_secs),
        paper.pattern.marking.correct,
        paper.pattern.marking.wrong_penalty
    );

    let sink = create_sink(&config)?;
    let tick_period = Duration::from_millis(config.tick_interval_ms.max(1));
    let mut session = ExamSession::new(AssessmentEngine::new(paper), sink)
        .with_exam(exam_key)
        .with_observer(Arc::new(ConsoleObserver))
        .with_tick_period(tick_period);

    session.start();
    print_question(&session);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    while session.engine().phase() == Phase::InProgress {
        tokio::select! {
            event = session.next_event() => {
                if let SessionEvent::Idle = event {
                    break;
                }
            }
            line = lines.next_line(), if stdin_open => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => {
                        println!("Input closed; the attempt continues until time runs out.");
                        stdin_open = false;
                        continue;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to read input");
                        stdin_open = false;
                        continue;
                    }
                };
                if !handle_input(&mut session, &line) {
                    session.restart();
                    println!("Attempt abandoned.");
                    session.flush().await;
                    return Ok(());
                }
            }
        }
    }

    session.flush().await;

    let Some(attempt) = session.attempt_report() else {
        return Ok(());
    };
    let (summary, subjects) = score_tables(&attempt.score);
    println!("\n{summary}\n{subjects}");

    let output = options.output.unwrap_or_else(|| config.output_dir.clone());
    let timestamp = attempt.created_at.format("%Y-%m-%dT%H%M%S");
    let formats: Vec<&str> = match options.format.as_str() {
        "all" => vec!["json", "html"],
        "none" => vec![],
        other => other.split(',').collect(),
    };
    for fmt in formats {
        match fmt {
            "json" => {
                let path = output.join(format!("attempt-{timestamp}.json"));
                attempt.save_json(&path)?;
                eprintln!("Report saved to: {}", path.display());
            }
            "html" => {
                let path = output.join(format!("attempt-{timestamp}.html"));
                write_html_report(&attempt, &path)?;
                eprintln!("HTML report: {}", path.display());
            }
            other => eprintln!("Unknown format: {other}"),
        }
    }

    Ok(())
}

fn minutes_to_secs(minutes: u64) -> Result<u64> {
    minutes
        .checked_mul(60)
        .with_context(|| format!("--minutes {minutes} is too large"))
}

/// Resolve the paper to sit and the key its results are recorded under.
async fn load_exam_paper(
    options: &TakeOptions,
    config: &ProctorConfig,
) -> Result<(ExamPaper, String)> {
    if let Some(path) = &options.file {
        let file = parser::parse_exam_file(path)?;
        let key = file.exam_key();
        let paper = if options.generate {
            let generator = generator(config, Some(file.bank.clone()))?;
            load_paper(generator.as_ref(), &file.pattern).await?
        } else {
            file.paper()?
        };
        return Ok((paper, key));
    }

    let name = options.exam.as_deref().unwrap_or(&config.default_exam);
    let kind: ExamKind = name.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let pattern = kind.pattern();

    let static_bank = if config.bank_dir.is_dir() {
        Some(StaticBankProvider::load_directory(&config.bank_dir)?)
    } else {
        None
    };

    let paper = if options.generate {
        let generator = generator(config, static_bank.map(StaticBankProvider::into_bank))?;
        load_paper(generator.as_ref(), &pattern).await?
    } else {
        let provider = static_bank.with_context(|| {
            format!(
                "no question bank at {}; pass --file, --generate, or set bank_dir",
                config.bank_dir.display()
            )
        })?;
        load_paper(&provider, &pattern).await?
    };
    Ok((paper, kind.to_string()))
}

fn generator(
    config: &ProctorConfig,
    fallback: Option<QuestionBank>,
) -> Result<Box<dyn QuestionProvider>> {
    let generator_config = config
        .generator
        .as_ref()
        .context("--generate needs a [generator] in the config or PROCTOR_OPENAI_KEY")?;
    create_generator(generator_config, fallback)
}

/// Apply one line of input. Returns `false` when the user abandons the attempt.
fn handle_input(session: &mut ExamSession, line: &str) -> bool {
    match parse_input(line) {
        Some(Input::Answer(option)) => {
            if session.answer_current(option) {
                let current = session.snapshot().current_question;
                println!("Q{current}: {}", option_label(option));
                if current < session.snapshot().total_questions {
                    session.navigate(Navigation::Next);
                    print_question(session);
                }
            } else {
                println!("That option is not available.");
            }
        }
        Some(Input::Next) => {
            session.navigate(Navigation::Next);
            print_question(session);
        }
        Some(Input::Previous) => {
            session.navigate(Navigation::Previous);
            print_question(session);
        }
        Some(Input::GoTo(n)) => {
            session.navigate(Navigation::To(n));
            print_question(session);
        }
        Some(Input::Submit) => {
            session.submit();
        }
        Some(Input::Quit) => return false,
        Some(Input::Status) => print_status(&session.snapshot()),
        Some(Input::Help) => println!("{HELP}"),
        None => println!("Unrecognized input. Type h for help."),
    }
    true
}

fn print_question(session: &ExamSession) {
    let snapshot = session.snapshot();
    let Some(question) = session.engine().paper().question(snapshot.current_question) else {
        return;
    };
    println!(
        "\nQ{}/{} [{}]{}",
        question.id,
        snapshot.total_questions,
        question.subject,
        question
            .topic
            .as_deref()
            .map(|t| format!(" ({t})"))
            .unwrap_or_default()
    );
    println!("{}", question.prompt);
    let selected = snapshot.answers.get(&question.id);
    for (i, option) in question.options.iter().enumerate() {
        let marker = if selected == Some(&i) { "*" } else { " " };
        println!(" {marker}{}) {option}", option_label(i));
    }
}

fn print_status(snapshot: &AttemptSnapshot) {
    let band = match snapshot.time_band {
        TimeBand::Normal => "",
        TimeBand::Warning => " (running low)",
        TimeBand::Critical => " (almost out!)",
    };
    println!(
        "{} remaining{band} | question {}/{} | {} answered",
        format_clock(snapshot.remaining_secs),
        snapshot.current_question,
        snapshot.total_questions,
        snapshot.answered()
    );
}
