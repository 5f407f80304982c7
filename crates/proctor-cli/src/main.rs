//! proctor CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "proctor", version, about = "Timed mock exams in the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sit a timed exam
    Take {
        /// Catalog exam (e.g. "jee_main", "neet"); defaults to the configured exam
        #[arg(long, conflicts_with = "file")]
        exam: Option<String>,

        /// Exam file (.toml) with its own pattern and questions
        #[arg(long)]
        file: Option<PathBuf>,

        /// Generate questions with the configured AI generator
        #[arg(long)]
        generate: bool,

        /// Override the exam duration, in minutes
        #[arg(long)]
        minutes: Option<u64>,

        /// Output directory for the attempt report
        #[arg(long)]
        output: Option<PathBuf>,

        /// Report format: json, html, all, none
        #[arg(long, default_value = "json")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate exam files
    Validate {
        /// Path to exam file or directory
        #[arg(long)]
        file: PathBuf,
    },

    /// Score a set of answers offline
    Score {
        /// Exam file (.toml)
        #[arg(long)]
        file: PathBuf,

        /// Answers JSON: question number -> option ("B" or 1)
        #[arg(long)]
        answers: PathBuf,

        /// Time spent, in seconds
        #[arg(long, default_value = "0")]
        elapsed_secs: u64,

        /// Output format: text, json, html
        #[arg(long, default_value = "text")]
        format: String,

        /// Write the report here instead of stdout (json/html)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Compare two attempt reports
    Compare {
        /// Baseline report JSON
        #[arg(long)]
        baseline: PathBuf,

        /// Current report JSON
        #[arg(long)]
        current: PathBuf,

        /// Change in percentage points treated as noise
        #[arg(long, default_value = "1.0")]
        threshold: f64,

        /// Exit code 1 if any subject regressed
        #[arg(long)]
        fail_on_regression: bool,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Show past attempts and per-exam statistics
    History {
        /// History file (JSON lines); defaults to the configured one
        #[arg(long)]
        file: Option<PathBuf>,

        /// Only show this exam
        #[arg(long)]
        exam: Option<String>,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List built-in exam patterns
    Patterns {
        /// Show the sections of one exam
        #[arg(long)]
        exam: Option<String>,
    },

    /// Create starter config and example exam file
    Init,
}

#[tokio::main]
async fn main() {
    let filter = tracing_subscriber::EnvFilter::from_default_env();
    let filter = match "proctor=info".parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Take {
            exam,
            file,
            generate,
            minutes,
            output,
            format,
            config,
        } => {
            commands::take::execute(commands::take::TakeOptions {
                exam,
                file,
                generate,
                minutes,
                output,
                format,
                config,
            })
            .await
        }
        Commands::Validate { file } => commands::validate::execute(file),
        Commands::Score {
            file,
            answers,
            elapsed_secs,
            format,
            output,
        } => commands::score::execute(file, answers, elapsed_secs, format, output),
        Commands::Compare {
            baseline,
            current,
            threshold,
            fail_on_regression,
            format,
        } => commands::compare::execute(baseline, current, threshold, fail_on_regression, format),
        Commands::History {
            file,
            exam,
            format,
            config,
        } => commands::history::execute(file, exam, format, config),
        Commands::Patterns { exam } => commands::patterns::execute(exam),
        Commands::Init => commands::init::execute(),
    };

    let code = match result {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {e:#}");
            1
        }
    };
    // An unfinished stdin read from `take` would otherwise hold the runtime open.
    process::exit(code);
}
