//! Attempt report types with JSON persistence and progress comparison.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::bank::ExamPaper;
use crate::model::{MarkingScheme, Subject};
use crate::scoring::ScoreReport;

/// A complete record of one finished attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Summary of the exam that was sat.
    pub exam: ExamSummary,
    /// Selected option per 1-based question id.
    pub answers: BTreeMap<u32, usize>,
    /// Frozen score.
    pub score: ScoreReport,
}

/// Summary of an exam pattern (without the questions).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamSummary {
    pub name: String,
    pub duration_secs: u64,
    pub question_count: u32,
    pub marking: MarkingScheme,
}

impl AttemptReport {
    pub fn new(paper: &ExamPaper, answers: BTreeMap<u32, usize>, score: ScoreReport) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            exam: ExamSummary {
                name: paper.pattern.name.clone(),
                duration_secs: paper.pattern.duration_secs,
                question_count: paper.total_questions(),
                marking: paper.pattern.marking,
            },
            answers,
            score,
        }
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: AttemptReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Compare this attempt against an earlier one, per subject percentage.
    ///
    /// Changes within `threshold` percentage points count as unchanged.
    pub fn compare(&self, baseline: &AttemptReport, threshold: f64) -> ProgressComparison {
        let percentages = |report: &AttemptReport| -> BTreeMap<Subject, f64> {
            report
                .score
                .subjects
                .iter()
                .map(|s| (s.subject, s.percentage))
                .collect()
        };

        let baseline_scores = percentages(baseline);
        let current_scores = percentages(self);

        let mut regressions = Vec::new();
        let mut improvements = Vec::new();
        let mut unchanged = 0usize;
        let mut new_subjects = 0usize;

        for (&subject, &current) in &current_scores {
            let Some(&baseline_val) = baseline_scores.get(&subject) else {
                new_subjects += 1;
                continue;
            };
            let change = SubjectChange {
                subject,
                baseline_percentage: baseline_val,
                current_percentage: current,
                delta: current - baseline_val,
            };
            if change.delta < -threshold {
                regressions.push(change);
            } else if change.delta > threshold {
                improvements.push(change);
            } else {
                unchanged += 1;
            }
        }

        let removed_subjects = baseline_scores
            .keys()
            .filter(|k| !current_scores.contains_key(k))
            .count();

        ProgressComparison {
            baseline_percentage: baseline.score.percentage,
            current_percentage: self.score.percentage,
            regressions,
            improvements,
            unchanged,
            new_subjects,
            removed_subjects,
        }
    }
}

/// Result of comparing two attempts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressComparison {
    pub baseline_percentage: f64,
    pub current_percentage: f64,
    /// Subjects where the percentage went down.
    pub regressions: Vec<SubjectChange>,
    /// Subjects where the percentage went up.
    pub improvements: Vec<SubjectChange>,
    /// Subjects with no significant change.
    pub unchanged: usize,
    /// Subjects in current but not baseline.
    pub new_subjects: usize,
    /// Subjects in baseline but not current.
    pub removed_subjects: usize,
}

/// A per-subject percentage change between two attempts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectChange {
    pub subject: Subject,
    pub baseline_percentage: f64,
    pub current_percentage: f64,
    pub delta: f64,
}

impl ProgressComparison {
    /// Format the comparison as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "**Overall:** {:.1}% -> {:.1}% ({:+.1})\n\n",
            self.baseline_percentage,
            self.current_percentage,
            self.overall_delta()
        ));
        md.push_str(&format!(
            "**Summary:** {} regressions, {} improvements, {} unchanged\n\n",
            self.regressions.len(),
            self.improvements.len(),
            self.unchanged
        ));

        for (title, changes) in [
            ("Regressions", &self.regressions),
            ("Improvements", &self.improvements),
        ] {
            if changes.is_empty() {
                continue;
            }
            md.push_str(&format!("### {title}\n\n"));
            md.push_str("| Subject | Baseline | Current | Delta |\n");
            md.push_str("|---------|----------|---------|-------|\n");
            for c in changes {
                md.push_str(&format!(
                    "| {} | {:.1}% | {:.1}% | {:+.1}% |\n",
                    c.subject, c.baseline_percentage, c.current_percentage, c.delta
                ));
            }
            md.push('\n');
        }

        md
    }

    pub fn overall_delta(&self) -> f64 {
        self.current_percentage - self.baseline_percentage
    }

    /// Returns true if any subject got worse.
    pub fn has_regressions(&self) -> bool {
        !self.regressions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::test_support::paper;
    use crate::scoring::score_attempt;

    fn attempt(answers: &[(u32, usize)]) -> AttemptReport {
        let paper = paper(
            600,
            &[(Subject::Physics, 2), (Subject::Chemistry, 2)],
            MarkingScheme::new(4.0, 1.0),
        );
        let answers: BTreeMap<u32, usize> = answers.iter().copied().collect();
        let score = score_attempt(&paper, &answers, 120);
        AttemptReport::new(&paper, answers, score)
    }

    #[test]
    fn compare_identical_attempts() {
        let baseline = attempt(&[(1, 0), (3, 0)]);
        let current = attempt(&[(1, 0), (3, 0)]);

        let comparison = current.compare(&baseline, 1.0);
        assert!(comparison.regressions.is_empty());
        assert!(comparison.improvements.is_empty());
        assert_eq!(comparison.unchanged, 2);
        assert_eq!(comparison.overall_delta(), 0.0);
    }

    #[test]
    fn compare_detects_regression_and_improvement() {
        // Physics 100% -> 0%, Chemistry 0% -> 100%.
        let baseline = attempt(&[(1, 0), (2, 0)]);
        let current = attempt(&[(3, 0), (4, 0)]);

        let comparison = current.compare(&baseline, 1.0);
        assert!(comparison.has_regressions());
        assert_eq!(comparison.regressions[0].subject, Subject::Physics);
        assert_eq!(comparison.regressions[0].delta, -100.0);
        assert_eq!(comparison.improvements[0].subject, Subject::Chemistry);
    }

    #[test]
    fn json_roundtrip() {
        let report = attempt(&[(1, 0), (2, 3)]);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("attempt.json");

        report.save_json(&path).unwrap();
        let loaded = AttemptReport::load_json(&path).unwrap();

        assert_eq!(loaded.id, report.id);
        assert_eq!(loaded.exam.question_count, 4);
        assert_eq!(loaded.answers.get(&2), Some(&3));
        assert_eq!(loaded.score.correct, 1);
    }

    #[test]
    fn markdown_output() {
        let baseline = attempt(&[(1, 0), (2, 0)]);
        let current = attempt(&[(3, 0)]);

        let md = current.compare(&baseline, 1.0).to_markdown();
        assert!(md.contains("Regressions"));
        assert!(md.contains("Physics"));
        assert!(md.contains("Improvements"));
    }
}
