//! Question provider backed by exam files on disk.

use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;

use proctor_core::bank::QuestionBank;
use proctor_core::model::ExamPattern;
use proctor_core::parser::{load_exam_directory, parse_exam_file, ExamFile};
use proctor_core::traits::QuestionProvider;

/// Serves a fixed, pre-loaded question bank.
#[derive(Debug, Clone)]
pub struct StaticBankProvider {
    bank: QuestionBank,
}

impl StaticBankProvider {
    pub fn new(bank: QuestionBank) -> Self {
        Self { bank }
    }

    pub fn from_exam_file(file: &ExamFile) -> Self {
        Self::new(file.bank.clone())
    }

    /// Load the bank of a single exam file.
    pub fn load(path: &Path) -> Result<Self> {
        Ok(Self::from_exam_file(&parse_exam_file(path)?))
    }

    /// Merge the banks of every exam file under `dir`.
    pub fn load_directory(dir: &Path) -> Result<Self> {
        let mut bank = QuestionBank::new();
        for file in load_exam_directory(dir)? {
            bank.extend(file.bank);
        }
        tracing::debug!(dir = %dir.display(), templates = bank.len(), "static bank loaded");
        Ok(Self::new(bank))
    }

    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    pub fn into_bank(self) -> QuestionBank {
        self.bank
    }
}

#[async_trait]
impl QuestionProvider for StaticBankProvider {
    fn name(&self) -> &str {
        "static"
    }

    async fn question_bank(&self, pattern: &ExamPattern) -> Result<QuestionBank> {
        let mut bank = QuestionBank::new();
        for section in &pattern.sections {
            bank = bank.with_pool(section.subject, self.bank.pool(section.subject).to_vec());
        }
        Ok(bank)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proctor_core::model::{QuestionTemplate, Subject};
    use proctor_core::traits::load_paper;

    fn template(prompt: &str) -> QuestionTemplate {
        QuestionTemplate {
            prompt: prompt.into(),
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct_option: 0,
            topic: None,
            explanation: None,
        }
    }

    #[tokio::test]
    async fn serves_only_pattern_subjects() {
        let bank = QuestionBank::new()
            .with_pool(Subject::Physics, vec![template("p1")])
            .with_pool(Subject::Biology, vec![template("b1")]);
        let provider = StaticBankProvider::new(bank);

        let pattern = proctor_core::catalog::ExamKind::JeeMain.pattern();
        let served = provider.question_bank(&pattern).await.unwrap();
        assert_eq!(served.pool(Subject::Physics).len(), 1);
        assert!(served.pool(Subject::Biology).is_empty());

        // Chemistry has no pool, so assembly fails.
        let err = load_paper(&provider, &pattern).await.unwrap_err();
        assert!(err.to_string().contains("Chemistry"));
    }

    #[test]
    fn load_directory_merges_banks() {
        let dir = tempfile::tempdir().unwrap();
        for (file, subject) in [("a.toml", "physics"), ("b.toml", "biology")] {
            std::fs::write(
                dir.path().join(file),
                format!(
                    r#"
[exam]
kind = "neet"

[[questions]]
subject = "{subject}"
prompt = "Question from {file}"
options = ["a", "b", "c", "d"]
correct = 2
"#
                ),
            )
            .unwrap();
        }

        let provider = StaticBankProvider::load_directory(dir.path()).unwrap();
        assert_eq!(provider.bank().len(), 2);
        assert_eq!(provider.bank().pool(Subject::Biology)[0].correct_option, 2);
    }
}
