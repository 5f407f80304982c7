//! Built-in exam patterns.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::model::{ExamPattern, MarkingScheme, Section, Subject};

/// Exams with a built-in pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExamKind {
    JeeMain,
    JeeAdvanced,
    Neet,
    Cuet,
    Clat,
    Aptitude,
}

impl ExamKind {
    pub const ALL: [ExamKind; 6] = [
        ExamKind::JeeMain,
        ExamKind::JeeAdvanced,
        ExamKind::Neet,
        ExamKind::Cuet,
        ExamKind::Clat,
        ExamKind::Aptitude,
    ];

    /// URL-safe identifier used by result sinks (e.g. "jeemain").
    pub fn slug(&self) -> &'static str {
        match self {
            ExamKind::JeeMain => "jeemain",
            ExamKind::JeeAdvanced => "jeeadvanced",
            ExamKind::Neet => "neet",
            ExamKind::Cuet => "cuet",
            ExamKind::Clat => "clat",
            ExamKind::Aptitude => "aptitude",
        }
    }

    /// Subjects of this exam, in paper order.
    pub fn subjects(&self) -> Vec<Subject> {
        self.pattern().sections.iter().map(|s| s.subject).collect()
    }

    /// The official pattern for this exam.
    pub fn pattern(&self) -> ExamPattern {
        match self {
            ExamKind::JeeMain => ExamPattern::with_minutes(
                "JEE Main",
                180,
                sections(&[
                    (Subject::Physics, 25),
                    (Subject::Chemistry, 25),
                    (Subject::Mathematics, 25),
                ]),
                MarkingScheme::new(4.0, 1.0),
            ),
            ExamKind::JeeAdvanced => ExamPattern::with_minutes(
                "JEE Advanced",
                180,
                sections(&[
                    (Subject::Physics, 18),
                    (Subject::Chemistry, 18),
                    (Subject::Mathematics, 18),
                ]),
                MarkingScheme::new(3.0, 1.0),
            ),
            ExamKind::Neet => ExamPattern::with_minutes(
                "NEET (National Eligibility cum Entrance Test)",
                200,
                sections(&[
                    (Subject::Physics, 45),
                    (Subject::Chemistry, 45),
                    (Subject::Biology, 90),
                ]),
                MarkingScheme::new(4.0, 1.0),
            ),
            ExamKind::Cuet => ExamPattern::with_minutes(
                "CUET (UG)",
                165,
                sections(&[
                    (Subject::GeneralTest, 50),
                    (Subject::English, 40),
                    (Subject::QuantitativeAptitude, 50),
                    (Subject::LogicalReasoning, 50),
                    (Subject::CurrentAffairs, 10),
                ]),
                MarkingScheme::new(1.0, 0.25),
            ),
            ExamKind::Clat => ExamPattern::with_minutes(
                "CLAT (UG)",
                120,
                sections(&[
                    (Subject::EnglishLanguage, 28),
                    (Subject::CurrentAffairs, 35),
                    (Subject::LegalReasoning, 35),
                    (Subject::LogicalReasoning, 28),
                    (Subject::QuantitativeTechniques, 14),
                ]),
                MarkingScheme::new(1.0, 0.25),
            ),
            ExamKind::Aptitude => ExamPattern::with_minutes(
                "Aptitude Assessment",
                30,
                sections(&[
                    (Subject::LogicalReasoning, 10),
                    (Subject::CreativeThinking, 10),
                    (Subject::AnalyticalSkills, 10),
                    (Subject::CommunicationStyle, 10),
                ]),
                MarkingScheme::new(1.0, 0.0),
            ),
        }
    }
}

fn sections(layout: &[(Subject, u32)]) -> Vec<Section> {
    layout
        .iter()
        .map(|&(subject, question_count)| Section {
            subject,
            question_count,
        })
        .collect()
}

impl fmt::Display for ExamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExamKind::JeeMain => "jee_main",
            ExamKind::JeeAdvanced => "jee_advanced",
            ExamKind::Neet => "neet",
            ExamKind::Cuet => "cuet",
            ExamKind::Clat => "clat",
            ExamKind::Aptitude => "aptitude",
        };
        f.write_str(s)
    }
}

impl FromStr for ExamKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "jee_main" | "jeemain" => Ok(ExamKind::JeeMain),
            "jee_advanced" | "jeeadvanced" => Ok(ExamKind::JeeAdvanced),
            "neet" => Ok(ExamKind::Neet),
            "cuet" => Ok(ExamKind::Cuet),
            "clat" => Ok(ExamKind::Clat),
            "aptitude" => Ok(ExamKind::Aptitude),
            other => Err(format!("unknown exam: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jee_main_pattern() {
        let pattern = ExamKind::JeeMain.pattern();
        assert_eq!(pattern.name, "JEE Main");
        assert_eq!(pattern.duration_secs, 180 * 60);
        assert_eq!(pattern.total_questions(), 75);
        assert_eq!(pattern.marking, MarkingScheme::new(4.0, 1.0));
    }

    #[test]
    fn neet_has_double_biology() {
        let pattern = ExamKind::Neet.pattern();
        assert_eq!(pattern.total_questions(), 180);
        assert_eq!(pattern.section_count(Subject::Biology), Some(90));
    }

    #[test]
    fn fractional_penalty_exams() {
        for kind in [ExamKind::Cuet, ExamKind::Clat] {
            assert_eq!(kind.pattern().marking.wrong_penalty, 0.25);
        }
        assert_eq!(ExamKind::Cuet.pattern().total_questions(), 200);
        assert_eq!(ExamKind::Clat.pattern().total_questions(), 140);
    }

    #[test]
    fn kind_parse_and_display() {
        for kind in ExamKind::ALL {
            assert_eq!(kind.to_string().parse::<ExamKind>().unwrap(), kind);
            assert_eq!(kind.slug().parse::<ExamKind>().unwrap(), kind);
        }
        assert_eq!("JEE Main".parse::<ExamKind>().unwrap(), ExamKind::JeeMain);
        assert!("gre".parse::<ExamKind>().is_err());
    }

    #[test]
    fn subjects_follow_pattern_order() {
        assert_eq!(
            ExamKind::JeeAdvanced.subjects(),
            vec![Subject::Physics, Subject::Chemistry, Subject::Mathematics]
        );
    }
}
