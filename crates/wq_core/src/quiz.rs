use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const MIN_QUESTIONS: usize = 5;
pub const MAX_QUESTIONS: usize = 10;
pub const OPTIONS_PER_QUESTION: usize = 4;
pub const MAX_ENTITIES: usize = 10;
pub const MAX_RELATED_TOPICS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "easy" => Some(Self::Easy),
            "medium" => Some(Self::Medium),
            "hard" => Some(Self::Hard),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEntities {
    #[serde(default)]
    pub people: Vec<String>,
    #[serde(default)]
    pub organizations: Vec<String>,
    #[serde(default)]
    pub locations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub section: String,
}

impl QuizQuestion {
    /// True when `answer` is byte-equal to one of the options.
    pub fn answer_is_option(&self) -> bool {
        self.options.iter().any(|option| option == &self.answer)
    }
}

/// Canonical generated quiz, as persisted and served.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizDocument {
    pub id: Option<i64>,
    pub url: String,
    pub title: String,
    pub summary: String,
    pub key_entities: KeyEntities,
    pub sections: Vec<String>,
    pub quiz: Vec<QuizQuestion>,
    pub related_topics: Vec<String>,
}

impl QuizDocument {
    /// Indices of questions whose answer does not match any option.
    pub fn unanswerable_questions(&self) -> Vec<usize> {
        self.quiz
            .iter()
            .enumerate()
            .filter(|(_, q)| !q.answer_is_option())
            .map(|(i, _)| i)
            .collect()
    }

    /// Scores submitted answers keyed by question index.
    pub fn score(&self, quiz_id: i64, answers: &HashMap<usize, String>) -> ScoreReport {
        let results: Vec<QuestionResult> = self
            .quiz
            .iter()
            .enumerate()
            .map(|(idx, q)| {
                let your_answer = answers.get(&idx).cloned();
                QuestionResult {
                    question_id: idx,
                    question: q.question.clone(),
                    correct: your_answer.as_deref() == Some(q.answer.as_str()),
                    your_answer,
                    correct_answer: q.answer.clone(),
                }
            })
            .collect();

        ScoreReport {
            quiz_id,
            score: results.iter().filter(|r| r.correct).count(),
            total: self.quiz.len(),
            results,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionResult {
    pub question_id: usize,
    pub question: String,
    pub your_answer: Option<String>,
    pub correct_answer: String,
    pub correct: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub quiz_id: i64,
    pub score: usize,
    pub total: usize,
    pub results: Vec<QuestionResult>,
}
