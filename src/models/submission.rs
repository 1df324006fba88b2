// src/models/submission.rs

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{
    models::{question::Question, user::User},
    utils::ids::random_id,
};

static NOTE_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^NOTE-\d{6}$").expect("static regex is valid"));

/// Generates a shareable note reference, `NOTE-` followed by six digits.
pub fn generate_note_id() -> String {
    let n: u32 = rand::thread_rng().gen_range(100_000..=999_999);
    format!("NOTE-{n}")
}

pub fn is_note_id(candidate: &str) -> bool {
    NOTE_ID_PATTERN.is_match(candidate)
}

/// One recorded answer by one student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: String,
    pub student_id: String,
    pub student_name: String,
    pub question_id: String,
    pub answer: usize,
    pub is_correct: bool,
    pub timestamp: DateTime<Utc>,
    pub note_id: String,
}

impl Submission {
    /// Builds the record for `student` answering `question` with option `answer`.
    pub fn record(student: &User, question: &Question, answer: usize) -> Self {
        Self {
            id: random_id(),
            student_id: student.id.clone(),
            student_name: student.name.clone(),
            question_id: question.id.clone(),
            answer,
            is_correct: question.is_correct(answer),
            timestamp: Utc::now(),
            note_id: generate_note_id(),
        }
    }
}

/// DTO for answering a question.
#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub answer: usize,
}

/// A student's own history.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentHistory {
    pub submissions: Vec<Submission>,
    /// Rounded percentage of correct answers; absent before the first answer.
    pub accuracy: Option<u32>,
}

/// One row of the administrator's performance report.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentReport {
    pub student_id: String,
    pub student_name: String,
    pub attempts: usize,
    pub correct: usize,
    pub accuracy: u32,
    /// Up to three most recent submissions.
    pub recent: Vec<Submission>,
    /// Whether the student currently has a call in the registry.
    pub busy: bool,
}

/// Rounded percentage, `None` when nothing was attempted.
pub fn accuracy(correct: usize, attempts: usize) -> Option<u32> {
    if attempts == 0 {
        return None;
    }
    Some(((correct as f64 / attempts as f64) * 100.0).round() as u32)
}
