// src/store/submissions.rs

use std::collections::HashSet;

use crate::models::submission::{StudentHistory, StudentReport, Submission, accuracy};

/// How many recent submissions a report row shows.
const RECENT_PER_STUDENT: usize = 3;

/// Append-only answer log, kept newest-first.
///
/// One entry per (student, question) is expected but not enforced.
#[derive(Debug, Clone, Default)]
pub struct SubmissionLog {
    entries: Vec<Submission>,
}

impl SubmissionLog {
    pub fn new(entries: Vec<Submission>) -> Self {
        Self { entries }
    }

    pub fn all(&self) -> &[Submission] {
        &self.entries
    }

    pub fn record(&mut self, submission: Submission) {
        self.entries.insert(0, submission);
    }

    pub fn for_student<'a>(&'a self, student_id: &'a str) -> impl Iterator<Item = &'a Submission> {
        self.entries.iter().filter(move |s| s.student_id == student_id)
    }

    /// The student's most recent answer to `question_id`.
    pub fn find(&self, student_id: &str, question_id: &str) -> Option<&Submission> {
        self.entries
            .iter()
            .find(|s| s.student_id == student_id && s.question_id == question_id)
    }

    /// Name the student gave at their latest login, as recorded on their latest answer.
    pub fn student_name(&self, student_id: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|s| s.student_id == student_id)
            .map(|s| s.student_name.as_str())
    }

    pub fn history(&self, student_id: &str) -> StudentHistory {
        let submissions: Vec<Submission> = self.for_student(student_id).cloned().collect();
        let correct = submissions.iter().filter(|s| s.is_correct).count();
        StudentHistory {
            accuracy: accuracy(correct, submissions.len()),
            submissions,
        }
    }

    /// One row per distinct student, most recently active first.
    pub fn reports(&self, is_busy: impl Fn(&str) -> bool) -> Vec<StudentReport> {
        let mut seen = HashSet::new();
        let students: Vec<&str> = self
            .entries
            .iter()
            .map(|s| s.student_id.as_str())
            .filter(|id| seen.insert(*id))
            .collect();

        students
            .into_iter()
            .map(|student_id| {
                let subs: Vec<&Submission> = self.for_student(student_id).collect();
                let correct = subs.iter().filter(|s| s.is_correct).count();
                StudentReport {
                    student_id: student_id.to_string(),
                    student_name: subs[0].student_name.clone(),
                    attempts: subs.len(),
                    correct,
                    accuracy: accuracy(correct, subs.len()).unwrap_or(0),
                    recent: subs.iter().take(RECENT_PER_STUDENT).map(|s| (*s).clone()).collect(),
                    busy: is_busy(student_id),
                }
            })
            .collect()
    }
}
