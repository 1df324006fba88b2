// src/models/question.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::submission::Submission;

/// Every question carries exactly this many options.
pub const OPTION_COUNT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// A multiple-choice question in the bank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,

    pub text: String,

    /// e.g. "Quantitative", "Logical Reasoning".
    pub category: String,

    pub options: Vec<String>,

    /// Index into `options`.
    pub correct_answer: usize,

    pub difficulty: Difficulty,

    pub explanation: String,
}

impl Question {
    /// Whether `answer` picks the correct option.
    /// This is the only place correctness is decided.
    pub fn is_correct(&self, answer: usize) -> bool {
        answer == self.correct_answer
    }
}

/// The two entries a fresh question bank starts with.
pub fn seed_questions() -> Vec<Question> {
    vec![
        Question {
            id: "1".to_string(),
            text: "If 5 workers can build a wall in 12 days, how many workers are needed to build the same wall in 4 days?".to_string(),
            category: "Quantitative".to_string(),
            options: ["10", "15", "20", "25"].map(String::from).to_vec(),
            correct_answer: 1,
            difficulty: Difficulty::Easy,
            explanation: "Work = Workers x Days. 5 * 12 = 60. To do it in 4 days: 60 / 4 = 15.".to_string(),
        },
        Question {
            id: "2".to_string(),
            text: "Find the odd one out: 27, 64, 125, 144, 216".to_string(),
            category: "Logical Reasoning".to_string(),
            options: ["27", "64", "144", "216"].map(String::from).to_vec(),
            correct_answer: 2,
            difficulty: Difficulty::Medium,
            explanation: "All others are perfect cubes (3^3, 4^3, 5^3, 6^3). 144 is 12^2.".to_string(),
        },
    ]
}

/// Question as a student sees it.
/// The answer key and explanation stay hidden until the student has answered it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentQuestion {
    pub id: String,
    pub text: String,
    pub category: String,
    pub options: Vec<String>,
    pub difficulty: Difficulty,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    /// The student's earlier answer, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission: Option<Submission>,
}

impl StudentQuestion {
    pub fn new(question: Question, submission: Option<Submission>) -> Self {
        let revealed = submission.is_some();
        Self {
            id: question.id,
            text: question.text,
            category: question.category,
            options: question.options,
            difficulty: question.difficulty,
            correct_answer: revealed.then_some(question.correct_answer),
            explanation: revealed.then_some(question.explanation),
            submission,
        }
    }
}

fn default_category() -> String {
    "Quantitative".to_string()
}

/// DTO for posting a new question.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuestionRequest {
    #[validate(custom(function = validate_text))]
    pub text: String,
    #[serde(default = "default_category")]
    #[validate(length(min = 1, max = 100))]
    pub category: String,
    #[validate(custom(function = validate_options))]
    pub options: Vec<String>,
    #[validate(range(max = 3))]
    pub correct_answer: usize,
    pub difficulty: Difficulty,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub explanation: String,
}

fn validate_text(text: &str) -> Result<(), validator::ValidationError> {
    if text.trim().is_empty() {
        return Err(validator::ValidationError::new("text_cannot_be_empty"));
    }
    if text.len() > 1000 {
        return Err(validator::ValidationError::new("text_too_long"));
    }
    Ok(())
}

fn validate_options(options: &[String]) -> Result<(), validator::ValidationError> {
    if options.len() != OPTION_COUNT {
        return Err(validator::ValidationError::new("exactly_four_options"));
    }
    for opt in options {
        if opt.trim().is_empty() {
            return Err(validator::ValidationError::new("option_cannot_be_empty"));
        }
        if opt.len() > 500 {
            return Err(validator::ValidationError::new("option_too_long"));
        }
    }
    Ok(())
}

/// Query string for the delete endpoint. Deletion only happens once confirmed.
#[derive(Debug, Default, Deserialize)]
pub struct DeleteQuestionQuery {
    #[serde(default)]
    pub confirm: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(options: &[&str]) -> CreateQuestionRequest {
        CreateQuestionRequest {
            text: "What comes next: 2, 4, 8, ?".to_string(),
            category: "Quantitative".to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
            correct_answer: 2,
            difficulty: Difficulty::Easy,
            explanation: String::new(),
        }
    }

    #[test]
    fn accepts_four_filled_options() {
        assert!(request(&["10", "12", "16", "32"]).validate().is_ok());
    }

    #[test]
    fn rejects_blank_option() {
        assert!(request(&["10", " ", "16", "32"]).validate().is_err());
    }

    #[test]
    fn rejects_wrong_option_count() {
        assert!(request(&["10", "12", "16"]).validate().is_err());
    }

    #[test]
    fn rejects_blank_text_and_out_of_range_answer() {
        let mut req = request(&["10", "12", "16", "32"]);
        req.text = "   ".to_string();
        assert!(req.validate().is_err());

        let mut req = request(&["10", "12", "16", "32"]);
        req.correct_answer = 4;
        assert!(req.validate().is_err());
    }

    #[test]
    fn student_view_hides_key_until_answered() {
        let question = seed_questions().remove(0);
        let hidden = serde_json::to_value(StudentQuestion::new(question, None)).unwrap();
        assert!(hidden.get("correctAnswer").is_none());
        assert!(hidden.get("explanation").is_none());
    }

    #[test]
    fn seeds_have_valid_keys() {
        for q in seed_questions() {
            assert_eq!(q.options.len(), OPTION_COUNT);
            assert!(q.correct_answer < OPTION_COUNT);
        }
    }
}
