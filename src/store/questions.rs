// src/store/questions.rs

use crate::{
    models::question::{CreateQuestionRequest, Question},
    utils::ids::random_id,
};

/// Ordered question bank. New questions go to the end.
#[derive(Debug, Clone, Default)]
pub struct QuestionRepository {
    questions: Vec<Question>,
}

impl QuestionRepository {
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    pub fn all(&self) -> &[Question] {
        &self.questions
    }

    pub fn get(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// Appends a question built from an already validated form.
    pub fn add(&mut self, req: CreateQuestionRequest) -> Question {
        let question = Question {
            id: random_id(),
            text: req.text,
            category: req.category,
            options: req.options,
            correct_answer: req.correct_answer,
            difficulty: req.difficulty,
            explanation: req.explanation,
        };
        self.questions.push(question.clone());
        question
    }

    /// Removes the first question with `id`, keeping the order of the rest.
    pub fn delete(&mut self, id: &str) -> Option<Question> {
        let pos = self.questions.iter().position(|q| q.id == id)?;
        Some(self.questions.remove(pos))
    }
}
