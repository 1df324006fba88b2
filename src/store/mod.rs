// src/store/mod.rs

//! The platform's state container.
//!
//! Owns the question bank, the submission log and the support settings, and
//! writes the affected category back to storage after each accepted mutation.
//! Writes happen while the category's lock is held, so saves land in
//! mutation order.

pub mod persistence;
pub mod questions;
pub mod submissions;

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use validator::Validate;

use crate::{
    broker::CallBroker,
    error::AppError,
    models::{
        question::{CreateQuestionRequest, OPTION_COUNT, Question, StudentQuestion, seed_questions},
        submission::{StudentHistory, StudentReport, Submission},
        support::{SupportConfig, UpdateSupportRequest},
        user::User,
    },
    utils::html::clean_question,
};

use self::{
    persistence::{
        CONFIG_KEY, QUESTIONS_KEY, SUBMISSIONS_KEY, StateStorage, load_json, save_json,
    },
    questions::QuestionRepository,
    submissions::SubmissionLog,
};

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

pub struct PlatformStore {
    storage: Arc<dyn StateStorage>,
    questions: RwLock<QuestionRepository>,
    submissions: RwLock<SubmissionLog>,
    support: RwLock<SupportConfig>,
}

impl PlatformStore {
    /// Rehydrates every category from `storage`.
    /// Missing keys fall back to the seed questions, an empty log and `default_meet_link`.
    pub fn load(storage: Arc<dyn StateStorage>, default_meet_link: &str) -> Result<Self, AppError> {
        let questions: Vec<Question> = match load_json(storage.as_ref(), QUESTIONS_KEY)? {
            Some(questions) => questions,
            None => {
                tracing::info!("No saved questions, seeding the question bank");
                seed_questions()
            }
        };
        let submissions: Vec<Submission> =
            load_json(storage.as_ref(), SUBMISSIONS_KEY)?.unwrap_or_default();
        let support = load_json(storage.as_ref(), CONFIG_KEY)?.unwrap_or_else(|| SupportConfig {
            meet_link: default_meet_link.to_string(),
        });

        tracing::info!(
            questions = questions.len(),
            submissions = submissions.len(),
            "State loaded"
        );

        let store = Self {
            storage,
            questions: RwLock::new(QuestionRepository::new(questions)),
            submissions: RwLock::new(SubmissionLog::new(submissions)),
            support: RwLock::new(support),
        };
        // Mirror the rehydrated state so a fresh install has every key on disk.
        save_json(store.storage.as_ref(), QUESTIONS_KEY, read(&store.questions).all())?;
        save_json(store.storage.as_ref(), SUBMISSIONS_KEY, read(&store.submissions).all())?;
        save_json(store.storage.as_ref(), CONFIG_KEY, &*read(&store.support))?;

        Ok(store)
    }

    pub fn questions(&self) -> Vec<Question> {
        read(&self.questions).all().to_vec()
    }

    pub fn question(&self, id: &str) -> Option<Question> {
        read(&self.questions).get(id).cloned()
    }

    /// Questions as `student` sees them: answer keys only for what they already answered.
    pub fn questions_for_student(&self, student: &User) -> Vec<StudentQuestion> {
        let questions = read(&self.questions);
        let submissions = read(&self.submissions);
        questions
            .all()
            .iter()
            .map(|q| StudentQuestion::new(q.clone(), submissions.find(&student.id, &q.id).cloned()))
            .collect()
    }

    /// Sanitizes and validates the form, then appends the question.
    /// Nothing is committed when validation fails.
    pub fn add_question(&self, mut req: CreateQuestionRequest) -> Result<Question, AppError> {
        clean_question(&mut req);
        req.validate()?;

        let mut questions = write(&self.questions);
        let question = questions.add(req);
        save_json(self.storage.as_ref(), QUESTIONS_KEY, questions.all())?;

        tracing::info!(question_id = %question.id, "Question added");
        Ok(question)
    }

    pub fn delete_question(&self, id: &str) -> Result<Question, AppError> {
        let mut questions = write(&self.questions);
        let removed = questions
            .delete(id)
            .ok_or_else(|| AppError::NotFound("Question not found".to_string()))?;
        save_json(self.storage.as_ref(), QUESTIONS_KEY, questions.all())?;

        tracing::info!(question_id = %id, "Question deleted");
        Ok(removed)
    }

    /// Records `student`'s answer to `question_id`.
    pub fn answer(
        &self,
        student: &User,
        question_id: &str,
        answer: usize,
    ) -> Result<Submission, AppError> {
        if answer >= OPTION_COUNT {
            return Err(AppError::BadRequest(format!(
                "Answer must be an option index between 0 and {}",
                OPTION_COUNT - 1
            )));
        }

        let question = self
            .question(question_id)
            .ok_or_else(|| AppError::NotFound("Question not found".to_string()))?;

        let submission = Submission::record(student, &question, answer);

        let mut log = write(&self.submissions);
        log.record(submission.clone());
        save_json(self.storage.as_ref(), SUBMISSIONS_KEY, log.all())?;

        tracing::info!(
            student_id = %student.id,
            question_id,
            correct = submission.is_correct,
            note_id = %submission.note_id,
            "Answer recorded"
        );
        Ok(submission)
    }

    pub fn submissions(&self) -> Vec<Submission> {
        read(&self.submissions).all().to_vec()
    }

    pub fn history(&self, student_id: &str) -> StudentHistory {
        read(&self.submissions).history(student_id)
    }

    pub fn reports(&self, calls: &CallBroker) -> Vec<StudentReport> {
        read(&self.submissions).reports(|id| calls.is_busy(id))
    }

    /// Name of a student known from the submission log.
    pub fn student_name(&self, student_id: &str) -> Option<String> {
        read(&self.submissions)
            .student_name(student_id)
            .map(String::from)
    }

    pub fn support_config(&self) -> SupportConfig {
        read(&self.support).clone()
    }

    pub fn update_support(&self, req: UpdateSupportRequest) -> Result<SupportConfig, AppError> {
        req.validate()?;

        let mut support = write(&self.support);
        support.meet_link = req.meet_link;
        save_json(self.storage.as_ref(), CONFIG_KEY, &*support)?;

        tracing::info!(meet_link = %support.meet_link, "Support configuration updated");
        Ok(support.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::DEFAULT_MEET_LINK,
        identity,
        models::{
            call::Initiator,
            question::Difficulty,
            submission::is_note_id,
        },
        store::persistence::MemoryStorage,
    };

    fn store_with(storage: &MemoryStorage) -> PlatformStore {
        PlatformStore::load(Arc::new(storage.clone()), DEFAULT_MEET_LINK).unwrap()
    }

    fn form(options: [&str; 4], correct: usize) -> CreateQuestionRequest {
        CreateQuestionRequest {
            text: "How many?".to_string(),
            category: "Quantitative".to_string(),
            options: options.map(String::from).to_vec(),
            correct_answer: correct,
            difficulty: Difficulty::Easy,
            explanation: String::new(),
        }
    }

    #[test]
    fn fresh_store_is_seeded() {
        let storage = MemoryStorage::new();
        let store = store_with(&storage);
        assert_eq!(store.questions().len(), 2);
        assert!(store.submissions().is_empty());
        assert_eq!(store.support_config().meet_link, DEFAULT_MEET_LINK);
        assert!(storage.load(QUESTIONS_KEY).unwrap().is_some());
    }

    #[test]
    fn answers_are_scored_against_the_key() {
        let store = store_with(&MemoryStorage::new());
        let student = identity::student("Asha", "STU-001").unwrap();

        let posted = store.add_question(form(["10", "15", "20", "25"], 1)).unwrap();
        let right = store.answer(&student, &posted.id, 1).unwrap();
        assert!(right.is_correct);
        assert!(is_note_id(&right.note_id));

        let wrong = store.answer(&student, "2", 0).unwrap();
        assert!(!wrong.is_correct);

        for sub in store.submissions() {
            let q = store.question(&sub.question_id).unwrap();
            assert_eq!(sub.is_correct, sub.answer == q.correct_answer);
        }
        assert_eq!(store.history("STU-001").accuracy, Some(50));
    }

    #[test]
    fn invalid_answers_commit_nothing() {
        let store = store_with(&MemoryStorage::new());
        let student = identity::student("Asha", "STU-001").unwrap();

        assert!(matches!(store.answer(&student, "1", 4), Err(AppError::BadRequest(_))));
        assert!(matches!(store.answer(&student, "nope", 0), Err(AppError::NotFound(_))));
        assert!(store.submissions().is_empty());
    }

    #[test]
    fn invalid_question_commits_nothing() {
        let store = store_with(&MemoryStorage::new());
        let err = store.add_question(form(["10", "", "20", "25"], 1));
        assert!(matches!(err, Err(AppError::BadRequest(_))));

        // Sanitizing can empty an option; that is caught too.
        let err = store.add_question(form(["10", "<script>x</script>", "20", "25"], 1));
        assert!(matches!(err, Err(AppError::BadRequest(_))));
        assert_eq!(store.questions().len(), 2);
    }

    #[test]
    fn student_view_reveals_answered_only() {
        let store = store_with(&MemoryStorage::new());
        let student = identity::student("Asha", "STU-001").unwrap();
        store.answer(&student, "1", 1).unwrap();

        let view = store.questions_for_student(&student);
        assert_eq!(view[0].correct_answer, Some(1));
        assert!(view[0].submission.is_some());
        assert_eq!(view[1].correct_answer, None);
        assert!(view[1].explanation.is_none());
    }

    #[test]
    fn state_survives_reload() {
        let storage = MemoryStorage::new();
        let store = store_with(&storage);
        let student = identity::student("Asha", "STU-001").unwrap();

        let added = store.add_question(form(["a", "b", "c", "d"], 3)).unwrap();
        store.delete_question("1").unwrap();
        store.answer(&student, &added.id, 3).unwrap();
        store
            .update_support(UpdateSupportRequest {
                meet_link: "https://meet.google.com/abc-defg-hij".to_string(),
            })
            .unwrap();

        let reloaded = store_with(&storage);
        let ids: Vec<String> = reloaded.questions().into_iter().map(|q| q.id).collect();
        assert_eq!(ids, vec!["2".to_string(), added.id]);
        assert_eq!(reloaded.submissions(), store.submissions());
        assert_eq!(
            reloaded.support_config().meet_link,
            "https://meet.google.com/abc-defg-hij"
        );
    }

    #[test]
    fn delete_unknown_question_is_not_found() {
        let store = store_with(&MemoryStorage::new());
        assert!(matches!(store.delete_question("zzz"), Err(AppError::NotFound(_))));
        assert_eq!(store.questions().len(), 2);
    }

    #[test]
    fn reports_mark_busy_students() {
        let store = store_with(&MemoryStorage::new());
        let calls = CallBroker::new();
        let student = identity::student("Asha", "STU-001").unwrap();
        store.answer(&student, "1", 1).unwrap();

        assert!(!store.reports(&calls)[0].busy);
        calls.initiate(&student, Initiator::Student);
        assert!(store.reports(&calls)[0].busy);
        assert_eq!(store.student_name("STU-001").as_deref(), Some("Asha"));
    }

    #[test]
    fn rejects_bad_meet_link() {
        let store = store_with(&MemoryStorage::new());
        let err = store.update_support(UpdateSupportRequest {
            meet_link: "not a url".to_string(),
        });
        assert!(matches!(err, Err(AppError::BadRequest(_))));
        assert_eq!(store.support_config().meet_link, DEFAULT_MEET_LINK);
    }
}
