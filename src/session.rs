//! Quiz session state machine.
//!
//! One session per player. The state is derived from the stored fields, so a
//! revealed answer always has a recorded choice and an unstarted session never
//! holds a question.
use log::{debug, info};
use rand::Rng;
use std::fmt;

use crate::error::{QuizError, Result};
use crate::questions::{Question, QuestionGenerator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizState {
    NotStarted,
    AwaitingAnswer,
    AnswerRevealed,
}

impl fmt::Display for QuizState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QuizState::NotStarted => "the quiz has not started",
            QuizState::AwaitingAnswer => "waiting for an answer",
            QuizState::AnswerRevealed => "the answer is revealed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct QuizSession {
    score: u32,
    question_index: Option<usize>,
    current: Option<Question>,
    user_choice: Option<String>,
    last_answer_correct: Option<bool>,
}

impl QuizSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> QuizState {
        match (&self.current, &self.user_choice) {
            (None, _) => QuizState::NotStarted,
            (Some(_), None) => QuizState::AwaitingAnswer,
            (Some(_), Some(_)) => QuizState::AnswerRevealed,
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Zero-based index of the current question; `None` before `start`
    pub fn question_index(&self) -> Option<usize> {
        self.question_index
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.current.as_ref()
    }

    pub fn submitted(&self) -> bool {
        self.user_choice.is_some()
    }

    pub fn user_choice(&self) -> Option<&str> {
        self.user_choice.as_deref()
    }

    pub fn last_answer_correct(&self) -> Option<bool> {
        self.last_answer_correct
    }

    /// Questions whose result has already been folded into the score
    pub fn answered(&self) -> usize {
        self.question_index.unwrap_or(0)
    }

    /// `(correct, answered)` including a revealed answer not yet scored by
    /// `next`, for summaries shown when the player stops mid-question.
    pub fn tally(&self) -> (u32, usize) {
        let pending = u32::from(self.last_answer_correct == Some(true));
        (
            self.score + pending,
            self.answered() + usize::from(self.submitted()),
        )
    }

    fn expect_state(&self, action: &'static str, expected: QuizState) -> Result<()> {
        let state = self.state();
        if state == expected {
            Ok(())
        } else {
            Err(QuizError::InvalidStateTransition { action, state })
        }
    }

    /// Starts a fresh quiz with its first question
    pub fn start<R: Rng + ?Sized>(
        &mut self,
        generator: &QuestionGenerator<'_>,
        rng: &mut R,
    ) -> Result<&Question> {
        self.expect_state("start", QuizState::NotStarted)?;
        let question = generator.generate(rng)?;
        *self = Self {
            score: 0,
            question_index: Some(0),
            current: Some(question),
            user_choice: None,
            last_answer_correct: None,
        };
        info!("Quiz started");
        Ok(self.current_question_unchecked())
    }

    /// Records the player's answer and returns whether it was right
    pub fn submit(&mut self, choice: &str) -> Result<bool> {
        self.expect_state("submit", QuizState::AwaitingAnswer)?;
        let question = self.current_question_unchecked();
        if !question.has_option(choice) {
            return Err(QuizError::InvalidChoice(choice.to_string()));
        }
        let correct = choice == question.correct_answer;
        debug!("Answer '{choice}' submitted, correct: {correct}");
        self.user_choice = Some(choice.to_string());
        self.last_answer_correct = Some(correct);
        Ok(correct)
    }

    /// Hint for the question being answered
    pub fn hint(&self) -> Result<&str> {
        self.expect_state("show a hint", QuizState::AwaitingAnswer)?;
        Ok(self.current_question_unchecked().hint.as_str())
    }

    /// Scores the revealed answer and moves to a new question.
    ///
    /// If no question can be generated the session is left as it was.
    pub fn next<R: Rng + ?Sized>(
        &mut self,
        generator: &QuestionGenerator<'_>,
        rng: &mut R,
    ) -> Result<&Question> {
        self.expect_state("move to the next question", QuizState::AnswerRevealed)?;
        let question = generator.generate(rng)?;
        if self.last_answer_correct == Some(true) {
            self.score += 1;
        }
        self.question_index = self.question_index.map(|i| i + 1);
        self.current = Some(question);
        self.user_choice = None;
        self.last_answer_correct = None;
        Ok(self.current_question_unchecked())
    }

    /// Back to the start screen from any state
    pub fn reset(&mut self) {
        *self = Self::default();
        info!("Quiz reset");
    }

    // Only called once the state check has ruled out NotStarted
    fn current_question_unchecked(&self) -> &Question {
        match &self.current {
            Some(q) => q,
            None => unreachable!("question checked by state guard"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::tests::sample_dataset;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn wrong_option(q: &Question) -> String {
        q.options
            .iter()
            .find(|o| **o != q.correct_answer)
            .unwrap()
            .clone()
    }

    #[test]
    fn test_new_session_not_started() {
        let session = QuizSession::new();
        assert_eq!(session.state(), QuizState::NotStarted);
        assert_eq!(session.question_index(), None);
        assert!(session.current_question().is_none());
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn test_start_yields_first_question() {
        let dataset = sample_dataset();
        let generator = QuestionGenerator::new(&dataset);
        let mut rng = StdRng::seed_from_u64(11);
        let mut session = QuizSession::new();

        session.start(&generator, &mut rng).unwrap();
        assert_eq!(session.state(), QuizState::AwaitingAnswer);
        assert_eq!(session.question_index(), Some(0));
        assert_eq!(session.score(), 0);
        assert!(!session.submitted());
        assert_eq!(session.user_choice(), None);
        assert_eq!(session.last_answer_correct(), None);
    }

    #[test]
    fn test_correct_answer_scores_on_next() {
        let dataset = sample_dataset();
        let generator = QuestionGenerator::new(&dataset);
        let mut rng = StdRng::seed_from_u64(5);
        let mut session = QuizSession::new();

        let answer = session.start(&generator, &mut rng).unwrap().correct_answer.clone();
        assert!(session.submit(&answer).unwrap());
        assert_eq!(session.state(), QuizState::AnswerRevealed);
        assert_eq!(session.user_choice(), Some(answer.as_str()));
        // score only moves once the player continues
        assert_eq!(session.score(), 0);

        session.next(&generator, &mut rng).unwrap();
        assert_eq!(session.score(), 1);
        assert_eq!(session.question_index(), Some(1));
        assert_eq!(session.state(), QuizState::AwaitingAnswer);
        assert_eq!(session.last_answer_correct(), None);
    }

    #[test]
    fn test_wrong_answer_does_not_score() {
        let dataset = sample_dataset();
        let generator = QuestionGenerator::new(&dataset);
        let mut rng = StdRng::seed_from_u64(9);
        let mut session = QuizSession::new();

        let wrong = wrong_option(session.start(&generator, &mut rng).unwrap());
        assert!(!session.submit(&wrong).unwrap());
        assert_eq!(session.last_answer_correct(), Some(false));
        session.next(&generator, &mut rng).unwrap();
        assert_eq!(session.score(), 0);
        assert_eq!(session.question_index(), Some(1));
    }

    #[test]
    fn test_score_tracks_correct_answers_over_many_rounds() {
        let dataset = sample_dataset();
        let generator = QuestionGenerator::new(&dataset);
        let mut rng = StdRng::seed_from_u64(21);
        let mut session = QuizSession::new();
        session.start(&generator, &mut rng).unwrap();

        let mut expected = 0;
        for round in 0..20 {
            let q = session.current_question().unwrap().clone();
            let choice = if round % 3 == 0 {
                wrong_option(&q)
            } else {
                expected += 1;
                q.correct_answer.clone()
            };
            session.submit(&choice).unwrap();
            let before = session.score();
            session.next(&generator, &mut rng).unwrap();
            assert!(session.score() >= before);
        }
        assert_eq!(session.score(), expected);
        assert_eq!(session.answered(), 20);
    }

    #[test]
    fn test_tally_counts_revealed_answer() {
        let dataset = sample_dataset();
        let generator = QuestionGenerator::new(&dataset);
        let mut rng = StdRng::seed_from_u64(13);
        let mut session = QuizSession::new();
        assert_eq!(session.tally(), (0, 0));

        let answer = session.start(&generator, &mut rng).unwrap().correct_answer.clone();
        assert_eq!(session.tally(), (0, 0));
        session.submit(&answer).unwrap();
        assert_eq!(session.score(), 0);
        assert_eq!(session.tally(), (1, 1));
        session.next(&generator, &mut rng).unwrap();
        assert_eq!(session.tally(), (1, 1));
    }

    #[test]
    fn test_next_before_submit_is_rejected() {
        let dataset = sample_dataset();
        let generator = QuestionGenerator::new(&dataset);
        let mut rng = StdRng::seed_from_u64(2);
        let mut session = QuizSession::new();
        session.start(&generator, &mut rng).unwrap();

        let err = session.next(&generator, &mut rng).unwrap_err();
        assert!(matches!(
            err,
            QuizError::InvalidStateTransition {
                state: QuizState::AwaitingAnswer,
                ..
            }
        ));
        assert_eq!(session.question_index(), Some(0));
    }

    #[test]
    fn test_double_submit_is_rejected() {
        let dataset = sample_dataset();
        let generator = QuestionGenerator::new(&dataset);
        let mut rng = StdRng::seed_from_u64(3);
        let mut session = QuizSession::new();
        let answer = session.start(&generator, &mut rng).unwrap().correct_answer.clone();

        session.submit(&answer).unwrap();
        let err = session.submit(&answer).unwrap_err();
        assert!(matches!(
            err,
            QuizError::InvalidStateTransition {
                state: QuizState::AnswerRevealed,
                ..
            }
        ));
    }

    #[test]
    fn test_only_start_is_legal_before_starting() {
        let dataset = sample_dataset();
        let generator = QuestionGenerator::new(&dataset);
        let mut rng = StdRng::seed_from_u64(4);
        let mut session = QuizSession::new();

        assert!(matches!(
            session.submit("Eden Gardens"),
            Err(QuizError::InvalidStateTransition { state: QuizState::NotStarted, .. })
        ));
        assert!(session.next(&generator, &mut rng).is_err());
        assert!(session.hint().is_err());
    }

    #[test]
    fn test_start_twice_is_rejected() {
        let dataset = sample_dataset();
        let generator = QuestionGenerator::new(&dataset);
        let mut rng = StdRng::seed_from_u64(4);
        let mut session = QuizSession::new();
        session.start(&generator, &mut rng).unwrap();
        assert!(session.start(&generator, &mut rng).is_err());
    }

    #[test]
    fn test_invalid_choice() {
        let dataset = sample_dataset();
        let generator = QuestionGenerator::new(&dataset);
        let mut rng = StdRng::seed_from_u64(6);
        let mut session = QuizSession::new();
        session.start(&generator, &mut rng).unwrap();

        match session.submit("Lord's") {
            Err(QuizError::InvalidChoice(c)) => assert_eq!(c, "Lord's"),
            other => panic!("expected InvalidChoice, got {other:?}"),
        }
        assert_eq!(session.state(), QuizState::AwaitingAnswer);
    }

    #[test]
    fn test_hint_only_before_submit() {
        let dataset = sample_dataset();
        let generator = QuestionGenerator::new(&dataset);
        let mut rng = StdRng::seed_from_u64(8);
        let mut session = QuizSession::new();
        let answer = session.start(&generator, &mut rng).unwrap().correct_answer.clone();

        assert!(session.hint().unwrap().starts_with("Hint:"));
        session.submit(&answer).unwrap();
        assert!(session.hint().is_err());
    }

    #[test]
    fn test_reset_from_every_state() {
        let dataset = sample_dataset();
        let generator = QuestionGenerator::new(&dataset);
        let mut rng = StdRng::seed_from_u64(10);
        let mut session = QuizSession::new();

        session.reset();
        assert_eq!(session.state(), QuizState::NotStarted);

        session.start(&generator, &mut rng).unwrap();
        session.reset();
        assert_eq!(session.question_index(), None);
        assert_eq!(session.score(), 0);

        let answer = session.start(&generator, &mut rng).unwrap().correct_answer.clone();
        session.submit(&answer).unwrap();
        let answer = session.next(&generator, &mut rng).unwrap().correct_answer.clone();
        assert_eq!(session.score(), 1);
        session.submit(&answer).unwrap();
        session.reset();
        assert_eq!(session.state(), QuizState::NotStarted);
        assert_eq!(session.question_index(), None);
        assert_eq!(session.score(), 0);
        assert!(session.current_question().is_none());
        assert!(!session.submitted());
    }

    #[test]
    fn test_failed_generation_leaves_session_unchanged() {
        let dataset = sample_dataset();
        let generator = QuestionGenerator::new(&dataset);
        let empty = crate::dataset::Dataset::default();
        let broken = QuestionGenerator::new(&empty);
        let mut rng = StdRng::seed_from_u64(12);
        let mut session = QuizSession::new();

        assert!(session.start(&broken, &mut rng).is_err());
        assert_eq!(session.state(), QuizState::NotStarted);

        let answer = session.start(&generator, &mut rng).unwrap().correct_answer.clone();
        session.submit(&answer).unwrap();
        assert!(session.next(&broken, &mut rng).is_err());
        assert_eq!(session.state(), QuizState::AnswerRevealed);
        assert_eq!(session.score(), 0);
    }
}
