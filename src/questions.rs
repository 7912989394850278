//! Multiple-choice question kinds and generation.
//!
//! A question picks one match, asks about its venue, player of the match or
//! winner, and mixes the right answer with three decoys drawn from the other
//! values of the same column.
use log::debug;
use rand::seq::{IteratorRandom, SliceRandom};
use rand::Rng;
use std::fmt;

use crate::dataset::{Dataset, MatchRecord};
use crate::error::{QuizError, Result};

/// Options shown for every question
pub const OPTION_COUNT: usize = 4;

/// Types of quiz questions available
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuestionKind {
    Venue,
    PlayerOfMatch,
    Winner,
}

impl QuestionKind {
    pub const ALL: [QuestionKind; 3] = [
        QuestionKind::Venue,
        QuestionKind::PlayerOfMatch,
        QuestionKind::Winner,
    ];

    /// The record field this kind asks for
    pub fn answer<'a>(&self, record: &'a MatchRecord) -> &'a str {
        match self {
            QuestionKind::Venue => &record.venue,
            QuestionKind::PlayerOfMatch => &record.player_of_match,
            QuestionKind::Winner => &record.winner,
        }
    }

    fn prompt(&self, r: &MatchRecord) -> String {
        match self {
            QuestionKind::Venue => format!(
                "In which stadium was the match between {} and {} on {} played?",
                r.team1, r.team2, r.date
            ),
            QuestionKind::PlayerOfMatch => format!(
                "Who was 'Player of the Match' in the {} vs {} game at {}?",
                r.team1, r.team2, r.venue
            ),
            QuestionKind::Winner => format!(
                "Which team won the match between {} and {} at {} on {}?",
                r.team1, r.team2, r.venue, r.date
            ),
        }
    }

    // Never mentions the answer field
    fn hint(&self, r: &MatchRecord) -> String {
        match self {
            QuestionKind::Venue => {
                format!("Hint: The 'Player of the Match' was {}.", r.player_of_match)
            }
            QuestionKind::PlayerOfMatch => format!("Hint: The match was won by {}.", r.winner),
            QuestionKind::Winner => format!(
                "Hint: {} won the toss and chose to {}.",
                r.toss_winner, r.toss_decision
            ),
        }
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QuestionKind::Venue => "venue",
            QuestionKind::PlayerOfMatch => "player_of_match",
            QuestionKind::Winner => "winner",
        };
        f.write_str(name)
    }
}

/// A single multiple-choice question
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub kind: QuestionKind,
    pub prompt: String,
    pub options: [String; OPTION_COUNT],
    pub correct_answer: String,
    pub hint: String,
}

impl Question {
    pub fn has_option(&self, choice: &str) -> bool {
        self.options.iter().any(|o| o == choice)
    }

    /// Resolves user input to an option: a 1-based number or the option text
    /// (case-insensitive).
    pub fn resolve_option(&self, input: &str) -> Option<&str> {
        let input = input.trim();
        if let Ok(n) = input.parse::<usize>() {
            return n
                .checked_sub(1)
                .and_then(|i| self.options.get(i))
                .map(String::as_str);
        }
        self.options
            .iter()
            .find(|o| o.eq_ignore_ascii_case(input))
            .map(String::as_str)
    }
}

/// Builds a question about `record`, drawing decoys from `distinct`.
///
/// `distinct` holds every value of the kind's column; it must have at least
/// four entries, the answer among them.
pub fn question_for<R: Rng + ?Sized>(
    record: &MatchRecord,
    kind: QuestionKind,
    distinct: &[String],
    rng: &mut R,
) -> Result<Question> {
    let correct = kind.answer(record);
    let decoys: Vec<&String> = distinct
        .iter()
        .filter(|v| v.as_str() != correct)
        .choose_multiple(rng, OPTION_COUNT - 1);
    if decoys.len() < OPTION_COUNT - 1 {
        return Err(QuizError::InsufficientDistinctValues {
            kind,
            distinct: decoys.len() + 1,
        });
    }

    let mut options = [
        correct.to_string(),
        decoys[0].clone(),
        decoys[1].clone(),
        decoys[2].clone(),
    ];
    // choose_multiple keeps source order, so the shuffle does all the mixing
    options.shuffle(rng);

    Ok(Question {
        kind,
        prompt: kind.prompt(record),
        options,
        correct_answer: correct.to_string(),
        hint: kind.hint(record),
    })
}

/// Draws random questions from a loaded dataset
#[derive(Debug, Clone, Copy)]
pub struct QuestionGenerator<'a> {
    dataset: &'a Dataset,
}

impl<'a> QuestionGenerator<'a> {
    pub fn new(dataset: &'a Dataset) -> Self {
        Self { dataset }
    }

    fn usable(&self, kind: QuestionKind) -> bool {
        self.dataset.distinct(kind).len() >= OPTION_COUNT
    }

    /// True when at least one question kind has enough distinct values
    pub fn is_ready(&self) -> bool {
        !self.dataset.is_empty() && QuestionKind::ALL.iter().any(|k| self.usable(*k))
    }

    /// Generates a random question.
    ///
    /// The kind is drawn uniformly; if its column has fewer than four distinct
    /// values the remaining kinds are tried in random order.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Question> {
        let record = self
            .dataset
            .records()
            .choose(rng)
            .ok_or(QuizError::EmptyDataset)?;

        let first = *QuestionKind::ALL
            .choose(rng)
            .ok_or(QuizError::EmptyDataset)?;
        let mut rest: Vec<QuestionKind> = QuestionKind::ALL
            .into_iter()
            .filter(|k| *k != first)
            .collect();
        rest.shuffle(rng);

        let mut last = first;
        for kind in std::iter::once(first).chain(rest) {
            last = kind;
            if !self.usable(kind) {
                debug!("Skipping {kind} question: too few distinct values");
                continue;
            }
            let question = question_for(record, kind, self.dataset.distinct(kind), rng)?;
            debug!("Generated {kind} question: {}", question.prompt);
            return Ok(question);
        }

        Err(QuizError::InsufficientDistinctValues {
            kind: last,
            distinct: self.dataset.distinct(last).len(),
        })
    }
}
