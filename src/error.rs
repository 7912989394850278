//! Error types shared by the loader, the question generator and the quiz session.
use std::path::PathBuf;

use thiserror::Error;

use crate::questions::QuestionKind;
use crate::session::QuizState;

#[derive(Debug, Error)]
pub enum QuizError {
    #[error("dataset not found at '{}'", .0.display())]
    DatasetNotFound(PathBuf),

    #[error("dataset is missing required column '{0}'")]
    MissingColumn(String),

    #[error("dataset has no usable matches")]
    EmptyDataset,

    /// Fewer than four distinct values for every question kind, so no
    /// question can carry three decoys.
    #[error("not enough distinct values for a question ({kind} has {distinct})")]
    InsufficientDistinctValues { kind: QuestionKind, distinct: usize },

    #[error("'{0}' is not one of the current options")]
    InvalidChoice(String),

    #[error("cannot {action} while {state}")]
    InvalidStateTransition {
        action: &'static str,
        state: QuizState,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("SQL error: {0}")]
    Sql(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, QuizError>;
