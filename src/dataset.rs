//! Match dataset loading.
//!
//! Reads the IPL matches CSV, keeps the columns the quiz and the stats pages use
//! and drops the rows that cannot back a question (no venue, no player of the
//! match or no winner).
use log::{info, warn};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use crate::error::{QuizError, Result};
use crate::questions::QuestionKind;

/// Columns every dataset file must carry
pub const REQUIRED_COLUMNS: [&str; 8] = [
    "team1",
    "team2",
    "date",
    "venue",
    "player_of_match",
    "winner",
    "toss_winner",
    "toss_decision",
];

/// Cell values that count as missing, matching the markers pandas reads as NaN
const NULL_MARKERS: [&str; 9] = [
    "NA", "N/A", "n/a", "NaN", "nan", "NULL", "null", "None", "<NA>",
];

/// One historical match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRecord {
    pub team1: String,
    pub team2: String,
    pub date: String,
    pub venue: String,
    pub player_of_match: String,
    pub winner: String,
    pub toss_winner: String,
    pub toss_decision: String,
}

// Row as it sits in the file; unknown columns are ignored
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawMatch {
    team1: String,
    team2: String,
    date: String,
    venue: String,
    player_of_match: String,
    winner: String,
    toss_winner: String,
    toss_decision: String,
}

fn present(value: &str) -> Option<String> {
    let v = value.trim();
    if v.is_empty() || NULL_MARKERS.contains(&v) {
        None
    } else {
        Some(v.to_string())
    }
}

impl RawMatch {
    fn into_record(self) -> Option<MatchRecord> {
        Some(MatchRecord {
            venue: present(&self.venue)?,
            player_of_match: present(&self.player_of_match)?,
            winner: present(&self.winner)?,
            team1: self.team1.trim().to_string(),
            team2: self.team2.trim().to_string(),
            date: self.date.trim().to_string(),
            toss_winner: self.toss_winner.trim().to_string(),
            toss_decision: self.toss_decision.trim().to_string(),
        })
    }
}

/// Loaded matches plus the distinct answer values per question kind.
///
/// Built once and only read afterwards.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<MatchRecord>,
    venues: Vec<String>,
    players: Vec<String>,
    winners: Vec<String>,
}

impl Dataset {
    /// Loads a dataset from a CSV file on disk.
    ///
    /// A missing file is reported as [`QuizError::DatasetNotFound`] so callers
    /// can show a message instead of aborting.
    pub fn load(path: &Path) -> Result<Self> {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(QuizError::DatasetNotFound(path.to_path_buf()))
            }
            Err(e) => return Err(e.into()),
        };
        let dataset = Self::from_reader(file)?;
        info!("Loaded {} matches from {}", dataset.len(), path.display());
        Ok(dataset)
    }

    /// Parses CSV content with a header row.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        for column in REQUIRED_COLUMNS {
            if !headers.iter().any(|h| h == column) {
                return Err(QuizError::MissingColumn(column.to_string()));
            }
        }

        let mut records = Vec::new();
        let mut dropped = 0usize;
        for row in reader.deserialize::<RawMatch>() {
            match row?.into_record() {
                Some(record) => records.push(record),
                None => dropped += 1,
            }
        }
        if dropped > 0 {
            warn!("Dropped {dropped} matches with no venue, player of the match or winner");
        }

        Ok(Self::from_records(records))
    }

    pub fn from_records(records: Vec<MatchRecord>) -> Self {
        let venues = unique(records.iter().map(|r| r.venue.as_str()));
        let players = unique(records.iter().map(|r| r.player_of_match.as_str()));
        let winners = unique(records.iter().map(|r| r.winner.as_str()));
        Self {
            records,
            venues,
            players,
            winners,
        }
    }

    pub fn records(&self) -> &[MatchRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct values of the column a question kind asks about, in order of
    /// first appearance.
    pub fn distinct(&self, kind: QuestionKind) -> &[String] {
        match kind {
            QuestionKind::Venue => &self.venues,
            QuestionKind::PlayerOfMatch => &self.players,
            QuestionKind::Winner => &self.winners,
        }
    }
}

fn unique<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .filter(|v| seen.insert(*v))
        .map(str::to_string)
        .collect()
}
