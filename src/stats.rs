//! Stats explorer: frequency charts and per-stadium match lists.
//!
//! The dataset is copied into an in-memory SQLite table so every chart is a
//! plain GROUP BY query.
use log::debug;
use rusqlite::{params, Connection};

use crate::dataset::Dataset;
use crate::error::Result;

/// Bars in the venue and player-of-the-match charts
pub const TOP_N: usize = 10;

/// Matches listed in a stadium report
pub const RECENT_MATCHES: usize = 10;

/// One row of a stadium report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRow {
    pub date: String,
    pub team1: String,
    pub team2: String,
    pub winner: String,
    pub player_of_match: String,
}

/// Everything shown for a selected stadium
#[derive(Debug, Clone)]
pub struct VenueReport {
    pub venue: String,
    pub total_matches: usize,
    /// Up to ten latest matches, oldest first
    pub recent: Vec<MatchRow>,
}

pub struct StatsDb {
    conn: Connection,
}

impl StatsDb {
    /// Copies every record into a fresh in-memory database, keeping file order
    /// in the row id.
    pub fn from_dataset(dataset: &Dataset) -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        conn.execute_batch(
            "CREATE TABLE matches (
                id INTEGER PRIMARY KEY,
                team1 TEXT NOT NULL,
                team2 TEXT NOT NULL,
                date TEXT NOT NULL,
                venue TEXT NOT NULL,
                player_of_match TEXT NOT NULL,
                winner TEXT NOT NULL,
                toss_winner TEXT NOT NULL,
                toss_decision TEXT NOT NULL
            );",
        )?;

        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO matches
                 (team1, team2, date, venue, player_of_match, winner, toss_winner, toss_decision)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            for r in dataset.records() {
                stmt.execute(params![
                    r.team1,
                    r.team2,
                    r.date,
                    r.venue,
                    r.player_of_match,
                    r.winner,
                    r.toss_winner,
                    r.toss_decision,
                ])?;
            }
        }
        tx.commit()?;
        debug!("Stats table holds {} matches", dataset.len());

        Ok(Self { conn })
    }

    // Column names come from the fixed set below, never from user input
    fn value_counts(&self, column: &str, limit: Option<usize>) -> Result<Vec<(String, u64)>> {
        let limit = limit.map_or(-1, |n| n as i64);
        let sql = format!(
            "SELECT {column}, COUNT(*) AS n
             FROM matches
             GROUP BY {column}
             ORDER BY n DESC, {column} ASC
             LIMIT ?1"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([limit], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut counts = Vec::new();
        for row in rows {
            let (value, n) = row?;
            counts.push((value, n as u64));
        }
        Ok(counts)
    }

    /// Most used stadiums
    pub fn top_venues(&self, n: usize) -> Result<Vec<(String, u64)>> {
        self.value_counts("venue", Some(n))
    }

    /// Most frequent 'Player of the Match' winners
    pub fn top_players_of_match(&self, n: usize) -> Result<Vec<(String, u64)>> {
        self.value_counts("player_of_match", Some(n))
    }

    /// Total wins for every team
    pub fn team_wins(&self) -> Result<Vec<(String, u64)>> {
        self.value_counts("winner", None)
    }

    /// Distinct stadiums in the order they first appear
    pub fn venues(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT venue FROM matches GROUP BY venue ORDER BY MIN(id)")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        let mut venues = Vec::new();
        for row in rows {
            venues.push(row?);
        }
        Ok(venues)
    }

    /// Match count and latest matches at one stadium
    pub fn venue_report(&self, venue: &str) -> Result<VenueReport> {
        let total: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM matches WHERE venue = ?1",
            [venue],
            |row| row.get(0),
        )?;

        let mut stmt = self.conn.prepare(
            "SELECT date, team1, team2, winner, player_of_match
             FROM matches
             WHERE venue = ?1
             ORDER BY id DESC
             LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![venue, RECENT_MATCHES as i64], |row| {
            Ok(MatchRow {
                date: row.get(0)?,
                team1: row.get(1)?,
                team2: row.get(2)?,
                winner: row.get(3)?,
                player_of_match: row.get(4)?,
            })
        })?;

        let mut recent = Vec::new();
        for row in rows {
            recent.push(row?);
        }
        recent.reverse();

        Ok(VenueReport {
            venue: venue.to_string(),
            total_matches: total as usize,
            recent,
        })
    }
}

/// Renders a horizontal text bar chart, longest bar `width` characters wide.
pub fn render_bar_chart(title: &str, counts: &[(String, u64)], width: usize) -> String {
    let mut out = format!("{title}\n");
    if counts.is_empty() {
        out.push_str("(no data)\n");
        return out;
    }

    let label_width = counts
        .iter()
        .map(|(l, _)| l.chars().count())
        .max()
        .unwrap_or(0);
    let max = counts.iter().map(|(_, c)| *c).max().unwrap_or(0).max(1);

    for (label, count) in counts {
        let len = ((*count as f64 / max as f64) * width as f64).round() as usize;
        // keep non-zero counts visible
        let len = if *count > 0 { len.max(1) } else { 0 };
        out.push_str(&format!(
            "{label:<label_width$} | {} {count}\n",
            "█".repeat(len)
        ));
    }
    out
}

/// Renders a stadium report as a table
pub fn render_venue_report(report: &VenueReport) -> String {
    let mut out = format!(
        "Total matches played at {}: {}\n",
        report.venue, report.total_matches
    );
    if report.recent.is_empty() {
        return out;
    }
    let header = "date | team1 | team2 | winner | player_of_match";
    out.push_str(header);
    out.push('\n');
    out.push_str(&"-".repeat(header.len()));
    out.push('\n');
    for m in &report.recent {
        out.push_str(&format!(
            "{} | {} | {} | {} | {}\n",
            m.date, m.team1, m.team2, m.winner, m.player_of_match
        ));
    }
    out
}
