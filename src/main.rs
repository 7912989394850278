mod config;
mod dataset;
mod error;
mod questions;
mod session;
mod stats;

use crate::config::{Cli, Command, Config};
use crate::dataset::Dataset;
use crate::error::QuizError;
use crate::questions::QuestionGenerator;
use crate::session::{QuizSession, QuizState};
use crate::stats::{render_bar_chart, render_venue_report, StatsDb, TOP_N};
use clap::Parser;
use log::{error, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::{self, Write};

/// Width of the longest bar in the stats charts
const CHART_WIDTH: usize = 40;

const NO_DATA: &str = "Please download the dataset as instructed to use the app.";

const NOT_ENOUGH_VALUES: &str =
    "The dataset does not have enough distinct values to build questions.";

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let config = Config::from(&cli);

    let dataset = match Dataset::load(&config.data_path) {
        Ok(d) => Some(d),
        Err(QuizError::DatasetNotFound(path)) => {
            println!("Error: '{}' not found.", path.display());
            println!(
                "Please make sure the 'matches.csv' file is inside the \
                 'IPL Matches 2008-2020.csv' folder."
            );
            None
        }
        Err(e) => {
            error!("Failed to load dataset: {e}");
            println!("Error: could not read the dataset: {e}");
            None
        }
    };

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    match cli.command {
        Some(Command::Stats { venue }) => match &dataset {
            Some(d) => print_stats(d, venue.as_deref()),
            None => println!("{NO_DATA}"),
        },
        None => run_prompt(dataset.as_ref(), &mut rng),
    }
}

fn print_help() {
    println!("Commands:");
    println!("  start        -> start the quiz");
    println!("  1-4 / <text> -> answer the current question");
    println!("  hint         -> show a hint");
    println!("  next         -> next question (after answering)");
    println!("  reset        -> reset the quiz");
    println!("  score        -> show session score");
    println!("  stats        -> show IPL stats charts");
    println!("  venues       -> list stadiums");
    println!("  venue <name> -> recent matches at a stadium (name or number)");
    println!("  quit         -> exit");
    println!();
}

fn print_question(session: &QuizSession) {
    let (Some(q), Some(index)) = (session.current_question(), session.question_index()) else {
        return;
    };
    println!("Score: {}", session.score());
    println!("Question {}", index + 1);
    println!("{}", q.prompt);
    for (i, option) in q.options.iter().enumerate() {
        println!("  {}. {}", i + 1, option);
    }
    println!("(Answer with 1-4 or the option text, 'hint' for a hint)");
    println!();
}

fn print_summary(session: &QuizSession) {
    let (correct, answered) = session.tally();
    println!("\n=== SESSION SUMMARY ===");
    println!("Questions answered: {}", answered);
    println!("Total score: {}/{}", correct, answered);
}

/// Logs a rejected transition and puts the session back on the start screen
fn recover(session: &mut QuizSession, err: QuizError) {
    error!("Quiz session error: {err}");
    session.reset();
    println!("Something went wrong ({err}).");
    println!("The quiz has been reset; type 'start' to play again.");
    println!();
}

fn print_stats(dataset: &Dataset, venue: Option<&str>) {
    let stats = match StatsDb::from_dataset(dataset) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to build stats: {e}");
            println!("Error building stats: {e}");
            return;
        }
    };
    if let Err(e) = print_charts(&stats) {
        println!("Error running stats query: {e}");
    }
    if let Some(venue) = venue {
        print_venue(&stats, venue);
    }
}

fn print_charts(stats: &StatsDb) -> error::Result<()> {
    println!("=== IPL STATS EXPLORER ===");
    println!();
    println!(
        "{}",
        render_bar_chart("Top 10 Most Used Stadiums", &stats.top_venues(TOP_N)?, CHART_WIDTH)
    );
    println!(
        "{}",
        render_bar_chart(
            "Top 10 'Player of the Match' Winners",
            &stats.top_players_of_match(TOP_N)?,
            CHART_WIDTH
        )
    );
    println!(
        "{}",
        render_bar_chart("Total Wins per Team", &stats.team_wins()?, CHART_WIDTH)
    );
    Ok(())
}

fn print_venue(stats: &StatsDb, selection: &str) {
    let venues = match stats.venues() {
        Ok(v) => v,
        Err(e) => {
            println!("Error running stats query: {e}");
            return;
        }
    };

    // a number picks from the 'venues' listing
    let venue = match selection.parse::<usize>() {
        Ok(n) => n.checked_sub(1).and_then(|i| venues.get(i)).cloned(),
        Err(_) => venues
            .iter()
            .find(|v| v.eq_ignore_ascii_case(selection))
            .cloned(),
    };

    match venue {
        Some(v) => match stats.venue_report(&v) {
            Ok(report) => println!("{}", render_venue_report(&report)),
            Err(e) => println!("Error running stats query: {e}"),
        },
        None => {
            println!("Unknown stadium: '{selection}'");
            println!("Type 'venues' to see available stadiums.\n");
        }
    }
}

/// Quiz transitions the prompt can request
#[derive(Debug, Clone, PartialEq, Eq)]
enum QuizAction {
    Start,
    Submit(String),
    Hint,
    Next,
}

fn print_verdict(session: &QuizSession) {
    let Some(q) = session.current_question() else {
        return;
    };
    if session.last_answer_correct() == Some(true) {
        println!("Correct! 🎉");
    } else {
        println!("Wrong! The correct answer was: {}", q.correct_answer);
    }
    println!("Type 'next' for the next question.\n");
}

/// Runs one transition on the session.
///
/// A rejected transition or choice is logged and the session reset.
fn apply<R: Rng + ?Sized>(
    session: &mut QuizSession,
    generator: &QuestionGenerator<'_>,
    rng: &mut R,
    action: QuizAction,
) {
    let result = match &action {
        QuizAction::Start => session.start(generator, rng).map(|_| ()),
        QuizAction::Next => session.next(generator, rng).map(|_| ()),
        QuizAction::Submit(choice) => session.submit(choice).map(|_| ()),
        QuizAction::Hint => session.hint().map(|hint| println!("{hint}\n")),
    };
    match result {
        Ok(()) => match action {
            QuizAction::Start | QuizAction::Next => print_question(session),
            QuizAction::Submit(_) => print_verdict(session),
            QuizAction::Hint => {}
        },
        Err(e) => recover(session, e),
    }
}

/// Handles quiz input, refusing commands the current state does not offer.
///
/// Returns false when the input is not a quiz command or answer.
fn handle_quiz_input<R: Rng + ?Sized>(
    session: &mut QuizSession,
    generator: &QuestionGenerator<'_>,
    rng: &mut R,
    raw: &str,
) -> bool {
    let state = session.state();
    match raw.to_lowercase().as_str() {
        "start" => match state {
            QuizState::NotStarted => apply(session, generator, rng, QuizAction::Start),
            _ => println!("A quiz is already running. Type 'reset' to start over."),
        },
        "hint" => match state {
            QuizState::AwaitingAnswer => apply(session, generator, rng, QuizAction::Hint),
            QuizState::AnswerRevealed => {
                println!("The answer is already revealed. Type 'next'.\n")
            }
            QuizState::NotStarted => println!("Type 'start' to begin the quiz.\n"),
        },
        "next" => match state {
            QuizState::AnswerRevealed => apply(session, generator, rng, QuizAction::Next),
            QuizState::AwaitingAnswer => println!("Submit an answer first.\n"),
            QuizState::NotStarted => println!("Type 'start' to begin the quiz.\n"),
        },
        _ => {
            let choice = session
                .current_question()
                .and_then(|q| q.resolve_option(raw))
                .map(str::to_string);
            match (state, choice) {
                (QuizState::AwaitingAnswer, Some(choice)) => {
                    apply(session, generator, rng, QuizAction::Submit(choice))
                }
                (QuizState::AnswerRevealed, Some(_)) => println!(
                    "You already answered '{}'. Type 'next'.\n",
                    session.user_choice().unwrap_or_default()
                ),
                _ => return false,
            }
        }
    }
    true
}

fn run_prompt(dataset: Option<&Dataset>, rng: &mut StdRng) {
    let generator = dataset
        .map(QuestionGenerator::new)
        .filter(|g| g.is_ready());
    let unavailable = if dataset.is_some() { NOT_ENOUGH_VALUES } else { NO_DATA };
    if dataset.is_some() && generator.is_none() {
        println!("{NOT_ENOUGH_VALUES}");
    }
    let stats = dataset.and_then(|d| match StatsDb::from_dataset(d) {
        Ok(s) => Some(s),
        Err(e) => {
            error!("Failed to build stats: {e}");
            None
        }
    });

    let mut session = QuizSession::new();

    println!("Welcome to the IPL Cricket Quiz!");
    print_help();
    if dataset.is_none() {
        println!("{NO_DATA}");
        println!();
    }

    let stdin = io::stdin();

    loop {
        print!("> ");
        io::stdout().flush().ok();

        let mut input = String::new();
        match stdin.read_line(&mut input) {
            Ok(0) => {
                print_summary(&session);
                break;
            }
            Ok(_) => {}
            Err(_) => {
                eprintln!("Error reading input, try again.");
                continue;
            }
        }

        let raw = input.trim().to_string();
        if raw.is_empty() {
            continue;
        }

        let lc_cmd = raw.to_lowercase();

        match lc_cmd.as_str() {
            "quit" | "exit" => {
                print_summary(&session);
                println!("Goodbye!");
                break;
            }
            "help" => print_help(),
            "score" => {
                let (correct, answered) = session.tally();
                println!("\n=== SESSION SCORE ===");
                println!("Questions answered: {}", answered);
                println!("Score: {}", correct);
                match session.last_answer_correct() {
                    Some(true) => println!("Last answer: correct"),
                    Some(false) => println!("Last answer: wrong"),
                    None => {}
                }
                println!();
            }
            "reset" => {
                session.reset();
                println!("Quiz reset. Type 'start' to play again.\n");
            }
            "stats" => match &stats {
                Some(s) => {
                    if let Err(e) = print_charts(s) {
                        println!("Error running stats query: {e}");
                    }
                }
                None => println!("{NO_DATA}"),
            },
            "venues" => match &stats {
                Some(s) => match s.venues() {
                    Ok(venues) => {
                        println!("Stadiums:");
                        for (i, v) in venues.iter().enumerate() {
                            println!("{:>3}: {}", i + 1, v);
                        }
                        println!();
                    }
                    Err(e) => println!("Error running stats query: {e}"),
                },
                None => println!("{NO_DATA}"),
            },
            cmd if cmd.starts_with("venue ") => match &stats {
                Some(s) => {
                    let selection = raw
                        .split_once(char::is_whitespace)
                        .map(|(_, rest)| rest.trim())
                        .unwrap_or_default();
                    print_venue(s, selection)
                }
                None => println!("{NO_DATA}"),
            },
            "start" | "hint" | "next" if generator.is_none() => println!("{unavailable}\n"),
            other => {
                let handled = match &generator {
                    Some(g) => handle_quiz_input(&mut session, g, rng, &raw),
                    None => false,
                };
                if !handled {
                    info!("Unrecognised input: {other}");
                    println!("Unknown command or answer: '{raw}'");
                    println!("Type 'help' to see available commands.\n");
                }
            }
        }
    }
}
