//! Line commands for the console front end and the text it prints back.

use std::fmt::Write as _;

use anyhow::{anyhow, bail, Result};

use crate::{
    hours::today_hours,
    models::{Campus, CrowdLevel, MealPeriod},
    utils::time::{format_clock_time, format_decimal_time},
};

use super::{
    controller::{DashboardSnapshot, IntentReceipt},
    reactions::{reaction_summary, REACTION_PALETTE},
};

pub const HELP: &str = "\
commands:
  vote <csb|sju>
  react <csb|sju> <emoji>
  crowd <csb|sju> <low|medium|high>
  like <csb|sju> <text>
  dislike <csb|sju> <text>
  status
  help
  quit";

/// Feedback entries shown per campus in the status view.
const FEEDBACK_SHOWN: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    Vote(Campus),
    React(Campus, String),
    Crowd(Campus, CrowdLevel),
    Feedback {
        campus: Campus,
        text: String,
        is_positive: bool,
    },
    Status,
    Help,
    Quit,
}

impl ConsoleCommand {
    /// `Ok(None)` for a blank line.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (verb, rest) = split_word(line);
        let command = match verb.to_ascii_lowercase().as_str() {
            "vote" => ConsoleCommand::Vote(campus_arg(rest)?.0),
            "react" => {
                let (campus, token) = campus_arg(rest)?;
                if token.is_empty() {
                    bail!("pick a reaction: {}", REACTION_PALETTE.join(" "));
                }
                ConsoleCommand::React(campus, token.to_string())
            }
            "crowd" => {
                let (campus, level) = campus_arg(rest)?;
                let level: CrowdLevel = level.parse()?;
                if !CrowdLevel::REPORTABLE.contains(&level) {
                    bail!("crowd level must be low, medium or high");
                }
                ConsoleCommand::Crowd(campus, level)
            }
            "like" | "dislike" => {
                let (campus, text) = campus_arg(rest)?;
                ConsoleCommand::Feedback {
                    campus,
                    text: text.to_string(),
                    is_positive: verb.eq_ignore_ascii_case("like"),
                }
            }
            "status" => ConsoleCommand::Status,
            "help" | "?" => ConsoleCommand::Help,
            "quit" | "exit" => ConsoleCommand::Quit,
            other => bail!("unknown command '{other}' (try 'help')"),
        };
        Ok(Some(command))
    }
}

fn split_word(input: &str) -> (&str, &str) {
    match input.split_once(char::is_whitespace) {
        Some((head, tail)) => (head, tail.trim_start()),
        None => (input, ""),
    }
}

fn campus_arg(input: &str) -> Result<(Campus, &str)> {
    let (campus, rest) = split_word(input);
    if campus.is_empty() {
        return Err(anyhow!("missing campus (csb or sju)"));
    }
    Ok((campus.parse()?, rest))
}

pub fn describe_receipt(campus: Campus, receipt: &IntentReceipt) -> String {
    match &receipt.rejection {
        Some(rejection) => format!("not recorded: {rejection}"),
        None => {
            let data = receipt.votes.get(campus);
            format!(
                "recorded for {} ({}% of {} votes)",
                campus.display_name(),
                data.percentage,
                receipt.votes.total_votes()
            )
        }
    }
}

pub fn render_status(snapshot: &DashboardSnapshot) -> String {
    let mut out = String::new();
    let _ = write!(out, "{}", snapshot.meal);
    if let Some(countdown) = snapshot.crowd_reset.time_until_reset(snapshot.taken_at) {
        let _ = write!(out, " | crowd levels reset in {countdown}");
    }
    out.push('\n');

    for campus in Campus::ALL {
        let data = snapshot.votes.get(campus);
        let is_open = snapshot.open.get(campus);
        let hours = today_hours(campus, snapshot.taken_at.date());

        let _ = write!(out, "{} ({campus})", campus.display_name());
        match (is_open, hours.close) {
            (true, Some(close)) => {
                let _ = write!(
                    out,
                    " open until {} | {} crowd",
                    format_decimal_time(close),
                    data.crowd_level.as_str()
                );
            }
            _ => out.push_str(" closed"),
        }
        out.push('\n');

        let _ = writeln!(out, "  {}% ({} votes)", data.percentage, data.count);

        let summary = reaction_summary(&data.recent_reactions);
        if let Some(latest) = data.recent_reactions.get(0) {
            let _ = writeln!(
                out,
                "  reactions: {summary} (last at {})",
                format_clock_time(latest.timestamp)
            );
        }

        let weather = snapshot.weather.get(campus);
        if weather.loading {
            out.push_str("  weather: loading\n");
        } else if weather.reading.is_unavailable() {
            out.push_str("  weather: unavailable\n");
        } else {
            let _ = writeln!(
                out,
                "  weather: {} (feels {}), {} humidity",
                weather.reading.format_temp(snapshot.unit),
                weather.reading.format_feels_like(snapshot.unit),
                weather.reading.format_humidity()
            );
        }

        for like in data.likes.iter().rev().take(FEEDBACK_SHOWN) {
            let _ = writeln!(out, "  👍 {like}");
        }
        for dislike in data.dislikes.iter().rev().take(FEEDBACK_SHOWN) {
            let _ = writeln!(out, "  👎 {dislike}");
        }
    }

    if snapshot.meal == MealPeriod::Closed {
        out.push_str("Dining halls are currently closed. Check back during meal times!\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        hours::open_status,
        models::{TemperatureUnit, VotesState, WeatherData, WeatherState},
        scheduler::CrowdResetState,
    };
    use chrono::{NaiveDate, NaiveDateTime};

    fn friday(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 10, 18)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn parses_commands() {
        assert_eq!(
            ConsoleCommand::parse("vote CSB").unwrap(),
            Some(ConsoleCommand::Vote(Campus::Csb))
        );
        assert_eq!(
            ConsoleCommand::parse("react sju 😋").unwrap(),
            Some(ConsoleCommand::React(Campus::Sju, "😋".into()))
        );
        assert_eq!(
            ConsoleCommand::parse("crowd csb high").unwrap(),
            Some(ConsoleCommand::Crowd(Campus::Csb, CrowdLevel::High))
        );
        assert_eq!(
            ConsoleCommand::parse("dislike sju  the soup was  cold").unwrap(),
            Some(ConsoleCommand::Feedback {
                campus: Campus::Sju,
                text: "the soup was  cold".into(),
                is_positive: false,
            })
        );
        assert_eq!(ConsoleCommand::parse("   ").unwrap(), None);
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!(ConsoleCommand::parse("vote").is_err());
        assert!(ConsoleCommand::parse("vote umn").is_err());
        assert!(ConsoleCommand::parse("react csb").is_err());
        assert!(ConsoleCommand::parse("crowd csb unknown").is_err());
        assert!(ConsoleCommand::parse("dance").is_err());
    }

    #[test]
    fn status_shows_open_hall_and_closed_hall() {
        let now = friday(20, 0);
        let mut votes = VotesState::new();
        votes.record_vote(Campus::Csb, now).unwrap();
        votes.record_reaction(Campus::Csb, "👍", now).unwrap();
        let mut weather = WeatherState::default();
        weather.csb.loading = false;
        weather.csb.reading = WeatherData {
            temp: Some(41.0),
            humidity: Some(80.0),
            feels_like: Some(36.0),
        };

        let snapshot = DashboardSnapshot {
            votes,
            meal: MealPeriod::Dinner,
            open: open_status(now),
            crowd_reset: CrowdResetState::default(),
            weather,
            unit: TemperatureUnit::F,
            taken_at: now,
        };

        let text = render_status(&snapshot);
        assert!(text.contains("Gorecki (csb) open until 10:30 PM | Unknown crowd"));
        assert!(text.contains("Refectory (sju) closed"));
        assert!(text.contains("100% (1 votes)"));
        assert!(text.contains("reactions: 👍 (last at 8:00 PM)"));
        assert!(text.contains("weather: 41°F (feels 36°F), 80% humidity"));
        assert!(text.contains("weather: loading"));
    }
}
